/*!
# covsim

The experiment harness: a stand-in scenario engine (mobility, energy drain,
traffic) wired to the monitoring primitives of [`covsim_core`].

Build a [`Scenario`] with [`Scenario::builder`], run it to completion with
[`Scenario::run`], and read the returned
[`SimulationSummary`](covsim_core::SimulationSummary).
*/

mod energy_model;
mod mobility;
mod scenario;
mod traffic;

pub use self::{
    energy_model::{CurrentProfile, EnergySource},
    mobility::{Bounds, Fixed, Mobility, RandomWalk},
    scenario::{Scenario, ScenarioBuilder, ScenarioError},
    traffic::{PacketOutcome, TrafficModel},
};

// convenient re-export of the core objects a harness user needs
pub use covsim_core::{
    NodeId, Position, SimDuration, SimulationSummary, Timestamp,
};
