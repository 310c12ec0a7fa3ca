/*!
# covsim-core

Deterministic monitoring-and-aggregation primitives for wireless
coverage/energy experiments.

The crate provides the bookkeeping that sits on top of a discrete-event
scenario: a virtual-time [`Scheduler`], per-node coverage accounting
([`CoverageTracker`]), an energy consumption ledger ([`EnergyLedger`]),
a one-shot flow-statistics reduction ([`FlowSummary`]), and the final
[`SimulationSummary`]. It performs no I/O beyond diagnostic logging and
owns no randomness; the scenario driver (see the `covsim` crate) supplies
positions, energy notifications and traffic counters.
*/

pub mod coverage;
pub mod defaults;
mod energy;
mod error;
mod event_queue;
mod flow;
mod geometry;
mod node;
mod scheduler;
mod summary;
mod time;

pub use self::{
    coverage::{CoverageRecord, CoverageStatus, CoverageTracker},
    energy::{EnergyLedger, EnergyObserver, EnergyRecord, SourceId},
    error::CoverageError,
    event_queue::EventQueue,
    flow::{FlowId, FlowStats, FlowSummary},
    geometry::{AccessPoint, CoverageArea, Position},
    node::NodeId,
    scheduler::Scheduler,
    summary::{OutOfCoverageSummary, SimulationSummary},
    time::{SimDuration, Timestamp},
};
