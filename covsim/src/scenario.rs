//! Scenario wiring and the discrete-event run loop.
//!
//! Everything here is declarative setup of the stand-in simulator: how many
//! nodes and access points exist, where they sit, which models drive them.
//! The monitoring and aggregation logic lives in `covsim-core`; the run loop
//! only pops events off the scheduler and routes them to the owning
//! component.

use crate::{
    energy_model::EnergySource,
    mobility::{Bounds, Fixed, Mobility, RandomWalk},
    traffic::{PacketOutcome, TrafficModel},
};
use covsim_core::{
    defaults, CoverageArea, CoverageError, CoverageStatus, CoverageTracker, EnergyLedger,
    EnergyObserver as _, FlowId, FlowSummary, NodeId, Position, Scheduler, SimulationSummary,
    SourceId, Timestamp,
};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;
use std::{collections::HashMap, time::Duration};
use thiserror::Error;
use tracing::info;

/// How often every energy source accounts its idle draw.
const ENERGY_UPDATE_INTERVAL: Duration = Duration::from_secs(1);
/// When traffic starts, and how often each flow transmits.
const TRAFFIC_START: Duration = Duration::from_secs(1);
const PACKET_INTERVAL: Duration = Duration::from_millis(100);
/// Radio airtime billed per transmitted packet and per received ack.
const PACKET_AIRTIME: Duration = Duration::from_micros(150);
const ACK_AIRTIME: Duration = Duration::from_micros(30);
/// One-way propagation delay of a delivered packet, plus uniform jitter.
const BASE_DELAY: Duration = Duration::from_millis(10);
const DELAY_JITTER: Duration = Duration::from_millis(5);
/// Random walkers roam this many coverage radii in each direction.
const ROAM_FACTOR: f64 = 4.0;
const WALK_SPEED_MPS: (f64, f64) = (1.0, 2.0);

/// Setup faults, surfaced at wiring time, before any callback runs.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario requires at least one mobile node")]
    NoNodes,
    #[error("scenario requires at least one access point")]
    NoAccessPoints,
    #[error("packet loss rate must be within 0.0..=1.0, got {0}")]
    InvalidLossRate(f64),
    #[error(transparent)]
    Coverage(#[from] CoverageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    /// Sample one node's position and evaluate its coverage.
    Probe(NodeId),
    /// Account one node's idle energy draw.
    EnergyTick(NodeId),
    /// Transmit one packet on a flow.
    PacketSend(FlowId),
}

/// Builder for a [`Scenario`].
///
/// Nodes come in two flavors: `nodes(n)` adds `n` random walkers (seeded
/// from the scenario seed), `node_at(position)` pins a node to a fixed
/// position. Access points are either laid out on a grid (`access_points`)
/// or placed explicitly (`access_point_at`).
pub struct ScenarioBuilder {
    sim_time: Duration,
    random_nodes: u32,
    fixed_nodes: Vec<Position>,
    grid_access_points: u32,
    explicit_access_points: Vec<Position>,
    coverage_radius_m: f64,
    packet_loss_rate: f64,
    use_ca: bool,
    seed: u64,
    initial_energy_j: f64,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self {
            sim_time: Duration::from_secs(30),
            random_nodes: 0,
            fixed_nodes: Vec::new(),
            grid_access_points: 0,
            explicit_access_points: Vec::new(),
            coverage_radius_m: defaults::DEFAULT_COVERAGE_RADIUS_M,
            packet_loss_rate: 0.0,
            use_ca: false,
            seed: 0,
            initial_energy_j: defaults::DEFAULT_INITIAL_ENERGY_J,
        }
    }
}

impl ScenarioBuilder {
    pub fn sim_time(mut self, sim_time: Duration) -> Self {
        self.sim_time = sim_time;
        self
    }

    pub fn nodes(mut self, count: u32) -> Self {
        self.random_nodes = count;
        self
    }

    pub fn node_at(mut self, position: Position) -> Self {
        self.fixed_nodes.push(position);
        self
    }

    pub fn access_points(mut self, count: u32) -> Self {
        self.grid_access_points = count;
        self
    }

    pub fn access_point_at(mut self, position: Position) -> Self {
        self.explicit_access_points.push(position);
        self
    }

    pub fn coverage_radius(mut self, radius_m: f64) -> Self {
        self.coverage_radius_m = radius_m;
        self
    }

    pub fn packet_loss_rate(mut self, rate: f64) -> Self {
        self.packet_loss_rate = rate;
        self
    }

    pub fn use_ca(mut self, use_ca: bool) -> Self {
        self.use_ca = use_ca;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn initial_energy(mut self, joules: f64) -> Self {
        self.initial_energy_j = joules;
        self
    }

    /// Wire the scenario. All setup faults surface here.
    pub fn build(self) -> Result<Scenario, ScenarioError> {
        let mut area = CoverageArea::new(self.coverage_radius_m)?;
        for position in &self.explicit_access_points {
            area.add_access_point(*position);
        }
        // single-row grid, one coverage diameter apart
        for i in 0..self.grid_access_points {
            area.add_access_point(Position::new(
                f64::from(i) * 2.0 * self.coverage_radius_m,
                0.0,
                0.0,
            ));
        }
        if area.is_empty() {
            return Err(ScenarioError::NoAccessPoints);
        }

        let extent = ROAM_FACTOR * self.coverage_radius_m;
        let bounds = Bounds::new(0.0, extent, 0.0, extent);

        let mut mobility: HashMap<NodeId, Box<dyn Mobility>> = HashMap::new();
        let mut node = NodeId::ZERO;
        for position in &self.fixed_nodes {
            mobility.insert(node, Box::new(Fixed::new(*position)));
            node = node.next();
        }
        for _ in 0..self.random_nodes {
            let rng = ChaChaRng::seed_from_u64(self.seed.wrapping_add(node.into_u64() + 1));
            mobility.insert(node, Box::new(RandomWalk::new(bounds, WALK_SPEED_MPS, rng)));
            node = node.next();
        }
        if mobility.is_empty() {
            return Err(ScenarioError::NoNodes);
        }

        let base_delay = if self.use_ca {
            BASE_DELAY / 2
        } else {
            BASE_DELAY
        };
        let mut traffic = TrafficModel::new(self.packet_loss_rate, base_delay, DELAY_JITTER)?;

        let mut tracker = CoverageTracker::default();
        let mut ledger = EnergyLedger::new();
        let mut sources = HashMap::new();
        let mut scheduler = Scheduler::new(self.sim_time);

        let mut node_ids: Vec<NodeId> = mobility.keys().copied().collect();
        node_ids.sort();
        for node in node_ids {
            tracker.register(node);

            let source_id = SourceId::new(node.into_u64());
            ledger.register(source_id, self.initial_energy_j);
            sources.insert(node, EnergySource::new(source_id, self.initial_energy_j));

            let flow = traffic.add_flow(node);

            let tick = tracker.tick_interval();
            scheduler.schedule_periodic(tick, tick, Event::Probe(node));
            scheduler.schedule_periodic(
                ENERGY_UPDATE_INTERVAL,
                ENERGY_UPDATE_INTERVAL,
                Event::EnergyTick(node),
            );
            scheduler.schedule_periodic(TRAFFIC_START, PACKET_INTERVAL, Event::PacketSend(flow));
        }

        info!(
            nodes = mobility.len(),
            access_points = area.access_points().count(),
            coverage_radius_m = self.coverage_radius_m,
            sim_time_s = self.sim_time.as_secs_f64(),
            packet_loss_rate = self.packet_loss_rate,
            use_ca = self.use_ca,
            seed = self.seed,
            "scenario configured"
        );

        Ok(Scenario {
            scheduler,
            area,
            mobility,
            tracker,
            sources,
            ledger,
            traffic,
            rng: ChaChaRng::seed_from_u64(self.seed),
        })
    }
}

/// A fully wired run, ready to execute.
///
/// All callbacks run to completion, one at a time, on the thread calling
/// [`run`](Scenario::run); each record is mutated by exactly one component.
pub struct Scenario {
    scheduler: Scheduler<Event>,
    area: CoverageArea,
    mobility: HashMap<NodeId, Box<dyn Mobility>>,
    tracker: CoverageTracker,
    sources: HashMap<NodeId, EnergySource>,
    ledger: EnergyLedger,
    traffic: TrafficModel,
    rng: ChaChaRng,
}

impl Scenario {
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::default()
    }

    /// Drive the event loop to the stop time, then aggregate.
    ///
    /// The flow table snapshot and the summary are read strictly after the
    /// last mutating event.
    pub fn run(mut self) -> SimulationSummary {
        while let Some((now, event)) = self.scheduler.next() {
            match event {
                Event::Probe(node) => self.on_probe(now, node),
                Event::EnergyTick(node) => self.on_energy_tick(now, node),
                Event::PacketSend(flow) => self.on_packet_send(now, flow),
            }
        }

        info!(at = %self.scheduler.stop_time(), "simulation stopped");
        let flows = FlowSummary::aggregate(self.traffic.flows());
        SimulationSummary::build(&self.tracker, &self.ledger, &flows)
    }

    fn on_probe(&mut self, now: Timestamp, node: NodeId) {
        let Some(mobility) = self.mobility.get_mut(&node) else {
            return;
        };
        let position = mobility.sample(now);
        let in_coverage = self.area.covers(&position);
        self.tracker.on_tick(node, in_coverage);
    }

    fn on_energy_tick(&mut self, now: Timestamp, node: NodeId) {
        let Some(source) = self.sources.get_mut(&node) else {
            return;
        };
        if let Some((old, new)) = source.drain_idle(ENERGY_UPDATE_INTERVAL) {
            self.ledger.on_energy_changed(source.id(), now, old, new);
        }
    }

    fn on_packet_send(&mut self, now: Timestamp, flow: FlowId) {
        let Some(node) = self.traffic.source(flow) else {
            return;
        };
        // the most recent probe observation decides deliverability
        let in_coverage = self
            .tracker
            .record(node)
            .is_some_and(|r| r.status() == CoverageStatus::InCoverage);
        let outcome = self.traffic.on_send(flow, in_coverage, &mut self.rng);

        let Some(source) = self.sources.get_mut(&node) else {
            return;
        };
        if let Some((old, new)) = source.drain_tx(PACKET_AIRTIME) {
            self.ledger.on_energy_changed(source.id(), now, old, new);
        }
        if let PacketOutcome::Delivered { .. } = outcome {
            if let Some((old, new)) = source.drain_rx(ACK_AIRTIME) {
                self.ledger.on_energy_changed(source.id(), now, old, new);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIM_TIME: Duration = Duration::from_secs(30);
    const RADIUS: f64 = 50.0;

    fn edge_scenario(distance_m: f64) -> Scenario {
        Scenario::builder()
            .sim_time(SIM_TIME)
            .coverage_radius(RADIUS)
            .access_point_at(Position::ORIGIN)
            .node_at(Position::new(distance_m, 0.0, 0.0))
            .seed(1)
            .build()
            .unwrap()
    }

    #[test]
    fn stationary_node_at_the_coverage_edge_stays_connected() {
        let summary = edge_scenario(50.0).run();

        assert_eq!(summary.out_of_coverage.sum_s, 0.0);
        assert_eq!(summary.peak_pending_sync_mb, 0.0);
        assert_eq!(summary.packet_loss_pct, Some(0.0));
        assert!(summary.avg_delay_ms.unwrap() >= 10.0);
        assert!(summary.energy_consumed_wh > 0.0);
        assert!(summary.total_tx_packets > 0);
    }

    #[test]
    fn node_just_outside_coverage_is_out_for_the_whole_run() {
        let summary = edge_scenario(51.0).run();

        // probes fire at 0.1s..=29.9s: the full run, within one tick
        let expected_s = 29.9;
        assert!((summary.out_of_coverage.sum_s - expected_s).abs() < 1e-9);

        // buffer accumulated for the whole outage, never synced
        let expected_mb = expected_s * 0.05 / 1_000.0;
        assert!((summary.peak_pending_sync_mb - expected_mb).abs() < 1e-9);

        // every transmission happened without coverage
        assert_eq!(summary.packet_loss_pct, Some(100.0));
        assert_eq!(summary.total_lost_packets, summary.total_tx_packets);
    }

    #[test]
    fn same_seed_replays_identically() {
        let build = || {
            Scenario::builder()
                .sim_time(SIM_TIME)
                .nodes(5)
                .access_points(2)
                .packet_loss_rate(0.1)
                .seed(99)
                .build()
                .unwrap()
        };

        assert_eq!(build().run(), build().run());
    }

    #[test]
    fn different_seeds_diverge() {
        let build = |seed| {
            Scenario::builder()
                .sim_time(SIM_TIME)
                .nodes(5)
                .access_points(2)
                .packet_loss_rate(0.5)
                .seed(seed)
                .build()
                .unwrap()
        };

        assert_ne!(build(1).run(), build(2).run());
    }

    #[test]
    fn setup_faults_surface_before_the_run() {
        let no_nodes = Scenario::builder().access_points(1).build();
        assert!(matches!(no_nodes, Err(ScenarioError::NoNodes)));

        let no_aps = Scenario::builder().nodes(1).build();
        assert!(matches!(no_aps, Err(ScenarioError::NoAccessPoints)));

        let bad_radius = Scenario::builder()
            .nodes(1)
            .access_points(1)
            .coverage_radius(-1.0)
            .build();
        assert!(matches!(bad_radius, Err(ScenarioError::Coverage(_))));

        let bad_loss = Scenario::builder()
            .nodes(1)
            .access_points(1)
            .packet_loss_rate(1.5)
            .build();
        assert!(matches!(bad_loss, Err(ScenarioError::InvalidLossRate(_))));
    }

    #[test]
    fn carrier_aggregation_halves_the_base_delay() {
        let build = |use_ca| {
            Scenario::builder()
                .sim_time(SIM_TIME)
                .coverage_radius(RADIUS)
                .access_point_at(Position::ORIGIN)
                .node_at(Position::ORIGIN)
                .use_ca(use_ca)
                .seed(1)
                .build()
                .unwrap()
        };

        let plain = build(false).run().avg_delay_ms.unwrap();
        let with_ca = build(true).run().avg_delay_ms.unwrap();
        assert!(with_ca < plain);
    }
}
