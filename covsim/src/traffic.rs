//! The stand-in traffic source and flow monitor.
//!
//! One uplink flow per node: the node periodically transmits a fixed-size
//! datagram towards the infrastructure. A packet is lost when the sender is
//! out of coverage at transmission time or when the configured random loss
//! strikes; delivered packets accrue a propagation delay. The per-flow
//! counters kept here are the "flow monitor" table that the end-of-run
//! aggregation snapshots.

use crate::mobility::uniform;
use crate::scenario::ScenarioError;
use covsim_core::{FlowId, FlowStats, NodeId};
use rand_core::Rng;
use std::time::Duration;

/// What happened to one transmitted packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketOutcome {
    Delivered { delay: Duration },
    Lost,
}

struct Flow {
    source: NodeId,
    stats: FlowStats,
}

/// All traffic flows of a run, keyed by [`FlowId`] in creation order.
pub struct TrafficModel {
    flows: Vec<Flow>,
    loss_rate: f64,
    base_delay: Duration,
    jitter: Duration,
}

impl TrafficModel {
    /// # Errors
    ///
    /// Rejects a loss rate outside `0.0..=1.0` (including NaN).
    pub fn new(
        loss_rate: f64,
        base_delay: Duration,
        jitter: Duration,
    ) -> Result<Self, ScenarioError> {
        if !(0.0..=1.0).contains(&loss_rate) {
            return Err(ScenarioError::InvalidLossRate(loss_rate));
        }
        Ok(Self {
            flows: Vec::new(),
            loss_rate,
            base_delay,
            jitter,
        })
    }

    /// Register the uplink flow of `source` and return its identifier.
    pub fn add_flow(&mut self, source: NodeId) -> FlowId {
        let id = FlowId::new(self.flows.len() as u64);
        self.flows.push(Flow {
            source,
            stats: FlowStats::default(),
        });
        id
    }

    /// The node transmitting on `flow`.
    pub fn source(&self, flow: FlowId) -> Option<NodeId> {
        self.flows.get(flow_index(flow)).map(|f| f.source)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Account one packet transmission on `flow`.
    pub fn on_send<R: Rng>(
        &mut self,
        flow: FlowId,
        in_coverage: bool,
        rng: &mut R,
    ) -> PacketOutcome {
        let lost = !in_coverage || self.loss_strikes(rng);
        let delay = if lost {
            None
        } else {
            Some(self.base_delay + self.jitter.mul_f64(uniform(rng, 0.0, 1.0)))
        };

        let Some(flow) = self.flows.get_mut(flow_index(flow)) else {
            return PacketOutcome::Lost;
        };
        flow.stats.tx_packets += 1;
        match delay {
            None => {
                flow.stats.lost_packets += 1;
                PacketOutcome::Lost
            }
            Some(delay) => {
                flow.stats.delay_sum += delay;
                PacketOutcome::Delivered { delay }
            }
        }
    }

    /// Read-only snapshot of the per-flow counters.
    pub fn flows(&self) -> impl Iterator<Item = &FlowStats> {
        self.flows.iter().map(|f| &f.stats)
    }

    fn loss_strikes<R: Rng>(&self, rng: &mut R) -> bool {
        if self.loss_rate == 0.0 {
            return false;
        }
        let bits = rng.next_u64();
        let sample = (bits as f64) * (1.0 / (u64::MAX as f64 + 1.0));
        sample < self.loss_rate
    }
}

fn flow_index(flow: FlowId) -> usize {
    flow.into_u64() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng as _;

    const BASE: Duration = Duration::from_millis(10);
    const JITTER: Duration = Duration::from_millis(5);

    fn model(loss_rate: f64) -> (TrafficModel, FlowId) {
        let mut model = TrafficModel::new(loss_rate, BASE, JITTER).unwrap();
        let flow = model.add_flow(NodeId::ZERO);
        (model, flow)
    }

    #[test]
    fn rejects_invalid_loss_rate() {
        assert!(TrafficModel::new(-0.1, BASE, JITTER).is_err());
        assert!(TrafficModel::new(1.1, BASE, JITTER).is_err());
        assert!(TrafficModel::new(f64::NAN, BASE, JITTER).is_err());
        assert!(TrafficModel::new(1.0, BASE, JITTER).is_ok());
    }

    #[test]
    fn lossless_in_coverage_delivers_everything() {
        let (mut model, flow) = model(0.0);
        let mut rng = ChaChaRng::seed_from_u64(0);

        for _ in 0..100 {
            let outcome = model.on_send(flow, true, &mut rng);
            let PacketOutcome::Delivered { delay } = outcome else {
                panic!("unexpected loss");
            };
            assert!(delay >= BASE && delay <= BASE + JITTER);
        }

        let stats = model.flows().next().unwrap();
        assert_eq!(stats.tx_packets, 100);
        assert_eq!(stats.lost_packets, 0);
        assert!(stats.delay_sum >= 100 * BASE);
    }

    #[test]
    fn out_of_coverage_packets_are_lost_but_counted() {
        let (mut model, flow) = model(0.0);
        let mut rng = ChaChaRng::seed_from_u64(0);

        for _ in 0..10 {
            assert_eq!(model.on_send(flow, false, &mut rng), PacketOutcome::Lost);
        }

        let stats = model.flows().next().unwrap();
        assert_eq!(stats.tx_packets, 10);
        assert_eq!(stats.lost_packets, 10);
        assert_eq!(stats.delay_sum, Duration::ZERO);
    }

    #[test]
    fn certain_loss_drops_everything() {
        let (mut model, flow) = model(1.0);
        let mut rng = ChaChaRng::seed_from_u64(0);

        for _ in 0..100 {
            assert_eq!(model.on_send(flow, true, &mut rng), PacketOutcome::Lost);
        }
    }

    #[test]
    fn flows_are_accounted_independently() {
        let mut model = TrafficModel::new(0.0, BASE, JITTER).unwrap();
        let a = model.add_flow(NodeId::ZERO);
        let b = model.add_flow(NodeId::ZERO.next());
        let mut rng = ChaChaRng::seed_from_u64(0);

        model.on_send(a, true, &mut rng);
        model.on_send(b, false, &mut rng);

        let stats: Vec<_> = model.flows().collect();
        assert_eq!(stats[0].lost_packets, 0);
        assert_eq!(stats[1].lost_packets, 1);
        assert_eq!(model.source(b), Some(NodeId::ZERO.next()));
    }
}
