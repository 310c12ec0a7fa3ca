//! End-of-run flow statistics reduction.
//!
//! The per-flow counters belong to the external flow monitor (the traffic
//! model in the scenario driver); this module only borrows a snapshot of
//! them once the simulation has stopped advancing time and reduces it to
//! scalar metrics. Pure, no state carried between runs.

use anyhow::anyhow;
use std::{fmt, str, time::Duration};

/// The identifier of a source-destination traffic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowId(u64);

impl FlowId {
    pub const ZERO: Self = FlowId::new(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use = "function does not modify the current value"]
    pub fn next(self) -> Self {
        Self::new(self.0 + 1)
    }

    #[inline]
    pub fn into_u64(self) -> u64 {
        self.0
    }
}

impl str::FromStr for FlowId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|error| anyhow!("{error}"))
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw counters for one observed flow.
///
/// `delay_sum` covers successfully delivered packets only; lost packets
/// contribute to `lost_packets` and nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    pub tx_packets: u64,
    pub lost_packets: u64,
    pub delay_sum: Duration,
}

/// The one-shot reduction of every observed flow's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowSummary {
    total_tx: u64,
    total_lost: u64,
    total_delay: Duration,
}

impl FlowSummary {
    /// Reduce a snapshot of per-flow counters.
    ///
    /// Invoked exactly once per run, after the last mutating event.
    pub fn aggregate<'a>(flows: impl IntoIterator<Item = &'a FlowStats>) -> Self {
        let mut summary = Self::default();
        for flow in flows {
            summary.total_tx += flow.tx_packets;
            summary.total_lost += flow.lost_packets;
            summary.total_delay += flow.delay_sum;
        }
        summary
    }

    #[inline]
    pub fn total_tx(&self) -> u64 {
        self.total_tx
    }

    #[inline]
    pub fn total_lost(&self) -> u64 {
        self.total_lost
    }

    #[inline]
    pub fn total_delay(&self) -> Duration {
        self.total_delay
    }

    /// Packet loss rate in percent, or `None` when no traffic was observed
    /// (the metric is undefined, not zero and not NaN).
    pub fn loss_rate_pct(&self) -> Option<f64> {
        if self.total_tx == 0 {
            return None;
        }
        Some(self.total_lost as f64 * 100.0 / self.total_tx as f64)
    }

    /// Average packet delay in milliseconds, or `None` when no traffic was
    /// observed.
    pub fn avg_delay_ms(&self) -> Option<f64> {
        if self.total_tx == 0 {
            return None;
        }
        Some(self.total_delay.as_secs_f64() * 1_000.0 / self.total_tx as f64)
    }
}
