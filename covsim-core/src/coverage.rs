//! Per-node coverage accounting.
//!
//! [`CoverageTracker`] owns one [`CoverageRecord`] per mobile node and is
//! the only component that mutates them. Each coverage-probe tick feeds the
//! most recent in/out-of-coverage observation through
//! [`CoverageTracker::on_tick`]; there is no debouncing, the latest probe
//! result wins.

use crate::{defaults, NodeId};
use std::{collections::BTreeMap, time::Duration};

/// Whether a node currently has a reachable access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverageStatus {
    #[default]
    InCoverage,
    OutOfCoverage,
}

/// Coverage and pending-sync bookkeeping for a single node.
///
/// The pending-sync buffer models store-and-forward backlog accumulated
/// while disconnected; reconnection flushes it instantly, so the value of
/// interest is the running peak, not the end-of-run value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageRecord {
    status: CoverageStatus,
    out_of_coverage: Duration,
    pending_sync_kb: f64,
    peak_pending_sync_kb: f64,
}

impl CoverageRecord {
    #[inline]
    pub fn status(&self) -> CoverageStatus {
        self.status
    }

    /// Cumulative time spent out of coverage. Monotonically non-decreasing.
    #[inline]
    pub fn out_of_coverage(&self) -> Duration {
        self.out_of_coverage
    }

    /// Data currently buffered while waiting for a link, in kilobytes.
    /// Exactly `0.0` after any in-coverage tick.
    #[inline]
    pub fn pending_sync_kb(&self) -> f64 {
        self.pending_sync_kb
    }

    /// Running maximum of the pending-sync buffer, in kilobytes.
    #[inline]
    pub fn peak_pending_sync_kb(&self) -> f64 {
        self.peak_pending_sync_kb
    }
}

/// Owns the [`CoverageRecord`] of every tracked node for the lifetime of
/// one run.
pub struct CoverageTracker {
    records: BTreeMap<NodeId, CoverageRecord>,
    tick_interval: Duration,
    accumulation_rate_kb_per_sec: f64,
}

impl CoverageTracker {
    pub fn new(tick_interval: Duration, accumulation_rate_kb_per_sec: f64) -> Self {
        Self {
            records: BTreeMap::new(),
            tick_interval,
            accumulation_rate_kb_per_sec,
        }
    }

    /// Start tracking `node` with a fresh record (in coverage, all
    /// accumulators at zero).
    pub fn register(&mut self, node: NodeId) {
        self.records.entry(node).or_default();
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn record(&self, node: NodeId) -> Option<&CoverageRecord> {
        self.records.get(&node)
    }

    pub fn records(&self) -> impl Iterator<Item = (NodeId, &CoverageRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply one probe observation for `node`.
    ///
    /// Out of coverage: the cumulative out-of-coverage time grows by one
    /// tick interval and the pending-sync buffer by `tick × rate`, updating
    /// the running peak. In coverage: the buffer drops to exactly zero (the
    /// backlog syncs instantly once a link is available).
    ///
    /// Ticks for unregistered nodes are ignored; registration happens at
    /// setup, before any probe runs.
    pub fn on_tick(&mut self, node: NodeId, in_coverage: bool) {
        let Some(record) = self.records.get_mut(&node) else {
            return;
        };
        if in_coverage {
            record.status = CoverageStatus::InCoverage;
            record.pending_sync_kb = 0.0;
        } else {
            record.status = CoverageStatus::OutOfCoverage;
            record.out_of_coverage += self.tick_interval;
            record.pending_sync_kb +=
                self.tick_interval.as_secs_f64() * self.accumulation_rate_kb_per_sec;
            if record.pending_sync_kb > record.peak_pending_sync_kb {
                record.peak_pending_sync_kb = record.pending_sync_kb;
            }
        }
    }

    /// Largest peak pending-sync buffer across all nodes, in kilobytes.
    pub fn peak_pending_sync_kb(&self) -> f64 {
        self.records
            .values()
            .map(|r| r.peak_pending_sync_kb)
            .fold(0.0, f64::max)
    }
}

impl Default for CoverageTracker {
    fn default() -> Self {
        Self::new(
            defaults::DEFAULT_TICK_INTERVAL,
            defaults::DEFAULT_ACCUMULATION_RATE_KB_PER_SEC,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);
    const RATE: f64 = 0.05;
    const NODE: NodeId = NodeId::ZERO;

    fn tracker() -> CoverageTracker {
        let mut tracker = CoverageTracker::new(TICK, RATE);
        tracker.register(NODE);
        tracker
    }

    #[test]
    fn out_of_coverage_time_grows_by_exactly_one_tick() {
        let mut tracker = tracker();

        for i in 1..=5u32 {
            tracker.on_tick(NODE, false);
            assert_eq!(tracker.record(NODE).unwrap().out_of_coverage(), i * TICK);
        }

        // in-coverage ticks leave the accumulator untouched
        tracker.on_tick(NODE, true);
        assert_eq!(tracker.record(NODE).unwrap().out_of_coverage(), 5 * TICK);
    }

    #[test]
    fn buffer_resets_to_exactly_zero_on_reconnection() {
        let mut tracker = tracker();

        for _ in 0..7 {
            tracker.on_tick(NODE, false);
        }
        assert!(tracker.record(NODE).unwrap().pending_sync_kb() > 0.0);

        tracker.on_tick(NODE, true);
        let record = tracker.record(NODE).unwrap();
        assert_eq!(record.pending_sync_kb(), 0.0);
        assert_eq!(record.status(), CoverageStatus::InCoverage);
    }

    #[test]
    fn peak_buffer_survives_reconnection() {
        let mut tracker = tracker();
        let n = 20;

        for _ in 0..n {
            tracker.on_tick(NODE, false);
        }
        tracker.on_tick(NODE, true);

        let record = tracker.record(NODE).unwrap();
        let expected = n as f64 * TICK.as_secs_f64() * RATE;
        assert!((record.peak_pending_sync_kb() - expected).abs() < 1e-12);
        assert_eq!(record.pending_sync_kb(), 0.0);
    }

    #[test]
    fn peak_is_a_running_maximum() {
        let mut tracker = tracker();

        // long outage, sync, then a shorter one: the first outage's peak
        // must win
        for _ in 0..10 {
            tracker.on_tick(NODE, false);
        }
        tracker.on_tick(NODE, true);
        for _ in 0..3 {
            tracker.on_tick(NODE, false);
        }

        let record = tracker.record(NODE).unwrap();
        let expected = 10.0 * TICK.as_secs_f64() * RATE;
        assert!((record.peak_pending_sync_kb() - expected).abs() < 1e-12);
    }

    #[test]
    fn unregistered_node_is_ignored() {
        let mut tracker = CoverageTracker::new(TICK, RATE);
        tracker.on_tick(NODE, false);
        assert!(tracker.record(NODE).is_none());
    }
}
