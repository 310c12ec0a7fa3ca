//! The end-of-run report.

use crate::{CoverageTracker, EnergyLedger, FlowSummary};
use core::fmt;
use serde::Serialize;

const JOULES_PER_WATT_HOUR: f64 = 3_600.0;
const KILOBYTES_PER_MEGABYTE: f64 = 1_000.0;

/// Out-of-coverage time across all tracked nodes.
///
/// Whether a multi-node run should report a sum, a maximum or a mean is a
/// question of experiment design; the summary carries all three and lets
/// the reader pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutOfCoverageSummary {
    pub sum_s: f64,
    pub max_s: f64,
    pub mean_s: f64,
}

/// Aggregate scalar view of a completed run.
///
/// Built exactly once, after the last mutating event; a pure read of the
/// ledgers, none of which are modified. Loss rate and average delay are
/// `None` when the run observed no traffic at all — the metrics are
/// undefined, and the report says so instead of printing NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub energy_consumed_wh: f64,
    pub out_of_coverage: OutOfCoverageSummary,
    pub packet_loss_pct: Option<f64>,
    pub avg_delay_ms: Option<f64>,
    pub peak_pending_sync_mb: f64,
    pub total_tx_packets: u64,
    pub total_lost_packets: u64,
}

impl SimulationSummary {
    pub fn build(
        coverage: &CoverageTracker,
        energy: &EnergyLedger,
        flows: &FlowSummary,
    ) -> Self {
        let mut out = OutOfCoverageSummary::default();
        for (_, record) in coverage.records() {
            let seconds = record.out_of_coverage().as_secs_f64();
            out.sum_s += seconds;
            out.max_s = out.max_s.max(seconds);
        }
        if !coverage.is_empty() {
            out.mean_s = out.sum_s / coverage.len() as f64;
        }

        Self {
            energy_consumed_wh: energy.total_consumed_j() / JOULES_PER_WATT_HOUR,
            out_of_coverage: out,
            packet_loss_pct: flows.loss_rate_pct(),
            avg_delay_ms: flows.avg_delay_ms(),
            peak_pending_sync_mb: coverage.peak_pending_sync_kb() / KILOBYTES_PER_MEGABYTE,
            total_tx_packets: flows.total_tx(),
            total_lost_packets: flows.total_lost(),
        }
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Results ===")?;
        writeln!(f, "Total energy consumed: {:.6} Wh", self.energy_consumed_wh)?;
        writeln!(
            f,
            "Out-of-coverage time: {:.1} s (sum), {:.1} s (max), {:.1} s (mean)",
            self.out_of_coverage.sum_s, self.out_of_coverage.max_s, self.out_of_coverage.mean_s
        )?;
        match self.packet_loss_pct {
            Some(pct) => writeln!(f, "Packet loss rate: {pct:.2}%")?,
            None => writeln!(f, "Packet loss rate: undefined (no traffic)")?,
        }
        match self.avg_delay_ms {
            Some(ms) => writeln!(f, "Average packet delay: {ms:.3} ms")?,
            None => writeln!(f, "Average packet delay: undefined (no traffic)")?,
        }
        write!(
            f,
            "Max data stored before sync: {:.6} MB",
            self.peak_pending_sync_mb
        )
    }
}
