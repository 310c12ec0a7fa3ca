//! Linear-drain energy sources for the scenario's mobile nodes.
//!
//! Each node carries a finite charge depleted by a constant current
//! profile: an idle draw accounted every energy tick, plus per-packet
//! transmit/receive draws. Every depletion produces an `(old, new)`
//! remaining-energy notification for the subscribed
//! [`EnergyObserver`](covsim_core::EnergyObserver).

use covsim_core::SourceId;
use std::time::Duration;

/// Radio current draw, in amperes, per activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentProfile {
    pub tx_a: f64,
    pub rx_a: f64,
    pub idle_a: f64,
}

impl Default for CurrentProfile {
    /// 300 mA transmitting, 100 mA receiving, 50 mA idle.
    fn default() -> Self {
        Self {
            tx_a: 0.3,
            rx_a: 0.1,
            idle_a: 0.05,
        }
    }
}

/// A finite store of energy attached to one node.
///
/// The source never recharges; once depleted it stays at zero and stops
/// emitting notifications.
#[derive(Debug, Clone)]
pub struct EnergySource {
    id: SourceId,
    remaining_j: f64,
    supply_v: f64,
    profile: CurrentProfile,
}

impl EnergySource {
    const DEFAULT_SUPPLY_V: f64 = 3.0;

    pub fn new(id: SourceId, initial_j: f64) -> Self {
        Self {
            id,
            remaining_j: initial_j,
            supply_v: Self::DEFAULT_SUPPLY_V,
            profile: CurrentProfile::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> SourceId {
        self.id
    }

    #[inline]
    pub fn remaining_j(&self) -> f64 {
        self.remaining_j
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.remaining_j == 0.0
    }

    /// Account the idle draw over `dt`.
    pub fn drain_idle(&mut self, dt: Duration) -> Option<(f64, f64)> {
        self.drain(self.supply_v * self.profile.idle_a * dt.as_secs_f64())
    }

    /// Account one transmission of `airtime`.
    pub fn drain_tx(&mut self, airtime: Duration) -> Option<(f64, f64)> {
        self.drain(self.supply_v * self.profile.tx_a * airtime.as_secs_f64())
    }

    /// Account one reception of `airtime`.
    pub fn drain_rx(&mut self, airtime: Duration) -> Option<(f64, f64)> {
        self.drain(self.supply_v * self.profile.rx_a * airtime.as_secs_f64())
    }

    /// Deplete `joules`, clamped at zero. Returns the `(old, new)` pair to
    /// notify with, or `None` when nothing changed.
    fn drain(&mut self, joules: f64) -> Option<(f64, f64)> {
        if joules <= 0.0 || self.is_depleted() {
            return None;
        }
        let old = self.remaining_j;
        self.remaining_j = (old - joules).max(0.0);
        Some((old, self.remaining_j))
    }
}
