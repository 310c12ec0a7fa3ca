//! Energy consumption ledger.
//!
//! Energy sources live in the scenario driver; the ledger only reacts to
//! their remaining-energy notifications. A component interested in those
//! notifications implements [`EnergyObserver`] and is registered as the
//! handler at wiring time — the event source is the sole caller, invoked
//! synchronously on the simulation thread, so notifications arrive in
//! timestamp order per source.

use crate::Timestamp;
use anyhow::anyhow;
use std::{collections::BTreeMap, fmt, str};
use tracing::{debug, warn};

/// The identifier of an energy source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

impl SourceId {
    pub const ZERO: Self = SourceId::new(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use = "function does not modify the current value"]
    pub fn next(self) -> Self {
        Self::new(self.0 + 1)
    }
}

impl str::FromStr for SourceId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|error| anyhow!("{error}"))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handler for remaining-energy-change notifications.
///
/// Notifications are asynchronous in virtual time — there is no fixed
/// period — but each callback runs to completion on the single simulation
/// thread before the next queued event fires.
pub trait EnergyObserver {
    fn on_energy_changed(&mut self, source: SourceId, now: Timestamp, old_j: f64, new_j: f64);
}

/// Consumption bookkeeping for a single energy source.
#[derive(Debug, Clone, Copy)]
pub struct EnergyRecord {
    initial_j: f64,
    remaining_j: f64,
    consumed_j: f64,
}

impl EnergyRecord {
    fn new(initial_j: f64) -> Self {
        Self {
            initial_j,
            remaining_j: initial_j,
            consumed_j: 0.0,
        }
    }

    #[inline]
    pub fn initial_j(&self) -> f64 {
        self.initial_j
    }

    #[inline]
    pub fn remaining_j(&self) -> f64 {
        self.remaining_j
    }

    /// Cumulative consumption. Always `initial_j - remaining_j`.
    #[inline]
    pub fn consumed_j(&self) -> f64 {
        self.consumed_j
    }
}

/// Owns the [`EnergyRecord`] of every registered source for the lifetime
/// of one run.
#[derive(Default)]
pub struct EnergyLedger {
    records: BTreeMap<SourceId, EnergyRecord>,
}

impl EnergyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` with its initial charge, in joules.
    pub fn register(&mut self, source: SourceId, initial_j: f64) {
        self.records
            .entry(source)
            .or_insert_with(|| EnergyRecord::new(initial_j));
    }

    pub fn record(&self, source: SourceId) -> Option<&EnergyRecord> {
        self.records.get(&source)
    }

    pub fn records(&self) -> impl Iterator<Item = (SourceId, &EnergyRecord)> {
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

    /// Total consumption across all sources, in joules.
    pub fn total_consumed_j(&self) -> f64 {
        self.records.values().map(|r| r.consumed_j).sum()
    }
}

impl EnergyObserver for EnergyLedger {
    /// Record a remaining-energy change.
    ///
    /// A notification reporting *more* remaining energy than before is
    /// recorded as-is: the ledger is a passive observer and does not decide
    /// whether a recharge is plausible, it only flags the increase in the
    /// log.
    fn on_energy_changed(&mut self, source: SourceId, now: Timestamp, old_j: f64, new_j: f64) {
        let Some(record) = self.records.get_mut(&source) else {
            warn!(%source, %now, "energy notification for unregistered source, dropped");
            return;
        };

        let delta_j = new_j - old_j;
        if delta_j > 0.0 {
            warn!(%source, %now, delta_j, "remaining energy increased");
        }

        record.remaining_j = new_j;
        record.consumed_j = record.initial_j - new_j;

        debug!(%source, %now, remaining_j = new_j, delta_j, "remaining energy changed");
    }
}
