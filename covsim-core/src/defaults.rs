//! Default values for the monitoring primitives.

use std::time::Duration;

/// Default coverage-probe tick interval.
///
/// The position of every mobile node is sampled at this period; all
/// coverage and buffer accounting advances in these steps.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Default pending-sync accumulation rate, in kilobytes per second.
///
/// This is the volume of data a disconnected node is modeled as buffering
/// while it waits for a radio link to come back.
pub const DEFAULT_ACCUMULATION_RATE_KB_PER_SEC: f64 = 0.05;

/// Default coverage radius around an access point, in meters.
pub const DEFAULT_COVERAGE_RADIUS_M: f64 = 50.0;

/// Default initial charge of a node's energy source, in joules.
pub const DEFAULT_INITIAL_ENERGY_J: f64 = 10_000.0;
