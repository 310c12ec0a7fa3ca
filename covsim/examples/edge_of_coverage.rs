//! A node parked just outside the coverage edge: the whole run is spent
//! out of coverage, buffering data that never syncs.
//!
//! Run with:
//!   cargo run --example edge_of_coverage -p covsim

use anyhow::Result;
use covsim::{Position, Scenario};
use std::time::Duration;

fn main() -> Result<()> {
    let scenario = Scenario::builder()
        .sim_time(Duration::from_secs(30))
        .coverage_radius(50.0)
        .access_point_at(Position::ORIGIN)
        .node_at(Position::new(51.0, 0.0, 0.0))
        .seed(42)
        .build()?;

    let summary = scenario.run();
    println!("{summary}");

    Ok(())
}
