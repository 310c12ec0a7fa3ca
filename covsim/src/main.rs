use anyhow::{Context as _, Result};
use clap::Parser;
use covsim::{Scenario, SimDuration};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Run a wireless coverage/energy scenario and report the results.
#[derive(Debug, Parser)]
#[command(name = "covsim", version, about)]
struct Args {
    /// Total simulated duration, e.g. `30s`, `5m` or `1s 500ms`.
    #[arg(long, default_value = "30s")]
    sim_time: SimDuration,

    /// Number of mobile nodes roaming the area.
    #[arg(long, default_value_t = 10)]
    nodes: u32,

    /// Number of fixed access points, laid out on a grid.
    #[arg(long, default_value_t = 3)]
    access_points: u32,

    /// Coverage radius around each access point, in meters.
    #[arg(long, default_value_t = 50.0)]
    coverage_radius: f64,

    /// Probability that a transmitted packet is randomly dropped.
    #[arg(long, default_value_t = 0.0)]
    packet_loss_rate: f64,

    /// Enable carrier aggregation in the radio model.
    #[arg(long)]
    use_ca: bool,

    /// RNG seed. Defaults to the wall clock, so each run differs unless a
    /// seed is pinned.
    #[arg(long)]
    seed: Option<u64>,

    /// Also emit the summary as a single JSON record on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_secs(),
    };

    let scenario = Scenario::builder()
        .sim_time(args.sim_time.into_duration())
        .nodes(args.nodes)
        .access_points(args.access_points)
        .coverage_radius(args.coverage_radius)
        .packet_loss_rate(args.packet_loss_rate)
        .use_ca(args.use_ca)
        .seed(seed)
        .build()
        .context("failed to wire the scenario")?;

    let summary = scenario.run();

    println!("{summary}");
    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}
