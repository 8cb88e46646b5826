//! Replay a recorded interaction script through the behavior collector.

use anyhow::Context;
use behavior_analytics::capture::{ManualClock, SimulatedPage, WriterBeacon};
use behavior_analytics::replay;
use behavior_analytics::{Capabilities, Collector, CollectorConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "behavior-replay", version, about)]
struct Args {
    /// JSON-lines replay script
    script: PathBuf,

    /// Endpoint origin (overrides BEHAVIOR_ANALYTICS_ORIGIN)
    #[arg(long)]
    origin: Option<String>,

    /// Print events to stdout instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Playback speed multiplier; 0 replays without waiting
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Initial page path
    #[arg(long, default_value = "/")]
    path: String,

    /// Document referrer
    #[arg(long, default_value = "")]
    referrer: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    behavior_analytics::init_tracing();
    let args = Args::parse();

    let mut config = CollectorConfig::from_env();
    if let Some(origin) = args.origin {
        config.origin = origin;
    }

    let input = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;
    let entries = replay::parse_script(&input)?;

    let page = Arc::new(SimulatedPage::new(args.path, args.referrer));
    let clock = Arc::new(ManualClock::new(chrono::Utc::now().timestamp_millis().max(0) as u64));
    let mut capabilities = Capabilities::new(page.clone()).with_clock(clock.clone());
    if args.dry_run {
        capabilities = capabilities.with_beacon(Arc::new(WriterBeacon::new(std::io::stdout())));
    }
    let collector = Collector::new(config, capabilities);

    tracing::info!(entries = entries.len(), dry_run = args.dry_run, "replaying script");
    let summary = replay::run(&collector, &page, &clock, &entries, args.speed).await;

    // The page is gone once the script ends
    collector.send_exit_event();
    if !args.dry_run {
        // Give fallback posts a moment before the runtime shuts down
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    tracing::info!(
        dom_events = summary.dom_events,
        page_changes = summary.page_changes,
        duration_ms = summary.duration_ms,
        "replay finished"
    );
    Ok(())
}
