//! Replay a JSON-lines event log and print every book.
//!
//! ```text
//! booktrack-replay --config tracker.json --input events.jsonl --depth 5
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use booktrack_feed::{BookRegistry, replay, telemetry};
use booktrack_types::{ErrorPolicy, TrackerConfig, constants};
use clap::Parser;

#[allow(clippy::cast_possible_wrap)]
const MAX_DEPTH: i64 = constants::MAX_DEPTH_LEVELS as i64;

#[derive(Debug, Parser)]
#[command(name = "booktrack-replay", version, about = "Replay venue book events")]
struct Args {
    /// Tracker configuration (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Event log, one JSON object per line. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Ticks per side in the printed ladders. Overrides the config.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=MAX_DEPTH))]
    depth: Option<u16>,

    /// Log and count rejected events instead of stopping.
    #[arg(long)]
    skip_errors: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing("info", args.log_json);

    let raw = fs::read_to_string(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let config = TrackerConfig::from_json(&raw)?;
    let registry = BookRegistry::from_config(&config)?;

    let policy = if args.skip_errors {
        ErrorPolicy::Skip
    } else {
        config.error_policy
    };

    tracing::info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        markets = registry.len(),
        ?policy,
        "Starting replay"
    );

    let summary = match &args.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            replay(BufReader::new(file), &registry, policy)?
        }
        None => replay(io::stdin().lock(), &registry, policy)?,
    };

    let depth = args.depth.map_or(config.depth_levels, usize::from);
    for handle in registry.handles() {
        let book = handle.read();
        let stats = book.stats();
        println!("{} next_sequence={}", book.key(), book.next_sequence());
        print!("{}", book.ladder(depth));
        println!(
            "fills={} executed={} volume={} last={} digest={}",
            stats.fill_count,
            stats.executed_quantity,
            stats.volume,
            stats
                .last_trade_price
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            book.digest_hex(),
        );
        println!();
    }

    println!(
        "lines={} applied={} rejected={} fills={}",
        summary.lines_read, summary.events_applied, summary.events_rejected, summary.fills
    );
    Ok(())
}
