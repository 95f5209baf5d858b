//! LiveFPL price-change CLI
//!
//! Scrapes price-change progress from LiveFPL (cached for a few hours) and
//! prints the matching players as a JSON envelope.

use clap::Parser;
use fpl::data::CachedClient;
use fpl::endpoints::prices::{report, PriceFilter};
use fpl::output::Envelope;
use fpl::{Config, PlayerId, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livefpl")]
#[command(about = "Fetch LiveFPL price-change progress as cached JSON", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "fpl.toml")]
    config: String,

    /// Override the cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Force fetching fresh data from the website, ignoring cache
    #[arg(long)]
    force_refresh: bool,

    /// Filter players by IDs (space-separated)
    #[arg(long, num_args = 1..)]
    player_ids: Option<Vec<u64>>,

    /// Select metric >= value (use with --filter-now or --filter-tonight)
    #[arg(long, allow_negative_numbers = true)]
    filter_gt: Option<f64>,

    /// Select metric <= value (use with --filter-now or --filter-tonight)
    #[arg(long, allow_negative_numbers = true)]
    filter_lt: Option<f64>,

    /// Apply --filter-gt/--filter-lt to pct_now
    #[arg(long)]
    filter_now: bool,

    /// Apply --filter-gt/--filter-lt to pct_tonight
    #[arg(long)]
    filter_tonight: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const CACHE_KEY: &str = "prices";

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let filter = PriceFilter {
        player_ids: cli
            .player_ids
            .as_ref()
            .map(|ids| ids.iter().copied().map(PlayerId).collect()),
        gt: cli.filter_gt,
        lt: cli.filter_lt,
        now: cli.filter_now,
        tonight: cli.filter_tonight,
    };

    let envelope = if filter.is_empty() {
        Envelope::info(
            "No specific data requested. Use --player-ids or filters: --filter-now/--filter-tonight with --filter-gt/--filter-lt.",
        )
    } else {
        run(&cli, &filter).unwrap_or_else(|e| Envelope::error(e.to_string()))
    };

    match envelope.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    if envelope.is_error() {
        std::process::exit(1);
    }
}

fn run(cli: &Cli, filter: &PriceFilter) -> Result<Envelope> {
    let config = Config::load_or_default(&cli.config)?.with_cache_dir(cli.cache_dir.clone());
    let mut client = CachedClient::from_config(&config)?;

    let snapshot = client.fetch_html_parsed(&config.api.prices_url, CACHE_KEY, cli.force_refresh)?;
    log::debug!("Parsed {} players from {}", snapshot.players.len(), config.api.prices_url);

    let report = report(snapshot, filter, config.output.max_players);
    Ok(Envelope::success(serde_json::to_value(report)?))
}
