//! Fantasy Premier League data CLI
//!
//! Cached access to the FPL API. Every command prints a JSON envelope on
//! stdout; logging goes to stderr.

use clap::{Parser, Subcommand};
use fpl::output::{Envelope, Status};
use fpl::{Config, PlayerId, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fpl")]
#[command(about = "Fetch and shape Fantasy Premier League data", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "fpl.toml")]
    config: String,

    /// Override the cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Force fetching fresh data from the API, ignoring cache
    #[arg(long, global = true)]
    force_refresh: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Players, teams and gameweeks from bootstrap-static
    Data {
        /// Show details for all gameweeks
        #[arg(long)]
        gameweeks: bool,
        /// Show details for all teams
        #[arg(long)]
        teams: bool,
        /// Filter players by team name (case-insensitive, partial match)
        #[arg(long)]
        team: Option<String>,
        /// Filter players by team ID
        #[arg(long)]
        team_id: Option<i64>,
        /// Filter players by name (case-insensitive, partial match)
        #[arg(long)]
        player: Option<String>,
        /// Filter players by IDs (space-separated)
        #[arg(long, num_args = 1..)]
        player_ids: Option<Vec<u64>>,
        /// Filter players by position (GKP, DEF, MID, FWD)
        #[arg(long)]
        position: Option<String>,
        /// Minimum player cost (e.g. 4.5)
        #[arg(long)]
        min_price: Option<f64>,
        /// Maximum player cost (e.g. 10.0)
        #[arg(long)]
        max_price: Option<f64>,
    },
    /// Details, history, transfers and picks for one FPL team
    Entry {
        /// FPL team ID
        entry_id: u64,
        /// General details (team name, manager, points, rank, leagues)
        #[arg(long)]
        details: bool,
        /// Gameweek history, past seasons and chips played
        #[arg(long)]
        history: bool,
        /// Transfer history
        #[arg(long)]
        transfers: bool,
        /// Picks for a gameweek
        #[arg(long, value_name = "GAMEWEEK")]
        picks: Option<u32>,
    },
    /// Fixture list
    Fixtures {
        /// Show all fixtures
        #[arg(long, visible_alias = "all")]
        fixtures: bool,
        /// Fixtures for one gameweek
        #[arg(long)]
        gameweek: Option<u32>,
    },
    /// Classic league standings
    League {
        /// Classic league ID
        league_id: u64,
        /// Page of standings to fetch
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Live gameweek stats for selected players
    Live {
        /// Gameweek number
        #[arg(long)]
        gameweek: u32,
        /// Player IDs to include (space-separated)
        #[arg(long, num_args = 1.., required = true)]
        player_ids: Vec<u64>,
    },
    /// Show per-URL request and fetch counters
    Stats,
    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let envelope = match Config::load_or_default(&cli.config) {
        Ok(config) => {
            let config = config.with_cache_dir(cli.cache_dir.clone());
            run(&cli, &config)
        }
        Err(e) => Envelope::error(format!("Error loading config: {}", e)),
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

fn run(cli: &Cli, config: &Config) -> Envelope {
    let force = cli.force_refresh;

    let result = match &cli.command {
        Commands::Data {
            gameweeks,
            teams,
            team,
            team_id,
            player,
            player_ids,
            position,
            min_price,
            max_price,
        } => {
            let filter = commands::DataRequest {
                gameweeks: *gameweeks,
                teams: *teams,
                team: team.clone(),
                team_id: *team_id,
                player: player.clone(),
                player_ids: player_ids.as_deref().map(to_player_ids),
                position: position.clone(),
                min_price: *min_price,
                max_price: *max_price,
            };
            commands::data(config, &filter, force)
        }
        Commands::Entry {
            entry_id,
            details,
            history,
            transfers,
            picks,
        } => commands::entry(config, *entry_id, *details, *history, *transfers, *picks, force),
        Commands::Fixtures { fixtures, gameweek } => {
            commands::fixtures(config, *fixtures, *gameweek, force)
        }
        Commands::League { league_id, page } => commands::league(config, *league_id, *page, force),
        Commands::Live {
            gameweek,
            player_ids,
        } => commands::live(config, *gameweek, &to_player_ids(player_ids), force),
        Commands::Stats => commands::stats(config),
        Commands::Init => commands::init(&cli.config),
    };

    result.unwrap_or_else(|e| Envelope::error(e.to_string()))
}

fn to_player_ids(ids: &[u64]) -> Vec<PlayerId> {
    ids.iter().copied().map(PlayerId).collect()
}

mod commands {
    use super::*;
    use fpl::data::{CachedClient, StatsTracker};
    use fpl::endpoints::bootstrap::{Bootstrap, PlayerFilter};
    use fpl::endpoints::{entry as entry_shape, fixtures as fixture_shape, league as league_shape};
    use fpl::endpoints::{live as live_shape, Endpoints};
    use fpl::output::insert;
    use serde_json::{Map, Value};

    fn client(config: &Config) -> Result<CachedClient> {
        CachedClient::from_config(config)
    }

    pub fn init(config_path: &str) -> Result<Envelope> {
        let config = Config::default();
        config.save(config_path)?;
        std::fs::create_dir_all(&config.cache.dir)?;
        log::info!("Created default config at {}", config_path);

        let mut data = Map::new();
        insert(&mut data, "config", &config_path)?;
        insert(&mut data, "cache_dir", &config.cache.dir)?;
        Ok(Envelope::new(
            Status::Success,
            Some(format!("Created default config at {}", config_path)),
            Some(Value::Object(data)),
        ))
    }

    pub struct DataRequest {
        pub gameweeks: bool,
        pub teams: bool,
        pub team: Option<String>,
        pub team_id: Option<i64>,
        pub player: Option<String>,
        pub player_ids: Option<Vec<PlayerId>>,
        pub position: Option<String>,
        pub min_price: Option<f64>,
        pub max_price: Option<f64>,
    }

    impl DataRequest {
        fn wants_players(&self) -> bool {
            self.player.is_some()
                || self.player_ids.is_some()
                || self.position.is_some()
                || self.min_price.is_some()
                || self.max_price.is_some()
                || self.team.is_some()
                || self.team_id.is_some()
        }
    }

    pub fn data(config: &Config, req: &DataRequest, force: bool) -> Result<Envelope> {
        let mut client = client(config)?;
        let api = Endpoints::new(&config.api.base_url);

        let bootstrap = match api
            .bootstrap()
            .fetch(&mut client, force)
            .and_then(Bootstrap::from_value)
        {
            Ok(b) => b,
            Err(e) => {
                return Ok(Envelope::error(format!(
                    "Failed to load FPL general data: {}",
                    e
                )))
            }
        };

        let team_filter = bootstrap.resolve_team_filter(req.team.as_deref(), req.team_id)?;

        let mut data = Map::new();
        if let Some(info) = &team_filter.info {
            insert(&mut data, "team_filter_info", info)?;
        }
        if req.gameweeks {
            insert(&mut data, "gameweeks", &bootstrap.gameweeks())?;
        }
        if req.teams {
            insert(&mut data, "teams", &bootstrap.teams())?;
        }

        let wants_players = req.wants_players();
        if wants_players {
            let players = bootstrap.players(&PlayerFilter {
                name: req.player.clone(),
                player_ids: req.player_ids.clone(),
                team_id: team_filter.team_id,
                position: req.position.clone(),
                min_price: req.min_price,
                max_price: req.max_price,
            });
            insert(&mut data, "player_count", &players.len())?;
            insert(&mut data, "players", &players)?;
        }

        if !(req.gameweeks || req.teams || wants_players) {
            return Ok(Envelope::info(
                "No specific data requested. Use --gameweeks, --teams, or filters like --player, --team, etc.",
            )
            .with_data(Value::Object(data)));
        }

        Ok(Envelope::success(Value::Object(data)))
    }

    pub fn entry(
        config: &Config,
        entry_id: u64,
        details: bool,
        history: bool,
        transfers: bool,
        picks: Option<u32>,
        force: bool,
    ) -> Result<Envelope> {
        if !(details || history || transfers || picks.is_some()) {
            return Ok(Envelope::info(format!(
                "No specific data type requested for entry ID {}. Use --details, --history, --transfers, or --picks <GAMEWEEK_NUMBER>.",
                entry_id
            ))
            .with_data(Value::Object(Map::new())));
        }

        let mut client = client(config)?;
        let api = Endpoints::new(&config.api.base_url);
        let mut data = Map::new();

        // Sections fetched before a failure are still reported
        let outcome = entry_sections(
            &api,
            &mut client,
            &mut data,
            entry_id,
            (details, history, transfers, picks),
            force,
        );

        let data = Value::Object(data);
        Ok(match outcome {
            Ok(()) => Envelope::success(data),
            Err(e) => Envelope::error(e.to_string()).with_data(data),
        })
    }

    fn entry_sections(
        api: &Endpoints,
        client: &mut CachedClient,
        data: &mut Map<String, Value>,
        entry_id: u64,
        (details, history, transfers, picks): (bool, bool, bool, Option<u32>),
        force: bool,
    ) -> Result<()> {
        if details {
            let shaped = api
                .entry_details(entry_id)
                .fetch(client, force)
                .and_then(entry_shape::details)
                .map_err(|e| e.context(format!("Failed to get entry details for ID {}", entry_id)))?;
            insert(data, "entry_details", &shaped)?;
        }
        if history {
            let shaped = api
                .entry_history(entry_id)
                .fetch(client, force)
                .and_then(entry_shape::history)
                .map_err(|e| e.context(format!("Failed to get history for entry ID {}", entry_id)))?;
            insert(data, "entry_history", &shaped)?;
        }
        if transfers {
            let shaped = api
                .entry_transfers(entry_id)
                .fetch(client, force)
                .and_then(entry_shape::transfers)
                .map_err(|e| e.context(format!("Failed to get transfers for entry ID {}", entry_id)))?;
            insert(data, "entry_transfers", &shaped)?;
        }
        if let Some(gw) = picks {
            let shaped = api
                .entry_picks(entry_id, gw)
                .fetch(client, force)
                .and_then(|v| entry_shape::picks(v, gw))
                .map_err(|e| {
                    e.context(format!(
                        "Failed to get picks for entry ID {}, Gameweek {}",
                        entry_id, gw
                    ))
                })?;
            insert(data, "entry_picks", &shaped)?;
        }
        Ok(())
    }

    pub fn fixtures(config: &Config, all: bool, gameweek: Option<u32>, force: bool) -> Result<Envelope> {
        let gameweek = match (all, gameweek) {
            (true, _) => None,
            (false, Some(gw)) => Some(gw),
            (false, None) => {
                return Ok(Envelope::info("No specific data requested. Use --fixtures or --gameweek <n>.")
                    .with_data(Value::Object(Map::new())))
            }
        };

        let mut client = client(config)?;
        let api = Endpoints::new(&config.api.base_url);
        let raw = api
            .fixtures(gameweek)
            .fetch(&mut client, force)
            .map_err(|e| e.context("Failed to fetch fixtures"))?;

        let mut data = Map::new();
        insert(&mut data, "fixtures", &fixture_shape::fixtures(raw))?;
        Ok(Envelope::success(Value::Object(data)))
    }

    pub fn league(config: &Config, league_id: u64, page: u32, force: bool) -> Result<Envelope> {
        if page == 0 {
            return Err(fpl::FplError::InvalidArgs(
                "--page must be 1 or greater".to_string(),
            ));
        }

        let mut client = client(config)?;
        let api = Endpoints::new(&config.api.base_url);
        let raw = api
            .league_standings(league_id, page)
            .fetch(&mut client, force)
            .map_err(|e| e.context("Failed to fetch league standings"))?;

        let shaped = league_shape::standings(raw, page);
        Ok(Envelope::success(serde_json::to_value(shaped)?))
    }

    pub fn live(config: &Config, gameweek: u32, player_ids: &[PlayerId], force: bool) -> Result<Envelope> {
        let mut client = client(config)?;
        let api = Endpoints::new(&config.api.base_url);
        let raw = api
            .live_gameweek(gameweek)
            .fetch(&mut client, force)
            .map_err(|e| e.context("Failed to fetch live gameweek data"))?;

        let mut data = Map::new();
        insert(
            &mut data,
            "live",
            &live_shape::live_gameweek(raw, gameweek, Some(player_ids)),
        )?;
        Ok(Envelope::success(Value::Object(data)))
    }

    pub fn stats(config: &Config) -> Result<Envelope> {
        let tracker = StatsTracker::open(&config.cache.dir);
        if tracker.entries().is_empty() {
            return Ok(Envelope::info(format!(
                "No requests recorded yet in {}",
                tracker.path().display()
            )));
        }

        let mut data = Map::new();
        insert(&mut data, "stats_file", &tracker.path())?;
        insert(&mut data, "urls", tracker.entries())?;
        Ok(Envelope::success(Value::Object(data)))
    }
}
