//! Lineup Crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lineup_crawler::{
    LineupService,
    error::{AppError, Result},
    models::Config,
    pipeline,
    storage::{LocalStorage, SnapshotStorage},
};

/// Predicted lineup crawler
#[derive(Parser, Debug)]
#[command(
    name = "lineup-crawler",
    version,
    about = "Predicted lineup and squad crawler"
)]
struct Cli {
    /// Path to storage directory containing config and snapshot
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one lineup cycle and print the matches
    Fetch {
        /// Print the matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch every configured squad page
    Squads,

    /// Run one lineup cycle and classify a player
    Status {
        /// First name as listed in the fantasy roster
        first: String,
        /// Last name as listed in the fantasy roster
        last: String,
    },

    /// Validate configuration file
    Validate,

    /// Show current snapshot info
    Info,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));

    if let Command::Init { force } = cli.command {
        return init_config(&config_path, force);
    }

    let config = Arc::new(Config::load_or_default(&config_path));
    log::info!("Loaded configuration from {}", config_path.display());

    let storage = Arc::new(LocalStorage::new(&cli.storage_dir, &config.storage));

    match cli.command {
        Command::Fetch { json } => {
            let service = LineupService::with_http(Arc::clone(&config))?.with_storage(storage);
            pipeline::run_lineups(&service).await?;

            let matches = service.matches();
            if json {
                println!("{}", serde_json::to_string_pretty(matches.as_slice())?);
            } else {
                for record in matches.iter() {
                    println!(
                        "{} vs {} ({} / {} players)",
                        record.home_team,
                        record.away_team,
                        record.home_squad.len(),
                        record.away_squad.len()
                    );
                }
            }
        }

        Command::Squads => {
            let service = LineupService::with_http(Arc::clone(&config))?;
            pipeline::run_squads(&service).await?;
            println!("{} players indexed", service.player_cache_count());
        }

        Command::Status { first, last } => {
            let service = LineupService::with_http(Arc::clone(&config))?.with_storage(storage);
            if let Err(e) = pipeline::run_lineups(&service).await {
                log::warn!("Using snapshot data: {}", e);
            }

            let status = service.get_player_status(&first, &last);
            let player = service.get_player(&first, &last);
            println!(
                "{} {}: {} [{} / {}]",
                first,
                last,
                status,
                service.icon(status),
                service.color(status)
            );
            match player {
                Some(player) => println!(
                    "  {} ({})",
                    player.display_name,
                    player.slug_id.as_deref().unwrap_or("-")
                ),
                None => println!("  no fan-site player found"),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let config = Config::load(&config_path)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} squad pages)", config.site.squads.len());
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            match storage.load_snapshot().await? {
                Some(snapshot) => {
                    log::info!("Snapshot: {}", storage.snapshot_path().display());
                    log::info!("Last updated: {}", snapshot.saved_at);
                    log::info!("Matches: {}", snapshot.count);
                }
                None => log::info!("No snapshot found yet."),
            }
        }

        Command::Init { .. } => {}
    }

    log::info!("Done!");

    Ok(())
}

/// Write the default configuration to `path`.
fn init_config(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        log::warn!(
            "Config already exists at {}. Use --force to overwrite.",
            path.display()
        );
        return Err(AppError::config("config file exists"));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml_string()?)?;
    log::info!("Default config written to {}", path.display());
    Ok(())
}
