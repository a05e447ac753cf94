//! offerwatch CLI
//!
//! Intended to be triggered on a schedule (cron, CI). Each invocation runs the
//! pipeline once and exits with a status code that reflects the outcome.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use offerwatch::{
    config::{load_config, load_dotenv, target_from_env},
    error::Result,
    models::Config,
    pipeline::{NotifyOutcome, Orchestrator, RunOptions},
    services::StaticSource,
    storage::{CsvSnapshotStore, SnapshotStore},
};

/// offerwatch - UC3M job offer watcher
#[derive(Parser, Debug)]
#[command(name = "offerwatch", version, about = "Emails new UC3M job offers")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the listing, notify new offers and update the snapshot
    Run {
        /// Fetch and diff only: no email, no snapshot update
        #[arg(long)]
        dry_run: bool,

        /// Read the listing from a local HTML file instead of the network
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and credentials
    Validate,

    /// Show current snapshot info
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging level may come from the config file, so read it before init.
    let loaded = load_config(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let result = match loaded {
        Ok(config) => execute(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn execute(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Run {
            dry_run,
            from_file,
            json,
        } => {
            let options = if dry_run {
                RunOptions::dry_run()
            } else {
                RunOptions::default()
            };

            load_dotenv();
            let target = if options.notify {
                Some(target_from_env()?)
            } else {
                None
            };

            let mut orchestrator = Orchestrator::from_config(&config, target, options)?;
            if let Some(path) = from_file {
                log::info!("Reading listing from {}", path.display());
                let source = StaticSource::from_file(config.source.url.clone(), &path)?;
                orchestrator = orchestrator.with_source(Box::new(source));
            }

            let report = orchestrator.run().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            if let NotifyOutcome::Failed { error } = &report.notification {
                log::warn!(
                    "Snapshot updated but {} new offers were not delivered: {}",
                    report.delta.new_count(),
                    error
                );
            }
            log::info!(
                "Done: {} offers, {} new, snapshot {}",
                report.fetched,
                report.delta.new_count(),
                if report.persisted { "updated" } else { "unchanged" }
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("✓ Config OK (source: {})", config.source.url);

            load_dotenv();
            let target = target_from_env()?;
            log::info!("✓ Mail credentials OK (recipient: {})", target.recipient);
        }

        Command::Info => {
            let store = CsvSnapshotStore::new(&config.snapshot.path);
            log::info!("Source: {}", config.source.url);
            log::info!("Snapshot: {}", store.location());

            match store.load().await? {
                Some(offers) => {
                    log::info!("Offers in snapshot: {}", offers.len());
                    for offer in &offers {
                        log::info!("{}", offer.format("    [{code}] {title} ({status})"));
                    }
                }
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    Ok(())
}
