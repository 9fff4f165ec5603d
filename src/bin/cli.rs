//! WH Helper CLI
//!
//! Local execution entry point. For the Telegram webhook, use `wh-helper-server`.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use wh_helper::{
    error::Result,
    models::{Config, Snapshot, Topic},
    pipeline,
    services::{Aggregator, IntentClassifier, RandomPicker, Responder, TopicExtractor},
    storage::{self, SnapshotStore},
};

/// WH Helper - exam and registration dates of the Westfälische Hochschule
#[derive(Parser, Debug)]
#[command(
    name = "wh-helper",
    version,
    about = "Exam and registration helper for the Westfälische Hochschule"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all topics once and print a summary
    Refresh {
        /// Also write the snapshot as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Scrape a single topic live and print its records
    Show {
        /// Topic: anmeldung, klausuren or aktuelles
        topic: Topic,
    },

    /// Answer a question the way the bot would
    Ask {
        /// The message text
        text: Vec<String>,
    },

    /// Print the intent a message is classified as
    Classify {
        /// The message text
        text: Vec<String>,
    },

    /// Validate the configuration file
    Validate,
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

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env_overrides();

    log::debug!("Using configuration from {}", cli.config.display());

    match cli.command {
        Command::Refresh { output } => {
            let aggregator = Aggregator::from_config(&config)?;
            let store = SnapshotStore::new(Snapshot::with_defaults(Utc::now()));
            let snapshot = pipeline::run_refresh(&aggregator, &store).await;

            for topic in Topic::ALL {
                let records = snapshot.records(topic);
                log::info!("{}: {} records", topic, records.len());
                for record in records {
                    log::debug!("  {} | {} | {}", record.kind, record.description, record.date);
                }
            }

            if let Some(path) = output {
                storage::write_snapshot(&path, &snapshot).await?;
            }
        }

        Command::Show { topic } => {
            let aggregator = Aggregator::from_config(&config)?;
            let records = aggregator.extractor(topic).extract().await;
            for record in &records {
                println!("{} | {} | {}", record.kind, record.description, record.date);
                if let Some(content) = &record.content {
                    println!("    {}", content);
                }
            }
            log::info!("{}: {} records", topic, records.len());
        }

        Command::Ask { text } => {
            let text = text.join(" ");
            let intent = IntentClassifier::new().classify(&text);
            log::info!("Intent: {}", intent);

            let aggregator = Aggregator::from_config(&config)?;
            let snapshot = aggregator.build_snapshot().await;
            let responder = Responder::new(&config.sources.program_url, RandomPicker);
            println!("{}", responder.render(intent, &snapshot));
        }

        Command::Classify { text } => {
            let text = text.join(" ");
            println!("{}", IntentClassifier::new().classify(&text));
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} registration pages, refresh every {}s, cache TTL {}s)",
                config.sources.registration_urls.len(),
                config.schedule.refresh_interval_secs,
                config.cache.ttl_secs
            );
        }
    }

    Ok(())
}
