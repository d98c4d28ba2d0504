//! IPO Feed CLI
//!
//! Runs the JSON API or performs a one-off fetch from the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ipo_feed::{
    api::{
        self, ApiState,
        types::{AllIposResponse, CategoryResponse},
    },
    diagnostics::LogSink,
    error::Result,
    models::{Category, Config},
    pipeline::Aggregator,
};

/// IPO Feed - Indian IPO calendar scraper
#[derive(Parser, Debug)]
#[command(
    name = "ipo-feed",
    version,
    about = "Scrapes IPO calendar pages and serves them as JSON"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve {
        /// Override server.host from the config
        #[arg(long)]
        host: Option<String>,

        /// Override server.port from the config
        #[arg(long)]
        port: Option<u16>,
    },

    /// Fetch once and print the JSON response to stdout
    Fetch {
        #[arg(value_enum, default_value_t = Target::All)]
        target: Target,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Current,
    Upcoming,
    All,
}

/// Initialize logging from the verbosity flag or the configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging level may come from the config, so load it before logging starts.
    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) if matches!(cli.command, Command::Validate) => {
            log::error!("Cannot read {}: {}", cli.config.display(), e);
            return Err(e);
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let aggregator = Aggregator::from_config(&config)?;
            log::info!("Sources in priority order: {}", aggregator.source_ids().join(", "));
            api::serve(&config.server, ApiState::new(aggregator)).await?;
        }

        Command::Fetch { target } => {
            config.validate()?;
            let aggregator = Aggregator::from_config(&config)?;
            let sink = LogSink;

            let json = match target {
                Target::All => {
                    let current = aggregator.current(&sink).await?;
                    let upcoming = aggregator.upcoming(&sink).await?;
                    serde_json::to_string_pretty(&AllIposResponse::from_outcomes(current, upcoming))?
                }
                Target::Current => {
                    let outcome = aggregator.collect(Category::Current, &sink).await?;
                    serde_json::to_string_pretty(&CategoryResponse::from_outcome(outcome))?
                }
                Target::Upcoming => {
                    let outcome = aggregator.collect(Category::Upcoming, &sink).await?;
                    serde_json::to_string_pretty(&CategoryResponse::from_outcome(outcome))?
                }
            };
            println!("{json}");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ {} sources OK", config.sources.len());

            // Adapter construction also checks header values.
            Aggregator::from_config(&config)?;
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
