//! playctl command line - inspect the persisted session and configuration
//! used by the playback controller.

use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use playctl::{
    config::{Config, ConfigPaths},
    runtime_state::RuntimeStateStore,
    services::playback::LastPlayed,
    tracing_config,
};
use tracing::{debug, instrument};

/// Playback controller utilities
#[derive(Parser, Debug)]
#[command(name = "playctl", version, about)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Runtime state file to use instead of the default location
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Also write logs to a daily-rotated file
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the session that would be restored on connect
    LastPlayed,
    /// Persist a session to restore on the next connect
    Remember {
        /// Media identifier
        media_id: i64,
        /// Feed identifier
        feed_id: i64,
        /// Play from the local download instead of streaming
        #[arg(long)]
        download: bool,
    },
    /// Clear the persisted session
    Forget,
    /// Print the effective configuration as TOML
    Config,
    /// Print the JSON schema of the configuration
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let _log_guard = if cli.log_file {
        Some(tracing_config::init_with_file(config.general.log_level)?)
    } else {
        tracing_config::init(config.general.log_level)?;
        None
    };

    let store = match &cli.state {
        Some(path) => RuntimeStateStore::new(path),
        None => RuntimeStateStore::at_default_location()?,
    };

    let output = run(cli.command, &config, &store)?;
    if !output.trim().is_empty() {
        println!("{output}");
    }

    Ok(())
}

#[instrument(skip(config, store))]
fn run(command: Command, config: &Config, store: &RuntimeStateStore) -> Result<String, Box<dyn Error>> {
    debug!(state = %store.path().display(), "Running command");

    let output = match command {
        Command::LastPlayed => match store.load().last_played {
            Some(session) => format!(
                "media {} from feed {} ({})",
                session.media_id,
                session.feed_id,
                if session.is_stream { "stream" } else { "download" }
            ),
            None => "No last played media".to_string(),
        },
        Command::Remember {
            media_id,
            feed_id,
            download,
        } => {
            store.remember(Some(LastPlayed {
                media_id,
                feed_id,
                is_stream: !download,
            }))?;
            format!("Remembered media {media_id} from feed {feed_id}")
        }
        Command::Forget => {
            store.remember(None)?;
            "Forgot last played media".to_string()
        }
        Command::Config => {
            let location = ConfigPaths::main_config()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "<unknown>".to_string());
            format!("# default location: {location}\n{}", config.to_toml_string()?)
        }
        Command::Schema => {
            let schema = schemars::schema_for!(Config);
            serde_json::to_string_pretty(&schema)?
        }
    };

    Ok(output)
}
