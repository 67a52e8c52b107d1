// ABOUTME: Entry point for coursebot — a terminal chat client for the university course assistant.
// ABOUTME: Parses CLI args, loads config, sets up file logging, and launches the app.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use coursebot::app::App;
use coursebot::chat::Language;
use coursebot::config::Config;

#[derive(Debug, Parser)]
#[command(name = "coursebot", version, about = "Chat with the university course assistant")]
struct Cli {
    /// Base URL of the chat server (the client POSTs to <URL>/chat).
    #[arg(long, env = "COURSEBOT_BASE_URL")]
    base_url: Option<String>,

    /// Language replies are requested in.
    #[arg(long, value_enum)]
    language: Option<Language>,

    /// Start with only the welcome message instead of restoring history.
    #[arg(long)]
    fresh: bool,

    /// Directory for the session id, chat history, and log file.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Config file to read instead of ~/.coursebot/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(language) = self.language {
            config.chat.language = language;
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.to_string_lossy().into_owned();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads COURSEBOT_BASE_URL.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply(&mut config);

    init_logging(&config.data_dir())?;
    App::new(config, cli.fresh).run().await
}

/// Log to `<data_dir>/coursebot.log`; the terminal belongs to the TUI.
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("coursebot.log"))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coursebot=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
