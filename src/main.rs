use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use replay_devtools::{
    render_tree, util, App, AuthClient, CommentStore, Config, DevtoolsSession,
    GraphqlCommentStore, LocalRecording, MemoryCommentStore, StaticTokenClient, TokenManager,
};
use replay_devtools::ui::components::format_time;
use replay_devtools::ui::install_panic_hook;

#[derive(Parser)]
#[command(name = "replay-devtools", version, about = "Terminal devtools for recorded browser sessions")]
struct Cli {
    /// Directory for config and logs (default: ~/.replay-devtools)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect a recording interactively
    Open { fixture: PathBuf },
    /// Print the markup tree and timeline summary of a recording
    Dump { fixture: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir);

    // Initialize logging to file (~/.replay-devtools/logs/replay-devtools.log)
    fs::create_dir_all(util::logs_dir())?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(log_file)
        .with_ansi(false) // Disable ANSI colors in log file
        .init();

    let config = Config::load();

    match cli.command {
        Command::Open { fixture } => open(config, &fixture).await,
        Command::Dump { fixture } => dump(config, &fixture).await,
    }
}

fn open_recording(fixture: &Path) -> Result<Arc<LocalRecording>> {
    LocalRecording::open(fixture)
        .with_context(|| format!("Failed to open recording {}", fixture.display()))
}

async fn open(config: Config, fixture: &Path) -> Result<()> {
    install_panic_hook();
    let session = DevtoolsSession::from_recording(open_recording(fixture)?, config.playback);

    let (comments, tokens): (Arc<dyn CommentStore>, _) = match &config.comments_endpoint {
        Some(endpoint) => {
            let client: Arc<dyn AuthClient> = Arc::new(StaticTokenClient::from_env());
            let tokens = TokenManager::new(client, config.auth.clone());
            (
                Arc::new(GraphqlCommentStore::new(endpoint.clone(), tokens.clone())),
                Some(tokens),
            )
        }
        None => (Arc::new(MemoryCommentStore::new()), None),
    };

    let mut app = App::new(config, session, comments);
    if let Some(tokens) = tokens {
        app = app.with_tokens(tokens.clone());
        tokio::spawn(async move { tokens.init().await });
    }
    app.run().await
}

async fn dump(config: Config, fixture: &Path) -> Result<()> {
    let recording = open_recording(fixture)?;
    let paints = recording.paints().len();
    let mut session = DevtoolsSession::from_recording(recording, config.playback);
    session.start().await?;

    let snapshot = session.store().snapshot();
    for node in render_tree(&snapshot.markup, config.inspector) {
        for line in node.lines() {
            println!("{}{}", "  ".repeat(line.node.depth), line.text());
        }
    }

    let timeline = &snapshot.timeline;
    println!();
    println!(
        "duration: {}",
        timeline
            .recording_duration
            .map(format_time)
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!("paints: {paints}");
    println!("current time: {}", format_time(timeline.current_time));
    match &timeline.screenshot {
        Some(screen) => println!("screen: {}", screen.hash),
        None => println!("screen: none"),
    }

    session.shutdown();
    Ok(())
}
