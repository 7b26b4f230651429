use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use steamsage::chat;
use steamsage::config::Config;
use steamsage::models::is_app_id;
use steamsage::review_manager::ReviewManager;
use steamsage::session::Selection;
use steamsage::web_server;
use steamsage::{GameResult, SummaryResponse};
use tracing::{error, info, warn};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web server.
    Serve {
        #[arg(long, default_value_t = 9900, help = "Port for the web server.")]
        port: u16,
    },
    /// Search the Steam store for games.
    Search {
        query: String,
        #[arg(long, help = "Print results as JSON.")]
        json: bool,
    },
    /// Fetch and summarize reviews for up to three games.
    Summarize {
        #[arg(required = true, value_parser = parse_game_ref, help = "Game as APP_ID or APP_ID=TITLE.")]
        games: Vec<GameResult>,
        #[arg(long, help = "Print summaries as JSON.")]
        json: bool,
    },
    /// Summarize games, then chat about them.
    Chat {
        #[arg(required = true, value_parser = parse_game_ref, help = "Game as APP_ID or APP_ID=TITLE.")]
        games: Vec<GameResult>,
    },
}

/// `APP_ID=TITLE`, title defaulting to the id. Only id and title matter for reviews.
fn parse_game_ref(value: &str) -> Result<GameResult, String> {
    let (app_id, title) = match value.split_once('=') {
        Some((id, title)) => (id.trim(), title.trim()),
        None => (value.trim(), value.trim()),
    };
    if !is_app_id(app_id) {
        return Err(format!("invalid app id '{}'", app_id));
    }
    let title = if title.is_empty() { app_id } else { title };
    Ok(GameResult {
        app_id: app_id.to_string(),
        title: title.to_string(),
        release_date: String::new(),
        image_url: String::new(),
        url: String::new(),
    })
}

fn select(games: Vec<GameResult>) -> Vec<GameResult> {
    let mut selection = Selection::new();
    for game in games {
        let app_id = game.app_id.clone();
        if !selection.add(game) {
            warn!("Skipping {}: duplicate or more than three games", app_id);
        }
    }
    selection.games().to_vec()
}

fn print_summaries(summaries: &[SummaryResponse]) {
    for s in summaries {
        println!("== {}", s.title);
        if let Some(err) = &s.error {
            println!("  Could not summarize: {}", err);
            continue;
        }
        println!("{}", s.summary);
        println!("Positives:");
        if s.positive.is_empty() {
            println!("  No positives found.");
        }
        for point in &s.positive {
            println!("  + {}", point);
        }
        println!("Negatives:");
        if s.negative.is_empty() {
            println!("  No negatives found.");
        }
        for point in &s.negative {
            println!("  - {}", point);
        }
        println!();
    }
}

async fn summarize(manager: &ReviewManager, games: Vec<GameResult>) -> Result<Vec<SummaryResponse>> {
    let games = select(games);
    let digest = manager
        .digest(&games)
        .await
        .context("Error fetching reviews or AI summaries")?;
    if digest.summaries.is_empty() {
        println!("None of the selected games has reviews to summarize.");
    }
    Ok(digest.summaries)
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GOOGLE_AI_KEY and endpoint overrides)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,steamsage=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Fail fast: nothing runs without the API key.
    let config = Config::from_env().context("Configuration error")?;
    let manager = Arc::new(ReviewManager::new(config));

    info!("Steam Sage starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Serve { port } => {
            let manager_web_clone = manager.clone();
            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, manager_web_clone).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, shutting down...");
                    web_server_handle.abort();
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }
            info!("Shutdown complete.");
        }
        Commands::Search { query, json } => {
            let games = manager
                .store()
                .fetch_games(&query)
                .await
                .context("Game search failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&games)?);
            } else if games.is_empty() {
                println!("No games found for '{}'.", query);
            } else {
                for game in &games {
                    println!("{:>8}  {}  ({})", game.app_id, game.title, game.release_date);
                }
            }
        }
        Commands::Summarize { games, json } => {
            let summaries = summarize(&manager, games).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_summaries(&summaries);
            }
        }
        Commands::Chat { games } => {
            let summaries = summarize(&manager, games).await?;
            if summaries.is_empty() {
                bail!("Nothing to chat about");
            }
            print_summaries(&summaries);
            io::stdout().flush()?;

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = io::stdout();
            chat::run_interactive_chat(manager.ai(), manager.config(), &summaries, stdin, &mut stdout)
                .await
                .context("Chat session failed")?;
        }
    }

    Ok(())
}
