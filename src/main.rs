//! Main entry point for the Pinfall arena
//!
//! Runs a local league of bots: registers them, keeps them queued, plays
//! matches as pairings appear, and reports the standings on shutdown.

use anyhow::Result;
use clap::Parser;
use pinfall::config::AppConfig;
use pinfall::events::{ArenaEvent, ChannelEventPublisher};
use pinfall::rating::{rank_band, RatingTier};
use pinfall::runner::ExecutionMode;
use pinfall::service::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info};

/// Pinfall - bot-vs-bot bowling arena
#[derive(Parser)]
#[command(
    name = "pinfall",
    version,
    about = "Bot-vs-bot ten-pin bowling with Elo ratings and matchmaking",
    long_about = "Pinfall runs a local league of bowling bots. Bots are queued, paired by rating \
                 proximity and wait time, play full ten-frame games against each other, and \
                 have their Elo ratings updated after every match."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Number of bots in the league
    #[arg(short, long, default_value_t = 8, help = "Number of bots to register")]
    bots: usize,

    /// Play a fixed number of rounds and exit
    #[arg(
        short,
        long,
        value_name = "N",
        help = "Play N matchmaking rounds and exit instead of running until Ctrl+C"
    )]
    rounds: Option<usize>,

    /// Execution mode override
    #[arg(long, value_name = "MODE", help = "Match execution mode (sequential, concurrent)")]
    mode: Option<ExecutionMode>,

    /// Seed override
    #[arg(long, value_name = "SEED", help = "Seed for reproducible leagues")]
    seed: Option<u64>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Print final standings as JSON
    #[arg(long, help = "Print the final leaderboard as JSON on stdout")]
    json: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without starting the league")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() -> Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = ctrl_c => {
                result?;
                info!("Received SIGINT (Ctrl+C) signal");
            },
            _ = terminate.recv() => {
                info!("Received SIGTERM signal");
            },
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await?;
        info!("Received SIGINT (Ctrl+C) signal");
    }

    Ok(())
}

/// Log every event the arena publishes
async fn event_log_task(mut events: UnboundedReceiver<ArenaEvent>) {
    while let Some(event) = events.recv().await {
        match &event {
            ArenaEvent::MatchCompleted(completed) => {
                let line = completed
                    .settlements
                    .iter()
                    .map(|s| format!("{} {} ({:+})", s.competitor_id, s.final_score, s.delta()))
                    .collect::<Vec<_>>()
                    .join(" vs ");
                info!("🎳 Match {} - {}", completed.match_id, line);
            }
            other => debug!("Event: {}", other.event_type()),
        }
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig, bots: usize) {
    info!("🎳 Pinfall Arena");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Bots: {}", bots);
    info!("   Execution mode: {}", config.simulation.execution_mode);
    info!(
        "   Seed: {}",
        config
            .simulation
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "entropy".to_string())
    );
    info!(
        "   K-factor: {}, initial rating: {}",
        config.rating.k_factor, config.rating.initial_rating
    );
    info!(
        "   Default tolerance: {}, max wait time: {}s",
        config.matchmaking.default_tolerance, config.matchmaking.max_wait_time_seconds
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if let Some(mode) = args.mode {
        config.simulation.execution_mode = mode;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    pinfall::config::validate_config(&config)?;
    Ok(config)
}

/// Log the final standings, optionally as JSON on stdout
fn report_standings(app_state: &AppState, json: bool) -> Result<()> {
    let leaderboard = app_state.arena().leaderboard()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&leaderboard)?);
        return Ok(());
    }

    info!("🏆 Final standings");
    for (place, competitor) in leaderboard.iter().enumerate() {
        info!(
            "  {:>2}. {:<20} {:>5}  {:<12} rank {:>2}  {}W {}L {}D  high {}  avg {:.1}",
            place + 1,
            competitor.name,
            competitor.rating,
            RatingTier::for_rating(competitor.rating).to_string(),
            rank_band(competitor.rating),
            competitor.stats.wins,
            competitor.stats.losses,
            competitor.stats.draws,
            competitor.stats.high_score,
            competitor.stats.average_score
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config, args.bots);
        info!("Dry run completed - exiting without starting the league");
        return Ok(());
    }

    display_startup_banner(&config, args.bots);

    // Initialize application state
    let (publisher, events) = ChannelEventPublisher::channel();
    let event_task = tokio::spawn(event_log_task(events));

    let mut app_state = match AppState::new(config.clone(), Arc::new(publisher)) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };
    app_state.register_league(args.bots)?;

    if let Some(rounds) = args.rounds {
        info!("Playing {} rounds...", rounds);
        for round in 1..=rounds {
            let results = app_state.play_round().await?;
            debug!("Round {} played {} matches", round, results.len());
        }
    } else {
        if let Err(e) = app_state.start().await {
            error!("Failed to start arena: {}", e);
            std::process::exit(1);
        }

        info!("✅ Pinfall arena is running");
        info!("Press Ctrl+C to shutdown gracefully...");

        wait_for_shutdown_signal().await?;

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");
        app_state.shutdown().await?;
    }

    report_standings(&app_state, args.json)?;

    let stats = app_state.arena().stats()?;
    info!(
        "League finished: {} matches, {} draws, high game {}",
        stats.matches_played, stats.draws, stats.highest_score
    );

    drop(app_state);
    event_task.abort();

    info!("🛑 Pinfall arena stopped");
    Ok(())
}
