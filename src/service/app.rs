//! Main application state and service coordination
//!
//! This module builds the arena from configuration and runs the background
//! tasks of a local league: matchmaking rounds, queue cleanup and periodic
//! statistics.

use crate::config::AppConfig;
use crate::events::EventPublisher;
use crate::metrics::MetricsCollector;
use crate::queue::MatchmakingQueue;
use crate::rating::{CompetitorStore, EloRatingCalculator, InMemoryCompetitorStore};
use crate::runner::{MatchResult, MatchRunner};
use crate::service::arena::ArenaService;
use crate::strategy::{BotStrategy, RandomStrategyProvider};
use crate::types::Competitor;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Arena orchestration
    arena: Arc<ArenaService>,

    /// Strategy source for every bot in the league
    strategies: Arc<RandomStrategyProvider>,

    metrics: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub fn new(config: AppConfig, publisher: Arc<dyn EventPublisher>) -> Result<Self, ServiceError> {
        crate::config::validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        info!("Initializing {} arena", config.service.name);

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let rating_calculator =
            EloRatingCalculator::new(config.rating.k_factor, config.rating.initial_rating)
                .map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to initialize rating calculator: {}", e),
                })?;

        let strategies = Arc::new(match config.simulation.seed {
            Some(seed) => RandomStrategyProvider::seeded(seed),
            None => RandomStrategyProvider::new(),
        });

        let mut runner = MatchRunner::new(strategies.clone(), Arc::new(rating_calculator))
            .with_mode(config.simulation.execution_mode)
            .with_simulator_config(config.simulator_config());
        if let Some(seed) = config.simulation.seed {
            runner = runner.with_seed(seed);
        }

        let store: Arc<dyn CompetitorStore> = Arc::new(InMemoryCompetitorStore::new());
        let queue = Arc::new(MatchmakingQueue::new(store.clone(), config.queue_config()));

        let arena = ArenaService::new(
            store,
            queue,
            Arc::new(runner),
            publisher,
            config.rating.initial_rating,
        )
        .with_metrics(metrics.clone());

        Ok(Self {
            config,
            arena: Arc::new(arena),
            strategies,
            metrics,
            background_tasks: Vec::new(),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn arena(&self) -> Arc<ArenaService> {
        self.arena.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Register a bot and give it a playing style
    pub fn register_bot(
        &self,
        id: &str,
        name: &str,
        strategy: BotStrategy,
    ) -> crate::error::Result<Competitor> {
        let competitor = self.arena.register_competitor(id, name)?;
        let profile = self.strategies.assign(&competitor.id, strategy)?;
        debug!(
            "Bot '{}' plays {:?} at skill {:.2}",
            competitor.id, profile.strategy, profile.skill
        );
        Ok(competitor)
    }

    /// Register `count` bots, cycling through every strategy
    pub fn register_league(&self, count: usize) -> crate::error::Result<Vec<Competitor>> {
        (0..count)
            .map(|i| {
                let strategy = BotStrategy::ALL[i % BotStrategy::ALL.len()];
                let id = format!("bot-{:03}", i + 1);
                let name = format!("{:?} Bot {}", strategy, i + 1);
                self.register_bot(&id, &name, strategy)
            })
            .collect()
    }

    /// Requeue idle bots and run one matchmaking round
    pub async fn play_round(&self) -> crate::error::Result<Vec<MatchResult>> {
        self.arena.queue_idle_competitors().await?;
        self.arena.run_matchmaking_round().await
    }

    /// Start all background tasks
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting {} arena", self.config.service.name);
        *self.is_running.write().await = true;
        self.start_background_tasks();
        info!("✅ Arena started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {}", self.config.service.name);
        *self.is_running.write().await = false;

        let shutdown_timeout = self.config.shutdown_timeout();
        if tokio::time::timeout(shutdown_timeout, self.stop_background_tasks())
            .await
            .is_err()
        {
            warn!("⚠️  Background tasks did not stop within {:?}", shutdown_timeout);
        }

        let final_stats = self
            .arena
            .stats()
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;

        info!("Final arena statistics: {:?}", final_stats);
        info!("✅ Arena shutdown completed");
        Ok(())
    }

    fn start_background_tasks(&mut self) {
        info!("Starting background tasks...");

        // Matchmaking rounds
        let matchmaking_task = {
            let arena = self.arena.clone();
            let interval = self.config.round_interval();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                info!("Matchmaking task started ({}ms interval)", interval.as_millis());

                while *is_running.read().await {
                    ticker.tick().await;

                    if let Err(e) = arena.queue_idle_competitors().await {
                        warn!("Failed to requeue idle competitors: {}", e);
                        continue;
                    }
                    match arena.run_matchmaking_round().await {
                        Ok(results) if !results.is_empty() => {
                            debug!("Matchmaking round played {} matches", results.len())
                        }
                        Ok(_) => {}
                        Err(e) => error!("Matchmaking round failed: {}", e),
                    }
                }

                info!("Matchmaking task stopped");
            })
        };

        // Queue cleanup
        let cleanup_task = {
            let arena = self.arena.clone();
            let max_wait = self.config.max_wait_time();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(max_wait / 2);
                info!("Queue cleanup task started");

                while *is_running.read().await {
                    ticker.tick().await;

                    match arena.remove_stale_entries(max_wait) {
                        Ok(removed) if !removed.is_empty() => {
                            info!("Removed {} stale queue entries", removed.len())
                        }
                        Ok(_) => debug!("Cleanup check completed - no stale entries found"),
                        Err(e) => warn!("Queue cleanup failed: {}", e),
                    }
                }

                info!("Queue cleanup task stopped");
            })
        };

        // Periodic statistics
        let stats_task = {
            let arena = self.arena.clone();
            let metrics = self.metrics.clone();
            let interval = self.config.stats_interval();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                info!("Stats task started");

                while *is_running.read().await {
                    ticker.tick().await;
                    metrics.update_uptime();

                    match (arena.stats(), arena.leaderboard()) {
                        (Ok(stats), Ok(leaderboard)) => {
                            let leader = leaderboard
                                .first()
                                .map(|c| format!("{} ({})", c.name, c.rating))
                                .unwrap_or_else(|| "-".to_string());
                            info!(
                                "League: {} matches, {} draws, high game {}, leader {}",
                                stats.matches_played, stats.draws, stats.highest_score, leader
                            );
                        }
                        (Err(e), _) | (_, Err(e)) => warn!("Failed to read league stats: {}", e),
                    }
                }

                info!("Stats task stopped");
            })
        };

        self.background_tasks.push(matchmaking_task);
        self.background_tasks.push(cleanup_task);
        self.background_tasks.push(stats_task);

        info!(
            "{} background tasks started successfully",
            self.background_tasks.len()
        );
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&mut self) {
        let task_count = self.background_tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);
        for (i, task) in self.background_tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
            let _ = task.await;
        }

        info!("✅ All {} background tasks stopped", task_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEventPublisher;

    fn seeded_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.simulation.seed = Some(2024);
        config
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.rating.k_factor = -1.0;
        let result = AppState::new(config, Arc::new(NoOpEventPublisher));
        assert!(matches!(result, Err(ServiceError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_league_rounds_move_ratings() {
        let app = AppState::new(seeded_config(), Arc::new(NoOpEventPublisher)).unwrap();
        let bots = app.register_league(6).unwrap();
        assert_eq!(bots.len(), 6);

        for _ in 0..3 {
            let results = app.play_round().await.unwrap();
            assert_eq!(results.len(), 3);
        }

        let leaderboard = app.arena().leaderboard().unwrap();
        assert!(leaderboard.iter().all(|c| c.stats.matches_played == 3));
        // Elo is zero-sum
        let total: i32 = leaderboard.iter().map(|c| c.rating).sum();
        assert_eq!(total, 6 * 1200);
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let mut config = seeded_config();
        config.matchmaking.round_interval_ms = 5;
        let mut app = AppState::new(config, Arc::new(NoOpEventPublisher)).unwrap();
        app.register_league(4).unwrap();

        app.start().await.unwrap();
        assert!(app.is_running().await);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        app.shutdown().await.unwrap();

        assert!(!app.is_running().await);
        assert!(app.arena().stats().unwrap().matches_played > 0);
    }
}
