//! Runs one full match between two competitors

use crate::error::{ArenaError, Result};
use crate::game::SimulatorConfig;
use crate::rating::RatingCalculator;
use crate::runner::half::GameHalf;
use crate::runner::result::MatchResult;
use crate::strategy::StrategyProvider;
use crate::types::{Competitor, MatchId, MatchOutcome, MatchStatus};
use crate::utils::{current_timestamp, generate_match_id};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// How the two halves of a match are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Both halves on the calling task, alternating frame by frame
    #[default]
    Sequential,
    /// Each half on its own blocking worker
    Concurrent,
}

impl std::str::FromStr for ExecutionMode {
    type Err = ArenaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "concurrent" => Ok(ExecutionMode::Concurrent),
            other => Err(ArenaError::ConfigurationError {
                message: format!("unknown execution mode: {}", other),
            }),
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Plays matches to completion and settles ratings
pub struct MatchRunner {
    strategy: Arc<dyn StrategyProvider>,
    rating_calculator: Arc<dyn RatingCalculator>,
    simulator_config: SimulatorConfig,
    mode: ExecutionMode,
    seed: Option<u64>,
    matches_started: AtomicU64,
}

impl MatchRunner {
    pub fn new(
        strategy: Arc<dyn StrategyProvider>,
        rating_calculator: Arc<dyn RatingCalculator>,
    ) -> Self {
        Self {
            strategy,
            rating_calculator,
            simulator_config: SimulatorConfig::default(),
            mode: ExecutionMode::default(),
            seed: None,
            matches_started: AtomicU64::new(0),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_simulator_config(mut self, config: SimulatorConfig) -> Self {
        self.simulator_config = config;
        self
    }

    /// Seed every simulator this runner creates, for reproducible leagues
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Run a match under a freshly generated id
    pub async fn run_match(&self, a: &Competitor, b: &Competitor) -> Result<MatchResult> {
        self.run_match_with_id(generate_match_id(), a, b).await
    }

    /// Run a match under an id the caller already handed out
    pub async fn run_match_with_id(
        &self,
        match_id: MatchId,
        a: &Competitor,
        b: &Competitor,
    ) -> Result<MatchResult> {
        if a.id == b.id {
            return Err(ArenaError::invalid_input(format!(
                "competitor '{}' cannot play against itself",
                a.id
            ))
            .into());
        }

        let started_at = current_timestamp();
        let started = Instant::now();
        let (seed_a, seed_b) = self.next_seeds();

        info!(
            "Starting match {} - '{}' ({}) vs '{}' ({}), mode: {}",
            match_id, a.id, a.rating, b.id, b.rating, self.mode
        );

        let half_a = GameHalf::new(a.id.clone(), self.simulator_config.clone(), seed_a, started);
        let half_b = GameHalf::new(b.id.clone(), self.simulator_config.clone(), seed_b, started);

        let (half_a, half_b) = match self.mode {
            ExecutionMode::Sequential => self.play_sequential(half_a, half_b)?,
            ExecutionMode::Concurrent => self.play_concurrent(half_a, half_b).await?,
        };

        let game_a = half_a.into_game()?;
        let game_b = half_b.into_game()?;

        let rating_update = self.rating_calculator.calculate_rating_update(
            a.rating,
            b.rating,
            game_a.final_score,
            game_b.final_score,
        )?;

        let winner = match rating_update.outcome_a {
            MatchOutcome::Win => Some(a.id.clone()),
            MatchOutcome::Loss => Some(b.id.clone()),
            MatchOutcome::Draw => None,
        };

        info!(
            "Match {} completed - '{}' {} : {} '{}', rating change {:+}/{:+}, time: {:.2}ms",
            match_id,
            a.id,
            game_a.final_score,
            game_b.final_score,
            b.id,
            rating_update.delta_a,
            rating_update.delta_b,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(MatchResult {
            match_id,
            status: MatchStatus::Completed,
            competitor_a: game_a,
            competitor_b: game_b,
            winner,
            rating_update,
            started_at,
            completed_at: current_timestamp(),
        })
    }

    fn next_seeds(&self) -> (Option<u64>, Option<u64>) {
        let index = self.matches_started.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => {
                let base = seed.wrapping_add(index.wrapping_mul(2));
                (Some(base), Some(base.wrapping_add(1)))
            }
            None => (None, None),
        }
    }

    /// Alternate frames A, B, A, B ... on the calling task
    fn play_sequential(
        &self,
        mut half_a: GameHalf,
        mut half_b: GameHalf,
    ) -> Result<(GameHalf, GameHalf)> {
        let strategy = self.strategy.as_ref();
        while !half_a.is_complete() || !half_b.is_complete() {
            if !half_a.is_complete() {
                half_a.play_frame(strategy)?;
            }
            if !half_b.is_complete() {
                half_b.play_frame(strategy)?;
            }
        }
        debug!("Sequential match finished both games");
        Ok((half_a, half_b))
    }

    /// Each half on its own blocking worker with independent state
    async fn play_concurrent(
        &self,
        half_a: GameHalf,
        half_b: GameHalf,
    ) -> Result<(GameHalf, GameHalf)> {
        let worker = |mut half: GameHalf, strategy: Arc<dyn StrategyProvider>| {
            tokio::task::spawn_blocking(move || -> Result<GameHalf> {
                half.play_to_completion(strategy.as_ref())?;
                Ok(half)
            })
        };

        let (joined_a, joined_b) = tokio::join!(
            worker(half_a, Arc::clone(&self.strategy)),
            worker(half_b, Arc::clone(&self.strategy))
        );

        let half_a = joined_a
            .map_err(|e| ArenaError::internal(format!("game worker failed: {}", e)))??;
        let half_b = joined_b
            .map_err(|e| ArenaError::internal(format!("game worker failed: {}", e)))??;

        debug!("Concurrent match finished both games");
        Ok((half_a, half_b))
    }
}

impl std::fmt::Debug for MatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRunner")
            .field("mode", &self.mode)
            .field("seed", &self.seed)
            .field("rating", &self.rating_calculator.config())
            .finish()
    }
}
