//! One competitor's side of a match

use crate::error::{ArenaError, Result};
use crate::game::{GameState, ReplayRecorder, SimulatorConfig, ThrowSimulator};
use crate::runner::result::CompetitorGame;
use crate::strategy::StrategyProvider;
use crate::types::CompetitorId;
use std::time::Instant;
use tracing::trace;

/// Game state, simulator and replay log owned by a single call site
#[derive(Debug)]
pub(crate) struct GameHalf {
    competitor_id: CompetitorId,
    game: GameState,
    simulator: ThrowSimulator,
    replay: ReplayRecorder,
}

impl GameHalf {
    pub(crate) fn new(
        competitor_id: CompetitorId,
        config: SimulatorConfig,
        seed: Option<u64>,
        started: Instant,
    ) -> Self {
        let simulator = match seed {
            Some(seed) => ThrowSimulator::seeded(config, seed),
            None => ThrowSimulator::new(config),
        };
        Self {
            competitor_id,
            game: GameState::new(),
            simulator,
            replay: ReplayRecorder::new(started),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.game.is_complete()
    }

    /// Play every remaining throw of the current frame
    pub(crate) fn play_frame(&mut self, strategy: &dyn StrategyProvider) -> Result<()> {
        let frame = self.game.current_frame();
        while let Some((current, throw)) = self.game.next_throw() {
            if current != frame {
                break;
            }
            self.play_throw(strategy, current, throw)?;
        }
        Ok(())
    }

    pub(crate) fn play_to_completion(&mut self, strategy: &dyn StrategyProvider) -> Result<()> {
        while !self.game.is_complete() {
            self.play_frame(strategy)?;
        }
        Ok(())
    }

    fn play_throw(&mut self, strategy: &dyn StrategyProvider, frame: u8, throw: u8) -> Result<()> {
        let descriptor = strategy.next_throw(&self.competitor_id, frame, throw)?;
        let falls = self.simulator.simulate(&descriptor, self.game.pins_mut())?;

        // Snapshot before record_roll re-racks the deck
        let pins_after = *self.game.pins();
        let knocked = u8::try_from(falls.len())
            .map_err(|_| ArenaError::internal("simulator reported more falls than pins"))?;

        trace!(
            "Throw resolved - competitor: '{}', frame: {}, throw: {}, pins: {}",
            self.competitor_id, frame, throw, knocked
        );

        self.replay.record(frame, throw, descriptor, falls, &pins_after);
        self.game.record_roll(knocked)
    }

    pub(crate) fn into_game(self) -> Result<CompetitorGame> {
        let final_score = self.game.final_score()?;
        let summary = self
            .game
            .summary()
            .cloned()
            .ok_or_else(|| ArenaError::IncompleteMatchState {
                reason: format!("no summary for {}", self.competitor_id),
            })?;

        Ok(CompetitorGame {
            competitor_id: self.competitor_id,
            final_score,
            frames: self.game.frames().to_vec(),
            cumulative_scores: self.game.cumulative_scores().to_vec(),
            summary,
            replay: self.replay.into_frames(),
        })
    }
}
