//! Match results handed back to callers

use crate::game::{FrameRecord, GameSummary, ReplayFrame};
use crate::rating::RatingUpdate;
use crate::types::{CompetitorId, MatchId, MatchOutcome, MatchStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One competitor's finished game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorGame {
    pub competitor_id: CompetitorId,
    pub final_score: u16,
    pub frames: Vec<FrameRecord>,
    pub cumulative_scores: Vec<u16>,
    pub summary: GameSummary,
    pub replay: Vec<ReplayFrame>,
}

/// Everything a caller needs to persist and broadcast a finished match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub competitor_a: CompetitorGame,
    pub competitor_b: CompetitorGame,
    /// `None` on a draw
    pub winner: Option<CompetitorId>,
    pub rating_update: RatingUpdate,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// Game played by the given competitor, if they took part
    pub fn game_for(&self, competitor_id: &str) -> Option<&CompetitorGame> {
        [&self.competitor_a, &self.competitor_b]
            .into_iter()
            .find(|game| game.competitor_id == competitor_id)
    }

    /// Outcome and post-match rating for the given competitor
    pub fn settlement_for(&self, competitor_id: &str) -> Option<(MatchOutcome, i32)> {
        if self.competitor_a.competitor_id == competitor_id {
            Some((self.rating_update.outcome_a, self.rating_update.new_rating_a))
        } else if self.competitor_b.competitor_id == competitor_id {
            Some((self.rating_update.outcome_b(), self.rating_update.new_rating_b))
        } else {
            None
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}
