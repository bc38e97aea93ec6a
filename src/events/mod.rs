//! Outbound arena notifications
//!
//! The game engine, rating engine and queue never publish anything; the
//! arena service emits these after each state change it commits.

pub mod publisher;

pub use publisher::{ChannelEventPublisher, EventPublisher, NoOpEventPublisher};

use crate::runner::MatchResult;
use crate::types::{CompetitorId, MatchId, MatchOutcome, QueueId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A competitor joined the matchmaking queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorQueued {
    pub competitor_id: CompetitorId,
    pub queue_id: QueueId,
    pub rating: i32,
    pub position: usize,
    pub timestamp: DateTime<Utc>,
}

/// Two competitors were paired and a match is about to be played
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFound {
    pub match_id: MatchId,
    pub competitor_a: CompetitorId,
    pub competitor_b: CompetitorId,
    pub rating_a: i32,
    pub rating_b: i32,
    pub timestamp: DateTime<Utc>,
}

/// Final score and rating movement for one side of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorSettlement {
    pub competitor_id: CompetitorId,
    pub final_score: u16,
    pub outcome: MatchOutcome,
    pub old_rating: i32,
    pub new_rating: i32,
}

impl CompetitorSettlement {
    pub fn delta(&self) -> i32 {
        self.new_rating - self.old_rating
    }
}

/// A match finished and its results were committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCompleted {
    pub match_id: MatchId,
    pub winner: Option<CompetitorId>,
    pub settlements: Vec<CompetitorSettlement>,
    pub duration_ms: i64,
    pub timestamp: DateTime<Utc>,
}

impl MatchCompleted {
    pub fn from_result(result: &MatchResult) -> Self {
        let update = &result.rating_update;
        Self {
            match_id: result.match_id,
            winner: result.winner.clone(),
            settlements: vec![
                CompetitorSettlement {
                    competitor_id: result.competitor_a.competitor_id.clone(),
                    final_score: result.competitor_a.final_score,
                    outcome: update.outcome_a,
                    old_rating: update.old_rating_a,
                    new_rating: update.new_rating_a,
                },
                CompetitorSettlement {
                    competitor_id: result.competitor_b.competitor_id.clone(),
                    final_score: result.competitor_b.final_score,
                    outcome: update.outcome_b(),
                    old_rating: update.old_rating_b,
                    new_rating: update.new_rating_b,
                },
            ],
            duration_ms: result.duration_ms(),
            timestamp: result.completed_at,
        }
    }
}

/// Union type for all arena events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaEvent {
    CompetitorQueued(CompetitorQueued),
    MatchFound(MatchFound),
    MatchCompleted(MatchCompleted),
}

impl ArenaEvent {
    /// Variant name, as it appears in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            ArenaEvent::CompetitorQueued(_) => "CompetitorQueued",
            ArenaEvent::MatchFound(_) => "MatchFound",
            ArenaEvent::MatchCompleted(_) => "MatchCompleted",
        }
    }
}
