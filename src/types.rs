//! Common types used throughout the bowling arena

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for competitors (bots)
pub type CompetitorId = String;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Unique identifier for queue entries
pub type QueueId = Uuid;

/// Rating assigned to competitors that have never played
pub const DEFAULT_RATING: i32 = 1200;

/// Lifecycle status of a match as seen by the outside world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "pending"),
            MatchStatus::InProgress => write!(f, "in_progress"),
            MatchStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Lifetime counters for a competitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorStats {
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub high_score: u16,
    /// Running mean of final game scores
    pub average_score: f64,
}

/// How a single match ended for one competitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

impl MatchOutcome {
    /// Outcome for the side scoring `own` against `opponent`
    pub fn from_scores(own: u16, opponent: u16) -> Self {
        match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => MatchOutcome::Win,
            std::cmp::Ordering::Less => MatchOutcome::Loss,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }

    /// Actual score used by expectation-based rating updates
    pub fn actual_score(&self) -> f64 {
        match self {
            MatchOutcome::Win => 1.0,
            MatchOutcome::Loss => 0.0,
            MatchOutcome::Draw => 0.5,
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            MatchOutcome::Win => MatchOutcome::Loss,
            MatchOutcome::Loss => MatchOutcome::Win,
            MatchOutcome::Draw => MatchOutcome::Draw,
        }
    }
}

/// A bot competing in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    pub rating: i32,
    pub stats: CompetitorStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Competitor {
    /// Create a fresh competitor at the default rating
    pub fn new(id: impl Into<CompetitorId>, name: impl Into<String>) -> Self {
        Self::with_rating(id, name, DEFAULT_RATING)
    }

    /// Create a competitor with an explicit starting rating
    pub fn with_rating(id: impl Into<CompetitorId>, name: impl Into<String>, rating: i32) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            rating,
            stats: CompetitorStats::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold one completed match into the rating and lifetime counters
    pub fn apply_match(&mut self, final_score: u16, outcome: MatchOutcome, new_rating: i32) {
        let played = self.stats.matches_played as f64;
        self.stats.average_score =
            (self.stats.average_score * played + final_score as f64) / (played + 1.0);
        self.stats.matches_played += 1;
        match outcome {
            MatchOutcome::Win => self.stats.wins += 1,
            MatchOutcome::Loss => self.stats.losses += 1,
            MatchOutcome::Draw => self.stats.draws += 1,
        }
        self.stats.high_score = self.stats.high_score.max(final_score);
        self.rating = new_rating;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_competitor_defaults() {
        let competitor = Competitor::new("bot-1", "Gutter Goblin");
        assert_eq!(competitor.rating, DEFAULT_RATING);
        assert_eq!(competitor.stats, CompetitorStats::default());
    }

    #[test]
    fn test_apply_match_updates_counters() {
        let mut competitor = Competitor::new("bot-1", "Gutter Goblin");

        competitor.apply_match(180, MatchOutcome::Win, 1216);
        assert_eq!(competitor.rating, 1216);
        assert_eq!(competitor.stats.matches_played, 1);
        assert_eq!(competitor.stats.wins, 1);
        assert_eq!(competitor.stats.high_score, 180);
        assert_eq!(competitor.stats.average_score, 180.0);

        competitor.apply_match(120, MatchOutcome::Loss, 1200);
        assert_eq!(competitor.stats.matches_played, 2);
        assert_eq!(competitor.stats.losses, 1);
        assert_eq!(competitor.stats.high_score, 180);
        assert_eq!(competitor.stats.average_score, 150.0);

        competitor.apply_match(150, MatchOutcome::Draw, 1200);
        assert_eq!(competitor.stats.draws, 1);
        assert_eq!(competitor.stats.average_score, 150.0);
    }

    #[test]
    fn test_outcome_from_scores() {
        assert_eq!(MatchOutcome::from_scores(200, 150), MatchOutcome::Win);
        assert_eq!(MatchOutcome::from_scores(150, 200), MatchOutcome::Loss);
        assert_eq!(MatchOutcome::from_scores(150, 150), MatchOutcome::Draw);
        assert_eq!(MatchOutcome::Win.reversed(), MatchOutcome::Loss);
    }

    #[test]
    fn test_match_status_display() {
        assert_eq!(MatchStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            serde_json::to_string(&MatchStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
