//! Elo rating updates for head-to-head matches
//!
//! Pure functions of the two ratings, the two final scores and K. The
//! expectation comes from the skillratings Elo model; the update itself is
//! rounded to whole rating points per side.

use crate::error::{ArenaError, Result};
use crate::types::MatchOutcome;
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;

/// Default K-factor for rating updates
pub const K_FACTOR: f64 = 32.0;

/// Result of applying one match to both competitors' ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub old_rating_a: i32,
    pub old_rating_b: i32,
    pub new_rating_a: i32,
    pub new_rating_b: i32,
    pub delta_a: i32,
    pub delta_b: i32,
    /// Outcome from side A's point of view
    pub outcome_a: MatchOutcome,
}

impl RatingUpdate {
    pub fn outcome_b(&self) -> MatchOutcome {
        self.outcome_a.reversed()
    }
}

/// Probability that A beats B
pub fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    let (expected_a, _) = skillratings::elo::expected_score(
        &EloRating {
            rating: rating_a as f64,
        },
        &EloRating {
            rating: rating_b as f64,
        },
    );
    expected_a
}

/// Whole-point rating change for one side
///
/// Rounds half away from zero, so mirrored expectations give mirrored deltas.
pub fn rating_delta(expected: f64, outcome: MatchOutcome, k_factor: f64) -> i32 {
    (k_factor * (outcome.actual_score() - expected)).round() as i32
}

/// New ratings for both sides of a finished match
///
/// Equal final scores are a draw; otherwise the higher score wins.
pub fn calculate_rating_update(
    rating_a: i32,
    rating_b: i32,
    score_a: u16,
    score_b: u16,
    k_factor: f64,
) -> Result<RatingUpdate> {
    validate_k_factor(k_factor)?;

    let expected_a = expected_score(rating_a, rating_b);
    let expected_b = 1.0 - expected_a;
    let outcome_a = MatchOutcome::from_scores(score_a, score_b);

    let delta_a = rating_delta(expected_a, outcome_a, k_factor);
    let delta_b = rating_delta(expected_b, outcome_a.reversed(), k_factor);

    Ok(RatingUpdate {
        old_rating_a: rating_a,
        old_rating_b: rating_b,
        new_rating_a: rating_a + delta_a,
        new_rating_b: rating_b + delta_b,
        delta_a,
        delta_b,
        outcome_a,
    })
}

pub(crate) fn validate_k_factor(k_factor: f64) -> Result<()> {
    if !k_factor.is_finite() || k_factor <= 0.0 {
        return Err(ArenaError::invalid_input(format!(
            "K-factor must be a positive finite number, got {}",
            k_factor
        ))
        .into());
    }
    Ok(())
}

/// Named skill bracket for a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatingTier {
    Beginner,
    Novice,
    Intermediate,
    Advanced,
    Expert,
    Master,
    Legend,
}

impl RatingTier {
    pub fn for_rating(rating: i32) -> Self {
        match rating {
            r if r >= 2000 => RatingTier::Legend,
            r if r >= 1800 => RatingTier::Master,
            r if r >= 1600 => RatingTier::Expert,
            r if r >= 1400 => RatingTier::Advanced,
            r if r >= 1200 => RatingTier::Intermediate,
            r if r >= 1000 => RatingTier::Novice,
            _ => RatingTier::Beginner,
        }
    }
}

impl std::fmt::Display for RatingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RatingTier::Beginner => "Beginner",
            RatingTier::Novice => "Novice",
            RatingTier::Intermediate => "Intermediate",
            RatingTier::Advanced => "Advanced",
            RatingTier::Expert => "Expert",
            RatingTier::Master => "Master",
            RatingTier::Legend => "Legend",
        };
        write!(f, "{}", name)
    }
}

/// Rank band 1 (2000 and up) through 21 (below 100), one band per 100 points
pub fn rank_band(rating: i32) -> u8 {
    if rating >= 2000 {
        1
    } else if rating < 100 {
        21
    } else {
        (21 - rating / 100) as u8
    }
}
