//! Rating calculator trait and implementations
//!
//! The match runner only talks to [`RatingCalculator`]; the Elo calculator is
//! the production implementation and the fixed-delta calculator exists for
//! tests that need to pin rating movement.

use crate::error::{ArenaError, Result};
use crate::rating::elo::{self, RatingUpdate, K_FACTOR};
use crate::types::{MatchOutcome, DEFAULT_RATING};

/// Trait for calculating rating changes after a head-to-head match
pub trait RatingCalculator: Send + Sync {
    /// Rating update for competitors A and B given their final scores
    fn calculate_rating_update(
        &self,
        rating_a: i32,
        rating_b: i32,
        score_a: u16,
        score_b: u16,
    ) -> Result<RatingUpdate>;

    /// Rating assigned to newly registered competitors
    fn initial_rating(&self) -> i32;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> Result<()>;
}

/// Classic Elo with a single K-factor for every competitor
#[derive(Debug, Clone)]
pub struct EloRatingCalculator {
    k_factor: f64,
    initial_rating: i32,
}

impl EloRatingCalculator {
    pub fn new(k_factor: f64, initial_rating: i32) -> Result<Self> {
        elo::validate_k_factor(k_factor)?;
        Ok(Self {
            k_factor,
            initial_rating,
        })
    }

    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }
}

impl Default for EloRatingCalculator {
    fn default() -> Self {
        Self {
            k_factor: K_FACTOR,
            initial_rating: DEFAULT_RATING,
        }
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn calculate_rating_update(
        &self,
        rating_a: i32,
        rating_b: i32,
        score_a: u16,
        score_b: u16,
    ) -> Result<RatingUpdate> {
        elo::calculate_rating_update(rating_a, rating_b, score_a, score_b, self.k_factor)
    }

    fn initial_rating(&self) -> i32 {
        self.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "k_factor": self.k_factor,
            "initial_rating": self.initial_rating
        })
    }

    fn update_config(&mut self, config: serde_json::Value) -> Result<()> {
        if let Some(k_factor) = config.get("k_factor").and_then(|v| v.as_f64()) {
            elo::validate_k_factor(k_factor)?;
            self.k_factor = k_factor;
        }
        if let Some(rating) = config.get("initial_rating").and_then(|v| v.as_i64()) {
            self.initial_rating = config_i32("initial_rating", rating)?;
        }
        Ok(())
    }
}

fn config_i32(key: &str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        ArenaError::ConfigurationError {
            message: format!("{} out of range: {}", key, value),
        }
        .into()
    })
}

/// Moves the winner up and the loser down by a fixed amount
///
/// Draws leave both ratings untouched.
#[derive(Debug, Clone)]
pub struct FixedDeltaCalculator {
    delta: i32,
    initial_rating: i32,
}

impl FixedDeltaCalculator {
    pub fn new(delta: i32) -> Self {
        Self {
            delta,
            initial_rating: DEFAULT_RATING,
        }
    }
}

impl RatingCalculator for FixedDeltaCalculator {
    fn calculate_rating_update(
        &self,
        rating_a: i32,
        rating_b: i32,
        score_a: u16,
        score_b: u16,
    ) -> Result<RatingUpdate> {
        let outcome_a = MatchOutcome::from_scores(score_a, score_b);
        let delta_a = match outcome_a {
            MatchOutcome::Win => self.delta,
            MatchOutcome::Loss => -self.delta,
            MatchOutcome::Draw => 0,
        };

        Ok(RatingUpdate {
            old_rating_a: rating_a,
            old_rating_b: rating_b,
            new_rating_a: rating_a + delta_a,
            new_rating_b: rating_b - delta_a,
            delta_a,
            delta_b: -delta_a,
            outcome_a,
        })
    }

    fn initial_rating(&self) -> i32 {
        self.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "fixed_delta",
            "delta": self.delta,
            "initial_rating": self.initial_rating
        })
    }

    fn update_config(&mut self, config: serde_json::Value) -> Result<()> {
        let delta = config
            .get("delta")
            .and_then(|v| v.as_i64())
            .map(|delta| config_i32("delta", delta))
            .transpose()?;
        let rating = config
            .get("initial_rating")
            .and_then(|v| v.as_i64())
            .map(|rating| config_i32("initial_rating", rating))
            .transpose()?;

        if let Some(delta) = delta {
            self.delta = delta;
        }
        if let Some(rating) = rating {
            self.initial_rating = rating;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::arena_error;

    #[test]
    fn test_elo_calculator_defaults() {
        let calculator = EloRatingCalculator::default();
        assert_eq!(calculator.initial_rating(), 1200);
        assert_eq!(calculator.k_factor(), 32.0);

        let update = calculator
            .calculate_rating_update(1200, 1200, 201, 187)
            .unwrap();
        assert_eq!(update.delta_a, 16);
        assert_eq!(update.delta_b, -16);
    }

    #[test]
    fn test_elo_calculator_rejects_bad_k() {
        let err = EloRatingCalculator::new(0.0, 1200).unwrap_err();
        assert!(matches!(
            arena_error(&err),
            Some(ArenaError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_elo_config_roundtrip() {
        let mut calculator = EloRatingCalculator::default();

        let config = calculator.config();
        assert_eq!(config["type"], "elo");
        assert_eq!(config["k_factor"], 32.0);

        calculator
            .update_config(serde_json::json!({ "k_factor": 16.0, "initial_rating": 1000 }))
            .unwrap();
        assert_eq!(calculator.k_factor(), 16.0);
        assert_eq!(calculator.initial_rating(), 1000);

        let update = calculator
            .calculate_rating_update(1200, 1200, 100, 120)
            .unwrap();
        assert_eq!(update.delta_a, -8);

        assert!(calculator
            .update_config(serde_json::json!({ "k_factor": -1.0 }))
            .is_err());
        assert_eq!(calculator.k_factor(), 16.0);
    }

    #[test]
    fn test_fixed_delta_calculator() {
        let calculator = FixedDeltaCalculator::new(10);

        let win = calculator.calculate_rating_update(1500, 900, 130, 90).unwrap();
        assert_eq!(win.new_rating_a, 1510);
        assert_eq!(win.new_rating_b, 890);

        let draw = calculator.calculate_rating_update(1500, 900, 90, 90).unwrap();
        assert_eq!(draw.delta_a, 0);
        assert_eq!(draw.outcome_a, MatchOutcome::Draw);
    }

    #[test]
    fn test_fixed_delta_config_rejects_out_of_range() {
        let mut calculator = FixedDeltaCalculator::new(10);

        let err = calculator
            .update_config(serde_json::json!({ "delta": 4_294_967_306i64 }))
            .unwrap_err();
        assert!(matches!(
            arena_error(&err),
            Some(ArenaError::ConfigurationError { .. })
        ));
        assert!(calculator
            .update_config(serde_json::json!({ "delta": 5, "initial_rating": i64::MIN }))
            .is_err());
        // Nothing applied from a rejected update
        assert_eq!(calculator.config()["delta"], 10);

        calculator
            .update_config(serde_json::json!({ "delta": 25, "initial_rating": 1000 }))
            .unwrap();
        assert_eq!(calculator.config()["delta"], 25);
        assert_eq!(calculator.initial_rating(), 1000);
    }
}
