//! Elo rating engine and competitor storage
//!
//! Ratings are whole numbers. The expectation curve comes from the
//! skillratings crate; updates and rounding live in [`elo`].

pub mod calculator;
pub mod elo;
pub mod storage;

pub use calculator::{EloRatingCalculator, FixedDeltaCalculator, RatingCalculator};
pub use elo::{calculate_rating_update, expected_score, rank_band, RatingTier, RatingUpdate, K_FACTOR};
pub use storage::{CompetitorStore, InMemoryCompetitorStore};
