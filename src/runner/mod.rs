//! Match runner
//!
//! Drives two competitors through a full game each, records replays, and
//! settles the match through the rating calculator. The runner never touches
//! storage or publishes events; callers persist the returned [`MatchResult`].

pub mod half;
pub mod match_runner;
pub mod result;

pub use match_runner::{ExecutionMode, MatchRunner};
pub use result::{CompetitorGame, MatchResult};
