//! Bot throw strategies
//!
//! A [`StrategyProvider`] decides the release for every throw a competitor
//! makes. The match runner asks it once per throw and feeds the resulting
//! descriptor to the simulator.

pub mod provider;

pub use provider::{BotProfile, BotStrategy, FixedThrowProvider, RandomStrategyProvider};

use crate::error::Result;
use crate::game::ThrowDescriptor;
use crate::types::CompetitorId;

/// Source of throw descriptors for competitors
pub trait StrategyProvider: Send + Sync {
    /// Release for `competitor_id` on the given frame (1-10) and throw (1-3)
    fn next_throw(
        &self,
        competitor_id: &CompetitorId,
        frame: u8,
        throw: u8,
    ) -> Result<ThrowDescriptor>;
}
