//! Strategy provider implementations

use crate::error::{ArenaError, Result};
use crate::game::ThrowDescriptor;
use crate::strategy::StrategyProvider;
use crate::types::CompetitorId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// Playing style of a bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStrategy {
    Balanced,
    Power,
    Precision,
    Defensive,
}

impl BotStrategy {
    pub const ALL: [BotStrategy; 4] = [
        BotStrategy::Balanced,
        BotStrategy::Power,
        BotStrategy::Precision,
        BotStrategy::Defensive,
    ];

    /// Multiplier on aim; higher is tighter
    fn accuracy(&self) -> f64 {
        match self {
            BotStrategy::Balanced => 1.0,
            BotStrategy::Power => 0.8,
            BotStrategy::Precision => 1.3,
            BotStrategy::Defensive => 1.1,
        }
    }

    /// Added to the base release speed
    fn power_modifier(&self) -> f64 {
        match self {
            BotStrategy::Balanced => 0.0,
            BotStrategy::Power => 3.0,
            BotStrategy::Precision => -2.0,
            BotStrategy::Defensive => -1.0,
        }
    }
}

impl std::str::FromStr for BotStrategy {
    type Err = ArenaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "balanced" => Ok(BotStrategy::Balanced),
            "power" => Ok(BotStrategy::Power),
            "precision" => Ok(BotStrategy::Precision),
            "defensive" => Ok(BotStrategy::Defensive),
            other => Err(ArenaError::invalid_input(format!(
                "unknown bot strategy: {}",
                other
            ))),
        }
    }
}

/// Strategy plus a fixed skill level in `[0.5, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotProfile {
    pub strategy: BotStrategy,
    pub skill: f64,
}

impl BotProfile {
    pub fn new(strategy: BotStrategy, skill: f64) -> Result<Self> {
        if !(0.5..=1.0).contains(&skill) {
            return Err(ArenaError::invalid_input(format!(
                "bot skill must be within 0.5..=1.0, got {}",
                skill
            ))
            .into());
        }
        Ok(Self { strategy, skill })
    }

    /// Aim spread factor: 1.0 for the weakest, most erratic bot
    fn spread(&self) -> f64 {
        (1.5 - self.skill) / self.strategy.accuracy()
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> Result<ThrowDescriptor> {
        let spread = self.spread();
        let lateral = (rng.gen::<f64>() - 0.5) * 4.0 * spread;
        let speed = 15.0 + rng.gen::<f64>() * 5.0 + self.strategy.power_modifier();
        let spin = (rng.gen::<f64>() - 0.5) * 2.0;
        let angle = (rng.gen::<f64>() * 0.1 - 0.05) * spread;
        ThrowDescriptor::new(lateral, speed, spin, angle)
    }
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            strategy: BotStrategy::Balanced,
            skill: 0.75,
        }
    }
}

/// Randomised bots with a per-competitor profile
///
/// Competitors without an assigned profile play with [`BotProfile::default`].
#[derive(Debug)]
pub struct RandomStrategyProvider {
    profiles: RwLock<HashMap<CompetitorId, BotProfile>>,
    rng: Mutex<StdRng>,
}

impl RandomStrategyProvider {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Assign a strategy with a randomly drawn skill level
    pub fn assign(&self, competitor_id: &CompetitorId, strategy: BotStrategy) -> Result<BotProfile> {
        let skill = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| ArenaError::internal("Failed to acquire strategy rng lock"))?;
            0.5 + rng.gen::<f64>() * 0.5
        };
        let profile = BotProfile::new(strategy, skill)?;
        self.assign_profile(competitor_id, profile)?;
        Ok(profile)
    }

    pub fn assign_profile(&self, competitor_id: &CompetitorId, profile: BotProfile) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| ArenaError::internal("Failed to acquire profiles write lock"))?;
        profiles.insert(competitor_id.clone(), profile);
        Ok(())
    }

    pub fn profile(&self, competitor_id: &CompetitorId) -> Result<BotProfile> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| ArenaError::internal("Failed to acquire profiles read lock"))?;
        Ok(profiles.get(competitor_id).copied().unwrap_or_default())
    }
}

impl Default for RandomStrategyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyProvider for RandomStrategyProvider {
    fn next_throw(
        &self,
        competitor_id: &CompetitorId,
        _frame: u8,
        _throw: u8,
    ) -> Result<ThrowDescriptor> {
        let profile = self.profile(competitor_id)?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ArenaError::internal("Failed to acquire strategy rng lock"))?;
        profile.generate(&mut *rng)
    }
}

/// Every competitor throws the same release every time
///
/// Used for deterministic matches: a fast centre ball always strikes and a
/// gutter ball always scores zero.
#[derive(Debug, Clone)]
pub struct FixedThrowProvider {
    throws: HashMap<CompetitorId, ThrowDescriptor>,
    fallback: ThrowDescriptor,
}

impl FixedThrowProvider {
    pub fn new(fallback: ThrowDescriptor) -> Self {
        Self {
            throws: HashMap::new(),
            fallback,
        }
    }

    pub fn with_throw(mut self, competitor_id: impl Into<CompetitorId>, throw: ThrowDescriptor) -> Self {
        self.throws.insert(competitor_id.into(), throw);
        self
    }
}

impl StrategyProvider for FixedThrowProvider {
    fn next_throw(
        &self,
        competitor_id: &CompetitorId,
        _frame: u8,
        _throw: u8,
    ) -> Result<ThrowDescriptor> {
        Ok(self
            .throws
            .get(competitor_id)
            .copied()
            .unwrap_or(self.fallback))
    }
}
