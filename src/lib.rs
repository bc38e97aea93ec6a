//! Pinfall - bot-vs-bot bowling arena
//!
//! This crate simulates ten-pin bowling matches between autonomous bots,
//! scores them under official rules, keeps Elo ratings, and pairs waiting
//! bots through a matchmaking queue.

pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod metrics;
pub mod queue;
pub mod rating;
pub mod runner;
pub mod service;
pub mod strategy;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{ArenaError, Result};
pub use types::*;

// Re-export key components
pub use events::EventPublisher;
pub use queue::MatchmakingQueue;
pub use rating::{CompetitorStore, RatingCalculator};
pub use runner::{ExecutionMode, MatchResult, MatchRunner};
pub use strategy::StrategyProvider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
