//! Service layer for the arena
//!
//! [`ArenaService`] commits match results and publishes events;
//! [`AppState`] builds it from configuration and drives a local league.

pub mod app;
pub mod arena;

pub use app::{AppState, ServiceError};
pub use arena::{ArenaService, ArenaStats};
