//! Main application configuration
//!
//! This module defines the configuration structures for the arena, loaded
//! from environment variables or a TOML file and validated before use.

use crate::game::SimulatorConfig;
use crate::queue::QueueConfig;
use crate::runner::ExecutionMode;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingSettings,
    pub matchmaking: MatchmakingSettings,
    pub simulation: SimulationSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// How often league statistics are logged
    pub stats_interval_seconds: u64,
}

/// Rating engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    pub k_factor: f64,
    pub initial_rating: i32,
}

/// Matchmaking queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingSettings {
    /// Rating gap accepted when a request names none
    pub default_tolerance: u32,
    /// Pairing score weight per second of wait-start gap
    pub wait_time_weight: f64,
    /// Entries older than this are dropped by the cleanup pass
    pub max_wait_time_seconds: u64,
    /// Delay between matchmaking rounds
    pub round_interval_ms: u64,
}

/// Match execution and simulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub execution_mode: ExecutionMode,
    /// Fixed seed for reproducible leagues; entropy when unset
    pub seed: Option<u64>,
    pub gutter_offset: f64,
    pub pin_action_radius: f64,
    pub spin_hook: f64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "pinfall".to_string(),
            log_level: "info".to_string(),
            shutdown_timeout_seconds: 30,
            stats_interval_seconds: 10,
        }
    }
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: crate::rating::K_FACTOR,
            initial_rating: crate::types::DEFAULT_RATING,
        }
    }
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        let queue = QueueConfig::default();
        Self {
            default_tolerance: queue.default_tolerance,
            wait_time_weight: queue.wait_time_weight,
            max_wait_time_seconds: 300, // 5 minutes
            round_interval_ms: 250,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let simulator = SimulatorConfig::default();
        Self {
            execution_mode: ExecutionMode::default(),
            seed: None,
            gutter_offset: simulator.gutter_offset,
            pin_action_radius: simulator.pin_action_radius,
            spin_hook: simulator.spin_hook,
        }
    }
}

/// Parse an environment variable when it is set
fn env_value<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {} value: {}", key, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load a TOML file, then let environment variables override it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("Failed to parse TOML configuration")?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Some(name) = env_value("SERVICE_NAME")? {
            self.service.name = name;
        }
        if let Some(log_level) = env_value("LOG_LEVEL")? {
            self.service.log_level = log_level;
        }
        if let Some(timeout) = env_value("SHUTDOWN_TIMEOUT_SECONDS")? {
            self.service.shutdown_timeout_seconds = timeout;
        }
        if let Some(interval) = env_value("STATS_INTERVAL_SECONDS")? {
            self.service.stats_interval_seconds = interval;
        }

        // Rating settings
        if let Some(k_factor) = env_value("ELO_K_FACTOR")? {
            self.rating.k_factor = k_factor;
        }
        if let Some(initial) = env_value("INITIAL_RATING")? {
            self.rating.initial_rating = initial;
        }

        // Matchmaking settings
        if let Some(tolerance) = env_value("DEFAULT_TOLERANCE")? {
            self.matchmaking.default_tolerance = tolerance;
        }
        if let Some(weight) = env_value("WAIT_TIME_WEIGHT")? {
            self.matchmaking.wait_time_weight = weight;
        }
        if let Some(wait_time) = env_value("MAX_WAIT_TIME_SECONDS")? {
            self.matchmaking.max_wait_time_seconds = wait_time;
        }
        if let Some(interval) = env_value("MATCHMAKING_INTERVAL_MS")? {
            self.matchmaking.round_interval_ms = interval;
        }

        // Simulation settings
        if let Some(mode) = env_value("EXECUTION_MODE")? {
            self.simulation.execution_mode = mode;
        }
        if let Some(seed) = env_value("SIMULATION_SEED")? {
            self.simulation.seed = Some(seed);
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get stats logging interval as Duration
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.service.stats_interval_seconds)
    }

    /// Get matchmaking round interval as Duration
    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.matchmaking.round_interval_ms)
    }

    /// Get maximum queue wait as Duration
    pub fn max_wait_time(&self) -> Duration {
        Duration::from_secs(self.matchmaking.max_wait_time_seconds)
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            default_tolerance: self.matchmaking.default_tolerance,
            wait_time_weight: self.matchmaking.wait_time_weight,
        }
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            gutter_offset: self.simulation.gutter_offset,
            pin_action_radius: self.simulation.pin_action_radius,
            spin_hook: self.simulation.spin_hook,
            ..SimulatorConfig::default()
        }
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.service.stats_interval_seconds == 0 {
        return Err(anyhow!("Stats interval must be greater than 0"));
    }

    // Validate rating settings
    if !config.rating.k_factor.is_finite() || config.rating.k_factor <= 0.0 {
        return Err(anyhow!("K-factor must be positive"));
    }

    // Validate matchmaking settings
    if !config.matchmaking.wait_time_weight.is_finite() || config.matchmaking.wait_time_weight < 0.0
    {
        return Err(anyhow!("Wait time weight cannot be negative"));
    }
    if config.matchmaking.max_wait_time_seconds == 0 {
        return Err(anyhow!("Max wait time must be greater than 0"));
    }
    if config.matchmaking.round_interval_ms == 0 {
        return Err(anyhow!("Matchmaking interval must be greater than 0"));
    }

    // Validate simulator geometry
    for (name, value) in [
        ("gutter_offset", config.simulation.gutter_offset),
        ("pin_action_radius", config.simulation.pin_action_radius),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(anyhow!("Simulation {} must be positive", name));
        }
    }
    if !config.simulation.spin_hook.is_finite() {
        return Err(anyhow!("Simulation spin_hook must be finite"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.rating.k_factor, 32.0);
        assert_eq!(config.rating.initial_rating, 1200);
        assert_eq!(config.matchmaking.default_tolerance, 100);
        assert_eq!(config.simulation.execution_mode, ExecutionMode::Sequential);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [rating]
            k_factor = 24.0

            [simulation]
            execution_mode = "concurrent"
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.rating.k_factor, 24.0);
        assert_eq!(config.rating.initial_rating, 1200);
        assert_eq!(config.simulation.execution_mode, ExecutionMode::Concurrent);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.service.name, "pinfall");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.rating.k_factor = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.matchmaking.wait_time_weight = -0.1;
        assert!(validate_config(&config).is_err());

        assert!(AppConfig::from_toml_str("[simulation]\nexecution_mode = \"warp\"").is_err());
    }

    #[test]
    fn test_derived_component_configs() {
        let mut config = AppConfig::default();
        config.matchmaking.default_tolerance = 250;
        config.simulation.pin_action_radius = 1.8;

        assert_eq!(config.queue_config().default_tolerance, 250);
        let simulator = config.simulator_config();
        assert_eq!(simulator.pin_action_radius, 1.8);
        assert_eq!(simulator.head_hit_radius, 1.4);
    }
}
