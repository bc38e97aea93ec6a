//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the arena: queue traffic,
//! match throughput and score/rating distributions.

use crate::runner::{ExecutionMode, MatchResult};
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Instant;

/// Main metrics collector for the arena
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    service_metrics: ServiceMetrics,
    queue_metrics: QueueMetrics,
    match_metrics: MatchMetrics,

    started: Instant,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Competitors known to the store
    pub competitors_registered: IntGauge,
}

/// Matchmaking queue metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Successful enqueues
    pub competitors_queued_total: IntCounter,

    /// Rejected enqueues by reason
    pub queue_rejections_total: IntCounterVec,

    /// Competitors currently waiting
    pub queue_size: IntGauge,

    /// Pairings handed out
    pub pairings_total: IntCounter,

    /// Seconds the requester waited before being paired
    pub queue_wait_time_seconds: Histogram,
}

/// Match execution metrics
#[derive(Clone)]
pub struct MatchMetrics {
    /// Completed matches by execution mode and result
    pub matches_total: IntCounterVec,

    /// Wall-clock match duration
    pub match_duration_seconds: Histogram,

    /// Final game score per competitor
    pub game_score: Histogram,

    /// Absolute rating change per competitor
    pub rating_change: Histogram,

    /// Strike frames across all games
    pub strikes_total: IntCounter,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let queue_metrics = QueueMetrics::new(&registry)?;
        let match_metrics = MatchMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            queue_metrics,
            match_metrics,
            started: Instant::now(),
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    pub fn matches(&self) -> &MatchMetrics {
        &self.match_metrics
    }

    pub fn record_competitor_registered(&self, total: usize) {
        self.service_metrics
            .competitors_registered
            .set(total as i64);
    }

    pub fn record_queued(&self, queue_size: usize) {
        self.queue_metrics.competitors_queued_total.inc();
        self.queue_metrics.queue_size.set(queue_size as i64);
    }

    /// Record a rejected enqueue ("conflict", "not_found", ...)
    pub fn record_queue_rejection(&self, reason: &str) {
        self.queue_metrics
            .queue_rejections_total
            .with_label_values(&[reason])
            .inc();
    }

    pub fn record_pairing(&self, wait_seconds: f64, queue_size: usize) {
        self.queue_metrics.pairings_total.inc();
        self.queue_metrics
            .queue_wait_time_seconds
            .observe(wait_seconds);
        self.queue_metrics.queue_size.set(queue_size as i64);
    }

    pub fn set_queue_size(&self, queue_size: usize) {
        self.queue_metrics.queue_size.set(queue_size as i64);
    }

    /// Record a completed match
    pub fn record_match(&self, result: &MatchResult, mode: ExecutionMode) {
        let result_label = if result.is_draw() { "draw" } else { "decisive" };
        let mode_label = mode.to_string();

        self.match_metrics
            .matches_total
            .with_label_values(&[mode_label.as_str(), result_label])
            .inc();

        self.match_metrics
            .match_duration_seconds
            .observe(result.duration_ms().max(0) as f64 / 1000.0);

        for game in [&result.competitor_a, &result.competitor_b] {
            self.match_metrics
                .game_score
                .observe(game.final_score as f64);
            self.match_metrics
                .strikes_total
                .inc_by(game.summary.strikes as u64);
        }

        for delta in [result.rating_update.delta_a, result.rating_update.delta_b] {
            self.match_metrics
                .rating_change
                .observe(delta.unsigned_abs() as f64);
        }
    }

    /// Refresh the uptime gauge
    pub fn update_uptime(&self) {
        self.service_metrics
            .uptime_seconds
            .set(self.started.elapsed().as_secs() as i64);
    }

    /// All registered metrics in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        self.update_uptime();
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&self.registry.gather())?)
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector").finish_non_exhaustive()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds = IntGauge::new("pinfall_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let competitors_registered = IntGauge::new(
            "pinfall_competitors_registered",
            "Competitors known to the store",
        )?;
        registry.register(Box::new(competitors_registered.clone()))?;

        Ok(Self {
            uptime_seconds,
            competitors_registered,
        })
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let competitors_queued_total = IntCounter::new(
            "pinfall_competitors_queued_total",
            "Total competitors added to the queue",
        )?;
        registry.register(Box::new(competitors_queued_total.clone()))?;

        let queue_rejections_total = IntCounterVec::new(
            Opts::new(
                "pinfall_queue_rejections_total",
                "Total rejected queue requests",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(queue_rejections_total.clone()))?;

        let queue_size = IntGauge::new("pinfall_queue_size", "Competitors currently waiting")?;
        registry.register(Box::new(queue_size.clone()))?;

        let pairings_total =
            IntCounter::new("pinfall_pairings_total", "Total pairings made by the queue")?;
        registry.register(Box::new(pairings_total.clone()))?;

        let queue_wait_time_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "pinfall_queue_wait_time_seconds",
                "Time spent waiting before being paired",
            )
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;
        registry.register(Box::new(queue_wait_time_seconds.clone()))?;

        Ok(Self {
            competitors_queued_total,
            queue_rejections_total,
            queue_size,
            pairings_total,
            queue_wait_time_seconds,
        })
    }
}

impl MatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_total = IntCounterVec::new(
            Opts::new("pinfall_matches_total", "Total completed matches"),
            &["mode", "result"],
        )?;
        registry.register(Box::new(matches_total.clone()))?;

        let match_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("pinfall_match_duration_seconds", "Match wall-clock duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(match_duration_seconds.clone()))?;

        let game_score = Histogram::with_opts(
            HistogramOpts::new("pinfall_game_score", "Final score of each game")
                .buckets(vec![30.0, 60.0, 90.0, 120.0, 150.0, 180.0, 210.0, 240.0, 270.0, 300.0]),
        )?;
        registry.register(Box::new(game_score.clone()))?;

        let rating_change = Histogram::with_opts(
            HistogramOpts::new("pinfall_rating_change", "Absolute rating change per competitor")
                .buckets(vec![0.0, 4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0]),
        )?;
        registry.register(Box::new(rating_change.clone()))?;

        let strikes_total = IntCounter::new("pinfall_strikes_total", "Total strike frames")?;
        registry.register(Box::new(strikes_total.clone()))?;

        Ok(Self {
            matches_total,
            match_duration_seconds,
            game_score,
            rating_change,
            strikes_total,
        })
    }
}
