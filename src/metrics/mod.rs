//! Metrics for the arena
//!
//! Prometheus counters, gauges and histograms for queue traffic and match
//! results, exposed in the text exposition format.

pub mod collector;

pub use collector::{MatchMetrics, MetricsCollector, QueueMetrics, ServiceMetrics};
