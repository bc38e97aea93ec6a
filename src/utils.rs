//! Utility functions for the bowling arena

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique queue entry ID
pub fn generate_queue_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: i32, rating2: i32) -> u32 {
    rating1.abs_diff(rating2)
}

/// Check if two ratings are within the given tolerance
pub fn ratings_within_tolerance(rating1: i32, rating2: i32, tolerance: u32) -> bool {
    rating_difference(rating1, rating2) <= tolerance
}

/// Absolute distance between two instants in fractional seconds
pub fn seconds_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    let delta = a.signed_duration_since(b);
    match delta.num_microseconds() {
        Some(micros) => (micros as f64 / 1_000_000.0).abs(),
        None => delta.num_seconds().abs() as f64,
    }
}
