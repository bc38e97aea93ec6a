//! Queue records

use crate::types::{CompetitorId, MatchId, QueueId};
use crate::utils::seconds_between;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default maximum rating gap a requester accepts
pub const DEFAULT_TOLERANCE: u32 = 100;

/// Weight of the wait-time gap, per second, in the pairing score
pub const DEFAULT_WAIT_TIME_WEIGHT: f64 = 0.1;

/// Tuning for the matchmaking queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub default_tolerance: u32,
    pub wait_time_weight: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_tolerance: DEFAULT_TOLERANCE,
            wait_time_weight: DEFAULT_WAIT_TIME_WEIGHT,
        }
    }
}

/// A competitor waiting for an opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub queue_id: QueueId,
    pub competitor_id: CompetitorId,
    /// Rating at the moment the competitor joined
    pub rating: i32,
    pub enqueued_at: DateTime<Utc>,
    /// Largest rating gap this competitor accepts
    pub tolerance: u32,
    /// Insertion order, used to break ties
    pub sequence: u64,
}

impl QueueEntry {
    /// Seconds spent waiting as of `now`
    pub fn wait_seconds(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(now, self.enqueued_at)
    }

    /// Ordering key: earliest wait start first, then insertion order
    pub(crate) fn wait_order(&self) -> (DateTime<Utc>, u64) {
        (self.enqueued_at, self.sequence)
    }
}

/// Receipt returned from a successful enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueTicket {
    pub queue_id: QueueId,
    /// 1-based position by wait start
    pub position: usize,
    /// Rating snapshot the entry is paired on
    pub rating: i32,
}

/// Two competitors taken out of the queue together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pairing {
    pub match_id: MatchId,
    pub requester: QueueEntry,
    pub opponent: QueueEntry,
    /// Score of the chosen opponent; lower is a closer match
    pub score: f64,
    pub paired_at: DateTime<Utc>,
}

impl Pairing {
    pub fn competitor_ids(&self) -> (&CompetitorId, &CompetitorId) {
        (&self.requester.competitor_id, &self.opponent.competitor_id)
    }
}
