//! Queue state and the single critical section around it

use crate::error::{ArenaError, Result};
use crate::queue::entry::{Pairing, QueueConfig, QueueEntry, QueueTicket};
use crate::queue::matching::best_candidate;
use crate::rating::CompetitorStore;
use crate::types::{CompetitorId, QueueId};
use crate::utils::{current_timestamp, generate_match_id, generate_queue_id};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct QueueState {
    entries: HashMap<QueueId, QueueEntry>,
    by_competitor: HashMap<CompetitorId, QueueId>,
    next_sequence: u64,
}

impl QueueState {
    fn position_of(&self, entry: &QueueEntry) -> usize {
        let key = entry.wait_order();
        self.entries
            .values()
            .filter(|other| other.wait_order() < key)
            .count()
            + 1
    }

    fn remove(&mut self, queue_id: &QueueId) -> Option<QueueEntry> {
        let entry = self.entries.remove(queue_id)?;
        self.by_competitor.remove(&entry.competitor_id);
        Some(entry)
    }

    fn sorted_entries(&self) -> Vec<QueueEntry> {
        let mut entries: Vec<QueueEntry> = self.entries.values().cloned().collect();
        entries.sort_by_key(|entry| entry.wait_order());
        entries
    }
}

/// Waiting competitors and the pairing logic over them
///
/// At most one entry exists per competitor. Store lookups happen before the
/// lock is taken; nothing inside the lock blocks.
pub struct MatchmakingQueue {
    store: Arc<dyn CompetitorStore>,
    config: QueueConfig,
    state: Mutex<QueueState>,
}

impl MatchmakingQueue {
    pub fn new(store: Arc<dyn CompetitorStore>, config: QueueConfig) -> Self {
        Self {
            store,
            config,
            state: Mutex::new(QueueState::default()),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueState>> {
        Ok(self
            .state
            .lock()
            .map_err(|_| ArenaError::internal("Failed to acquire queue lock"))?)
    }

    /// Add a registered competitor to the queue
    ///
    /// `tolerance` falls back to the configured default. A competitor that is
    /// already waiting is rejected with `QueueConflict` and the existing entry
    /// is left as it was.
    pub fn enqueue(&self, competitor_id: &str, tolerance: Option<u32>) -> Result<QueueTicket> {
        self.enqueue_at(competitor_id, tolerance, current_timestamp())
    }

    /// Enqueue with an explicit wait start
    pub fn enqueue_at(
        &self,
        competitor_id: &str,
        tolerance: Option<u32>,
        enqueued_at: DateTime<Utc>,
    ) -> Result<QueueTicket> {
        let competitor = self
            .store
            .get_competitor(&competitor_id.to_string())?
            .ok_or_else(|| ArenaError::CompetitorNotFound {
                competitor_id: competitor_id.to_string(),
            })?;

        let mut state = self.lock()?;

        if state.by_competitor.contains_key(&competitor.id) {
            return Err(ArenaError::QueueConflict {
                competitor_id: competitor.id,
            }
            .into());
        }

        let entry = QueueEntry {
            queue_id: generate_queue_id(),
            competitor_id: competitor.id.clone(),
            rating: competitor.rating,
            enqueued_at,
            tolerance: tolerance.unwrap_or(self.config.default_tolerance),
            sequence: state.next_sequence,
        };
        state.next_sequence += 1;

        let queue_id = entry.queue_id;
        let position = state.position_of(&entry);
        state.by_competitor.insert(competitor.id.clone(), queue_id);
        state.entries.insert(queue_id, entry);

        info!(
            "Competitor '{}' queued - rating: {}, position: {}, queue size: {}",
            competitor.id,
            competitor.rating,
            position,
            state.entries.len()
        );

        Ok(QueueTicket {
            queue_id,
            position,
            rating: competitor.rating,
        })
    }

    /// Remove a competitor from the queue; `false` if they were not waiting
    pub fn dequeue(&self, competitor_id: &str) -> Result<bool> {
        let mut state = self.lock()?;
        let Some(queue_id) = state.by_competitor.get(competitor_id).copied() else {
            return Ok(false);
        };
        state.remove(&queue_id);
        debug!("Competitor '{}' left the queue", competitor_id);
        Ok(true)
    }

    /// Pair a waiting competitor with their best available opponent
    ///
    /// Both entries leave the queue together. Returns `None`, leaving the
    /// queue untouched, when the requester is not waiting or nobody fits.
    pub fn find_match(&self, competitor_id: &str) -> Result<Option<Pairing>> {
        let mut state = self.lock()?;
        Ok(self.find_match_locked(&mut state, competitor_id))
    }

    fn find_match_locked(&self, state: &mut QueueState, competitor_id: &str) -> Option<Pairing> {
        let requester_id = *state.by_competitor.get(competitor_id)?;
        let requester = state.entries.get(&requester_id)?;

        let (opponent, score) =
            best_candidate(requester, state.entries.values(), self.config.wait_time_weight)?;
        let opponent_id = opponent.queue_id;

        let requester = state.remove(&requester_id)?;
        let opponent = state.remove(&opponent_id)?;

        info!(
            "Paired '{}' ({}) with '{}' ({}) - score: {:.2}, remaining: {}",
            requester.competitor_id,
            requester.rating,
            opponent.competitor_id,
            opponent.rating,
            score,
            state.entries.len()
        );

        Some(Pairing {
            match_id: generate_match_id(),
            requester,
            opponent,
            score,
            paired_at: current_timestamp(),
        })
    }

    /// Try to pair every waiting competitor, longest-waiting first
    ///
    /// Each pairing is its own critical section, so concurrent callers can
    /// interleave between pairings but never inside one.
    pub fn pair_all(&self) -> Result<Vec<Pairing>> {
        let waiting: Vec<CompetitorId> = self
            .waiting_entries()?
            .into_iter()
            .map(|entry| entry.competitor_id)
            .collect();

        let mut pairings = Vec::new();
        for competitor_id in waiting {
            if let Some(pairing) = self.find_match(&competitor_id)? {
                pairings.push(pairing);
            }
        }
        Ok(pairings)
    }

    /// Drop entries that started waiting before `older_than`
    pub fn remove_stale(&self, older_than: DateTime<Utc>) -> Result<Vec<QueueEntry>> {
        let mut state = self.lock()?;
        let stale: Vec<QueueId> = state
            .entries
            .values()
            .filter(|entry| entry.enqueued_at < older_than)
            .map(|entry| entry.queue_id)
            .collect();

        let removed: Vec<QueueEntry> = stale.iter().filter_map(|id| state.remove(id)).collect();
        if !removed.is_empty() {
            info!("Removed {} stale queue entries", removed.len());
        }
        Ok(removed)
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_queued(&self, competitor_id: &str) -> Result<bool> {
        Ok(self.lock()?.by_competitor.contains_key(competitor_id))
    }

    /// Snapshot of the queue, longest-waiting first
    pub fn waiting_entries(&self) -> Result<Vec<QueueEntry>> {
        Ok(self.lock()?.sorted_entries())
    }

    /// 1-based position of a waiting competitor
    pub fn position(&self, competitor_id: &str) -> Result<Option<usize>> {
        let state = self.lock()?;
        Ok(state
            .by_competitor
            .get(competitor_id)
            .and_then(|queue_id| state.entries.get(queue_id))
            .map(|entry| state.position_of(entry)))
    }
}

impl std::fmt::Debug for MatchmakingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchmakingQueue")
            .field("config", &self.config)
            .finish()
    }
}
