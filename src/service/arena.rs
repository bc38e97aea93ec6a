//! Arena orchestration
//!
//! Ties the competitor store, matchmaking queue and match runner together.
//! This is the only place that commits match results and publishes events.

use crate::error::{arena_error, ArenaError, Result};
use crate::events::{CompetitorQueued, EventPublisher, MatchCompleted, MatchFound};
use crate::metrics::MetricsCollector;
use crate::queue::{MatchmakingQueue, Pairing, QueueTicket};
use crate::rating::CompetitorStore;
use crate::runner::{MatchResult, MatchRunner};
use crate::types::{Competitor, CompetitorId};
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Running totals for the arena
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaStats {
    /// Total number of competitors registered
    pub competitors_registered: u64,
    /// Total number of successful enqueues
    pub competitors_queued: u64,
    /// Total number of completed matches
    pub matches_played: u64,
    /// Completed matches that ended level
    pub draws: u64,
    /// Best single game seen so far
    pub highest_score: u16,
    /// Queue entries dropped for waiting too long
    pub stale_entries_removed: u64,
}

/// In-process arena service
pub struct ArenaService {
    store: Arc<dyn CompetitorStore>,
    queue: Arc<MatchmakingQueue>,
    runner: Arc<MatchRunner>,
    publisher: Arc<dyn EventPublisher>,
    metrics: Option<Arc<MetricsCollector>>,
    initial_rating: i32,
    stats: RwLock<ArenaStats>,
    /// Competitors with a match in progress
    in_match: Mutex<HashSet<CompetitorId>>,
}

/// Marks two competitors as playing until dropped
///
/// Dropping releases both ids, whichever way the match ends.
struct MatchClaim<'a> {
    in_match: &'a Mutex<HashSet<CompetitorId>>,
    competitors: [CompetitorId; 2],
}

impl Drop for MatchClaim<'_> {
    fn drop(&mut self) {
        match self.in_match.lock() {
            Ok(mut playing) => {
                for id in &self.competitors {
                    playing.remove(id);
                }
            }
            Err(_) => error!(
                "Failed to release match claim for '{}' and '{}'",
                self.competitors[0], self.competitors[1]
            ),
        }
    }
}

impl ArenaService {
    pub fn new(
        store: Arc<dyn CompetitorStore>,
        queue: Arc<MatchmakingQueue>,
        runner: Arc<MatchRunner>,
        publisher: Arc<dyn EventPublisher>,
        initial_rating: i32,
    ) -> Self {
        Self {
            store,
            queue,
            runner,
            publisher,
            metrics: None,
            initial_rating,
            stats: RwLock::new(ArenaStats::default()),
            in_match: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn queue(&self) -> Arc<MatchmakingQueue> {
        self.queue.clone()
    }

    pub fn store(&self) -> Arc<dyn CompetitorStore> {
        self.store.clone()
    }

    fn update_stats(&self, update: impl FnOnce(&mut ArenaStats)) -> Result<()> {
        let mut stats = self
            .stats
            .write()
            .map_err(|_| ArenaError::internal("Failed to acquire stats lock"))?;
        update(&mut stats);
        Ok(())
    }

    fn lock_in_match(&self) -> Result<MutexGuard<'_, HashSet<CompetitorId>>> {
        Ok(self
            .in_match
            .lock()
            .map_err(|_| ArenaError::internal("Failed to acquire in-match lock"))?)
    }

    /// Claim both sides of a pairing under an already held in-match lock
    fn claim<'a>(
        &'a self,
        playing: &mut HashSet<CompetitorId>,
        pairing: &Pairing,
    ) -> Result<MatchClaim<'a>> {
        let (id_a, id_b) = pairing.competitor_ids();
        for id in [id_a, id_b] {
            if playing.contains(id) {
                return Err(ArenaError::QueueConflict {
                    competitor_id: id.clone(),
                }
                .into());
            }
        }
        playing.insert(id_a.clone());
        playing.insert(id_b.clone());
        Ok(MatchClaim {
            in_match: &self.in_match,
            competitors: [id_a.clone(), id_b.clone()],
        })
    }

    /// Whether the competitor has a match in progress
    pub fn is_in_match(&self, id: &str) -> Result<bool> {
        Ok(self.lock_in_match()?.contains(id))
    }

    /// Snapshot of the running totals
    pub fn stats(&self) -> Result<ArenaStats> {
        let stats = self
            .stats
            .read()
            .map_err(|_| ArenaError::internal("Failed to acquire stats lock"))?;
        Ok(stats.clone())
    }

    /// Register a new competitor at the initial rating
    pub fn register_competitor(&self, id: &str, name: &str) -> Result<Competitor> {
        if id.trim().is_empty() {
            return Err(ArenaError::invalid_input("competitor id cannot be empty").into());
        }
        if self.store.get_competitor(&id.to_string())?.is_some() {
            return Err(
                ArenaError::invalid_input(format!("competitor '{}' already registered", id)).into(),
            );
        }

        let competitor = Competitor::with_rating(id, name, self.initial_rating);
        self.store.store_competitor(competitor.clone())?;
        self.update_stats(|stats| stats.competitors_registered += 1)?;

        if let Some(metrics) = &self.metrics {
            metrics.record_competitor_registered(self.store.competitor_count()?);
        }

        info!(
            "Registered competitor '{}' ({}) at rating {}",
            competitor.id, competitor.name, competitor.rating
        );
        Ok(competitor)
    }

    pub fn get_competitor(&self, id: &str) -> Result<Competitor> {
        self.store.get_competitor(&id.to_string())?.ok_or_else(|| {
            ArenaError::CompetitorNotFound {
                competitor_id: id.to_string(),
            }
            .into()
        })
    }

    /// All competitors, highest rating first
    pub fn leaderboard(&self) -> Result<Vec<Competitor>> {
        self.store.all_competitors()
    }

    /// Enqueue unless the competitor is mid-match
    ///
    /// The in-match lock is held across the enqueue, so a competitor cannot
    /// slip back into the queue between being paired and being claimed.
    fn enqueue_idle(&self, id: &str, tolerance: Option<u32>) -> Result<QueueTicket> {
        let playing = self.lock_in_match()?;
        if playing.contains(id) {
            return Err(ArenaError::QueueConflict {
                competitor_id: id.to_string(),
            }
            .into());
        }
        self.queue.enqueue(id, tolerance)
    }

    /// Put a competitor in the queue and announce it
    ///
    /// A competitor already waiting or still playing a match is rejected
    /// with `QueueConflict`.
    pub async fn queue_competitor(&self, id: &str, tolerance: Option<u32>) -> Result<QueueTicket> {
        let ticket = match self.enqueue_idle(id, tolerance) {
            Ok(ticket) => ticket,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    let reason = match arena_error(&e) {
                        Some(ArenaError::QueueConflict { .. }) => "conflict",
                        Some(ArenaError::CompetitorNotFound { .. }) => "not_found",
                        _ => "error",
                    };
                    metrics.record_queue_rejection(reason);
                }
                return Err(e);
            }
        };

        self.update_stats(|stats| stats.competitors_queued += 1)?;
        if let Some(metrics) = &self.metrics {
            metrics.record_queued(self.queue.size()?);
        }

        let event = CompetitorQueued {
            competitor_id: id.to_string(),
            queue_id: ticket.queue_id,
            rating: ticket.rating,
            position: ticket.position,
            timestamp: current_timestamp(),
        };
        if let Err(e) = self.publisher.publish_competitor_queued(event).await {
            warn!("Failed to publish CompetitorQueued for '{}': {}", id, e);
        }

        Ok(ticket)
    }

    pub fn leave_queue(&self, id: &str) -> Result<bool> {
        let removed = self.queue.dequeue(id)?;
        if removed {
            if let Some(metrics) = &self.metrics {
                metrics.set_queue_size(self.queue.size()?);
            }
        }
        Ok(removed)
    }

    /// Look for an opponent for `id` and play the match if one is found
    pub async fn try_match(&self, id: &str) -> Result<Option<MatchResult>> {
        let claimed = {
            let mut playing = self.lock_in_match()?;
            match self.queue.find_match(id)? {
                Some(pairing) => {
                    let claim = self.claim(&mut playing, &pairing)?;
                    Some((pairing, claim))
                }
                None => None,
            }
        };

        match claimed {
            Some((pairing, claim)) => Ok(Some(self.play_claimed(pairing, claim).await?)),
            None => {
                debug!("No opponent available for '{}'", id);
                Ok(None)
            }
        }
    }

    /// Play a pairing handed out by the queue and commit the result
    ///
    /// Fails with `QueueConflict` if either competitor is already playing.
    pub async fn play_pairing(&self, pairing: Pairing) -> Result<MatchResult> {
        let claim = {
            let mut playing = self.lock_in_match()?;
            self.claim(&mut playing, &pairing)?
        };
        self.play_claimed(pairing, claim).await
    }

    async fn play_claimed(&self, pairing: Pairing, claim: MatchClaim<'_>) -> Result<MatchResult> {
        let (id_a, id_b) = pairing.competitor_ids();
        let competitor_a = self.get_competitor(id_a)?;
        let competitor_b = self.get_competitor(id_b)?;

        if let Some(metrics) = &self.metrics {
            let wait = pairing.requester.wait_seconds(pairing.paired_at);
            metrics.record_pairing(wait, self.queue.size()?);
        }

        let found = MatchFound {
            match_id: pairing.match_id,
            competitor_a: competitor_a.id.clone(),
            competitor_b: competitor_b.id.clone(),
            rating_a: competitor_a.rating,
            rating_b: competitor_b.rating,
            timestamp: current_timestamp(),
        };
        if let Err(e) = self.publisher.publish_match_found(found).await {
            warn!("Failed to publish MatchFound {}: {}", pairing.match_id, e);
        }

        let result = self
            .runner
            .run_match_with_id(pairing.match_id, &competitor_a, &competitor_b)
            .await?;

        self.commit_result(&result)?;
        // Free to queue again by the time anyone hears the match is over
        drop(claim);

        if let Err(e) = self
            .publisher
            .publish_match_completed(MatchCompleted::from_result(&result))
            .await
        {
            warn!("Failed to publish MatchCompleted {}: {}", result.match_id, e);
        }

        Ok(result)
    }

    /// Apply a finished match to the stored competitors
    ///
    /// Competitors are re-read from the store rather than taken from the
    /// pre-match snapshot.
    fn commit_result(&self, result: &MatchResult) -> Result<()> {
        let mut settled = Vec::with_capacity(2);
        for game in [&result.competitor_a, &result.competitor_b] {
            settled.push(self.get_competitor(&game.competitor_id)?);
        }

        for competitor in settled.iter_mut() {
            let game = result.game_for(&competitor.id).ok_or_else(|| {
                ArenaError::internal(format!("match result has no game for '{}'", competitor.id))
            })?;
            let (outcome, new_rating) = result.settlement_for(&competitor.id).ok_or_else(|| {
                ArenaError::internal(format!("match result has no rating for '{}'", competitor.id))
            })?;
            competitor.apply_match(game.final_score, outcome, new_rating);
        }

        self.store.store_competitors(settled)?;

        let best = result
            .competitor_a
            .final_score
            .max(result.competitor_b.final_score);
        self.update_stats(|stats| {
            stats.matches_played += 1;
            if result.is_draw() {
                stats.draws += 1;
            }
            stats.highest_score = stats.highest_score.max(best);
        })?;

        if let Some(metrics) = &self.metrics {
            metrics.record_match(result, self.runner.mode());
        }
        Ok(())
    }

    /// Pair everyone the queue can pair and play each match
    ///
    /// A match that fails is logged and skipped; its competitors have
    /// already left the queue.
    pub async fn run_matchmaking_round(&self) -> Result<Vec<MatchResult>> {
        let claimed = {
            let mut playing = self.lock_in_match()?;
            let mut claimed = Vec::new();
            for pairing in self.queue.pair_all()? {
                match self.claim(&mut playing, &pairing) {
                    Ok(claim) => claimed.push((pairing, claim)),
                    Err(e) => error!("Pairing {} dropped: {}", pairing.match_id, e),
                }
            }
            claimed
        };
        if claimed.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Matchmaking round produced {} pairings", claimed.len());
        let mut results = Vec::with_capacity(claimed.len());
        for (pairing, claim) in claimed {
            let match_id = pairing.match_id;
            match self.play_claimed(pairing, claim).await {
                Ok(result) => results.push(result),
                Err(e) => error!("Match {} failed: {}", match_id, e),
            }
        }
        Ok(results)
    }

    /// Queue every registered competitor that is neither waiting nor playing
    pub async fn queue_idle_competitors(&self) -> Result<usize> {
        let mut queued = 0;
        for competitor in self.store.all_competitors()? {
            if self.queue.is_queued(&competitor.id)? || self.is_in_match(&competitor.id)? {
                continue;
            }
            match self.queue_competitor(&competitor.id, None).await {
                Ok(_) => queued += 1,
                // Queued or paired by someone else in between
                Err(e) if matches!(arena_error(&e), Some(ArenaError::QueueConflict { .. })) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(queued)
    }

    /// Drop queue entries that have waited longer than `max_wait`
    pub fn remove_stale_entries(&self, max_wait: Duration) -> Result<Vec<CompetitorId>> {
        let max_wait = chrono::Duration::from_std(max_wait)
            .map_err(|e| ArenaError::invalid_input(format!("max wait out of range: {}", e)))?;
        let removed = self.queue.remove_stale(current_timestamp() - max_wait)?;

        let count = removed.len() as u64;
        self.update_stats(|stats| stats.stale_entries_removed += count)?;
        if let Some(metrics) = &self.metrics {
            metrics.set_queue_size(self.queue.size()?);
        }

        Ok(removed.into_iter().map(|entry| entry.competitor_id).collect())
    }
}

impl std::fmt::Debug for ArenaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaService")
            .field("runner", &self.runner)
            .field("queue", &self.queue)
            .field("initial_rating", &self.initial_rating)
            .finish_non_exhaustive()
    }
}
