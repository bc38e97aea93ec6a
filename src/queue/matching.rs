//! Opponent selection
//!
//! A requester is paired with the eligible entry that minimises
//! `rating gap + weight * wait-start gap in seconds`. Only the requester's
//! tolerance is checked. This is a greedy nearest-neighbour choice per
//! request, not a global assignment over the whole queue.

use crate::queue::entry::QueueEntry;
use crate::utils::{rating_difference, ratings_within_tolerance, seconds_between};

/// Pairing score of `candidate` for `requester`; lower is better
pub fn pairing_score(requester: &QueueEntry, candidate: &QueueEntry, wait_time_weight: f64) -> f64 {
    rating_difference(requester.rating, candidate.rating) as f64
        + wait_time_weight * seconds_between(requester.enqueued_at, candidate.enqueued_at)
}

/// Best opponent for `requester` among `candidates`, with its score
///
/// Ties go to the entry inserted first.
pub fn best_candidate<'a, I>(
    requester: &QueueEntry,
    candidates: I,
    wait_time_weight: f64,
) -> Option<(&'a QueueEntry, f64)>
where
    I: IntoIterator<Item = &'a QueueEntry>,
{
    candidates
        .into_iter()
        .filter(|candidate| candidate.competitor_id != requester.competitor_id)
        .filter(|candidate| {
            ratings_within_tolerance(requester.rating, candidate.rating, requester.tolerance)
        })
        .map(|candidate| (candidate, pairing_score(requester, candidate, wait_time_weight)))
        .min_by(|(a, score_a), (b, score_b)| {
            score_a
                .total_cmp(score_b)
                .then_with(|| a.sequence.cmp(&b.sequence))
        })
}
