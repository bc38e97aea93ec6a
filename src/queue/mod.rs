//! Matchmaking queue
//!
//! Waiting competitors are paired by rating proximity and how close together
//! they started waiting. All queue state sits behind one mutex so that the
//! search for an opponent and the removal of both entries happen in a single
//! critical section.

pub mod entry;
pub mod matching;
pub mod manager;

pub use entry::{Pairing, QueueConfig, QueueEntry, QueueTicket};
pub use matching::{best_candidate, pairing_score};
pub use manager::MatchmakingQueue;
