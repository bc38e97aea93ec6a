//! Event publisher seam and implementations

use crate::error::{ArenaError, Result};
use crate::events::{ArenaEvent, CompetitorQueued, MatchCompleted, MatchFound};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// Trait for publishing arena events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a CompetitorQueued event
    async fn publish_competitor_queued(&self, event: CompetitorQueued) -> Result<()>;

    /// Publish a MatchFound event
    async fn publish_match_found(&self, event: MatchFound) -> Result<()>;

    /// Publish a MatchCompleted event
    async fn publish_match_completed(&self, event: MatchCompleted) -> Result<()>;
}

/// Forwards events into an unbounded tokio channel
///
/// Whoever holds the receiver decides how events leave the process.
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::UnboundedSender<ArenaEvent>,
}

impl ChannelEventPublisher {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ArenaEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ArenaEvent) -> Result<()> {
        let event_type = event.event_type();
        self.sender.send(event).map_err(|_| {
            ArenaError::internal(format!("event channel closed while sending {}", event_type))
        })?;
        debug!("Published {} event", event_type);
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for ChannelEventPublisher {
    async fn publish_competitor_queued(&self, event: CompetitorQueued) -> Result<()> {
        self.send(ArenaEvent::CompetitorQueued(event))
    }

    async fn publish_match_found(&self, event: MatchFound) -> Result<()> {
        self.send(ArenaEvent::MatchFound(event))
    }

    async fn publish_match_completed(&self, event: MatchCompleted) -> Result<()> {
        self.send(ArenaEvent::MatchCompleted(event))
    }
}

/// Publisher that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish_competitor_queued(&self, _event: CompetitorQueued) -> Result<()> {
        Ok(())
    }

    async fn publish_match_found(&self, _event: MatchFound) -> Result<()> {
        Ok(())
    }

    async fn publish_match_completed(&self, _event: MatchCompleted) -> Result<()> {
        Ok(())
    }
}
