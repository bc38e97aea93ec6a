//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use pinfall::error::Result;
use pinfall::events::{ArenaEvent, CompetitorQueued, EventPublisher, MatchCompleted, MatchFound};
use pinfall::game::ThrowDescriptor;
use pinfall::queue::{MatchmakingQueue, QueueConfig};
use pinfall::rating::{CompetitorStore, EloRatingCalculator, InMemoryCompetitorStore};
use pinfall::runner::{ExecutionMode, MatchRunner};
use pinfall::service::ArenaService;
use pinfall::strategy::{FixedThrowProvider, StrategyProvider};
use pinfall::types::Competitor;
use std::sync::{Arc, Mutex};

/// Mock event publisher that captures published events for testing
#[derive(Debug, Default)]
pub struct MockEventPublisher {
    published_events: Arc<Mutex<Vec<ArenaEvent>>>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all published events (for testing)
    pub fn get_published_events(&self) -> Vec<ArenaEvent> {
        self.published_events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Count events of specific type
    pub fn count_events_of_type(&self, event_type: &str) -> usize {
        self.get_published_events()
            .iter()
            .filter(|event| event.event_type() == event_type)
            .count()
    }

    fn push(&self, event: ArenaEvent) {
        if let Ok(mut events) = self.published_events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish_competitor_queued(&self, event: CompetitorQueued) -> Result<()> {
        self.push(ArenaEvent::CompetitorQueued(event));
        Ok(())
    }

    async fn publish_match_found(&self, event: MatchFound) -> Result<()> {
        self.push(ArenaEvent::MatchFound(event));
        Ok(())
    }

    async fn publish_match_completed(&self, event: MatchCompleted) -> Result<()> {
        self.push(ArenaEvent::MatchCompleted(event));
        Ok(())
    }
}

/// Fast centre ball: always a strike on a full rack
pub fn strike_throw() -> ThrowDescriptor {
    ThrowDescriptor::straight(0.0, 22.0).unwrap()
}

/// Always in the gutter
pub fn gutter_throw() -> ThrowDescriptor {
    ThrowDescriptor::straight(-4.5, 16.0).unwrap()
}

/// Slow centre ball: six pins, then nothing on the second ball
pub fn six_pin_throw() -> ThrowDescriptor {
    ThrowDescriptor::straight(0.0, 12.0).unwrap()
}

/// Complete arena wired to a capturing publisher
pub struct TestArena {
    pub arena: ArenaService,
    pub store: Arc<dyn CompetitorStore>,
    pub queue: Arc<MatchmakingQueue>,
    pub events: Arc<MockEventPublisher>,
}

pub fn create_test_arena(strategy: Arc<dyn StrategyProvider>, mode: ExecutionMode) -> TestArena {
    let store: Arc<dyn CompetitorStore> = Arc::new(InMemoryCompetitorStore::new());
    let queue = Arc::new(MatchmakingQueue::new(store.clone(), QueueConfig::default()));
    let runner = MatchRunner::new(strategy, Arc::new(EloRatingCalculator::default()))
        .with_mode(mode)
        .with_seed(1234);
    let events = Arc::new(MockEventPublisher::new());

    let arena = ArenaService::new(
        store.clone(),
        queue.clone(),
        Arc::new(runner),
        events.clone(),
        1200,
    );

    TestArena {
        arena,
        store,
        queue,
        events,
    }
}

/// Arena where `ace` always strikes and everyone else throws gutter balls
pub fn create_ace_arena(mode: ExecutionMode) -> TestArena {
    let strategy = FixedThrowProvider::new(gutter_throw()).with_throw("ace", strike_throw());
    create_test_arena(Arc::new(strategy), mode)
}

/// Store pre-populated with competitors at the given ratings
pub fn store_with(competitors: &[(&str, i32)]) -> Arc<dyn CompetitorStore> {
    let store = InMemoryCompetitorStore::new();
    for (id, rating) in competitors {
        store
            .store_competitor(Competitor::with_rating(*id, *id, *rating))
            .unwrap();
    }
    Arc::new(store)
}
