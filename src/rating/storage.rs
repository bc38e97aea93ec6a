//! Competitor storage interface and implementations
//!
//! This module defines the interface for persisting and retrieving competitors
//! (rating plus lifetime counters). Only an in-memory implementation ships;
//! the trait is the seam for anything durable.

use crate::error::{ArenaError, Result};
use crate::types::{Competitor, CompetitorId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for competitor storage operations
pub trait CompetitorStore: Send + Sync {
    /// Get a competitor by id
    fn get_competitor(&self, competitor_id: &CompetitorId) -> Result<Option<Competitor>>;

    /// Store or replace a competitor
    fn store_competitor(&self, competitor: Competitor) -> Result<()>;

    /// Store several competitors under one lock acquisition
    fn store_competitors(&self, competitors: Vec<Competitor>) -> Result<()>;

    /// All competitors, ordered by rating (highest first)
    fn all_competitors(&self) -> Result<Vec<Competitor>>;

    /// Get total number of registered competitors
    fn competitor_count(&self) -> Result<usize>;
}

/// In-memory competitor storage
#[derive(Debug, Default)]
pub struct InMemoryCompetitorStore {
    competitors: RwLock<HashMap<CompetitorId, Competitor>>,
}

impl InMemoryCompetitorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompetitorStore for InMemoryCompetitorStore {
    fn get_competitor(&self, competitor_id: &CompetitorId) -> Result<Option<Competitor>> {
        let competitors = self
            .competitors
            .read()
            .map_err(|_| ArenaError::internal("Failed to acquire competitors read lock"))?;

        Ok(competitors.get(competitor_id).cloned())
    }

    fn store_competitor(&self, competitor: Competitor) -> Result<()> {
        let mut competitors = self
            .competitors
            .write()
            .map_err(|_| ArenaError::internal("Failed to acquire competitors write lock"))?;

        competitors.insert(competitor.id.clone(), competitor);
        Ok(())
    }

    fn store_competitors(&self, batch: Vec<Competitor>) -> Result<()> {
        let mut competitors = self
            .competitors
            .write()
            .map_err(|_| ArenaError::internal("Failed to acquire competitors write lock"))?;

        for competitor in batch {
            competitors.insert(competitor.id.clone(), competitor);
        }
        Ok(())
    }

    fn all_competitors(&self) -> Result<Vec<Competitor>> {
        let competitors = self
            .competitors
            .read()
            .map_err(|_| ArenaError::internal("Failed to acquire competitors read lock"))?;

        let mut all: Vec<Competitor> = competitors.values().cloned().collect();
        all.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    fn competitor_count(&self) -> Result<usize> {
        let competitors = self
            .competitors
            .read()
            .map_err(|_| ArenaError::internal("Failed to acquire competitors read lock"))?;

        Ok(competitors.len())
    }
}
