//! `SimStorageBackend` - In-Memory Storage for Testing
//!
//! `TigerStyle`: Deterministic testing with fault injection.
//!
//! Votes are kept as flat rows, the same shape the `votes` table uses, so
//! every read goes through [`FlatVoteRow::reconstruct`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::dst::{DeterministicRng, FaultConfig, FaultInjector, SimConfig};
use crate::history::SelectionEvent;
use crate::matchup::Vote;

use super::backend::StorageBackend;
use super::error::{StorageError, StorageResult};
use super::record::{FlatVoteRow, VoteFilter};

// =============================================================================
// SimStorageBackend
// =============================================================================

/// In-memory storage backend for testing.
///
/// `TigerStyle`:
/// - Deterministic via `DeterministicRng`
/// - Fault injection via `FaultInjector`
/// - Clones share the same data
#[derive(Debug, Clone)]
pub struct SimStorageBackend {
    /// Selection log in append order
    selections: Arc<RwLock<Vec<SelectionEvent>>>,
    /// Vote rows in append order
    vote_rows: Arc<RwLock<Vec<FlatVoteRow>>>,
    /// Fault injector for simulating failures
    fault_injector: Arc<FaultInjector>,
}

impl SimStorageBackend {
    /// Create a new `SimStorageBackend` with no faults registered.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let mut rng = DeterministicRng::new(config.seed());
        Self::with_fault_injector(Arc::new(FaultInjector::new(rng.fork())))
    }

    /// Create a backend that shares a simulation's fault injector.
    #[must_use]
    pub fn with_fault_injector(fault_injector: Arc<FaultInjector>) -> Self {
        Self {
            selections: Arc::new(RwLock::new(Vec::new())),
            vote_rows: Arc::new(RwLock::new(Vec::new())),
            fault_injector,
        }
    }

    /// Register a fault.
    ///
    /// # Panics
    /// Panics if the fault injector is already shared.
    #[must_use]
    pub fn with_faults(mut self, config: FaultConfig) -> Self {
        Arc::get_mut(&mut self.fault_injector)
            .expect("cannot add faults after backend is shared")
            .register(config);
        self
    }

    /// Get fault injector for inspection.
    #[must_use]
    pub fn fault_injector(&self) -> &Arc<FaultInjector> {
        &self.fault_injector
    }

    /// Number of stored selection events.
    pub async fn selection_count(&self) -> usize {
        self.selections.read().await.len()
    }

    /// Number of stored vote rows.
    pub async fn vote_row_count(&self) -> usize {
        self.vote_rows.read().await.len()
    }

    fn maybe_inject_fault(&self, operation: &str) -> StorageResult<()> {
        if let Some(fault_type) = self.fault_injector.should_inject(operation) {
            Err(StorageError::simulated_fault(fault_type.as_str(), operation))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StorageBackend for SimStorageBackend {
    #[tracing::instrument(skip(self, event), fields(item = %event.key(), deviated = event.deviated))]
    async fn append_selection_event(&self, event: &SelectionEvent) -> StorageResult<()> {
        self.maybe_inject_fault("append_selection_event")?;

        self.selections.write().await.push(event.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self, vote), fields(vote_id = %vote.id(), candidates = vote.candidates().len()))]
    async fn append_vote(&self, vote: &Vote) -> StorageResult<()> {
        self.maybe_inject_fault("append_vote")?;

        let rows = FlatVoteRow::flatten(vote);
        // Single lock scope: all rows of the vote land together.
        self.vote_rows.write().await.extend(rows);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn query_votes(&self, filter: Option<&VoteFilter>) -> StorageResult<Vec<Vote>> {
        self.maybe_inject_fault("query_votes")?;

        let rows = self.vote_rows.read().await;
        let mut votes = FlatVoteRow::reconstruct(&rows)?;
        if let Some(filter) = filter {
            votes.retain(|vote| filter.matches(vote));
        }
        // Stable: ties keep append order
        votes.sort_by_key(Vote::created_at);
        Ok(votes)
    }

    #[tracing::instrument(skip(self))]
    async fn query_recent_selections(
        &self,
        since: DateTime<Utc>,
    ) -> StorageResult<Vec<SelectionEvent>> {
        self.maybe_inject_fault("query_recent_selections")?;

        let selections = self.selections.read().await;
        Ok(selections
            .iter()
            .filter(|event| event.selected_at >= since)
            .cloned()
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_selections(&self) -> StorageResult<Vec<SelectionEvent>> {
        self.maybe_inject_fault("list_selections")?;

        Ok(self.selections.read().await.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn list_vote_rows(&self) -> StorageResult<Vec<FlatVoteRow>> {
        self.maybe_inject_fault("list_vote_rows")?;

        Ok(self.vote_rows.read().await.clone())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.maybe_inject_fault("clear")?;

        self.selections.write().await.clear();
        self.vote_rows.write().await.clear();
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
