//! Selection - Cooldown-Constrained Random Pick
//!
//! `TigerStyle`: Uniform draw over the eligible set, persist first, then
//! update the in-memory ledger.
//!
//! # Pick
//!
//! ```text
//! catalog ──► eligible = catalog − cooling down ──► uniform draw
//!                                                      │
//!                              append_selection_event ◄┘
//!                                        │ ok
//!                                        ▼
//!                                 ledger.record
//! ```
//!
//! An empty eligible set is an error. The cooldown is never relaxed.

use chrono::Duration;
use thiserror::Error;

use crate::catalog::{Catalog, Item};
use crate::clock::Clock;
use crate::dst::DeterministicRng;
use crate::history::{HistoryLedger, SelectionEvent};
use crate::storage::{StorageBackend, StorageError, StorageResult};

// =============================================================================
// Errors
// =============================================================================

/// Errors from the selection engine.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Every catalog item is inside its cooldown window
    #[error("no eligible items: all {catalog_size} items are within the {cooldown_days}-day cooldown")]
    EmptyEligibleSet {
        /// Items in the catalog
        catalog_size: usize,
        /// Cooldown window in whole days
        cooldown_days: i64,
    },

    /// Persistence failed; nothing was recorded
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// =============================================================================
// SelectionEngine
// =============================================================================

/// Picks one item at random from those not selected recently.
#[derive(Debug)]
pub struct SelectionEngine<S: StorageBackend, K: Clock> {
    storage: S,
    clock: K,
    ledger: HistoryLedger,
}

impl<S: StorageBackend, K: Clock> SelectionEngine<S, K> {
    /// Create an engine over an existing ledger.
    #[must_use]
    pub fn new(storage: S, clock: K, ledger: HistoryLedger) -> Self {
        Self {
            storage,
            clock,
            ledger,
        }
    }

    /// Create an engine whose ledger is rebuilt from storage.
    ///
    /// # Errors
    /// Propagates storage errors unchanged.
    pub async fn load(storage: S, clock: K) -> StorageResult<Self> {
        let ledger = HistoryLedger::load(&storage).await?;
        Ok(Self::new(storage, clock, ledger))
    }

    /// The selection log.
    #[must_use]
    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    /// Items that may be picked right now, in catalog order.
    #[must_use]
    pub fn eligible<'a, C: Catalog + ?Sized>(
        &self,
        catalog: &'a C,
        cooldown: Duration,
    ) -> Vec<&'a Item> {
        self.ledger
            .eligible(catalog.list_items(), self.clock.now(), cooldown)
    }

    /// Pick an item uniformly from the eligible set and record it.
    ///
    /// # Errors
    /// - `EmptyEligibleSet` if every item is cooling down (or the catalog is
    ///   empty). Nothing is recorded.
    /// - `Storage` if the append fails. The ledger is left unchanged.
    ///
    /// # Panics
    /// Panics if `cooldown` is negative.
    #[tracing::instrument(skip(self, catalog, rng), fields(catalog_size = catalog.count()))]
    pub async fn pick<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        cooldown: Duration,
        rng: &mut DeterministicRng,
    ) -> Result<Item, SelectionError> {
        // Precondition
        assert!(cooldown >= Duration::zero(), "cooldown must not be negative");

        let now = self.clock.now();
        let eligible = self.ledger.eligible(catalog.list_items(), now, cooldown);
        if eligible.is_empty() {
            tracing::warn!(
                catalog_size = catalog.count(),
                cooldown_days = cooldown.num_days(),
                "no eligible items"
            );
            return Err(SelectionError::EmptyEligibleSet {
                catalog_size: catalog.count(),
                cooldown_days: cooldown.num_days(),
            });
        }

        let item = (*rng.choose(&eligible)).clone();
        tracing::debug!(eligible = eligible.len(), item = %item.key(), "drew item");

        let event = SelectionEvent::picked(item.clone(), now);
        self.storage.append_selection_event(&event).await?;
        self.ledger.record(event);

        tracing::info!(item = %item.key(), "picked");

        // Postcondition
        assert!(
            self.ledger.is_excluded(&item.key(), now, cooldown) || cooldown.is_zero(),
            "picked item must start its cooldown"
        );

        Ok(item)
    }

    /// Record that `actual` was used instead of the pick.
    ///
    /// The originally picked item keeps its own event and cooldown.
    ///
    /// # Errors
    /// Propagates storage errors unchanged; the ledger is left unchanged.
    #[tracing::instrument(skip(self, actual), fields(item = %actual.key()))]
    pub async fn record_deviation(&mut self, actual: Item) -> Result<SelectionEvent, SelectionError> {
        let event = SelectionEvent::deviation(actual, self.clock.now());
        self.storage.append_selection_event(&event).await?;
        self.ledger.record(event.clone());

        tracing::info!("deviation recorded");
        Ok(event)
    }
}
