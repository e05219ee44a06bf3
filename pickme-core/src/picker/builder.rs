//! Picker Builder Pattern
//!
//! `TigerStyle`: Fluent API, explicit components, fail with an error.
//!
//! Storage, clock and catalog are required. The RNG defaults to entropy
//! and the config to [`PickerConfig::default`].

use super::{Picker, PickerConfig, PickerError};
use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::dst::DeterministicRng;
use crate::history::HistoryLedger;
use crate::storage::StorageBackend;

// =============================================================================
// PickerBuilder
// =============================================================================

/// Builder for constructing [`Picker`] instances.
///
/// `TigerStyle`:
/// - Fluent API with method chaining
/// - `build()` returns `MissingComponent` instead of panicking
/// - History is loaded from storage during `build()`
///
/// # Example
///
/// ```rust
/// use pickme_core::catalog::{InMemoryCatalog, Item};
/// use pickme_core::dst::{SimClock, SimConfig};
/// use pickme_core::picker::{Picker, PickerConfig};
/// use pickme_core::storage::SimStorageBackend;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = InMemoryCatalog::from_items(vec![
///     Item::new("1", "Essie", "Ballet Slippers", "creme", "Classics"),
/// ])?;
///
/// let picker = Picker::builder()
///     .with_config(PickerConfig::default())
///     .with_catalog(catalog)
///     .with_storage(SimStorageBackend::new(SimConfig::with_seed(7)))
///     .with_clock(SimClock::new())
///     .with_seed(7)
///     .build()
///     .await?;
/// assert_eq!(picker.eligible().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PickerBuilder<S, K, C> {
    config: PickerConfig,
    catalog: Option<C>,
    storage: Option<S>,
    clock: Option<K>,
    rng: Option<DeterministicRng>,
}

impl<S, K, C> PickerBuilder<S, K, C>
where
    S: StorageBackend + Clone,
    K: Clock + Clone,
    C: Catalog,
{
    /// Create a new builder with no components set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PickerConfig::default(),
            catalog: None,
            storage: None,
            clock: None,
            rng: None,
        }
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PickerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: C) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the storage backend. Selection history is read from it on `build()`.
    #[must_use]
    pub fn with_storage(mut self, storage: S) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: K) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use a seeded RNG for reproducible picks and matchups.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(DeterministicRng::new(seed))
    }

    /// Set the RNG.
    #[must_use]
    pub fn with_rng(mut self, rng: DeterministicRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Validate, load history and assemble the picker.
    ///
    /// # Errors
    /// - `MissingComponent` if catalog, storage or clock is unset
    /// - `Config` if the configuration is invalid
    /// - `Storage` if the selection history cannot be read
    pub async fn build(self) -> Result<Picker<S, K, C>, PickerError> {
        let catalog = self
            .catalog
            .ok_or(PickerError::MissingComponent { component: "catalog" })?;
        let storage = self
            .storage
            .ok_or(PickerError::MissingComponent { component: "storage" })?;
        let clock = self
            .clock
            .ok_or(PickerError::MissingComponent { component: "clock" })?;
        let rng = self.rng.unwrap_or_else(DeterministicRng::from_entropy);

        self.config.validate()?;
        let ledger = HistoryLedger::load(&storage).await?;

        Picker::from_parts(self.config, catalog, storage, clock, ledger, rng)
    }
}

impl<S, K, C> Default for PickerBuilder<S, K, C>
where
    S: StorageBackend + Clone,
    K: Clock + Clone,
    C: Catalog,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
