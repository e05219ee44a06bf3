//! Picker - Orchestrator
//!
//! `TigerStyle`: One owner for catalog, ledger, engines, RNG and clock.
//! Calls are sequential; each public method is one user action.
//!
//! # Example
//!
//! ```rust
//! use pickme_core::catalog::{InMemoryCatalog, Item};
//! use pickme_core::matchup::Decision;
//! use pickme_core::picker::Picker;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = InMemoryCatalog::from_items(
//!     (1..=6)
//!         .map(|n| Item::new(n.to_string(), "Essie", format!("Shade {n}"), "creme", "Classics"))
//!         .collect(),
//! )?;
//! let mut picker = Picker::sim(42, catalog);
//!
//! let today = picker.pick().await?;
//! println!("wear {today}");
//!
//! let mut matchup = picker.draft_matchup()?;
//! let favourite = matchup.candidates()[0].key();
//! picker.submit(&mut matchup, Decision::Winner(favourite)).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;

use thiserror::Error;

use crate::catalog::{Catalog, CatalogError, Dimension, InMemoryCatalog, Item, ItemKey};
use crate::clock::Clock;
use crate::dst::{DeterministicRng, SimClock, SimConfig};
use crate::history::{HistoryFilter, HistoryLedger, SelectionEvent};
use crate::matchup::{Decision, Matchup, MatchupEngine, MatchupError, Vote};
use crate::selection::{SelectionEngine, SelectionError};
use crate::stats::{PopularItem, Statistic, StatisticsAggregator, UsageJourney};
use crate::storage::{SimStorageBackend, StorageBackend, StorageError};

pub use builder::PickerBuilder;
pub use config::{
    ConfigError, PickerConfig, ENV_COOLDOWN_DAYS, ENV_DATABASE_URL, ENV_MATCHUP_SIZE,
    ENV_POPULAR_LIMIT,
};

// =============================================================================
// PickerError
// =============================================================================

/// Errors from picker operations.
#[derive(Debug, Error)]
pub enum PickerError {
    /// Catalog load or lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Pick failed
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Matchup draft or vote failed
    #[error(transparent)]
    Matchup(#[from] MatchupError),

    /// Statistics read failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Builder is missing a required component
    #[error("missing component: {component}")]
    MissingComponent {
        /// Component name
        component: &'static str,
    },
}

impl PickerError {
    /// The storage error underneath, whichever layer surfaced it.
    #[must_use]
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::Storage(e)
            | Self::Selection(SelectionError::Storage(e))
            | Self::Matchup(MatchupError::Storage(e)) => Some(e),
            _ => None,
        }
    }
}

// =============================================================================
// Picker
// =============================================================================

/// Daily pick, matchups and statistics over one catalog.
#[derive(Debug)]
pub struct Picker<S, K, C>
where
    S: StorageBackend + Clone,
    K: Clock + Clone,
    C: Catalog,
{
    config: PickerConfig,
    catalog: C,
    selection: SelectionEngine<S, K>,
    matchups: MatchupEngine<S, K>,
    stats: StatisticsAggregator<S>,
    rng: DeterministicRng,
}

impl Picker<SimStorageBackend, SimClock, InMemoryCatalog> {
    /// Fully simulated picker: in-memory storage, simulated clock, seeded RNG.
    ///
    /// # Panics
    /// Panics if the default configuration is invalid.
    #[must_use]
    pub fn sim(seed: u64, catalog: InMemoryCatalog) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let storage = SimStorageBackend::new(SimConfig::with_seed(rng.next_u64()));
        Self::from_parts(
            PickerConfig::default(),
            catalog,
            storage,
            SimClock::new(),
            HistoryLedger::new(),
            rng,
        )
        .expect("default config is valid")
    }
}

impl<S, K, C> Picker<S, K, C>
where
    S: StorageBackend + Clone,
    K: Clock + Clone,
    C: Catalog,
{
    /// Start building a picker.
    #[must_use]
    pub fn builder() -> PickerBuilder<S, K, C> {
        PickerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: PickerConfig,
        catalog: C,
        storage: S,
        clock: K,
        ledger: HistoryLedger,
        rng: DeterministicRng,
    ) -> Result<Self, PickerError> {
        config.validate()?;

        let matchups =
            MatchupEngine::new(storage.clone(), clock.clone()).with_size(config.matchup_size)?;
        let stats = StatisticsAggregator::new(storage.clone());
        let selection = SelectionEngine::new(storage, clock, ledger);

        tracing::info!(
            catalog_size = catalog.count(),
            history = selection.ledger().len(),
            seed = rng.seed(),
            "picker ready"
        );

        Ok(Self {
            config,
            catalog,
            selection,
            matchups,
            stats,
            rng,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The selection log.
    #[must_use]
    pub fn ledger(&self) -> &HistoryLedger {
        self.selection.ledger()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Pick today's item.
    ///
    /// # Errors
    /// `Selection(EmptyEligibleSet)` when everything is cooling down, or the
    /// storage error from the append.
    pub async fn pick(&mut self) -> Result<Item, PickerError> {
        let item = self
            .selection
            .pick(&self.catalog, self.config.cooldown, &mut self.rng)
            .await?;
        Ok(item)
    }

    /// Items that could be picked right now.
    #[must_use]
    pub fn eligible(&self) -> Vec<&Item> {
        self.selection.eligible(&self.catalog, self.config.cooldown)
    }

    /// Record that the item with `key` was used instead of the pick.
    ///
    /// # Errors
    /// `Catalog(UnknownItem)` if the key is not in the catalog, or the
    /// storage error from the append.
    pub async fn record_deviation(&mut self, key: &ItemKey) -> Result<SelectionEvent, PickerError> {
        let item = self
            .catalog
            .find(key)
            .cloned()
            .ok_or_else(|| CatalogError::unknown_item(key.clone()))?;
        Ok(self.selection.record_deviation(item).await?)
    }

    /// Selection events passing the filter, oldest first.
    #[must_use]
    pub fn history(&self, filter: &HistoryFilter) -> Vec<&SelectionEvent> {
        self.ledger().filter(filter)
    }

    /// How far through the catalog the history has got.
    #[must_use]
    pub fn usage_journey(&self) -> UsageJourney {
        UsageJourney::from_history(self.ledger(), &self.catalog)
    }

    // =========================================================================
    // Matchups
    // =========================================================================

    /// Draw a new matchup.
    ///
    /// # Errors
    /// `Matchup(InsufficientCatalog)` if the catalog is too small.
    pub fn draft_matchup(&mut self) -> Result<Matchup, PickerError> {
        Ok(self.matchups.draft(&self.catalog, &mut self.rng)?)
    }

    /// Record the judge's decision.
    ///
    /// # Errors
    /// `Matchup(InvalidWinner | AlreadyClosed | Storage)`.
    pub async fn submit(
        &self,
        matchup: &mut Matchup,
        decision: Decision,
    ) -> Result<Vote, PickerError> {
        Ok(self.matchups.submit(matchup, decision).await?)
    }

    /// Close a matchup without voting.
    ///
    /// # Errors
    /// `Matchup(AlreadyClosed)` if it was already closed.
    pub fn abandon(&self, matchup: &mut Matchup) -> Result<(), PickerError> {
        Ok(self.matchups.abandon(matchup)?)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Per-value statistics for a dimension.
    ///
    /// # Errors
    /// Propagates storage errors.
    pub async fn summarize(&self, dimension: Dimension) -> Result<Vec<Statistic>, PickerError> {
        Ok(self.stats.summarize(dimension).await?)
    }

    /// Values that appeared and never won.
    ///
    /// # Errors
    /// Propagates storage errors.
    pub async fn unmemorable(&self, dimension: Dimension) -> Result<Vec<Statistic>, PickerError> {
        Ok(self.stats.unmemorable(dimension).await?)
    }

    /// The configured number of most-winning items.
    ///
    /// # Errors
    /// Propagates storage errors.
    pub async fn popular_items(&self) -> Result<Vec<PopularItem>, PickerError> {
        Ok(self.stats.popular_items(self.config.popular_limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_items(vec![
            Item::new("1", "X", "Alpha", "creme", "Core"),
            Item::new("2", "X", "Beta", "holo", "Core"),
            Item::new("3", "Y", "Gamma", "creme", "Core"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_sim_pick_and_history() {
        let mut picker = Picker::sim(42, catalog());

        let item = picker.pick().await.unwrap();

        assert_eq!(picker.ledger().len(), 1);
        assert_eq!(picker.eligible().len(), 2);
        let history = picker.history(&HistoryFilter::new().with_brand(item.brand.clone()));
        assert_eq!(history.len(), 1);
        assert_eq!(picker.usage_journey().worn_items, 1);
    }

    #[tokio::test]
    async fn test_record_deviation_unknown_item() {
        let mut picker = Picker::sim(42, catalog());

        let err = picker
            .record_deviation(&ItemKey::new("Zoya", "Core", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, PickerError::Catalog(CatalogError::UnknownItem { .. })));
        assert!(picker.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_matchup_round_trip_into_stats() {
        let mut picker = Picker::sim(42, catalog());
        // Default size is 5; this catalog only has 3.
        assert!(matches!(
            picker.draft_matchup(),
            Err(PickerError::Matchup(MatchupError::InsufficientCatalog { .. }))
        ));

        let storage = SimStorageBackend::new(SimConfig::with_seed(1));
        let mut picker = Picker::from_parts(
            PickerConfig::default().with_matchup_size(3),
            catalog(),
            storage,
            SimClock::new(),
            HistoryLedger::new(),
            DeterministicRng::new(1),
        )
        .unwrap();

        let mut matchup = picker.draft_matchup().unwrap();
        let alpha = ItemKey::new("X", "Core", "1");
        picker
            .submit(&mut matchup, Decision::Winner(alpha))
            .await
            .unwrap();

        let brands = picker.summarize(Dimension::Brand).await.unwrap();
        assert_eq!(
            brands,
            vec![
                Statistic::new(Dimension::Brand, "X", 2, 1),
                Statistic::new(Dimension::Brand, "Y", 1, 0),
            ]
        );
        assert_eq!(picker.unmemorable(Dimension::Brand).await.unwrap().len(), 1);
        assert_eq!(picker.popular_items().await.unwrap()[0].item.shade_name, "Alpha");
    }

    #[test]
    fn test_storage_error_accessor() {
        let err = PickerError::from(SelectionError::Storage(StorageError::read("statement timeout")));
        assert!(err.storage_error().is_some_and(StorageError::is_transient));

        let err = PickerError::MissingComponent { component: "catalog" };
        assert!(err.storage_error().is_none());
    }
}
