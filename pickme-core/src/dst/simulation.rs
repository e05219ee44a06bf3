//! Simulation - DST Test Harness
//!
//! `TigerStyle`: One seed drives the clock, the RNG and every fault. The
//! environment hands out components that all share the same fault injector.

use std::future::Future;
use std::sync::Arc;

use super::clock::SimClock;
use super::config::SimConfig;
use super::fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
use super::rng::DeterministicRng;
use crate::catalog::InMemoryCatalog;
use crate::picker::{Picker, PickerConfig, PickerError};
use crate::storage::SimStorageBackend;

/// Picker wired to a simulation's storage and clock.
pub type SimPicker = Picker<SimStorageBackend, SimClock, InMemoryCatalog>;

// =============================================================================
// SimEnvironment
// =============================================================================

/// Everything a simulated test needs.
///
/// `storage` and every picker created here share `clock` and `faults`, so
/// advancing the clock or injecting a fault affects all of them.
#[derive(Debug)]
pub struct SimEnvironment {
    /// Configuration this run started from
    pub config: SimConfig,
    /// Simulated time
    pub clock: SimClock,
    /// Test-side randomness
    pub rng: DeterministicRng,
    /// Shared fault injector
    pub faults: Arc<FaultInjector>,
    /// Shared in-memory storage
    pub storage: SimStorageBackend,
}

impl SimEnvironment {
    /// Advance simulated time in milliseconds.
    pub fn advance_time_ms(&self, ms: u64) -> u64 {
        self.clock.advance_ms(ms)
    }

    /// Advance simulated time by whole days.
    pub fn advance_days(&self, days: u64) -> u64 {
        self.clock.advance_days(days)
    }

    /// Current simulated time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Build a picker on this environment's storage and clock.
    ///
    /// History already in `storage` is loaded, so a second picker sees the
    /// first one's selections.
    ///
    /// # Errors
    /// Returns `Config` for an invalid config, or `Storage` if loading
    /// history hits an injected fault.
    pub async fn create_picker(
        &mut self,
        config: PickerConfig,
        catalog: InMemoryCatalog,
    ) -> Result<SimPicker, PickerError> {
        Picker::builder()
            .with_config(config)
            .with_catalog(catalog)
            .with_storage(self.storage.clone())
            .with_clock(self.clock.clone())
            .with_rng(self.rng.fork())
            .build()
            .await
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// DST simulation harness.
///
/// # Example
///
/// ```rust
/// use pickme_core::catalog::{InMemoryCatalog, Item};
/// use pickme_core::dst::{SimConfig, Simulation};
/// use pickme_core::picker::{PickerConfig, PickerError};
///
/// # #[tokio::main]
/// # async fn main() {
/// let catalog = InMemoryCatalog::from_items(vec![
///     Item::new("1", "Essie", "Ballet Slippers", "creme", "Classics"),
///     Item::new("2", "Essie", "Mademoiselle", "creme", "Classics"),
/// ])
/// .unwrap();
///
/// Simulation::new(SimConfig::with_seed(42))
///     .run(|mut env| async move {
///         let mut picker = env.create_picker(PickerConfig::default(), catalog).await?;
///         let first = picker.pick().await?;
///         env.advance_days(1);
///         let second = picker.pick().await?;
///         assert_ne!(first, second);
///         Ok::<(), PickerError>(())
///     })
///     .await
///     .unwrap();
/// # }
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    fault_configs: Vec<FaultConfig>,
}

impl Simulation {
    /// Create a simulation with no faults.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            fault_configs: Vec::new(),
        }
    }

    /// Register a fault.
    #[must_use]
    pub fn with_fault(mut self, fault_config: FaultConfig) -> Self {
        self.fault_configs.push(fault_config);
        self
    }

    /// Write and read failures at `probability`.
    #[must_use]
    pub fn with_storage_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::StorageWriteFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageReadFail, probability))
    }

    /// Connection failures and timeouts at `probability`.
    #[must_use]
    pub fn with_db_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::DbConnectionFail, probability))
            .with_fault(FaultConfig::new(FaultType::DbQueryTimeout, probability))
    }

    /// Run `test_fn` against a fresh environment.
    ///
    /// # Errors
    /// Whatever `test_fn` returns.
    pub async fn run<F, Fut, E>(self, test_fn: F) -> Result<(), E>
    where
        F: FnOnce(SimEnvironment) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let seed = self.config.seed();
        let env = self.build();
        let result = test_fn(env).await;
        if result.is_err() {
            tracing::error!(seed, "simulation failed; rerun with DST_SEED={seed}");
        }
        result
    }

    /// Build the environment without running anything.
    #[must_use]
    pub fn build(self) -> SimEnvironment {
        let mut rng = DeterministicRng::new(self.config.seed());
        let clock = SimClock::new();

        let faults = Arc::new(
            self.fault_configs
                .into_iter()
                .fold(FaultInjectorBuilder::new(rng.fork()), FaultInjectorBuilder::with_fault)
                .build(),
        );
        let storage = SimStorageBackend::with_fault_injector(Arc::clone(&faults));

        SimEnvironment {
            config: self.config,
            clock,
            rng,
            faults,
            storage,
        }
    }
}

/// Simulation seeded explicitly, or from `DST_SEED`, or at random.
#[must_use]
pub fn create_simulation(seed: Option<u64>) -> Simulation {
    let config = match seed {
        Some(s) => SimConfig::with_seed(s),
        None => SimConfig::from_env_or_random(),
    };
    Simulation::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::selection::SelectionError;
    use crate::storage::StorageError;

    fn catalog(n: usize) -> InMemoryCatalog {
        InMemoryCatalog::from_items(
            (1..=n)
                .map(|i| Item::new(i.to_string(), "Essie", format!("Shade {i}"), "creme", "Classics"))
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_simulation_basic() {
        let sim = Simulation::new(SimConfig::with_seed(42));

        let result = sim
            .run(|env| async move {
                assert_eq!(env.now_ms(), 0);
                env.advance_time_ms(1000);
                assert_eq!(env.now_ms(), 1000);
                env.advance_days(1);
                assert_eq!(env.now_ms(), 1000 + 86_400_000);
                Ok::<(), String>(())
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_pickers_share_storage() {
        let mut env = Simulation::new(SimConfig::with_seed(42)).build();

        let mut first = env
            .create_picker(PickerConfig::default(), catalog(3))
            .await
            .unwrap();
        let picked = first.pick().await.unwrap();

        let second = env
            .create_picker(PickerConfig::default(), catalog(3))
            .await
            .unwrap();
        assert_eq!(second.ledger().len(), 1);
        assert!(second.eligible().iter().all(|item| **item != picked));
        assert_eq!(env.storage.selection_count().await, 1);
    }

    #[tokio::test]
    async fn test_write_faults_reach_picker() {
        let mut env = Simulation::new(SimConfig::with_seed(42))
            .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0))
            .build();

        let mut picker = env
            .create_picker(PickerConfig::default(), catalog(3))
            .await
            .unwrap();

        let err = picker.pick().await.unwrap_err();
        assert!(matches!(
            err,
            PickerError::Selection(SelectionError::Storage(StorageError::SimulatedFault { .. }))
        ));
        assert!(picker.ledger().is_empty());
        assert!(env.faults.total_injections() >= 1);
    }

    #[tokio::test]
    async fn test_db_faults_block_history_load() {
        let mut env = Simulation::new(SimConfig::with_seed(42))
            .with_db_faults(1.0)
            .build();

        let result = env.create_picker(PickerConfig::default(), catalog(3)).await;
        assert!(matches!(result, Err(PickerError::Storage(_))));
    }

    #[tokio::test]
    async fn test_same_seed_same_picks() {
        async fn picks(seed: u64) -> Vec<Item> {
            let mut env = Simulation::new(SimConfig::with_seed(seed)).build();
            let mut picker = env
                .create_picker(PickerConfig::default(), catalog(20))
                .await
                .unwrap();
            let mut picks = Vec::new();
            for _ in 0..10 {
                picks.push(picker.pick().await.unwrap());
                env.advance_days(1);
            }
            picks
        }

        assert_eq!(picks(7).await, picks(7).await);
    }

    #[test]
    fn test_create_simulation_with_seed() {
        let env = create_simulation(Some(12345)).build();
        assert_eq!(env.config.seed(), 12345);
    }
}
