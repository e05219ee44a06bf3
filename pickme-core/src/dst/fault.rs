//! FaultInjector - Probabilistic Fault Injection
//!
//! TigerStyle: Explicit fault injection for the persistence collaborator.
//! Appends that fail must leave no vote or selection behind, and the engines
//! must surface the failure rather than retry it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::rng::DeterministicRng;
use crate::constants::DST_FAULT_PROBABILITY_MAX;

/// Types of faults that can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    /// Append (selection event or vote) fails
    StorageWriteFail,
    /// Query fails
    StorageReadFail,
    /// Disk full error on append
    StorageDiskFull,
    /// Database connection fails
    DbConnectionFail,
    /// Database query times out
    DbQueryTimeout,
}

impl FaultType {
    /// Get the fault type name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageWriteFail => "storage_write_fail",
            Self::StorageReadFail => "storage_read_fail",
            Self::StorageDiskFull => "storage_disk_full",
            Self::DbConnectionFail => "db_connection_fail",
            Self::DbQueryTimeout => "db_query_timeout",
        }
    }

    /// Whether this fault can hit the named operation.
    ///
    /// Write faults hit `append_*` operations, read faults hit `query_*` and
    /// `list_*`, database faults hit everything.
    #[must_use]
    pub fn applies_to(&self, operation: &str) -> bool {
        match self {
            Self::StorageWriteFail | Self::StorageDiskFull => operation.starts_with("append"),
            Self::StorageReadFail => {
                operation.starts_with("query") || operation.starts_with("list")
            }
            Self::DbConnectionFail | Self::DbQueryTimeout => true,
        }
    }
}

impl std::fmt::Display for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a specific fault.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// The type of fault
    pub fault_type: FaultType,
    /// Probability of injection (0.0 to 1.0)
    pub probability: f64,
    /// Optional operation filter (substring match)
    pub operation_filter: Option<String>,
    /// Maximum number of injections (None = unlimited)
    pub max_injections: Option<u64>,
}

impl FaultConfig {
    /// Create a new fault configuration.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        // Precondition
        assert!(
            (0.0..=DST_FAULT_PROBABILITY_MAX).contains(&probability),
            "probability must be in [0, {}], got {}",
            DST_FAULT_PROBABILITY_MAX,
            probability
        );

        Self {
            fault_type,
            probability,
            operation_filter: None,
            max_injections: None,
        }
    }

    /// Set operation filter (fault only applies to matching operations).
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Set maximum number of injections.
    ///
    /// # Panics
    /// Panics if `max` is zero.
    #[must_use]
    pub fn with_max_injections(mut self, max: u64) -> Self {
        assert!(max > 0, "max_injections must be positive");
        self.max_injections = Some(max);
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fault injector shared between the simulation harness and sim backends.
///
/// TigerStyle: Interior mutability so `should_inject` works through `Arc`.
#[derive(Debug)]
pub struct FaultInjector {
    rng: Mutex<DeterministicRng>,
    configs: Vec<FaultConfig>,
    injections: HashMap<FaultType, AtomicU64>,
}

impl FaultInjector {
    /// Create a new fault injector with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            configs: Vec::new(),
            injections: HashMap::new(),
        }
    }

    /// Register a fault configuration.
    ///
    /// Registration must happen before the injector is shared via `Arc`.
    pub fn register(&mut self, config: FaultConfig) {
        self.injections
            .entry(config.fault_type)
            .or_insert_with(|| AtomicU64::new(0));
        self.configs.push(config);
    }

    /// Check if a fault should be injected for the given operation.
    ///
    /// Returns the fault type if one should be injected, None otherwise.
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        for config in &self.configs {
            if !config.fault_type.applies_to(operation) {
                continue;
            }
            if let Some(ref filter) = config.operation_filter {
                if !operation.contains(filter.as_str()) {
                    continue;
                }
            }

            let counter = self.injections.get(&config.fault_type)?;
            if let Some(max) = config.max_injections {
                if counter.load(Ordering::Relaxed) >= max {
                    continue;
                }
            }

            if lock(&self.rng).next_bool(config.probability) {
                counter.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(fault = %config.fault_type, operation, "injecting fault");
                return Some(config.fault_type);
            }
        }

        None
    }

    /// Number of injections per fault type.
    #[must_use]
    pub fn injection_stats(&self) -> HashMap<String, u64> {
        self.injections
            .iter()
            .map(|(fault_type, count)| {
                (
                    fault_type.as_str().to_string(),
                    count.load(Ordering::Relaxed),
                )
            })
            .collect()
    }

    /// Get total number of injections.
    #[must_use]
    pub fn total_injections(&self) -> u64 {
        self.injections
            .values()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }
}

/// Builder for FaultInjector.
///
/// TigerStyle: Configure everything before sharing via Arc.
#[derive(Debug)]
pub struct FaultInjectorBuilder {
    rng: DeterministicRng,
    configs: Vec<FaultConfig>,
}

impl FaultInjectorBuilder {
    /// Create a new builder with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng,
            configs: Vec::new(),
        }
    }

    /// Add a fault configuration.
    #[must_use]
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Add common storage faults.
    #[must_use]
    pub fn with_storage_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::StorageWriteFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageReadFail, probability))
    }

    /// Build the FaultInjector.
    #[must_use]
    pub fn build(self) -> FaultInjector {
        let mut injector = FaultInjector::new(self.rng);
        for config in self.configs {
            injector.register(config);
        }
        injector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_faults_registered() {
        let injector = FaultInjector::new(DeterministicRng::new(42));

        for _ in 0..100 {
            assert!(injector.should_inject("append_vote").is_none());
        }
        assert_eq!(injector.total_injections(), 0);
    }

    #[test]
    fn test_fault_applies_to_operation_class() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0));

        assert!(injector.should_inject("query_votes").is_none());
        assert!(injector.should_inject("list_selections").is_none());
        assert_eq!(
            injector.should_inject("append_selection_event"),
            Some(FaultType::StorageWriteFail)
        );
        assert!(FaultType::DbConnectionFail.applies_to("query_votes"));
        assert!(FaultType::StorageReadFail.applies_to("list_vote_rows"));
    }

    #[test]
    fn test_always_inject() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0));

        for _ in 0..10 {
            assert_eq!(
                injector.should_inject("append_vote"),
                Some(FaultType::StorageWriteFail)
            );
        }
        assert_eq!(injector.total_injections(), 10);
    }

    #[test]
    fn test_never_inject() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 0.0));

        for _ in 0..100 {
            assert!(injector.should_inject("append_vote").is_none());
        }
    }

    #[test]
    fn test_operation_filter() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(
            FaultConfig::new(FaultType::StorageWriteFail, 1.0).with_filter("append_vote"),
        );

        assert!(injector.should_inject("append_selection_event").is_none());
        assert_eq!(
            injector.should_inject("append_vote"),
            Some(FaultType::StorageWriteFail)
        );
    }

    #[test]
    fn test_max_injections() {
        let mut injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageReadFail, 1.0).with_max_injections(2));

        assert!(injector.should_inject("query_votes").is_some());
        assert!(injector.should_inject("query_votes").is_some());
        assert!(injector.should_inject("query_votes").is_none());
        assert_eq!(injector.injection_stats()["storage_read_fail"], 2);
    }

    #[test]
    fn test_builder() {
        let injector = FaultInjectorBuilder::new(DeterministicRng::new(1))
            .with_storage_faults(1.0)
            .build();

        assert_eq!(
            injector.should_inject("append_vote"),
            Some(FaultType::StorageWriteFail)
        );
        assert_eq!(
            injector.should_inject("query_votes"),
            Some(FaultType::StorageReadFail)
        );
    }

    #[test]
    #[should_panic(expected = "probability must be in")]
    fn test_invalid_probability() {
        let _ = FaultConfig::new(FaultType::StorageWriteFail, 1.5);
    }
}
