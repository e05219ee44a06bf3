//! Property-Based Testing for DST
//!
//! TigerStyle: Random operation sequences with invariant checking.
//!
//! The runner generates operations from the state, applies them, moves the
//! simulated clock forward between steps and checks invariants after each
//! one. A failing run reports its seed so it can be replayed exactly.
//!
//! # Example
//!
//! ```rust,ignore
//! use pickme_core::dst::{PropertyTest, PropertyTestable, SimClock, DeterministicRng};
//!
//! struct Counter { value: i64, max: i64 }
//!
//! #[derive(Debug, Clone)]
//! enum CounterOp { Increment(i64), Reset }
//!
//! impl PropertyTestable for Counter {
//!     type Operation = CounterOp;
//!
//!     fn generate_operation(&self, rng: &mut DeterministicRng) -> Self::Operation {
//!         match rng.next_usize(0, 1) {
//!             0 => CounterOp::Increment(rng.next_usize(1, 10) as i64),
//!             _ => CounterOp::Reset,
//!         }
//!     }
//!
//!     fn apply_operation(&mut self, op: &Self::Operation, _clock: &SimClock) {
//!         match op {
//!             CounterOp::Increment(n) => self.value = (self.value + n).min(self.max),
//!             CounterOp::Reset => self.value = 0,
//!         }
//!     }
//!
//!     fn check_invariants(&self) -> Result<(), String> {
//!         if self.value > self.max {
//!             return Err(format!("value {} above max {}", self.value, self.max));
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use std::fmt::Debug;

use super::clock::SimClock;
use super::rng::DeterministicRng;
use crate::constants::DST_SIMULATION_STEPS_MAX;

/// Trait for systems that can be property-tested.
pub trait PropertyTestable {
    /// The type of operations that can be performed.
    type Operation: Debug + Clone;

    /// Generate a random operation based on current state.
    fn generate_operation(&self, rng: &mut DeterministicRng) -> Self::Operation;

    /// Apply an operation to the state.
    ///
    /// The clock is the one the runner advances between operations.
    fn apply_operation(&mut self, op: &Self::Operation, clock: &SimClock);

    /// Check that all invariants hold.
    ///
    /// # Errors
    /// Returns a description of the first violated invariant.
    fn check_invariants(&self) -> Result<(), String>;

    /// Describe the current state for debugging.
    fn describe_state(&self) -> String {
        String::from("(state description not implemented)")
    }
}

/// Result of a property test run.
#[derive(Debug)]
pub struct PropertyTestResult {
    /// Number of operations successfully executed
    pub operations_executed: u64,
    /// Seed used for reproduction
    pub seed: u64,
    /// Failure details, if any
    pub failure: Option<PropertyTestFailure>,
}

impl PropertyTestResult {
    /// Check if the test passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Unwrap the result, panicking with details if failed.
    ///
    /// # Panics
    /// Panics if the test failed, with reproduction info.
    pub fn unwrap(self) {
        if let Some(failure) = self.failure {
            panic!(
                "Property test failed!\n\
                 Seed: {} (use this to reproduce)\n\
                 Operation #{}: {}\n\
                 Invariant violation: {}\n\
                 State: {}",
                self.seed,
                failure.operation_index,
                failure.operation,
                failure.message,
                failure.state_description
            );
        }
    }
}

/// Details of a property test failure.
#[derive(Debug)]
pub struct PropertyTestFailure {
    /// Index of the failing operation (0-based)
    pub operation_index: u64,
    /// The operation that caused the failure
    pub operation: String,
    /// The invariant violation message
    pub message: String,
    /// Description of the state at failure
    pub state_description: String,
}

/// Configuration for time advancement during property tests.
#[derive(Debug, Clone)]
pub struct TimeAdvanceConfig {
    /// Minimum time to advance per operation (ms)
    pub min_ms: u64,
    /// Maximum time to advance per operation (ms)
    pub max_ms: u64,
    /// Probability of advancing time (0.0 to 1.0)
    pub probability: f64,
}

impl Default for TimeAdvanceConfig {
    fn default() -> Self {
        Self {
            min_ms: 0,
            max_ms: 1000,
            probability: 0.5,
        }
    }
}

impl TimeAdvanceConfig {
    /// No time advancement.
    #[must_use]
    pub fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
            probability: 0.0,
        }
    }

    /// Advance with given range and probability.
    ///
    /// # Panics
    /// Panics if the range is inverted or the probability is outside [0, 1].
    #[must_use]
    pub fn random(min_ms: u64, max_ms: u64, probability: f64) -> Self {
        assert!((0.0..=1.0).contains(&probability), "probability must be in [0, 1]");
        assert!(min_ms <= max_ms, "min_ms must be <= max_ms");
        Self {
            min_ms,
            max_ms,
            probability,
        }
    }
}

/// Property-based test runner.
///
/// TigerStyle:
/// - Deterministic via seed
/// - Explicit operation count limits
/// - Invariant checking after each operation
/// - Time advancement control
#[derive(Debug)]
pub struct PropertyTest {
    seed: u64,
    max_operations: u64,
    time_config: TimeAdvanceConfig,
    clock: SimClock,
}

impl PropertyTest {
    /// Create a new property test with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_operations: 100,
            time_config: TimeAdvanceConfig::default(),
            clock: SimClock::new(),
        }
    }

    /// Set the maximum number of operations to run.
    ///
    /// # Panics
    /// Panics if max exceeds DST_SIMULATION_STEPS_MAX.
    #[must_use]
    pub fn with_max_operations(mut self, max: u64) -> Self {
        assert!(
            max <= DST_SIMULATION_STEPS_MAX,
            "max_operations {} exceeds DST_SIMULATION_STEPS_MAX {}",
            max,
            DST_SIMULATION_STEPS_MAX
        );
        self.max_operations = max;
        self
    }

    /// Configure time advancement between operations.
    #[must_use]
    pub fn with_time_advance(mut self, config: TimeAdvanceConfig) -> Self {
        self.time_config = config;
        self
    }

    /// Drive the given clock instead of a private one.
    ///
    /// Use this when the state under test already holds a `SimClock`.
    #[must_use]
    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    /// Run the property test.
    #[must_use]
    pub fn run<T: PropertyTestable>(self, mut state: T) -> PropertyTestResult {
        let mut rng = DeterministicRng::new(self.seed);

        if let Err(msg) = state.check_invariants() {
            return PropertyTestResult {
                operations_executed: 0,
                seed: self.seed,
                failure: Some(PropertyTestFailure {
                    operation_index: 0,
                    operation: "(initial state)".to_string(),
                    message: format!("Initial state violates invariants: {}", msg),
                    state_description: state.describe_state(),
                }),
            };
        }

        for i in 0..self.max_operations {
            if self.time_config.probability > 0.0 && rng.next_bool(self.time_config.probability) {
                let advance = if self.time_config.min_ms == self.time_config.max_ms {
                    self.time_config.min_ms
                } else {
                    let span = self.time_config.max_ms - self.time_config.min_ms;
                    self.time_config.min_ms + rng.next_u64() % (span + 1)
                };
                self.clock.advance_ms(advance);
            }

            let op = state.generate_operation(&mut rng);
            let op_debug = format!("{:?}", op);
            state.apply_operation(&op, &self.clock);

            if let Err(msg) = state.check_invariants() {
                return PropertyTestResult {
                    operations_executed: i + 1,
                    seed: self.seed,
                    failure: Some(PropertyTestFailure {
                        operation_index: i,
                        operation: op_debug,
                        message: msg,
                        state_description: state.describe_state(),
                    }),
                };
            }
        }

        PropertyTestResult {
            operations_executed: self.max_operations,
            seed: self.seed,
            failure: None,
        }
    }

    /// Run the property test, panicking on failure.
    ///
    /// # Panics
    /// Panics if any invariant is violated.
    pub fn run_and_assert<T: PropertyTestable>(self, state: T) {
        self.run(state).unwrap();
    }
}

/// Run property tests over several seeds, building fresh state per seed.
///
/// The factory receives the seed and the clock the runner will advance.
///
/// # Panics
/// Panics if any test fails.
pub fn run_property_tests<T, F>(seeds: &[u64], max_operations: u64, state_factory: F)
where
    T: PropertyTestable,
    F: Fn(u64, SimClock) -> T,
{
    for &seed in seeds {
        let clock = SimClock::new();
        let state = state_factory(seed, clock.clone());
        PropertyTest::new(seed)
            .with_max_operations(max_operations)
            .with_clock(clock)
            .run_and_assert(state);
    }
}

/// Generate a set of test seeds including edge cases.
///
/// Returns seeds: [0, 1, 42, random, random, ...]
///
/// # Panics
/// Panics if `count < 3`.
#[must_use]
pub fn test_seeds(count: usize) -> Vec<u64> {
    assert!(count >= 3, "need at least 3 seeds for edge cases");

    let mut seeds = vec![0, 1, 42];
    let mut rng = DeterministicRng::from_entropy();
    while seeds.len() < count {
        seeds.push(rng.next_u64());
    }

    seeds
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tracks the last time it was touched; the clock must never run backwards.
    struct Stamp {
        last_ms: u64,
        ticks: u64,
    }

    #[derive(Debug, Clone)]
    enum StampOp {
        Touch,
        Noop,
    }

    impl PropertyTestable for Stamp {
        type Operation = StampOp;

        fn generate_operation(&self, rng: &mut DeterministicRng) -> Self::Operation {
            if rng.next_bool(0.7) {
                StampOp::Touch
            } else {
                StampOp::Noop
            }
        }

        fn apply_operation(&mut self, op: &Self::Operation, clock: &SimClock) {
            if let StampOp::Touch = op {
                assert!(clock.now_ms() >= self.last_ms);
                self.last_ms = clock.now_ms();
                self.ticks += 1;
            }
        }

        fn check_invariants(&self) -> Result<(), String> {
            if self.ticks > 0 && self.last_ms == u64::MAX {
                return Err("clock overflowed".to_string());
            }
            Ok(())
        }
    }

    struct AlwaysBroken;

    impl PropertyTestable for AlwaysBroken {
        type Operation = ();

        fn generate_operation(&self, _rng: &mut DeterministicRng) -> Self::Operation {}

        fn apply_operation(&mut self, _op: &Self::Operation, _clock: &SimClock) {}

        fn check_invariants(&self) -> Result<(), String> {
            Err("broken".to_string())
        }
    }

    #[test]
    fn test_property_test_success() {
        let result = PropertyTest::new(42)
            .with_max_operations(500)
            .with_time_advance(TimeAdvanceConfig::random(0, 10_000, 0.8))
            .run(Stamp {
                last_ms: 0,
                ticks: 0,
            });

        assert!(result.is_success());
        assert_eq!(result.operations_executed, 500);
    }

    #[test]
    fn test_property_test_reports_initial_failure() {
        let result = PropertyTest::new(7).run(AlwaysBroken);

        assert!(!result.is_success());
        assert_eq!(result.operations_executed, 0);
        assert_eq!(result.seed, 7);
    }

    #[test]
    fn test_with_clock_advances_shared_clock() {
        let clock = SimClock::new();
        let _ = PropertyTest::new(1)
            .with_max_operations(10)
            .with_time_advance(TimeAdvanceConfig::random(100, 100, 1.0))
            .with_clock(clock.clone())
            .run(Stamp {
                last_ms: 0,
                ticks: 0,
            });

        assert_eq!(clock.now_ms(), 1000);
    }

    #[test]
    fn test_seeds_include_edge_cases() {
        let seeds = test_seeds(5);
        assert_eq!(seeds.len(), 5);
        assert_eq!(&seeds[..3], &[0, 1, 42]);
    }
}
