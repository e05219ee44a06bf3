//! DST - Deterministic Simulation Testing
//!
//! TigerBeetle/FoundationDB-style deterministic simulation testing.
//!
//! One seed fixes everything random: which item is picked, which candidates
//! a matchup draws, and when storage fails. Time only moves when a test
//! moves it.
//!
//! # Usage
//!
//! ```rust
//! use pickme_core::dst::{FaultConfig, FaultType, SimConfig, Simulation};
//! use pickme_core::storage::StorageBackend;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let env = Simulation::new(SimConfig::with_seed(42))
//!     .with_fault(FaultConfig::new(FaultType::StorageReadFail, 1.0))
//!     .build();
//!
//! assert!(env.storage.list_selections().await.is_err());
//! # }
//! ```
//!
//! Run with an explicit seed for reproducibility:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

mod clock;
mod config;
mod fault;
mod property;
mod rng;
mod simulation;

pub use clock::SimClock;
pub use config::{SimConfig, DST_SEED_ENV};
pub use fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
pub use property::{
    run_property_tests, test_seeds, PropertyTest, PropertyTestFailure, PropertyTestResult,
    PropertyTestable, TimeAdvanceConfig,
};
pub use rng::DeterministicRng;
pub use simulation::{create_simulation, SimEnvironment, SimPicker, Simulation};
