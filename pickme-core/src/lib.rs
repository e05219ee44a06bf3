//! # Pickme
//!
//! Picks what to wear from a personal catalog, asks which of a few items you
//! prefer, and reports which attributes keep winning.
//!
//! ## Features
//!
//! - **Daily pick**: uniform random choice among items not selected within the cooldown window
//! - **Deviations**: record what was actually used; it starts its own cooldown
//! - **Matchups**: draw a few distinct items, record a winner or "no preference"
//! - **Statistics**: appearances, wins and win rate per brand, shade, finish or collection
//! - **Deterministic Testing**: seeded RNG, simulated clock and injected storage faults
//! - **Persistence**: in-memory for tests, `PostgreSQL` behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use pickme_core::catalog::{Dimension, InMemoryCatalog};
//! use pickme_core::matchup::Decision;
//! use pickme_core::picker::Picker;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = InMemoryCatalog::from_json_str(r#"[
//!     {"number": "1", "brand": "Essie", "shade_name": "Ballet Slippers", "finish": "creme", "collection": "Classics"},
//!     {"number": "2", "brand": "Essie", "shade_name": "Mademoiselle", "finish": "creme", "collection": "Classics"},
//!     {"number": "3", "brand": "OPI", "shade_name": "Bubble Bath", "finish": "sheer", "collection": "Core"},
//!     {"number": "4", "brand": "OPI", "shade_name": "Big Apple Red", "finish": "creme", "collection": "Core"},
//!     {"number": "5", "brand": "Zoya", "shade_name": "Storm", "finish": "holo", "collection": "Winter"}
//! ]"#)?;
//!
//! let mut picker = Picker::sim(42, catalog);
//!
//! let today = picker.pick().await?;
//! println!("today: {today}");
//!
//! let mut matchup = picker.draft_matchup()?;
//! let favourite = matchup.candidates()[2].key();
//! picker.submit(&mut matchup, Decision::Winner(favourite)).await?;
//!
//! for stat in picker.summarize(Dimension::Brand).await? {
//!     println!("{}: {}/{}", stat.value, stat.wins, stat.appearances);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         Picker                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ SelectionEngine │ MatchupEngine │ StatisticsAggregator  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Catalog (read-only)      │ HistoryLedger (in memory)    │
//! ├─────────────────────────────────────────────────────────┤
//! │ StorageBackend           │ Sim / PostgreSQL             │
//! ├─────────────────────────────────────────────────────────┤
//! │ DST Framework            │ Clock, RNG, fault injection  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Simulation-First Philosophy
//!
//! > "If you're not testing with fault injection, you're not testing."
//!
//! ```rust
//! use pickme_core::dst::{FaultConfig, FaultType, SimConfig, Simulation};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let sim = Simulation::new(SimConfig::with_seed(42))
//!     .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 0.1));
//!
//! sim.run(|env| async move {
//!     // Same seed = same picks = same faults
//!     env.advance_days(1);
//!     Ok::<_, anyhow::Error>(())
//! })
//! .await
//! .unwrap();
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `postgres` - `PostgreSQL` storage backend

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod clock;
pub mod constants;
pub mod dst;
pub mod history;
pub mod matchup;
pub mod picker;
pub mod selection;
pub mod stats;
pub mod storage;
pub mod telemetry;

// Re-export common types
pub use catalog::{Catalog, CatalogError, Dimension, InMemoryCatalog, Item, ItemKey};
pub use clock::{Clock, SystemClock};
pub use dst::{
    create_simulation, run_property_tests, test_seeds, DeterministicRng, FaultConfig,
    FaultInjector, FaultType, PropertyTest, PropertyTestFailure, PropertyTestResult,
    PropertyTestable, SimClock, SimConfig, SimEnvironment, Simulation, TimeAdvanceConfig,
};
pub use history::{HistoryFilter, HistoryLedger, SelectionEvent};
pub use matchup::{Decision, Matchup, MatchupEngine, MatchupError, MatchupState, Vote};
pub use picker::{Picker, PickerBuilder, PickerConfig, PickerError};
pub use selection::{SelectionEngine, SelectionError};
pub use stats::{PopularItem, Statistic, StatisticsAggregator, UsageJourney};
pub use storage::{SimStorageBackend, StorageBackend, StorageError, StorageResult};

#[cfg(feature = "postgres")]
pub use storage::PostgresBackend;

pub use telemetry::{init_logging, LogFormat, LoggingConfig};
