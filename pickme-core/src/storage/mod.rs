//! Storage - Backend Trait and Implementations
//!
//! TigerStyle: Abstract storage with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    StorageBackend Trait                      │
//! └─────────────────────────────────────────────────────────────┘
//!                   ↑                          ↑
//!                   │                          │
//!          ┌────────┴────────┐        ┌────────┴────────┐
//!          │SimStorageBackend│        │ PostgresBackend │
//!          │   (testing)     │        │   (server)      │
//!          └─────────────────┘        └─────────────────┘
//! ```
//!
//! Both backends keep votes as flat rows (one per candidate) and rebuild
//! them with [`FlatVoteRow::reconstruct`] on read.

mod backend;
mod error;
mod record;
mod sim;

#[cfg(feature = "postgres")]
mod postgres;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use record::{FlatVoteRow, VoteFilter};
pub use sim::SimStorageBackend;

#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;
