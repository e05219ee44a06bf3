//! Storage Backend Trait
//!
//! TigerStyle: Abstract interface for the append-only picker log.
//!
//! # Contract
//!
//! - Appends are durable before they return. No silent buffering.
//! - A failed append leaves nothing behind.
//! - Reads see every append that returned `Ok`, in append order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StorageResult;
use super::record::{FlatVoteRow, VoteFilter};
use crate::history::SelectionEvent;
use crate::matchup::Vote;

/// Persistence collaborator for selection events and votes.
///
/// TigerStyle: All operations are async, return explicit errors.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Append one selection event.
    async fn append_selection_event(&self, event: &SelectionEvent) -> StorageResult<()>;

    /// Append one vote as a single atomic write.
    async fn append_vote(&self, vote: &Vote) -> StorageResult<()>;

    /// Votes matching the filter, oldest first. `None` returns all votes.
    async fn query_votes(&self, filter: Option<&VoteFilter>) -> StorageResult<Vec<Vote>>;

    /// Selection events at or after `since`, oldest first.
    async fn query_recent_selections(
        &self,
        since: DateTime<Utc>,
    ) -> StorageResult<Vec<SelectionEvent>>;

    /// Every selection event, oldest first.
    async fn list_selections(&self) -> StorageResult<Vec<SelectionEvent>>;

    /// Votes as stored: one flat row per candidate.
    async fn list_vote_rows(&self) -> StorageResult<Vec<FlatVoteRow>>;

    /// Remove everything.
    ///
    /// Primarily for testing.
    async fn clear(&self) -> StorageResult<()>;
}
