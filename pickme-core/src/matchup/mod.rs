//! Matchup - Multi-Item Preference Votes
//!
//! `TigerStyle`: Explicit state machine, validate before any append.
//!
//! # States
//!
//! ```text
//! Drafting ──draft()──► AwaitingVote ──submit()──► Recorded
//!                            │
//!                            └──abandon()──► Abandoned
//! ```
//!
//! Drafting happens inside [`MatchupEngine::draft`] and ignores cooldowns.
//! `Recorded` and `Abandoned` are terminal. Only `submit` touches storage,
//! with exactly one `append_vote`.

mod vote;

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, Item, ItemKey};
use crate::clock::Clock;
use crate::constants::{MATCHUP_SIZE_COUNT_DEFAULT, MATCHUP_SIZE_COUNT_MAX, MATCHUP_SIZE_COUNT_MIN};
use crate::dst::DeterministicRng;
use crate::storage::{StorageBackend, StorageError};

pub use vote::Vote;

// =============================================================================
// Errors
// =============================================================================

/// Errors from the matchup engine.
#[derive(Debug, Error)]
pub enum MatchupError {
    /// Catalog is smaller than the matchup
    #[error("catalog has {available} items, matchup needs {required}")]
    InsufficientCatalog {
        /// Matchup size
        required: usize,
        /// Catalog size
        available: usize,
    },

    /// Winner is not one of the candidates
    #[error("winner {key} is not a candidate")]
    InvalidWinner {
        /// Rejected key
        key: ItemKey,
    },

    /// Matchup size outside the supported range
    #[error("matchup size {size} outside {min}..={max}")]
    InvalidSize {
        /// Requested size
        size: usize,
        /// Smallest allowed
        min: usize,
        /// Largest allowed
        max: usize,
    },

    /// Matchup already left `AwaitingVote`
    #[error("matchup {id} is already {state}")]
    AlreadyClosed {
        /// Matchup id
        id: Uuid,
        /// State it is in
        state: MatchupState,
    },

    /// Persistence failed; the matchup is still awaiting a vote
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// =============================================================================
// Matchup
// =============================================================================

/// Lifecycle state of a drafted matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupState {
    /// Shown to the judge, no decision yet
    AwaitingVote,
    /// Vote persisted
    Recorded,
    /// Judge left without deciding
    Abandoned,
}

impl MatchupState {
    /// State name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingVote => "awaiting_vote",
            Self::Recorded => "recorded",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for MatchupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The judge's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// This candidate is preferred
    Winner(ItemKey),
    /// None stood out; every candidate still gets an appearance
    NoPreference,
}

/// A set of distinct candidates awaiting a decision.
#[derive(Debug, Clone)]
pub struct Matchup {
    id: Uuid,
    candidates: Vec<Item>,
    state: MatchupState,
    drafted_at: DateTime<Utc>,
}

impl Matchup {
    /// Matchup id, reused as the vote id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Candidates in display order.
    #[must_use]
    pub fn candidates(&self) -> &[Item] {
        &self.candidates
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> MatchupState {
        self.state
    }

    /// When the candidates were drawn.
    #[must_use]
    pub fn drafted_at(&self) -> DateTime<Utc> {
        self.drafted_at
    }

    /// Position of a candidate.
    #[must_use]
    pub fn position_of(&self, key: &ItemKey) -> Option<usize> {
        self.candidates.iter().position(|item| &item.key() == key)
    }

    fn ensure_open(&self) -> Result<(), MatchupError> {
        if self.state == MatchupState::AwaitingVote {
            Ok(())
        } else {
            Err(MatchupError::AlreadyClosed {
                id: self.id,
                state: self.state,
            })
        }
    }
}

// =============================================================================
// MatchupEngine
// =============================================================================

/// Drafts matchups and records their votes.
#[derive(Debug)]
pub struct MatchupEngine<S: StorageBackend, K: Clock> {
    storage: S,
    clock: K,
    size: usize,
}

impl<S: StorageBackend, K: Clock> MatchupEngine<S, K> {
    /// Create an engine drafting `MATCHUP_SIZE_COUNT_DEFAULT` candidates.
    #[must_use]
    pub fn new(storage: S, clock: K) -> Self {
        Self {
            storage,
            clock,
            size: MATCHUP_SIZE_COUNT_DEFAULT,
        }
    }

    /// Set the number of candidates per matchup.
    ///
    /// # Errors
    /// Returns `InvalidSize` outside `MATCHUP_SIZE_COUNT_MIN..=MATCHUP_SIZE_COUNT_MAX`.
    pub fn with_size(mut self, size: usize) -> Result<Self, MatchupError> {
        if !(MATCHUP_SIZE_COUNT_MIN..=MATCHUP_SIZE_COUNT_MAX).contains(&size) {
            return Err(MatchupError::InvalidSize {
                size,
                min: MATCHUP_SIZE_COUNT_MIN,
                max: MATCHUP_SIZE_COUNT_MAX,
            });
        }
        self.size = size;
        Ok(self)
    }

    /// Candidates per matchup.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Draw `size` distinct items without replacement.
    ///
    /// # Errors
    /// Returns `InsufficientCatalog` if the catalog has fewer than `size` items.
    #[tracing::instrument(skip(self, catalog, rng), fields(size = self.size))]
    pub fn draft<C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        rng: &mut DeterministicRng,
    ) -> Result<Matchup, MatchupError> {
        let items = catalog.list_items();
        if items.len() < self.size {
            tracing::warn!(available = items.len(), "catalog too small for matchup");
            return Err(MatchupError::InsufficientCatalog {
                required: self.size,
                available: items.len(),
            });
        }

        let candidates: Vec<Item> = rng
            .sample_indices(items.len(), self.size)
            .into_iter()
            .map(|index| items[index].clone())
            .collect();

        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&rng.next_u64().to_le_bytes());
        bytes[8..].copy_from_slice(&rng.next_u64().to_le_bytes());
        let id = uuid::Builder::from_random_bytes(bytes).into_uuid();

        tracing::debug!(matchup_id = %id, "drafted matchup");

        // Postcondition
        assert_eq!(candidates.len(), self.size, "matchup must have exactly size candidates");

        Ok(Matchup {
            id,
            candidates,
            state: MatchupState::AwaitingVote,
            drafted_at: self.clock.now(),
        })
    }

    /// Record the judge's decision as one vote.
    ///
    /// The winner is checked before anything is written. On a storage error
    /// the matchup stays `AwaitingVote` so the same decision can be resent.
    ///
    /// # Errors
    /// - `AlreadyClosed` if the matchup is not awaiting a vote
    /// - `InvalidWinner` if the winner is not a candidate (nothing persisted)
    /// - `Storage` if the append fails
    #[tracing::instrument(skip(self, matchup, decision), fields(matchup_id = %matchup.id()))]
    pub async fn submit(
        &self,
        matchup: &mut Matchup,
        decision: Decision,
    ) -> Result<Vote, MatchupError> {
        matchup.ensure_open()?;

        let winner_index = match decision {
            Decision::Winner(key) => match matchup.position_of(&key) {
                Some(index) => Some(index),
                None => {
                    tracing::warn!(winner = %key, "rejected winner outside candidates");
                    return Err(MatchupError::InvalidWinner { key });
                }
            },
            Decision::NoPreference => None,
        };

        let vote = Vote::new(
            matchup.id,
            matchup.candidates.clone(),
            winner_index,
            self.clock.now(),
        );
        self.storage.append_vote(&vote).await?;
        matchup.state = MatchupState::Recorded;

        tracing::info!(
            winner = vote.winner().map(|w| w.key().to_string()),
            "vote recorded"
        );
        Ok(vote)
    }

    /// Close the matchup without a vote. Not an error; nothing is persisted.
    ///
    /// # Errors
    /// Returns `AlreadyClosed` if the matchup is not awaiting a vote.
    pub fn abandon(&self, matchup: &mut Matchup) -> Result<(), MatchupError> {
        matchup.ensure_open()?;
        matchup.state = MatchupState::Abandoned;
        tracing::debug!(matchup_id = %matchup.id, "matchup abandoned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::dst::{FaultConfig, FaultType, SimClock, SimConfig};
    use crate::storage::SimStorageBackend;
    use std::collections::HashSet;

    fn catalog(n: usize) -> InMemoryCatalog {
        let items = (0..n)
            .map(|i| Item::new(i.to_string(), "Essie", format!("Shade {i}"), "creme", "Classics"))
            .collect();
        InMemoryCatalog::from_items(items).unwrap()
    }

    fn engine(storage: SimStorageBackend) -> MatchupEngine<SimStorageBackend, SimClock> {
        MatchupEngine::new(storage, SimClock::at_ms(1_700_000_000_000))
    }

    #[test]
    fn test_draft_distinct_candidates() {
        let engine = engine(SimStorageBackend::new(SimConfig::with_seed(42)));
        let catalog = catalog(20);
        let mut rng = DeterministicRng::new(42);

        for _ in 0..50 {
            let matchup = engine.draft(&catalog, &mut rng).unwrap();
            let keys: HashSet<ItemKey> = matchup.candidates().iter().map(Item::key).collect();
            assert_eq!(keys.len(), MATCHUP_SIZE_COUNT_DEFAULT);
            assert_eq!(matchup.state(), MatchupState::AwaitingVote);
        }
    }

    #[test]
    fn test_draft_is_deterministic() {
        let engine = engine(SimStorageBackend::new(SimConfig::with_seed(42)));
        let catalog = catalog(20);

        let a = engine.draft(&catalog, &mut DeterministicRng::new(5)).unwrap();
        let b = engine.draft(&catalog, &mut DeterministicRng::new(5)).unwrap();

        assert_eq!(a.id(), b.id());
        assert_eq!(a.candidates(), b.candidates());
    }

    #[test]
    fn test_draft_insufficient_catalog() {
        let engine = engine(SimStorageBackend::new(SimConfig::with_seed(42)));

        let err = engine
            .draft(&catalog(4), &mut DeterministicRng::new(1))
            .unwrap_err();
        assert!(matches!(
            err,
            MatchupError::InsufficientCatalog { required: 5, available: 4 }
        ));
    }

    #[test]
    fn test_with_size_bounds() {
        let storage = SimStorageBackend::new(SimConfig::with_seed(42));
        assert!(engine(storage.clone()).with_size(1).is_err());
        assert!(engine(storage.clone()).with_size(MATCHUP_SIZE_COUNT_MAX + 1).is_err());
        assert_eq!(engine(storage).with_size(3).unwrap().size(), 3);
    }

    #[tokio::test]
    async fn test_submit_winner() {
        let storage = SimStorageBackend::new(SimConfig::with_seed(42));
        let engine = engine(storage.clone());
        let mut matchup = engine.draft(&catalog(10), &mut DeterministicRng::new(1)).unwrap();
        let winner = matchup.candidates()[3].key();

        let vote = engine
            .submit(&mut matchup, Decision::Winner(winner.clone()))
            .await
            .unwrap();

        assert_eq!(matchup.state(), MatchupState::Recorded);
        assert_eq!(vote.id(), matchup.id());
        assert_eq!(vote.winner().map(Item::key), Some(winner));
        assert_eq!(storage.query_votes(None).await.unwrap(), vec![vote]);
    }

    #[tokio::test]
    async fn test_submit_invalid_winner_persists_nothing() {
        let storage = SimStorageBackend::new(SimConfig::with_seed(42));
        let engine = engine(storage.clone());
        let mut matchup = engine.draft(&catalog(10), &mut DeterministicRng::new(1)).unwrap();

        let err = engine
            .submit(&mut matchup, Decision::Winner(ItemKey::new("Zoya", "Core", "1")))
            .await
            .unwrap_err();

        assert!(matches!(err, MatchupError::InvalidWinner { .. }));
        assert_eq!(matchup.state(), MatchupState::AwaitingVote);
        assert_eq!(storage.vote_row_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_twice_rejected() {
        let storage = SimStorageBackend::new(SimConfig::with_seed(42));
        let engine = engine(storage.clone());
        let mut matchup = engine.draft(&catalog(10), &mut DeterministicRng::new(1)).unwrap();

        engine
            .submit(&mut matchup, Decision::NoPreference)
            .await
            .unwrap();
        let err = engine
            .submit(&mut matchup, Decision::NoPreference)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MatchupError::AlreadyClosed { state: MatchupState::Recorded, .. }
        ));
        assert_eq!(storage.query_votes(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_abandon() {
        let storage = SimStorageBackend::new(SimConfig::with_seed(42));
        let engine = engine(storage.clone());
        let mut matchup = engine.draft(&catalog(10), &mut DeterministicRng::new(1)).unwrap();

        engine.abandon(&mut matchup).unwrap();

        assert_eq!(matchup.state(), MatchupState::Abandoned);
        assert!(engine.abandon(&mut matchup).is_err());
        assert!(engine
            .submit(&mut matchup, Decision::NoPreference)
            .await
            .is_err());
        assert_eq!(storage.vote_row_count().await, 0);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_matchup_open() {
        let storage = SimStorageBackend::new(SimConfig::with_seed(42)).with_faults(
            FaultConfig::new(FaultType::StorageWriteFail, 1.0).with_max_injections(1),
        );
        let engine = engine(storage.clone());
        let mut matchup = engine.draft(&catalog(10), &mut DeterministicRng::new(1)).unwrap();

        let err = engine
            .submit(&mut matchup, Decision::NoPreference)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchupError::Storage(_)));
        assert_eq!(matchup.state(), MatchupState::AwaitingVote);

        // No implicit retry happened; an explicit resend succeeds.
        assert_eq!(storage.vote_row_count().await, 0);
        engine
            .submit(&mut matchup, Decision::NoPreference)
            .await
            .unwrap();
        assert_eq!(storage.vote_row_count().await, 5);
    }
}
