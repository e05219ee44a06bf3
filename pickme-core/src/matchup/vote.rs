//! Vote - Durable Outcome of a Matchup
//!
//! `TigerStyle`: Normalized in memory (candidates plus winner position).
//! Flattening to one row per candidate happens only at the storage boundary.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Item;
use crate::constants::MATCHUP_SIZE_COUNT_MIN;

/// A recorded matchup outcome. Immutable.
///
/// The winner is stored as a position in `candidates`, so a vote can never
/// name a winner that was not shown. Deserialization runs the same shape
/// check as [`Vote::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VoteRecord")]
pub struct Vote {
    id: Uuid,
    candidates: Vec<Item>,
    winner_index: Option<usize>,
    created_at: DateTime<Utc>,
}

/// Wire form of a [`Vote`] before its shape is checked.
#[derive(Deserialize)]
struct VoteRecord {
    id: Uuid,
    candidates: Vec<Item>,
    winner_index: Option<usize>,
    created_at: DateTime<Utc>,
}

impl TryFrom<VoteRecord> for Vote {
    type Error = String;

    fn try_from(record: VoteRecord) -> Result<Self, Self::Error> {
        Self::check_shape(&record.candidates, record.winner_index)
            .map_err(|reason| format!("invalid vote {}: {reason}", record.id))?;

        Ok(Self {
            id: record.id,
            candidates: record.candidates,
            winner_index: record.winner_index,
            created_at: record.created_at,
        })
    }
}

impl Vote {
    /// Create a vote.
    ///
    /// # Panics
    /// Panics if the shape is invalid (see [`check_shape`](Self::check_shape)).
    #[must_use]
    pub fn new(
        id: Uuid,
        candidates: Vec<Item>,
        winner_index: Option<usize>,
        created_at: DateTime<Utc>,
    ) -> Self {
        // Precondition
        if let Err(reason) = Self::check_shape(&candidates, winner_index) {
            panic!("invalid vote {id}: {reason}");
        }

        Self {
            id,
            candidates,
            winner_index,
            created_at,
        }
    }

    /// Check that candidates are distinct, at least two, and that the winner
    /// position (if any) is in range.
    ///
    /// # Errors
    /// Returns a description of the first violated rule.
    pub fn check_shape(candidates: &[Item], winner_index: Option<usize>) -> Result<(), String> {
        if candidates.len() < MATCHUP_SIZE_COUNT_MIN {
            return Err(format!(
                "{} candidates, need at least {MATCHUP_SIZE_COUNT_MIN}",
                candidates.len()
            ));
        }

        let mut seen = HashSet::with_capacity(candidates.len());
        for item in candidates {
            if !seen.insert(item.key()) {
                return Err(format!("candidate {} appears twice", item.key()));
            }
        }

        if let Some(index) = winner_index {
            if index >= candidates.len() {
                return Err(format!(
                    "winner position {index} out of {} candidates",
                    candidates.len()
                ));
            }
        }

        Ok(())
    }

    /// Vote id. All flat rows of a vote share it.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Candidates in the order they were shown.
    #[must_use]
    pub fn candidates(&self) -> &[Item] {
        &self.candidates
    }

    /// Position of the winner in `candidates`.
    #[must_use]
    pub fn winner_index(&self) -> Option<usize> {
        self.winner_index
    }

    /// The winning item, or `None` for "no preference".
    #[must_use]
    pub fn winner(&self) -> Option<&Item> {
        self.winner_index.map(|index| &self.candidates[index])
    }

    /// Whether the judge declined to pick.
    #[must_use]
    pub fn is_no_preference(&self) -> bool {
        self.winner_index.is_none()
    }

    /// When the vote was recorded.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
