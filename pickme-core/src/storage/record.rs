//! Flat Vote Records
//!
//! `TigerStyle`: The `votes` table stores one row per candidate with the
//! winner columns repeated on every row. A vote is flattened on the way in
//! and rebuilt on the way out; nothing above storage sees rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use crate::catalog::{Dimension, Item, ItemKey};
use crate::matchup::Vote;

// =============================================================================
// FlatVoteRow
// =============================================================================

/// One row of the `votes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatVoteRow {
    /// Vote the row belongs to
    pub matchup_id: Uuid,
    /// Candidate position within the vote
    pub position: u32,
    /// Candidate number
    pub number: String,
    /// Candidate brand
    pub brand: String,
    /// Candidate shade name
    pub shade_name: String,
    /// Candidate finish
    pub finish: String,
    /// Candidate collection
    pub collection: String,
    /// Winner number, `None` for no preference
    pub winner_number: Option<String>,
    /// Winner brand
    pub winner_brand: Option<String>,
    /// Winner shade name
    pub winner_shade_name: Option<String>,
    /// Winner finish
    pub winner_finish: Option<String>,
    /// Winner collection
    pub winner_collection: Option<String>,
    /// When the vote was recorded
    pub created_at: DateTime<Utc>,
}

impl FlatVoteRow {
    /// Candidate on this row.
    #[must_use]
    pub fn candidate(&self) -> Item {
        Item::new(
            &self.number,
            &self.brand,
            &self.shade_name,
            &self.finish,
            &self.collection,
        )
    }

    /// Key of the winner named on this row.
    #[must_use]
    pub fn winner_key(&self) -> Option<ItemKey> {
        match (&self.winner_brand, &self.winner_collection, &self.winner_number) {
            (Some(brand), Some(collection), Some(number)) => {
                Some(ItemKey::new(brand, collection, number))
            }
            _ => None,
        }
    }

    /// Whether this row's candidate is the winner.
    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.winner_key()
            .map_or(false, |key| key == self.candidate().key())
    }

    /// Flatten a vote into rows, one per candidate, in candidate order.
    #[must_use]
    pub fn flatten(vote: &Vote) -> Vec<Self> {
        let winner = vote.winner();

        let rows: Vec<Self> = vote
            .candidates()
            .iter()
            .enumerate()
            .map(|(position, item)| Self {
                matchup_id: vote.id(),
                position: u32::try_from(position).unwrap_or(u32::MAX),
                number: item.number.clone(),
                brand: item.brand.clone(),
                shade_name: item.shade_name.clone(),
                finish: item.finish.clone(),
                collection: item.collection.clone(),
                winner_number: winner.map(|w| w.number.clone()),
                winner_brand: winner.map(|w| w.brand.clone()),
                winner_shade_name: winner.map(|w| w.shade_name.clone()),
                winner_finish: winner.map(|w| w.finish.clone()),
                winner_collection: winner.map(|w| w.collection.clone()),
                created_at: vote.created_at(),
            })
            .collect();

        // Postcondition
        assert_eq!(rows.len(), vote.candidates().len(), "one row per candidate");
        rows
    }

    /// Rebuild votes from rows.
    ///
    /// Votes come back in the order their first row appears; candidates are
    /// ordered by `position`.
    ///
    /// # Errors
    /// Returns `StorageError::CorruptRecord` if rows of one vote disagree on
    /// the winner or timestamp, the winner is not among the candidates, or
    /// the candidate set is not a valid vote.
    pub fn reconstruct(rows: &[Self]) -> StorageResult<Vec<Vote>> {
        let mut order: Vec<Uuid> = Vec::new();
        let mut groups: HashMap<Uuid, Vec<&Self>> = HashMap::new();
        for row in rows {
            groups
                .entry(row.matchup_id)
                .or_insert_with(|| {
                    order.push(row.matchup_id);
                    Vec::new()
                })
                .push(row);
        }

        let mut votes = Vec::with_capacity(order.len());
        for id in order {
            let mut group = groups.remove(&id).unwrap_or_default();
            group.sort_by_key(|row| row.position);
            votes.push(Self::reconstruct_one(id, &group)?);
        }

        Ok(votes)
    }

    fn reconstruct_one(id: Uuid, rows: &[&Self]) -> StorageResult<Vote> {
        let first = rows
            .first()
            .ok_or_else(|| StorageError::corrupt_record(format!("vote {id} has no rows")))?;
        let winner_key = first.winner_key();
        let created_at = first.created_at;

        for row in rows {
            if row.winner_key() != winner_key || row.created_at != created_at {
                return Err(StorageError::corrupt_record(format!(
                    "rows of vote {id} disagree on winner or timestamp"
                )));
            }
        }

        let candidates: Vec<Item> = rows.iter().map(|row| row.candidate()).collect();
        let winner_index = match winner_key {
            Some(key) => Some(
                candidates
                    .iter()
                    .position(|item| item.key() == key)
                    .ok_or_else(|| {
                        StorageError::corrupt_record(format!(
                            "winner {key} of vote {id} is not a candidate"
                        ))
                    })?,
            ),
            None => None,
        };

        Vote::check_shape(&candidates, winner_index)
            .map_err(|reason| StorageError::corrupt_record(format!("vote {id}: {reason}")))?;

        Ok(Vote::new(id, candidates, winner_index, created_at))
    }
}

// =============================================================================
// VoteFilter
// =============================================================================

/// Filter for [`query_votes`](super::StorageBackend::query_votes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteFilter {
    /// Keep votes where some candidate has this attribute value
    pub attribute: Option<(Dimension, String)>,
    /// Keep votes created at or after this time
    pub since: Option<DateTime<Utc>>,
    /// Keep votes created before this time
    pub until: Option<DateTime<Utc>>,
}

impl VoteFilter {
    /// Filter that matches every vote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to votes featuring an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, dimension: Dimension, value: impl Into<String>) -> Self {
        self.attribute = Some((dimension, value.into()));
        self
    }

    /// Restrict to votes created at or after `since`.
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Restrict to votes created before `until`.
    #[must_use]
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Whether the vote passes the filter.
    #[must_use]
    pub fn matches(&self, vote: &Vote) -> bool {
        if let Some(since) = self.since {
            if vote.created_at() < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if vote.created_at() >= until {
                return false;
            }
        }
        match &self.attribute {
            Some((dimension, value)) => vote
                .candidates()
                .iter()
                .any(|item| item.attribute(*dimension) == value),
            None => true,
        }
    }
}
