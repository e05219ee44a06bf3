//! Statistics - Preference Signal by Attribute
//!
//! `TigerStyle`: Derived, never stored. Pure functions over votes; the
//! aggregator only adds the storage read.
//!
//! For a dimension (brand, shade, finish, collection) and a value `v`:
//! - `appearances[v]` counts candidate slots with attribute `v`
//! - `wins[v]` counts votes whose winner has attribute `v`
//! - `win_rate = wins / appearances`, undefined when `appearances == 0`
//!
//! A "no preference" vote adds appearances and no wins.

mod journey;

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Dimension, Item, ItemKey};
use crate::constants::STATS_POPULAR_COUNT_MAX;
use crate::matchup::Vote;
use crate::storage::{StorageBackend, StorageResult, VoteFilter};

pub use journey::UsageJourney;

// =============================================================================
// Statistic
// =============================================================================

/// Appearance and win counts for one attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    /// Attribute grouped by
    pub dimension: Dimension,
    /// Attribute value
    pub value: String,
    /// Candidate slots with this value
    pub appearances: u64,
    /// Votes won by an item with this value
    pub wins: u64,
    /// `wins / appearances`, `None` when there are no appearances
    pub win_rate: Option<f64>,
}

impl Statistic {
    /// Build a statistic, deriving the win rate.
    ///
    /// # Panics
    /// Panics if `wins > appearances`.
    #[must_use]
    pub fn new(dimension: Dimension, value: impl Into<String>, appearances: u64, wins: u64) -> Self {
        // Precondition
        assert!(wins <= appearances, "wins ({wins}) exceed appearances ({appearances})");

        #[allow(clippy::cast_precision_loss)]
        let win_rate = (appearances > 0).then(|| wins as f64 / appearances as f64);

        Self {
            dimension,
            value: value.into(),
            appearances,
            wins,
            win_rate,
        }
    }

    /// Shown at least once and never chosen.
    #[must_use]
    pub fn is_unmemorable(&self) -> bool {
        self.appearances > 0 && self.wins == 0
    }

    /// Ranking order: win rate desc, appearances desc, value asc.
    ///
    /// Win rates are compared as exact fractions.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        let by_rate = match (self.appearances, other.appearances) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Greater,
            (_, 0) => Ordering::Less,
            (a, b) => {
                let lhs = u128::from(self.wins) * u128::from(b);
                let rhs = u128::from(other.wins) * u128::from(a);
                rhs.cmp(&lhs)
            }
        };

        by_rate
            .then_with(|| other.appearances.cmp(&self.appearances))
            .then_with(|| self.value.cmp(&other.value))
    }
}

/// An item and how many votes it won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularItem {
    /// The item
    pub item: Item,
    /// Votes won
    pub wins: u64,
}

// =============================================================================
// Pure Aggregation
// =============================================================================

/// Per-value statistics for `dimension`, in ranking order.
#[must_use]
pub fn summarize(votes: &[Vote], dimension: Dimension) -> Vec<Statistic> {
    let mut counts: HashMap<&str, (u64, u64)> = HashMap::new();

    for vote in votes {
        for candidate in vote.candidates() {
            counts.entry(candidate.attribute(dimension)).or_default().0 += 1;
        }
        if let Some(winner) = vote.winner() {
            counts.entry(winner.attribute(dimension)).or_default().1 += 1;
        }
    }

    let mut stats: Vec<Statistic> = counts
        .into_iter()
        .map(|(value, (appearances, wins))| Statistic::new(dimension, value, appearances, wins))
        .collect();
    stats.sort_by(Statistic::rank_cmp);
    stats
}

/// Items with the most wins, most first, ties by key. At most `limit`.
#[must_use]
pub fn popular_items(votes: &[Vote], limit: usize) -> Vec<PopularItem> {
    let mut wins: HashMap<ItemKey, PopularItem> = HashMap::new();

    for winner in votes.iter().filter_map(Vote::winner) {
        wins.entry(winner.key())
            .or_insert_with(|| PopularItem {
                item: winner.clone(),
                wins: 0,
            })
            .wins += 1;
    }

    let mut popular: Vec<PopularItem> = wins.into_values().collect();
    popular.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| a.item.key().cmp(&b.item.key()))
    });
    popular.truncate(limit);
    popular
}

// =============================================================================
// StatisticsAggregator
// =============================================================================

/// Read-only statistics over the vote store.
#[derive(Debug, Clone)]
pub struct StatisticsAggregator<S: StorageBackend> {
    storage: S,
}

impl<S: StorageBackend> StatisticsAggregator<S> {
    /// Create an aggregator reading from `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Statistics for every value of `dimension`.
    ///
    /// # Errors
    /// Propagates storage errors unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn summarize(&self, dimension: Dimension) -> StorageResult<Vec<Statistic>> {
        let votes = self.storage.query_votes(None).await?;
        Ok(summarize(&votes, dimension))
    }

    /// Statistics over the votes passing `filter`.
    ///
    /// # Errors
    /// Propagates storage errors unchanged.
    pub async fn summarize_filtered(
        &self,
        dimension: Dimension,
        filter: &VoteFilter,
    ) -> StorageResult<Vec<Statistic>> {
        let votes = self.storage.query_votes(Some(filter)).await?;
        Ok(summarize(&votes, dimension))
    }

    /// Values that appeared and never won, most appearances first.
    ///
    /// # Errors
    /// Propagates storage errors unchanged.
    pub async fn unmemorable(&self, dimension: Dimension) -> StorageResult<Vec<Statistic>> {
        let mut stats: Vec<Statistic> = self
            .summarize(dimension)
            .await?
            .into_iter()
            .filter(Statistic::is_unmemorable)
            .collect();
        stats.sort_by(Statistic::rank_cmp);
        Ok(stats)
    }

    /// Items with the most wins.
    ///
    /// # Errors
    /// Propagates storage errors unchanged.
    ///
    /// # Panics
    /// Panics if `limit` exceeds `STATS_POPULAR_COUNT_MAX`.
    #[tracing::instrument(skip(self))]
    pub async fn popular_items(&self, limit: usize) -> StorageResult<Vec<PopularItem>> {
        // Precondition
        assert!(
            limit <= STATS_POPULAR_COUNT_MAX,
            "limit {limit} exceeds {STATS_POPULAR_COUNT_MAX}"
        );

        let votes = self.storage.query_votes(None).await?;
        Ok(popular_items(&votes, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn a() -> Item {
        Item::new("1", "X", "Alpha", "creme", "Core")
    }

    fn b() -> Item {
        Item::new("2", "X", "Beta", "holo", "Core")
    }

    fn c() -> Item {
        Item::new("3", "Y", "Gamma", "creme", "Core")
    }

    fn vote(candidates: Vec<Item>, winner: Option<usize>) -> Vote {
        Vote::new(Uuid::new_v4(), candidates, winner, Utc::now())
    }

    #[test]
    fn test_brand_statistics_single_vote() {
        let votes = vec![vote(vec![a(), b(), c()], Some(0))];

        let stats = summarize(&votes, Dimension::Brand);

        assert_eq!(
            stats,
            vec![
                Statistic::new(Dimension::Brand, "X", 2, 1),
                Statistic::new(Dimension::Brand, "Y", 1, 0),
            ]
        );
        assert_eq!(stats[0].win_rate, Some(0.5));
        assert_eq!(stats[1].win_rate, Some(0.0));
    }

    #[test]
    fn test_no_preference_adds_appearances_only() {
        let votes = vec![vote(vec![a(), b(), c()], None)];

        let stats = summarize(&votes, Dimension::Finish);

        assert!(stats.iter().all(|s| s.wins == 0));
        assert_eq!(stats.iter().map(|s| s.appearances).sum::<u64>(), 3);
        assert!(stats.iter().all(Statistic::is_unmemorable));
    }

    #[test]
    fn test_ordering_rate_then_appearances_then_value() {
        let stats = {
            let mut s = vec![
                Statistic::new(Dimension::Brand, "b", 4, 2),
                Statistic::new(Dimension::Brand, "a", 2, 1),
                Statistic::new(Dimension::Brand, "c", 3, 3),
                Statistic::new(Dimension::Brand, "d", 0, 0),
                Statistic::new(Dimension::Brand, "e", 2, 1),
            ];
            s.sort_by(Statistic::rank_cmp);
            s
        };

        let order: Vec<&str> = stats.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a", "e", "d"]);
    }

    #[test]
    fn test_exact_rate_comparison() {
        // 1/3 and 2/6 are equal; appearances break the tie.
        let mut stats = vec![
            Statistic::new(Dimension::Brand, "a", 3, 1),
            Statistic::new(Dimension::Brand, "b", 6, 2),
        ];
        stats.sort_by(Statistic::rank_cmp);
        assert_eq!(stats[0].value, "b");
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let votes = vec![
            vote(vec![a(), b()], Some(1)),
            vote(vec![b(), c()], None),
            vote(vec![a(), c()], Some(1)),
        ];

        let first = summarize(&votes, Dimension::ShadeName);
        for _ in 0..10 {
            assert_eq!(summarize(&votes, Dimension::ShadeName), first);
        }
    }

    #[test]
    fn test_empty_votes() {
        assert!(summarize(&[], Dimension::Brand).is_empty());
        assert!(popular_items(&[], 10).is_empty());
    }

    #[test]
    fn test_popular_items() {
        let votes = vec![
            vote(vec![a(), b(), c()], Some(2)),
            vote(vec![a(), b(), c()], Some(2)),
            vote(vec![a(), b()], Some(0)),
            vote(vec![b(), c()], Some(0)),
            vote(vec![a(), c()], None),
        ];

        let popular = popular_items(&votes, 10);
        let ranked: Vec<(&str, u64)> = popular
            .iter()
            .map(|p| (p.item.shade_name.as_str(), p.wins))
            .collect();
        assert_eq!(ranked, vec![("Gamma", 2), ("Alpha", 1), ("Beta", 1)]);

        assert_eq!(popular_items(&votes, 1).len(), 1);
    }

    #[test]
    #[should_panic(expected = "wins (2) exceed appearances (1)")]
    fn test_statistic_rejects_impossible_counts() {
        let _ = Statistic::new(Dimension::Brand, "X", 1, 2);
    }
}
