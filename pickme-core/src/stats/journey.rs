//! Usage Journey - How Fast the Collection Is Being Worked Through
//!
//! `TigerStyle`: Undefined ratios are `None`, never NaN or infinity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ItemKey};
use crate::constants::{STATS_DAYS_PER_WEEK, STATS_WEEKS_PER_YEAR};
use crate::history::HistoryLedger;

/// Summary of selection history against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageJourney {
    /// Distinct catalog items selected at least once. History entries for
    /// items no longer in the catalog are not counted.
    pub worn_items: usize,
    /// Items in the catalog
    pub total_items: usize,
    /// `worn_items / total_items * 100`
    pub percent_worn: Option<f64>,
    /// Whole days between the first and last selection
    pub days_spanned: i64,
    /// Distinct items worn per week over the span
    pub items_per_week: Option<f64>,
    /// Weeks to wear the whole catalog at that pace
    pub weeks_to_wear_collection: Option<f64>,
    /// Same, in years
    pub years_to_wear_collection: Option<f64>,
}

impl UsageJourney {
    /// Compute the journey from the selection log and catalog size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_history<C: Catalog + ?Sized>(ledger: &HistoryLedger, catalog: &C) -> Self {
        let total_items = catalog.count();
        let in_catalog: HashSet<ItemKey> = catalog.list_items().iter().map(|i| i.key()).collect();
        let worn_items = ledger
            .events()
            .iter()
            .map(|event| event.key())
            .filter(|key| in_catalog.contains(key))
            .collect::<HashSet<_>>()
            .len();
        let days_spanned = ledger
            .span()
            .map_or(0, |(first, last)| (last - first).num_days());

        let percent_worn =
            (total_items > 0).then(|| worn_items as f64 / total_items as f64 * 100.0);

        let items_per_week = (days_spanned > 0)
            .then(|| worn_items as f64 / (days_spanned as f64 / STATS_DAYS_PER_WEEK));

        let weeks_to_wear_collection = items_per_week
            .filter(|pace| *pace > 0.0)
            .map(|pace| total_items as f64 / pace);

        let years_to_wear_collection =
            weeks_to_wear_collection.map(|weeks| weeks / STATS_WEEKS_PER_YEAR);

        // Postcondition
        assert!(worn_items <= total_items, "worn items must come from the catalog");

        Self {
            worn_items,
            total_items,
            percent_worn,
            days_spanned,
            items_per_week,
            weeks_to_wear_collection,
            years_to_wear_collection,
        }
    }
}
