//! History - Selection Event Log
//!
//! `TigerStyle`: Append-only log, pure eligibility.
//!
//! The ledger is the state the selection engine feeds back into. Whether an
//! item may be picked is a pure function of (catalog, log, now, cooldown);
//! nothing here reads a clock or touches storage except [`HistoryLedger::load`].

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Item, ItemKey};
use crate::storage::{StorageBackend, StorageResult};

// =============================================================================
// SelectionEvent
// =============================================================================

/// One entry in the selection log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    /// Item that was picked or actually used
    pub item: Item,
    /// When it happened
    pub selected_at: DateTime<Utc>,
    /// True when the judge used a different item than the one offered
    pub deviated: bool,
}

impl SelectionEvent {
    /// Event for an item the engine picked.
    #[must_use]
    pub fn picked(item: Item, selected_at: DateTime<Utc>) -> Self {
        Self {
            item,
            selected_at,
            deviated: false,
        }
    }

    /// Event for an item used instead of the pick.
    #[must_use]
    pub fn deviation(item: Item, selected_at: DateTime<Utc>) -> Self {
        Self {
            item,
            selected_at,
            deviated: true,
        }
    }

    /// Key of the event's item.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        self.item.key()
    }
}

// =============================================================================
// Cooldown
// =============================================================================

/// Whether an item last selected at `last` is still cooling down at `now`.
///
/// An item is excluded while `now < last + cooldown`, so a zero cooldown
/// excludes nothing.
#[must_use]
pub fn is_cooling_down(last: DateTime<Utc>, now: DateTime<Utc>, cooldown: Duration) -> bool {
    match last.checked_add_signed(cooldown) {
        Some(until) => now < until,
        // Window reaches past the representable range
        None => true,
    }
}

// =============================================================================
// HistoryFilter
// =============================================================================

/// Filter for browsing history.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Only these brands. Empty means every brand.
    pub brands: HashSet<String>,
    /// Only events on this calendar day (UTC).
    pub date: Option<NaiveDate>,
}

impl HistoryFilter {
    /// Filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a brand. May be called repeatedly.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brands.insert(brand.into());
        self
    }

    /// Restrict to a calendar day.
    #[must_use]
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Whether the event passes the filter.
    #[must_use]
    pub fn matches(&self, event: &SelectionEvent) -> bool {
        if !self.brands.is_empty() && !self.brands.contains(&event.item.brand) {
            return false;
        }
        self.date
            .map_or(true, |date| event.selected_at.date_naive() == date)
    }
}

// =============================================================================
// HistoryLedger
// =============================================================================

/// Ordered log of selection events with a per-item "last selected" index.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    events: Vec<SelectionEvent>,
    last_selected: HashMap<ItemKey, DateTime<Utc>>,
}

impl HistoryLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger holding the given events, in the given order.
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = SelectionEvent>) -> Self {
        let mut ledger = Self::new();
        for event in events {
            ledger.record(event);
        }
        ledger
    }

    /// Rebuild the ledger from persisted selections.
    ///
    /// # Errors
    /// Propagates storage errors unchanged.
    pub async fn load<S: StorageBackend + ?Sized>(storage: &S) -> StorageResult<Self> {
        let events = storage.list_selections().await?;
        tracing::debug!(events = events.len(), "history loaded");
        Ok(Self::from_events(events))
    }

    /// Append an event. The caller persists it first.
    pub fn record(&mut self, event: SelectionEvent) {
        let key = event.key();
        let at = event.selected_at;
        self.last_selected
            .entry(key)
            .and_modify(|last| {
                if at > *last {
                    *last = at;
                }
            })
            .or_insert(at);
        self.events.push(event);
    }

    /// Most recent selection time of an item.
    #[must_use]
    pub fn last_selected(&self, key: &ItemKey) -> Option<DateTime<Utc>> {
        self.last_selected.get(key).copied()
    }

    /// Whether the item is inside its cooldown window at `now`.
    #[must_use]
    pub fn is_excluded(&self, key: &ItemKey, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.last_selected(key)
            .map_or(false, |last| is_cooling_down(last, now, cooldown))
    }

    /// Items from `items` that may be picked at `now`, in catalog order.
    #[must_use]
    pub fn eligible<'a>(
        &self,
        items: &'a [Item],
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Vec<&'a Item> {
        items
            .iter()
            .filter(|item| !self.is_excluded(&item.key(), now, cooldown))
            .collect()
    }

    /// All events in append order.
    #[must_use]
    pub fn events(&self) -> &[SelectionEvent] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of distinct items ever selected.
    #[must_use]
    pub fn distinct_items(&self) -> usize {
        self.last_selected.len()
    }

    /// Events passing the filter, oldest first.
    #[must_use]
    pub fn filter(&self, filter: &HistoryFilter) -> Vec<&SelectionEvent> {
        let mut matched: Vec<&SelectionEvent> =
            self.events.iter().filter(|e| filter.matches(e)).collect();
        matched.sort_by_key(|e| e.selected_at);
        matched
    }

    /// Distinct brands present in history, sorted.
    #[must_use]
    pub fn brands(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.item.brand.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest selection times.
    #[must_use]
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.events.iter().map(|e| e.selected_at).min()?;
        let last = self.events.iter().map(|e| e.selected_at).max()?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn essie(number: &str) -> Item {
        Item::new(number, "Essie", format!("Shade {number}"), "creme", "Classics")
    }

    fn opi(number: &str) -> Item {
        Item::new(number, "OPI", format!("Shade {number}"), "shimmer", "Core")
    }

    #[test]
    fn test_cooldown_boundary() {
        let week = Duration::days(7);

        assert!(is_cooling_down(day(1), day(7), week));
        assert!(!is_cooling_down(day(1), day(8), week));
        assert!(!is_cooling_down(day(1), day(1), Duration::zero()));
    }

    #[test]
    fn test_last_selected_keeps_latest() {
        let ledger = HistoryLedger::from_events([
            SelectionEvent::picked(essie("1"), day(5)),
            SelectionEvent::picked(essie("1"), day(2)),
        ]);

        assert_eq!(ledger.last_selected(&essie("1").key()), Some(day(5)));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.distinct_items(), 1);
    }

    #[test]
    fn test_eligible_excludes_recent() {
        let items = vec![essie("1"), essie("2"), opi("1")];
        let ledger = HistoryLedger::from_events([SelectionEvent::picked(essie("1"), day(1))]);

        let eligible = ledger.eligible(&items, day(3), Duration::days(7));
        let keys: Vec<ItemKey> = eligible.iter().map(|i| i.key()).collect();
        assert_eq!(keys, vec![essie("2").key(), opi("1").key()]);

        let later = ledger.eligible(&items, day(8), Duration::days(7));
        assert_eq!(later.len(), 3);
    }

    #[test]
    fn test_same_number_other_brand_not_excluded() {
        let items = vec![essie("1"), opi("1")];
        let ledger = HistoryLedger::from_events([SelectionEvent::picked(essie("1"), day(1))]);

        let eligible = ledger.eligible(&items, day(2), Duration::days(7));
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].brand, "OPI");
    }

    #[test]
    fn test_deviation_counts_for_cooldown() {
        let ledger = HistoryLedger::from_events([SelectionEvent::deviation(opi("4"), day(1))]);

        assert!(ledger.is_excluded(&opi("4").key(), day(2), Duration::days(7)));
    }

    #[test]
    fn test_filter_by_brand_and_date() {
        let ledger = HistoryLedger::from_events([
            SelectionEvent::picked(opi("1"), day(3)),
            SelectionEvent::picked(essie("1"), day(1)),
            SelectionEvent::picked(essie("2"), day(2)),
        ]);

        let by_brand = ledger.filter(&HistoryFilter::new().with_brand("Essie"));
        assert_eq!(by_brand.len(), 2);
        assert_eq!(by_brand[0].selected_at, day(1), "results are chronological");

        let by_date = ledger.filter(&HistoryFilter::new().on_date(day(3).date_naive()));
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].item.brand, "OPI");

        let both = ledger.filter(
            &HistoryFilter::new()
                .with_brand("OPI")
                .on_date(day(1).date_naive()),
        );
        assert!(both.is_empty());

        assert_eq!(ledger.filter(&HistoryFilter::new()).len(), 3);
    }

    #[test]
    fn test_brands_sorted_distinct() {
        let ledger = HistoryLedger::from_events([
            SelectionEvent::picked(opi("1"), day(1)),
            SelectionEvent::picked(essie("1"), day(2)),
            SelectionEvent::picked(opi("2"), day(3)),
        ]);

        assert_eq!(ledger.brands(), vec!["Essie".to_string(), "OPI".to_string()]);
        assert_eq!(ledger.span(), Some((day(1), day(3))));
    }
}
