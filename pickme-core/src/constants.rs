//! TigerStyle Constants
//!
//! All limits use big-endian naming: CATEGORY_SPECIFICS_UNIT_LIMIT
//! Example: MATCHUP_SIZE_COUNT_MAX (not MAX_MATCHUP_SIZE)
//!
//! Every constant includes units in the name:
//! - _BYTES_MAX/MIN for size limits
//! - _DAYS_DEFAULT for time windows
//! - _COUNT_MAX for quantity limits
//! - _MS for milliseconds

// =============================================================================
// Catalog Limits
// =============================================================================

/// Maximum length of any single item attribute (number, brand, shade, ...)
pub const ITEM_FIELD_BYTES_MAX: usize = 256;

/// Maximum number of items a catalog may hold
pub const CATALOG_ITEMS_COUNT_MAX: usize = 100_000;

/// Brand assigned to catalog entries that omit one
pub const ITEM_BRAND_UNKNOWN: &str = "Unknown";

// =============================================================================
// Selection Limits
// =============================================================================

/// Default cooldown before a worn item becomes eligible again
pub const SELECTION_COOLDOWN_DAYS_DEFAULT: u64 = 7;

/// Maximum cooldown accepted from configuration
pub const SELECTION_COOLDOWN_DAYS_MAX: u64 = 3650; // 10 years

// =============================================================================
// Matchup Limits
// =============================================================================

/// Default number of candidates drafted into a matchup
pub const MATCHUP_SIZE_COUNT_DEFAULT: usize = 5;

/// Minimum number of candidates (a vote needs something to compare)
pub const MATCHUP_SIZE_COUNT_MIN: usize = 2;

/// Maximum number of candidates shown at once
pub const MATCHUP_SIZE_COUNT_MAX: usize = 12;

// =============================================================================
// Statistics Limits
// =============================================================================

/// Default number of entries in the most-popular list
pub const STATS_POPULAR_COUNT_DEFAULT: usize = 10;

/// Maximum number of entries in the most-popular list
pub const STATS_POPULAR_COUNT_MAX: usize = 1000;

/// Days per week, for usage-rate reporting
pub const STATS_DAYS_PER_WEEK: f64 = 7.0;

/// Weeks per year, for usage-rate reporting
pub const STATS_WEEKS_PER_YEAR: f64 = 52.0;

// =============================================================================
// Storage Limits
// =============================================================================

/// Maximum number of pooled database connections
pub const STORAGE_POOL_CONNECTIONS_COUNT_MAX: u32 = 10;

/// Minimum number of pooled database connections
pub const STORAGE_POOL_CONNECTIONS_COUNT_MIN: u32 = 1;

// =============================================================================
// DST (Deterministic Simulation Testing) Limits
// =============================================================================

/// Maximum number of simulation steps
pub const DST_SIMULATION_STEPS_MAX: u64 = 1_000_000;

/// Maximum probability for fault injection (1.0 = 100%)
pub const DST_FAULT_PROBABILITY_MAX: f64 = 1.0;

/// Maximum time advance per step in milliseconds
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 400 * TIME_MS_PER_DAY; // cooldowns are measured in days

// =============================================================================
// Logging
// =============================================================================

/// Filter directive used when `RUST_LOG` is unset
pub const LOG_FILTER_DEFAULT: &str = "pickme_core=info";

// =============================================================================
// Time Constants
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1000;

/// Milliseconds per minute
pub const TIME_MS_PER_MIN: u64 = 60 * TIME_MS_PER_SEC;

/// Milliseconds per hour
pub const TIME_MS_PER_HOUR: u64 = 60 * TIME_MS_PER_MIN;

/// Milliseconds per day
pub const TIME_MS_PER_DAY: u64 = 24 * TIME_MS_PER_HOUR;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matchup_limits_valid() {
        assert!(MATCHUP_SIZE_COUNT_MIN >= 2);
        assert!(MATCHUP_SIZE_COUNT_MIN <= MATCHUP_SIZE_COUNT_DEFAULT);
        assert!(MATCHUP_SIZE_COUNT_DEFAULT <= MATCHUP_SIZE_COUNT_MAX);
    }

    #[test]
    fn test_cooldown_limits_valid() {
        assert!(SELECTION_COOLDOWN_DAYS_DEFAULT <= SELECTION_COOLDOWN_DAYS_MAX);
        assert!(DST_TIME_ADVANCE_MS_MAX > SELECTION_COOLDOWN_DAYS_DEFAULT * TIME_MS_PER_DAY);
    }

    #[test]
    fn test_time_constants_consistent() {
        assert_eq!(TIME_MS_PER_MIN, 60_000);
        assert_eq!(TIME_MS_PER_HOUR, 3_600_000);
        assert_eq!(TIME_MS_PER_DAY, 86_400_000);
    }
}
