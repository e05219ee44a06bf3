//! Catalog - The Item Set Being Picked From
//!
//! `TigerStyle`: Read-only collaborator. Listing order is deterministic
//! within a call so seeded draws are reproducible.

mod item;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use item::{Dimension, Item, ItemKey};
pub use memory::InMemoryCatalog;

// =============================================================================
// Errors
// =============================================================================

/// Errors from loading or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Item failed field validation
    #[error("invalid item {key}: {reason}")]
    InvalidItem {
        /// Key of the offending item
        key: String,
        /// What was wrong
        reason: String,
    },

    /// Two items share the same key
    #[error("duplicate item: {key}")]
    DuplicateItem {
        /// The repeated key
        key: ItemKey,
    },

    /// Item is not in the catalog
    #[error("unknown item: {key}")]
    UnknownItem {
        /// The missing key
        key: ItemKey,
    },

    /// Catalog exceeds the supported size
    #[error("catalog has {count} items, max {max}")]
    TooManyItems {
        /// Items supplied
        count: usize,
        /// Limit
        max: usize,
    },

    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalog contents could not be parsed
    #[error("failed to parse catalog: {message}")]
    Parse {
        /// Parser message
        message: String,
    },
}

impl CatalogError {
    /// Create an invalid item error.
    #[must_use]
    pub fn invalid_item(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown item error.
    #[must_use]
    pub fn unknown_item(key: ItemKey) -> Self {
        Self::UnknownItem { key }
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

// =============================================================================
// Catalog Trait
// =============================================================================

/// Source of items.
pub trait Catalog: Send + Sync {
    /// All items, in a stable order.
    fn list_items(&self) -> &[Item];

    /// Number of items.
    fn count(&self) -> usize {
        self.list_items().len()
    }

    /// Look up an item by key.
    fn find(&self, key: &ItemKey) -> Option<&Item> {
        self.list_items().iter().find(|item| {
            item.number == key.number && item.brand == key.brand && item.collection == key.collection
        })
    }
}
