//! `InMemoryCatalog` - Catalog Loaded Up Front
//!
//! `TigerStyle`: Validate everything on load, then never change.

use std::collections::HashMap;
use std::path::Path;

use super::{Catalog, CatalogError, Item, ItemKey};
use crate::constants::CATALOG_ITEMS_COUNT_MAX;

/// Catalog held entirely in memory.
///
/// Items keep the order they were supplied in.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: Vec<Item>,
    index: HashMap<ItemKey, usize>,
}

impl InMemoryCatalog {
    /// Build a catalog from items.
    ///
    /// # Errors
    /// Returns `CatalogError` if an item is invalid, a key repeats, or there
    /// are more than `CATALOG_ITEMS_COUNT_MAX` items.
    pub fn from_items(items: Vec<Item>) -> Result<Self, CatalogError> {
        if items.len() > CATALOG_ITEMS_COUNT_MAX {
            return Err(CatalogError::TooManyItems {
                count: items.len(),
                max: CATALOG_ITEMS_COUNT_MAX,
            });
        }

        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            item.validate()
                .map_err(|reason| CatalogError::invalid_item(item.key().to_string(), reason))?;

            let key = item.key();
            if index.insert(key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateItem { key });
            }
        }

        tracing::debug!(items = items.len(), "catalog loaded");

        // Postcondition
        assert_eq!(index.len(), items.len(), "every item must be indexed");

        Ok(Self { items, index })
    }

    /// Parse a JSON array of items.
    ///
    /// # Errors
    /// Returns `CatalogError::Parse` on malformed JSON, or any
    /// [`from_items`](Self::from_items) error.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<Item> =
            serde_json::from_str(json).map_err(|e| CatalogError::parse(e.to_string()))?;
        Self::from_items(items)
    }

    /// Read and parse a JSON catalog file.
    ///
    /// # Errors
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn list_items(&self) -> &[Item] {
        &self.items
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn find(&self, key: &ItemKey) -> Option<&Item> {
        self.index.get(key).map(|&position| &self.items[position])
    }
}
