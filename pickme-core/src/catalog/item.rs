//! Item - A Single Catalog Entry
//!
//! `TigerStyle`: Explicit types, validation at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ITEM_BRAND_UNKNOWN, ITEM_FIELD_BYTES_MAX};

// =============================================================================
// ItemKey
// =============================================================================

/// Identity of an item.
///
/// Catalog numbers restart per brand and collection, so the number alone is
/// not unique. Ordering is (brand, collection, number) for stable output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    /// Brand the number belongs to
    pub brand: String,
    /// Collection the number belongs to
    pub collection: String,
    /// Catalog number within brand and collection
    pub number: String,
}

impl ItemKey {
    /// Create a new key.
    #[must_use]
    pub fn new(
        brand: impl Into<String>,
        collection: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            collection: collection.into(),
            number: number.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.brand, self.collection, self.number)
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// Item attribute that statistics can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Manufacturer
    Brand,
    /// Shade name
    ShadeName,
    /// Finish (creme, shimmer, ...)
    Finish,
    /// Collection or release
    Collection,
}

impl Dimension {
    /// Column name used in the flat vote record.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::ShadeName => "shade_name",
            Self::Finish => "finish",
            Self::Collection => "collection",
        }
    }

    /// All dimensions in display order.
    #[must_use]
    pub fn all() -> &'static [Dimension] {
        &[
            Self::Brand,
            Self::ShadeName,
            Self::Finish,
            Self::Collection,
        ]
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "brand" => Ok(Self::Brand),
            "shade_name" | "shade" => Ok(Self::ShadeName),
            "finish" => Ok(Self::Finish),
            "collection" => Ok(Self::Collection),
            other => Err(format!("unknown dimension: {other}")),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

fn default_brand() -> String {
    ITEM_BRAND_UNKNOWN.to_string()
}

/// A catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Catalog number, unique within brand and collection
    pub number: String,
    /// Manufacturer
    #[serde(default = "default_brand")]
    pub brand: String,
    /// Shade name
    #[serde(default)]
    pub shade_name: String,
    /// Finish
    #[serde(default)]
    pub finish: String,
    /// Collection or release
    #[serde(default)]
    pub collection: String,
}

impl Item {
    /// Create a new item.
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        brand: impl Into<String>,
        shade_name: impl Into<String>,
        finish: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            brand: brand.into(),
            shade_name: shade_name.into(),
            finish: finish.into(),
            collection: collection.into(),
        }
    }

    /// Identity of this item.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.brand, &self.collection, &self.number)
    }

    /// Value of the given attribute.
    #[must_use]
    pub fn attribute(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Brand => &self.brand,
            Dimension::ShadeName => &self.shade_name,
            Dimension::Finish => &self.finish,
            Dimension::Collection => &self.collection,
        }
    }

    /// Check field constraints.
    ///
    /// # Errors
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.number.trim().is_empty() {
            return Err("number must not be empty".to_string());
        }
        if self.brand.trim().is_empty() {
            return Err("brand must not be empty".to_string());
        }

        for (field, value) in [
            ("number", &self.number),
            ("brand", &self.brand),
            ("shade_name", &self.shade_name),
            ("finish", &self.finish),
            ("collection", &self.collection),
        ] {
            if value.len() > ITEM_FIELD_BYTES_MAX {
                return Err(format!(
                    "{field} is {} bytes, max {ITEM_FIELD_BYTES_MAX}",
                    value.len()
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (#{})", self.brand, self.shade_name, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_includes_brand_and_collection() {
        let a = Item::new("12", "Holo Taco", "Unicorn Skin", "holo", "Core");
        let b = Item::new("12", "ILNP", "Mega", "holo", "Core");

        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), ItemKey::new("Holo Taco", "Core", "12"));
    }

    #[test]
    fn test_attribute() {
        let item = Item::new("1", "Essie", "Ballet Slippers", "creme", "Classics");

        assert_eq!(item.attribute(Dimension::Brand), "Essie");
        assert_eq!(item.attribute(Dimension::ShadeName), "Ballet Slippers");
        assert_eq!(item.attribute(Dimension::Finish), "creme");
        assert_eq!(item.attribute(Dimension::Collection), "Classics");
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!("brand".parse::<Dimension>(), Ok(Dimension::Brand));
        assert_eq!("Shade Name".parse::<Dimension>(), Ok(Dimension::ShadeName));
        assert_eq!("FINISH".parse::<Dimension>(), Ok(Dimension::Finish));
        assert!("color".parse::<Dimension>().is_err());

        for dim in Dimension::all() {
            assert_eq!(dim.as_str().parse::<Dimension>(), Ok(*dim));
        }
    }

    #[test]
    fn test_validate() {
        assert!(Item::new("1", "Essie", "", "", "").validate().is_ok());
        assert!(Item::new(" ", "Essie", "", "", "").validate().is_err());
        assert!(Item::new("1", "", "", "", "").validate().is_err());

        let long = "x".repeat(ITEM_FIELD_BYTES_MAX + 1);
        let err = Item::new("1", "Essie", long, "", "").validate().unwrap_err();
        assert!(err.contains("shade_name"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let item: Item = serde_json::from_str(r#"{"number": "7"}"#).unwrap();

        assert_eq!(item.brand, ITEM_BRAND_UNKNOWN);
        assert_eq!(item.shade_name, "");
        assert_eq!(item.collection, "");
    }
}
