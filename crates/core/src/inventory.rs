//! Location and baseline inventory inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Longest accepted location string (width of the plan store's location column).
pub const MAX_LOCATION_LEN: usize = 255;

/// Largest baseline quantity accepted (exactly representable as `f64`).
pub const MAX_QUANTITY: u64 = 1 << 53;

/// Facility location (city, region or a `lat,lon` pair).
///
/// Opaque to the core apart from being a stable lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Trim and validate a caller-supplied location.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("location cannot be empty"));
        }
        if trimmed.chars().count() > MAX_LOCATION_LEN {
            return Err(DomainError::validation(format!(
                "location exceeds {MAX_LOCATION_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for Location {}

/// Baseline quantity per inventory category.
///
/// Keys are trimmed, non-empty and unique; quantities are whole units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryBaseline(BTreeMap<String, u64>);

impl InventoryBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a baseline from whole quantities, validating category names.
    pub fn from_quantities<I, K>(entries: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        let mut map = BTreeMap::new();
        for (name, qty) in entries {
            let name = normalize_category(name.as_ref())?;
            if qty > MAX_QUANTITY {
                return Err(DomainError::validation(format!(
                    "baseline for '{name}' exceeds {MAX_QUANTITY}"
                )));
            }
            if map.insert(name.clone(), qty).is_some() {
                return Err(DomainError::validation(format!(
                    "duplicate category '{name}'"
                )));
            }
        }
        Ok(Self(map))
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.0.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ValueObject for InventoryBaseline {}

/// Trim a category name and reject empty ones.
pub fn normalize_category(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("category name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Convert a caller-supplied numeric quantity into whole units.
pub fn whole_quantity(category: &str, value: f64) -> DomainResult<u64> {
    if !value.is_finite() {
        return Err(DomainError::validation(format!(
            "baseline for '{category}' must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(DomainError::validation(format!(
            "baseline for '{category}' cannot be negative"
        )));
    }
    if value.fract() != 0.0 {
        return Err(DomainError::validation(format!(
            "baseline for '{category}' must be a whole quantity"
        )));
    }
    if value > MAX_QUANTITY as f64 {
        return Err(DomainError::validation(format!(
            "baseline for '{category}' exceeds {MAX_QUANTITY}"
        )));
    }
    Ok(value as u64)
}
