//! Demand-signal feature set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Feature keys produced by the extractor.
pub mod vocabulary {
    pub const SEASONAL_RESPIRATORY: &str = "seasonal.respiratory";
    pub const SEASONAL_HEAT: &str = "seasonal.heat";
    pub const CALENDAR_HOLIDAY: &str = "calendar.holiday";
    pub const CALENDAR_WEEKEND: &str = "calendar.weekend";
    pub const CAPACITY_OCCUPANCY: &str = "capacity.occupancy";
    pub const CAPACITY_UNKNOWN: &str = "capacity.unknown";
    pub const INVENTORY_CATEGORIES: &str = "inventory.categories";
    pub const INVENTORY_UNKNOWN: &str = "inventory.unknown";
    pub const LOCATION_SOUTHERN_HEMISPHERE: &str = "location.southern_hemisphere";
    pub const LOCATION_UNKNOWN_HEMISPHERE: &str = "location.unknown_hemisphere";

    /// Operator-facing wording for a feature key.
    pub fn label(key: &str) -> &str {
        match key {
            SEASONAL_RESPIRATORY => "respiratory season",
            SEASONAL_HEAT => "summer heat",
            CALENDAR_HOLIDAY => "holiday period",
            CALENDAR_WEEKEND => "weekend",
            CAPACITY_OCCUPANCY => "bed occupancy",
            CAPACITY_UNKNOWN => "occupancy not reported",
            INVENTORY_UNKNOWN => "inventory description unreadable",
            LOCATION_SOUTHERN_HEMISPHERE => "southern hemisphere",
            LOCATION_UNKNOWN_HEMISPHERE => "hemisphere not inferable from location",
            other => other,
        }
    }
}

/// Named demand signals derived from location and inventory context.
///
/// Produced once by the feature extractor and only read afterwards, so the
/// type exposes no mutation beyond construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeMap<String, f64>);

impl FeatureSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Value of a feature, or `0.0` when it was not derived.
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    /// True when an explicit `*.unknown` style marker is set.
    pub fn is_flagged(&self, marker: &str) -> bool {
        self.get(marker).is_some_and(|v| v >= 1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl ValueObject for FeatureSet {}
