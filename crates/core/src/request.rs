//! Planning request payload and boundary validation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::inventory::{InventoryBaseline, Location, whole_quantity};

/// Largest inventory description accepted, in bytes.
pub const MAX_INVENTORY_CONTEXT_BYTES: usize = 1 << 20;

/// Raw planning payload as received from the API layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub location: String,
    /// Serialized inventory description (JSON, CSV or `name: qty` lines).
    #[serde(default)]
    pub inventory: String,
    #[serde(default)]
    pub baselines: BTreeMap<String, f64>,
    /// Date whose conditions should be planned for; today (UTC) when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl PlanRequest {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            inventory: String::new(),
            baselines: BTreeMap::new(),
            as_of: None,
        }
    }

    pub fn with_inventory(mut self, inventory: impl Into<String>) -> Self {
        self.inventory = inventory.into();
        self
    }

    pub fn with_baseline(mut self, category: impl Into<String>, quantity: f64) -> Self {
        self.baselines.insert(category.into(), quantity);
        self
    }

    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Fail fast on malformed input, before any service call.
    pub fn validate(&self) -> DomainResult<ValidatedRequest> {
        let location = Location::parse(&self.location)?;

        if self.inventory.len() > MAX_INVENTORY_CONTEXT_BYTES {
            return Err(DomainError::validation(format!(
                "inventory description exceeds {MAX_INVENTORY_CONTEXT_BYTES} bytes"
            )));
        }

        let quantities = self
            .baselines
            .iter()
            .map(|(name, value)| Ok((name.as_str(), whole_quantity(name.trim(), *value)?)))
            .collect::<DomainResult<Vec<_>>>()?;
        let baselines = InventoryBaseline::from_quantities(quantities)?;

        Ok(ValidatedRequest {
            location,
            inventory: self.inventory.clone(),
            baselines,
            as_of: self.as_of,
        })
    }
}

/// A request that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub location: Location,
    pub inventory: String,
    pub baselines: InventoryBaseline,
    pub as_of: Option<NaiveDate>,
}
