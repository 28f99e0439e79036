//! Multiplier plan and its translation into concrete quantities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Where a multiplier contribution came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    Feature,
    Event,
}

/// One multiplicative contribution to a category's raw multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub kind: DriverKind,
    /// Feature key or event kind.
    pub name: String,
    pub factor: f64,
}

impl Driver {
    pub fn feature(name: impl Into<String>, factor: f64) -> Self {
        Self {
            kind: DriverKind::Feature,
            name: name.into(),
            factor,
        }
    }

    pub fn event(name: impl Into<String>, factor: f64) -> Self {
        Self {
            kind: DriverKind::Event,
            name: name.into(),
            factor,
        }
    }

    /// Magnitude of the swing on a log scale (x2 and x0.5 weigh the same).
    pub fn strength(&self) -> f64 {
        self.factor.ln().abs()
    }
}

/// Clamp a raw multiplier into `[1/cap, cap]`.
///
/// A NaN raw value carries no usable information and maps to `1.0`.
pub fn clamp_to_cap(raw: f64, cap: f64) -> f64 {
    if raw.is_nan() {
        return 1.0;
    }
    raw.clamp(1.0 / cap, cap)
}

/// Multiplier for one category, with the contributions that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Product of all driver factors before clamping.
    pub raw: f64,
    /// Raw multiplier clamped into `[1/cap, cap]`.
    pub multiplier: f64,
    pub drivers: Vec<Driver>,
}

impl PlanEntry {
    /// Combine drivers multiplicatively and clamp against `cap`.
    pub fn from_drivers(drivers: Vec<Driver>, cap: f64) -> Self {
        let raw = drivers.iter().map(|d| d.factor).product::<f64>();
        Self {
            raw,
            multiplier: clamp_to_cap(raw, cap),
            drivers,
        }
    }

    /// The contribution with the largest swing; first one wins on ties.
    pub fn primary_driver(&self) -> Option<&Driver> {
        self.drivers.iter().fold(None, |best: Option<&Driver>, d| match best {
            Some(b) if b.strength() >= d.strength() => Some(b),
            _ => Some(d),
        })
    }

    pub fn was_clamped(&self) -> bool {
        self.raw != self.multiplier
    }
}

/// Capped multiplier per inventory category.
///
/// Invariant: every multiplier lies in `[1/cap, cap]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierPlan {
    cap: f64,
    entries: BTreeMap<String, PlanEntry>,
}

impl MultiplierPlan {
    /// Assemble a plan, checking the cap invariant for every entry.
    pub fn from_entries<I>(cap: f64, entries: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (String, PlanEntry)>,
    {
        validate_cap(cap)?;
        let entries: BTreeMap<String, PlanEntry> = entries.into_iter().collect();
        let floor = 1.0 / cap;
        for (category, entry) in &entries {
            if !(floor..=cap).contains(&entry.multiplier) {
                return Err(DomainError::invariant(format!(
                    "multiplier {} for '{category}' outside [{floor}, {cap}]",
                    entry.multiplier
                )));
            }
        }
        Ok(Self { cap, entries })
    }

    /// Plan from bare multipliers (no driver detail); values are clamped.
    pub fn from_multipliers<I, K>(cap: f64, multipliers: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        validate_cap(cap)?;
        let entries = multipliers.into_iter().map(|(k, m)| {
            let entry = PlanEntry {
                raw: m,
                multiplier: clamp_to_cap(m, cap),
                drivers: Vec::new(),
            };
            (k.into(), entry)
        });
        Self::from_entries(cap, entries)
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    pub fn multiplier(&self, category: &str) -> Option<f64> {
        self.entries.get(category).map(|e| e.multiplier)
    }

    pub fn entry(&self, category: &str) -> Option<&PlanEntry> {
        self.entries.get(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlanEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ValueObject for MultiplierPlan {}

/// `cap` must be finite and strictly greater than 1.
pub fn validate_cap(cap: f64) -> DomainResult<()> {
    if !(cap.is_finite() && cap > 1.0) {
        return Err(DomainError::validation(format!(
            "cap must be a finite number greater than 1.0 (got {cap})"
        )));
    }
    Ok(())
}

/// Concrete recommendation for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedLine {
    pub baseline: u64,
    pub multiplier: f64,
    pub recommended_quantity: u64,
    /// `recommended_quantity - baseline`.
    pub delta: i64,
}

impl TranslatedLine {
    pub fn is_unchanged(&self) -> bool {
        self.delta == 0
    }
}

/// Multiplier plan mapped onto the caller's baselines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedPlan(BTreeMap<String, TranslatedLine>);

impl TranslatedPlan {
    pub fn get(&self, category: &str) -> Option<&TranslatedLine> {
        self.0.get(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslatedLine)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
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

    /// Lines with a non-zero delta, largest absolute change first, then by name.
    pub fn changes_by_magnitude(&self) -> Vec<(&str, &TranslatedLine)> {
        let mut changed: Vec<_> = self.iter().filter(|(_, l)| !l.is_unchanged()).collect();
        changed.sort_by(|(a_name, a), (b_name, b)| {
            b.delta
                .unsigned_abs()
                .cmp(&a.delta.unsigned_abs())
                .then_with(|| a_name.cmp(b_name))
        });
        changed
    }

    /// Lines with zero delta, by name.
    pub fn unchanged(&self) -> Vec<(&str, &TranslatedLine)> {
        self.iter().filter(|(_, l)| l.is_unchanged()).collect()
    }
}

impl FromIterator<(String, TranslatedLine)> for TranslatedPlan {
    fn from_iter<T: IntoIterator<Item = (String, TranslatedLine)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl ValueObject for TranslatedPlan {}
