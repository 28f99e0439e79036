//! Applying a multiplier plan to baseline quantities.

use serde::{Deserialize, Serialize};

use surgeplan_core::{InventoryBaseline, MultiplierPlan, TranslatedLine, TranslatedPlan};

/// How a scaled quantity becomes a whole number.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Nearest integer, halves away from zero (quantities are never negative).
    #[default]
    HalfUp,
    /// Never recommend less than the exact product.
    Up,
}

impl RoundingPolicy {
    pub fn round(self, x: f64) -> u64 {
        let rounded = match self {
            Self::HalfUp => (x + 0.5).floor(),
            // Absorb float noise such as 100 * 1.1 = 110.00000000000001.
            Self::Up => (x - 1e-9).ceil(),
        };
        // `as` saturates: NaN -> 0, negatives -> 0, overflow -> u64::MAX.
        rounded.max(0.0) as u64
    }
}

impl std::str::FromStr for RoundingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "half_up" | "half-up" | "nearest" => Ok(Self::HalfUp),
            "up" | "ceil" | "ceiling" => Ok(Self::Up),
            other => Err(format!("unknown rounding policy '{other}'")),
        }
    }
}

/// Translate `plan` onto `baselines` with half-up rounding.
pub fn apply_multipliers(plan: &MultiplierPlan, baselines: &InventoryBaseline) -> TranslatedPlan {
    apply_multipliers_with(plan, baselines, RoundingPolicy::HalfUp)
}

/// Translate `plan` onto `baselines`.
///
/// The result has exactly the baseline categories. A category the plan does
/// not cover keeps multiplier 1.0.
pub fn apply_multipliers_with(
    plan: &MultiplierPlan,
    baselines: &InventoryBaseline,
    rounding: RoundingPolicy,
) -> TranslatedPlan {
    baselines
        .iter()
        .map(|(category, baseline)| {
            let multiplier = plan.multiplier(category).unwrap_or(1.0);
            let recommended_quantity = rounding.round(baseline as f64 * multiplier);
            let delta = (recommended_quantity as i128 - baseline as i128)
                .clamp(i64::MIN as i128, i64::MAX as i128) as i64;
            (
                category.to_string(),
                TranslatedLine {
                    baseline,
                    multiplier,
                    recommended_quantity,
                    delta,
                },
            )
        })
        .collect()
}
