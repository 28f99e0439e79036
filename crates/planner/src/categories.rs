//! Keyword classification of inventory categories.

use serde::{Deserialize, Serialize};

/// Categories planned for when neither baselines nor a readable inventory
/// description name any.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "N95 masks",
    "surgical masks",
    "gloves",
    "gowns",
    "IV fluids",
    "oxygen",
    "ventilator circuits",
    "bandages",
    "blood products",
];

/// Demand class of a category; decides which features move it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryClass {
    Respiratory,
    Hydration,
    Trauma,
    Protective,
    General,
}

const RESPIRATORY: &[&str] =
    &["mask", "n95", "respirator", "oxygen", "ventilat", "nebuli", "inhaler"];
const HYDRATION: &[&str] = &["fluid", "saline", "electrolyte", "lactated", "dextrose"];
const TRAUMA: &[&str] = &["bandage", "gauze", "suture", "splint", "tourniquet", "blood", "trauma"];
const PROTECTIVE: &[&str] = &["glove", "gown", "face shield", "sanitiz", "ppe", "disinfect"];

/// Classify by case-insensitive keyword; first matching class wins in the
/// order respiratory, hydration, trauma, protective.
pub fn classify(category: &str) -> CategoryClass {
    let lower = category.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
    let is_iv = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == "iv");

    if has(RESPIRATORY) {
        CategoryClass::Respiratory
    } else if is_iv || has(HYDRATION) {
        CategoryClass::Hydration
    } else if has(TRAUMA) {
        CategoryClass::Trauma
    } else if has(PROTECTIVE) {
        CategoryClass::Protective
    } else {
        CategoryClass::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_supplies() {
        assert_eq!(classify("N95 masks"), CategoryClass::Respiratory);
        assert_eq!(classify("Oxygen cylinders"), CategoryClass::Respiratory);
        assert_eq!(classify("IV fluids"), CategoryClass::Hydration);
        assert_eq!(classify("IV-start kits"), CategoryClass::Hydration);
        assert_eq!(classify("Normal saline 1L"), CategoryClass::Hydration);
        assert_eq!(classify("gauze pads"), CategoryClass::Trauma);
        assert_eq!(classify("Nitrile gloves"), CategoryClass::Protective);
        assert_eq!(classify("syringes"), CategoryClass::General);
    }

    #[test]
    fn iv_must_be_a_whole_word() {
        assert_eq!(classify("antivirals"), CategoryClass::General);
    }

    #[test]
    fn known_categories_cover_several_classes() {
        let classes: std::collections::HashSet<_> =
            KNOWN_CATEGORIES.iter().map(|c| classify(c)).collect();
        assert!(classes.len() >= 4);
    }
}
