//! Feature extraction: calendar, season, hemisphere and capacity signals.

use chrono::{Datelike, NaiveDate, Weekday};

use surgeplan_core::features::vocabulary::*;
use surgeplan_core::{FeatureSet, Location};

use crate::context::{InventoryContext, parse_inventory_context};

/// Respiratory-season intensity by (northern-hemisphere) month, January first.
const RESPIRATORY_BY_MONTH: [f64; 12] =
    [1.0, 1.0, 0.6, 0.3, 0.0, 0.0, 0.0, 0.0, 0.0, 0.3, 0.6, 1.0];

/// Heat intensity by (northern-hemisphere) month, January first.
const HEAT_BY_MONTH: [f64; 12] = [0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 0.5, 0.0, 0.0, 0.0];

/// Holiday/travel windows as (month, first day, last day), inclusive.
const HOLIDAY_WINDOWS: &[(u32, u32, u32)] = &[
    (12, 20, 31),
    (1, 1, 2),
    (7, 3, 5),
    (11, 22, 28),
    (5, 25, 31),
    (9, 1, 7),
];

/// Derive demand signals for `location` on `as_of` from a raw inventory description.
///
/// Pure: the same inputs always give the same feature set. An unreadable
/// description is not an error; it yields `inventory.unknown` and
/// `capacity.unknown` markers instead.
pub fn extract_features(
    location: &Location,
    inventory_context: &str,
    as_of: NaiveDate,
) -> FeatureSet {
    features_from_context(location, &parse_inventory_context(inventory_context), as_of)
}

/// Same as [`extract_features`] for an already parsed description.
pub fn features_from_context(
    location: &Location,
    context: &InventoryContext,
    as_of: NaiveDate,
) -> FeatureSet {
    let mut features: Vec<(&str, f64)> = Vec::with_capacity(10);

    let southern = match parse_coordinates(location.as_str()) {
        Some((lat, _)) => {
            let southern = lat < 0.0;
            features.push((LOCATION_SOUTHERN_HEMISPHERE, if southern { 1.0 } else { 0.0 }));
            southern
        }
        None => {
            features.push((LOCATION_UNKNOWN_HEMISPHERE, 1.0));
            false
        }
    };

    let season_idx = seasonal_month(as_of.month(), southern) as usize - 1;
    features.push((SEASONAL_RESPIRATORY, RESPIRATORY_BY_MONTH[season_idx]));
    features.push((SEASONAL_HEAT, HEAT_BY_MONTH[season_idx]));
    features.push((CALENDAR_HOLIDAY, if is_holiday(as_of) { 1.0 } else { 0.0 }));
    features.push((
        CALENDAR_WEEKEND,
        if matches!(as_of.weekday(), Weekday::Sat | Weekday::Sun) { 1.0 } else { 0.0 },
    ));

    match context.occupancy {
        Some(occ) => features.push((CAPACITY_OCCUPANCY, occ.clamp(0.0, 1.0))),
        None => features.push((CAPACITY_UNKNOWN, 1.0)),
    }

    if context.is_readable() {
        features.push((INVENTORY_CATEGORIES, context.quantities.len() as f64));
    } else {
        features.push((INVENTORY_UNKNOWN, 1.0));
    }

    features.into_iter().collect()
}

/// Month used for seasonal tables; southern locations shift by six months.
fn seasonal_month(month: u32, southern: bool) -> u32 {
    if southern { (month + 5) % 12 + 1 } else { month }
}

fn is_holiday(date: NaiveDate) -> bool {
    let (m, d) = (date.month(), date.day());
    HOLIDAY_WINDOWS
        .iter()
        .any(|&(month, first, last)| m == month && (first..=last).contains(&d))
}

/// `"lat,lon"` (optionally with spaces) within valid ranges.
fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (lat, lon) = raw.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn winter_weekday_in_the_north() {
        // 2024-01-17 is a Wednesday.
        let f = extract_features(&loc("Chicago, IL"), "occupancy: 90%", date(2024, 1, 17));
        assert_eq!(f.get(SEASONAL_RESPIRATORY), Some(1.0));
        assert_eq!(f.get(SEASONAL_HEAT), Some(0.0));
        assert_eq!(f.get(CALENDAR_HOLIDAY), Some(0.0));
        assert_eq!(f.get(CALENDAR_WEEKEND), Some(0.0));
        assert_eq!(f.get(CAPACITY_OCCUPANCY), Some(0.9));
        assert!(f.is_flagged(LOCATION_UNKNOWN_HEMISPHERE));
        assert!(!f.is_flagged(CAPACITY_UNKNOWN));
    }

    #[test]
    fn southern_coordinates_flip_the_seasons() {
        let f = extract_features(&loc("-33.87, 151.21"), "", date(2024, 7, 10));
        assert_eq!(f.get(LOCATION_SOUTHERN_HEMISPHERE), Some(1.0));
        assert_eq!(f.get(SEASONAL_RESPIRATORY), Some(1.0));
        assert_eq!(f.get(SEASONAL_HEAT), Some(0.0));

        let north = extract_features(&loc("33.45,-112.07"), "", date(2024, 7, 10));
        assert_eq!(north.get(LOCATION_SOUTHERN_HEMISPHERE), Some(0.0));
        assert_eq!(north.get(SEASONAL_HEAT), Some(1.0));
    }

    #[test]
    fn holiday_and_weekend() {
        // 2023-12-23 is a Saturday.
        let f = extract_features(&loc("Boston"), "", date(2023, 12, 23));
        assert_eq!(f.get(CALENDAR_HOLIDAY), Some(1.0));
        assert_eq!(f.get(CALENDAR_WEEKEND), Some(1.0));
    }

    #[test]
    fn unreadable_context_degrades_to_markers() {
        let f = extract_features(&loc("Boston"), "lots of stuff, really", date(2024, 3, 12));
        assert!(f.is_flagged(INVENTORY_UNKNOWN));
        assert!(f.is_flagged(CAPACITY_UNKNOWN));
        assert_eq!(f.get(INVENTORY_CATEGORIES), None);
        // Calendar signals are still present.
        assert_eq!(f.get(SEASONAL_RESPIRATORY), Some(0.6));
    }

    #[test]
    fn readable_context_counts_categories() {
        let inventory = r#"{"gloves": 10, "gowns": 4}"#;
        let f = extract_features(&loc("Boston"), inventory, date(2024, 3, 12));
        assert_eq!(f.get(INVENTORY_CATEGORIES), Some(2.0));
        assert!(!f.is_flagged(INVENTORY_UNKNOWN));
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_features(&loc("Boston"), "gloves: 3", date(2024, 5, 27));
        let b = extract_features(&loc("Boston"), "gloves: 3", date(2024, 5, 27));
        assert_eq!(a, b);
    }

    #[test]
    fn out_of_range_coordinates_are_not_coordinates() {
        assert!(parse_coordinates("120, 10").is_none());
        assert!(parse_coordinates("Portland, OR").is_none());
        assert_eq!(parse_coordinates(" 10.5 , -20 "), Some((10.5, -20.0)));
    }
}
