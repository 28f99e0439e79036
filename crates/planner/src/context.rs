//! Defensive parsing of the caller's free-form inventory description.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use surgeplan_core::inventory::MAX_QUANTITY;
use surgeplan_core::{DomainResult, InventoryBaseline};

const OCCUPANCY_KEYS: &[&str] = &["occupancy", "bed_occupancy", "bed occupancy", "census"];
const NESTED_KEYS: &[&str] = &["inventory", "items", "supplies"];
const NAME_KEYS: &[&str] = &["category", "name", "item"];
const QUANTITY_KEYS: &[&str] = &["quantity", "qty", "count", "on_hand"];
const SEPARATORS: &[char] = &[',', ';', '\t', ':', '='];

/// Which shape the description was recognised as.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextFormat {
    /// Nothing was supplied.
    Empty,
    Json,
    Delimited,
    /// Something was supplied but nothing usable could be read from it.
    Unknown,
}

/// What could be read from an inventory description.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryContext {
    pub format: ContextFormat,
    pub quantities: BTreeMap<String, u64>,
    /// Bed occupancy as a fraction in \[0, 1\].
    pub occupancy: Option<f64>,
}

impl InventoryContext {
    fn new(format: ContextFormat) -> Self {
        Self {
            format,
            quantities: BTreeMap::new(),
            occupancy: None,
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self.format, ContextFormat::Json | ContextFormat::Delimited)
    }

    /// Parsed quantities as a baseline.
    pub fn baseline(&self) -> DomainResult<InventoryBaseline> {
        InventoryBaseline::from_quantities(self.quantities.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    fn add_quantity(&mut self, name: &str, raw: f64) {
        let name = name.trim();
        if name.is_empty() || !raw.is_finite() || raw < 0.0 {
            return;
        }
        let qty = raw.round();
        if qty > MAX_QUANTITY as f64 {
            return;
        }
        let slot = self.quantities.entry(name.to_string()).or_insert(0);
        *slot = slot.saturating_add(qty as u64).min(MAX_QUANTITY);
    }

    fn finish(mut self) -> Self {
        if self.quantities.is_empty() && self.occupancy.is_none() {
            self.format = ContextFormat::Unknown;
        }
        self
    }
}

/// Read quantities and occupancy from JSON, delimited lines or `name: qty` lines.
///
/// Never fails: unreadable input yields [`ContextFormat::Unknown`].
pub fn parse_inventory_context(raw: &str) -> InventoryContext {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return InventoryContext::new(ContextFormat::Empty);
    }

    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        let mut ctx = InventoryContext::new(ContextFormat::Json);
        read_json(&mut ctx, &value);
        return ctx.finish();
    }

    let mut ctx = InventoryContext::new(ContextFormat::Delimited);
    for line in trimmed.lines() {
        read_line(&mut ctx, line);
    }
    ctx.finish()
}

fn read_json(ctx: &mut InventoryContext, value: &JsonValue) {
    match value {
        JsonValue::Object(map) => {
            for (key, v) in map {
                if is_key(key, OCCUPANCY_KEYS) {
                    if let Some(occ) = number(v).and_then(normalize_occupancy) {
                        ctx.occupancy = Some(occ);
                    }
                } else if is_key(key, NESTED_KEYS) && (v.is_object() || v.is_array()) {
                    read_json(ctx, v);
                } else if let Some(qty) = number(v) {
                    ctx.add_quantity(key, qty);
                }
            }
        }
        JsonValue::Array(items) => {
            for item in items.iter().filter_map(JsonValue::as_object) {
                let name = item
                    .iter()
                    .find(|(k, _)| is_key(k, NAME_KEYS))
                    .and_then(|(_, v)| v.as_str());
                let qty = item
                    .iter()
                    .find(|(k, _)| is_key(k, QUANTITY_KEYS))
                    .and_then(|(_, v)| number(v));
                if let (Some(name), Some(qty)) = (name, qty) {
                    ctx.add_quantity(name, qty);
                }
            }
        }
        _ => {}
    }
}

fn read_line(ctx: &mut InventoryContext, line: &str) {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return;
    }
    let Some(sep_at) = line.find(SEPARATORS) else {
        return;
    };
    let name = line[..sep_at].trim().trim_matches('"');
    let rest = &line[sep_at + 1..];
    let Some(first_field) = rest.split(SEPARATORS).map(str::trim).find(|f| !f.is_empty()) else {
        return;
    };
    let first_field = first_field.trim_matches('"');

    if is_key(name, OCCUPANCY_KEYS) {
        if let Some(occ) = parse_number(first_field).and_then(normalize_occupancy) {
            ctx.occupancy = Some(occ);
        }
        return;
    }
    // Header rows ("category,quantity") fall through here: the value is not numeric.
    if let Some(qty) = parse_number(first_field) {
        ctx.add_quantity(name, qty);
    }
}

fn is_key(key: &str, candidates: &[&str]) -> bool {
    let key = key.trim();
    candidates.iter().any(|c| key.eq_ignore_ascii_case(c))
}

fn number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => parse_number(s),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().trim_end_matches('%').trim().replace('_', "").parse().ok()
}

/// Fractions pass through; values in (1, 100] are percentages.
fn normalize_occupancy(raw: f64) -> Option<f64> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let fraction = if raw > 1.0 { raw / 100.0 } else { raw };
    Some(fraction.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        let ctx = parse_inventory_context("   ");
        assert_eq!(ctx.format, ContextFormat::Empty);
        assert!(!ctx.is_readable());
    }

    #[test]
    fn json_object_with_occupancy_and_nested_items() {
        let ctx = parse_inventory_context(
            r#"{"bed_occupancy": "92%", "inventory": {"N95 masks": 100, "IV fluids": "200"}, "note": "weekly"}"#,
        );
        assert_eq!(ctx.format, ContextFormat::Json);
        assert_eq!(ctx.quantities.get("N95 masks"), Some(&100));
        assert_eq!(ctx.quantities.get("IV fluids"), Some(&200));
        assert!(!ctx.quantities.contains_key("note"));
        assert!((ctx.occupancy.unwrap() - 0.92).abs() < 1e-12);
    }

    #[test]
    fn json_array_of_rows() {
        let ctx = parse_inventory_context(
            r#"[{"item":"gloves","qty":500},{"name":"gowns","on_hand":80},{"name":"broken"}]"#,
        );
        assert_eq!(ctx.quantities.len(), 2);
        assert_eq!(ctx.quantities.get("gowns"), Some(&80));
    }

    #[test]
    fn csv_with_header_and_duplicates() {
        let ctx = parse_inventory_context(
            "category,quantity\nN95 masks,100\nN95 masks,20\nsaline;40\n# comment\n",
        );
        assert_eq!(ctx.format, ContextFormat::Delimited);
        assert_eq!(ctx.quantities.get("N95 masks"), Some(&120));
        assert_eq!(ctx.quantities.get("saline"), Some(&40));
        assert!(!ctx.quantities.contains_key("category"));
    }

    #[test]
    fn key_value_lines_with_occupancy() {
        let ctx = parse_inventory_context("Gauze: 300\noccupancy = 0.8\nOxygen cylinders=12.4");
        assert_eq!(ctx.quantities.get("Gauze"), Some(&300));
        assert_eq!(ctx.quantities.get("Oxygen cylinders"), Some(&12));
        assert_eq!(ctx.occupancy, Some(0.8));
    }

    #[test]
    fn negative_and_garbage_values_are_skipped() {
        let ctx = parse_inventory_context("gloves,-5\ngowns,lots");
        assert_eq!(ctx.format, ContextFormat::Unknown);
        assert!(ctx.quantities.is_empty());
    }

    #[test]
    fn prose_is_unknown() {
        let ctx = parse_inventory_context("we have plenty of everything");
        assert_eq!(ctx.format, ContextFormat::Unknown);
        let ctx = parse_inventory_context("42");
        assert_eq!(ctx.format, ContextFormat::Unknown);
    }

    #[test]
    fn baseline_from_context() {
        let ctx = parse_inventory_context("gloves: 10");
        let baseline = ctx.baseline().unwrap();
        assert_eq!(baseline.get("gloves"), Some(10));
    }
}
