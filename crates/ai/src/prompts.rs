use chrono::NaiveDate;

pub const EVENT_SYSTEM: &str = "You are a hospital emergency-preparedness analyst. \
You answer with strict JSON only, never prose.";

pub const BRIEFING_SYSTEM: &str = "You are a hospital operations planner writing a short \
briefing for supply-chain and nursing leadership. Plain language, no markdown tables.";

pub fn event_detection(location: &str, as_of: NaiveDate, categories: &[String]) -> String {
    let categories = if categories.is_empty() {
        "(none supplied)".to_string()
    } else {
        categories.join(", ")
    };
    format!(
        r#"Identify discrete local events that could change demand for hospital supplies
near "{location}" during the two weeks starting {as_of}.
Consider weather emergencies, heat or cold waves, disease outbreaks, mass gatherings,
holidays with travel surges, and infrastructure disruptions.

INVENTORY CATEGORIES:
{categories}

Output JSON:
{{
  "events": [
    {{
      "kind": "short event name",
      "confidence": 0.0,
      "effects": {{"<category from the list above>": 1.0}},
      "evidence": "one sentence"
    }}
  ]
}}

CONSTRAINTS:
- confidence is a probability in [0, 1].
- effects are demand multipliers (1.2 = +20%, 0.9 = -10%); only use listed categories.
- Return {{"events": []}} if nothing relevant is expected."#
    )
}

pub fn briefing(facts: &str) -> String {
    format!(
        r#"Write an operational surge briefing (120-220 words) from the plan below.

PLAN FACTS:
{facts}

CONSTRAINTS:
- Mention every category listed under "Changes" by its exact name, largest change first.
- Name the event or condition driving each change.
- State that unchanged categories need no action.
- Do not invent events, quantities or categories."#
    )
}
