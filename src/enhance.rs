//! Bounded merge of an external prose-enhancement payload into a
//! synthesized recommendation.
//!
//! The enhancement collaborator (typically an LLM) may only touch the
//! allow-listed string-list fields: `rationale` (prepended),
//! `expected_taste`, `prep`, and `grinder.notes` (replaced). The numeric
//! contract stays authoritative: `target`, `grinder.setting_value`, and
//! `confidence` are never altered. Enhancement is best-effort; anything
//! malformed leaves the synthesized object unchanged.

use serde_json::Value;
use tracing::warn;

use crate::contract::{validate_recommendation, Recommendation};

/// Merge enhancement prose into `base`, returning the merged recommendation
/// if it re-passes validation and the unchanged base otherwise.
pub fn apply_enhancement(base: &Recommendation, enhancement: &Value) -> Recommendation {
    let mut merged = base.clone();

    // Enhancement rationale is prepended, the engine's reasoning stays
    if let Some(rationale) = string_array(enhancement.get("rationale")) {
        let mut combined = rationale;
        combined.extend(base.rationale.iter().cloned());
        merged.rationale = combined;
    }

    if let Some(taste) = string_array(enhancement.get("expected_taste")) {
        if !taste.is_empty() {
            merged.expected_taste = taste;
        }
    }

    if let Some(prep) = string_array(enhancement.get("prep")) {
        if !prep.is_empty() {
            merged.prep = prep;
        }
    }

    if let Some(notes) = enhancement
        .get("grinder")
        .and_then(|g| string_array(g.get("notes")))
    {
        merged.grinder.notes = notes;
    }

    match validate_recommendation(&merged) {
        Ok(()) => merged,
        Err(e) => {
            warn!("Enhancement produced an invalid recommendation, keeping the synthesized one: {}", e);
            base.clone()
        }
    }
}

/// Read a JSON value as an array of strings; any non-string element makes
/// the whole field read as absent.
fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}
