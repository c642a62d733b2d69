//! Simulated subjects and scripted replies for the reference scenarios.
//!
//! All data in this module is hardcoded and fictional. Replies are chosen by
//! the bracketed tag that opens each node's instructions (`[measure]`,
//! `[fit]`, ...) and computed from the agent attributes sent with the request.

use serde_json::{json, Value};

use cohort_contracts::{
    capability::PromptRequest,
    error::{CohortError, CohortResult},
};

// ── Request helpers ───────────────────────────────────────────────────────────

/// The `[tag]` at the start of the instructions, if any.
pub fn instruction_tag(instructions: &str) -> Option<&str> {
    let rest = instructions.trim_start().strip_prefix('[')?;
    rest.split_once(']').map(|(tag, _)| tag)
}

/// The agent attributes carried by `request`, or `Null` if they are not JSON.
fn attributes_of(request: &PromptRequest) -> Value {
    serde_json::from_str(&request.attributes).unwrap_or_default()
}

// ── Height screening ──────────────────────────────────────────────────────────

/// Replies for the height screening process.
///
/// - `[measure]` echoes the recorded height back, or fails when none exists
/// - `[fit]` assigns a garment size from the height
/// - `[confirm]` marks the fitting done
/// - `[refer]` refers the subject; heights above 220 get a numeric referral
///   code, which the node's schema rejects
pub fn screening_reply(request: &PromptRequest) -> CohortResult<String> {
    let attributes = attributes_of(request);
    let height = attributes.get("height").and_then(Value::as_f64);

    let reply = match instruction_tag(&request.instructions) {
        Some("measure") => match height {
            Some(h) => json!({ "height": h, "measured": true }),
            None => {
                return Err(CohortError::CapabilityCall {
                    reason: "no height reading on file for subject".to_string(),
                })
            }
        },
        Some("fit") => {
            let size = match height {
                Some(h) if h < 165.0 => "S",
                Some(h) if h < 180.0 => "M",
                _ => "L",
            };
            json!({ "size": size })
        }
        Some("confirm") => json!({ "fitted": true }),
        Some("refer") => match height {
            Some(h) if h > 220.0 => json!({ "referral": 7 }),
            _ => json!({ "referral": "custom-tailoring" }),
        },
        _ => json!({}),
    };
    Ok(reply.to_string())
}

// ── Population survey ─────────────────────────────────────────────────────────

/// Fictional respondents: (id, age, region).
pub const SURVEY_RESPONDENTS: [(&str, u64, &str); 4] = [
    ("respondent-1", 23, "north"),
    ("respondent-2", 41, "south"),
    ("respondent-3", 67, "east"),
    ("respondent-4", 35, "west"),
];

/// Replies for the population survey process.
///
/// `[income]` answers wrapped in a fenced code block, the way chat models
/// often do.
pub fn survey_reply(request: &PromptRequest) -> CohortResult<String> {
    let attributes = attributes_of(request);
    let age = attributes.get("age").and_then(Value::as_u64).unwrap_or(0);

    let reply = match instruction_tag(&request.instructions) {
        Some("age-band") => {
            let band = match age {
                0..=29 => "18-29",
                30..=49 => "30-49",
                50..=64 => "50-64",
                _ => "65+",
            };
            json!({ "age_band": band })
        }
        Some("income") => {
            let bracket = match attributes.get("region").and_then(Value::as_str) {
                Some("north") | Some("west") => "middle",
                Some("south") => "upper",
                _ => "lower",
            };
            return Ok(format!("```json\n{}\n```", json!({ "income_bracket": bracket })));
        }
        Some("satisfaction") => {
            let score = if age >= 65 { 4 } else { 3 };
            json!({ "satisfaction": score })
        }
        _ => json!({}),
    };
    Ok(reply.to_string())
}

#[cfg(test)]
mod tests {
    use super::instruction_tag;

    #[test]
    fn test_tags_are_read_from_the_instruction_prefix() {
        assert_eq!(instruction_tag("[measure] Record height."), Some("measure"));
        assert_eq!(instruction_tag("  [fit]"), Some("fit"));
        assert_eq!(instruction_tag("no tag here"), None);
        assert_eq!(instruction_tag("[unterminated"), None);
    }
}
