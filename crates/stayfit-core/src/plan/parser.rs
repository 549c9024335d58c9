//! Decoding a diet plan out of free-form generated text.
//!
//! Models tend to wrap their JSON in prose or code fences, so the decoder
//! takes the span from the first `{` to the last `}` and parses that.

use thiserror::Error;

use super::model::DietPlan;

/// Errors from decoding a generated answer into a [`DietPlan`].
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("no JSON object found in generated text")]
    NoJsonObject,

    #[error("generated JSON does not match the plan shape: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Return the slice from the first `{` through the last `}`, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode and check a plan from raw generated text.
pub fn parse_diet_plan(text: &str) -> Result<DietPlan, PlanParseError> {
    let json = extract_json_object(text).ok_or(PlanParseError::NoJsonObject)?;
    let plan: DietPlan = serde_json::from_str(json)?;
    plan.check()?;
    Ok(plan)
}
