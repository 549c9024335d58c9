//! Diet plan data model.

use serde::{Deserialize, Serialize};

use super::parser::PlanParseError;

/// An inclusive `low..=high` amount, e.g. grams of carbohydrate per kg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub low: f64,
    pub high: f64,
}

impl AmountRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Narrative part of a plan: one paragraph per meal or topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedPlan {
    pub overview: String,
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    pub snacks: String,
    pub supplements: String,
    pub tips: String,
}

/// Nutrition targets and guidance derived from a [`crate::UserProfile`].
///
/// A plan is never edited in place; regenerating produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub protein_intake_grams: f64,
    pub carb_range_grams_per_kg: AmountRange,
    pub water_intake_liters: AmountRange,
    pub creatine_advice_text: String,
    pub other_nutrients_text: String,
    pub detailed_plan: DetailedPlan,
}

impl DietPlan {
    /// Check that every number is finite and positive, ranges are ordered,
    /// and every text field is non-empty.
    pub fn check(&self) -> Result<(), PlanParseError> {
        check_amount("proteinIntakeGrams", self.protein_intake_grams)?;
        check_range("carbRangeGramsPerKg", &self.carb_range_grams_per_kg)?;
        check_range("waterIntakeLiters", &self.water_intake_liters)?;

        let d = &self.detailed_plan;
        let texts = [
            ("creatineAdviceText", &self.creatine_advice_text),
            ("otherNutrientsText", &self.other_nutrients_text),
            ("detailedPlan.overview", &d.overview),
            ("detailedPlan.breakfast", &d.breakfast),
            ("detailedPlan.lunch", &d.lunch),
            ("detailedPlan.dinner", &d.dinner),
            ("detailedPlan.snacks", &d.snacks),
            ("detailedPlan.supplements", &d.supplements),
            ("detailedPlan.tips", &d.tips),
        ];
        for (field, text) in texts {
            if text.trim().is_empty() {
                return Err(PlanParseError::InvalidField {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), PlanParseError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlanParseError::InvalidField {
            field,
            reason: format!("{value} is not a positive number"),
        })
    }
}

fn check_range(field: &'static str, range: &AmountRange) -> Result<(), PlanParseError> {
    check_amount(field, range.low)?;
    check_amount(field, range.high)?;
    if range.low > range.high {
        return Err(PlanParseError::InvalidField {
            field,
            reason: format!("low {} exceeds high {}", range.low, range.high),
        });
    }
    Ok(())
}

/// Where a plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Decoded from the generative-text service's answer.
    Generated,
    /// Computed locally by [`super::fallback_plan`].
    Fallback,
}

/// A plan together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub plan: DietPlan,
    pub source: PlanSource,
}

impl PlanOutcome {
    pub fn fallback(&self) -> bool {
        self.source == PlanSource::Fallback
    }
}
