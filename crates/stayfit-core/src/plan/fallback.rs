//! Deterministic, network-free diet plan generator.
//!
//! Used when no generative-text service is configured and whenever the
//! service fails or answers with something that is not a plan.

use crate::profile::{FitnessGoal, ProfileError, UserProfile};

use super::model::{AmountRange, DetailedPlan, DietPlan};

/// Protein per kg of body weight, in tenths of a gram. Integer tenths keep
/// the product exact for whole-kilogram weights (80 kg x 2.2 = 176).
///
/// For fractional weights this can differ from a plain `weight * 2.2` in
/// the last bits (70.5 kg gives 155.1 rather than 155.10000000000002).
/// The difference is intentional; displayed values are rounded anyway.
const PROTEIN_TENTHS_MUSCLE_GAIN: u32 = 22;
const PROTEIN_TENTHS_DEFAULT: u32 = 16;

const CARBS_FAT_LOSS: AmountRange = AmountRange::new(2.0, 3.0);
const CARBS_DEFAULT: AmountRange = AmountRange::new(4.0, 6.0);
const WATER_LITERS: AmountRange = AmountRange::new(2.5, 3.0);

const CREATINE_MUSCLE_GAIN: &str = "5g daily consistently";
const CREATINE_DEFAULT: &str = "Optional, 3-5g daily";
const OTHER_NUTRIENTS: &str = "Focus on whole foods, adequate vitamins and minerals";

// Same for every goal.
const BREAKFAST: &str = "Oats with protein powder and berries, or eggs with whole grain toast";
const LUNCH: &str = "Grilled chicken/fish with quinoa and vegetables";
const DINNER: &str = "Lean protein with steamed vegetables and sweet potato";
const SNACKS: &str = "Greek yogurt, nuts, protein smoothies, fruits";
const SUPPLEMENTS: &str = "Whey protein, multivitamin, omega-3 if needed";

pub const TIP_FAT_LOSS: &str =
    "Focus on creating a moderate caloric deficit while maintaining protein intake.";
pub const TIP_MUSCLE_GAIN: &str =
    "Ensure you're eating in a caloric surplus and getting adequate protein throughout the day.";
pub const TIP_WEIGHT_GAIN: &str = "Increase meal frequency and include healthy high-calorie foods like nuts, avocados, and healthy oils.";

/// Compute a complete plan from a profile.
///
/// Pure: the same profile always yields an identical plan. Fails only when
/// the profile does not validate.
pub fn fallback_plan(profile: &UserProfile) -> Result<DietPlan, ProfileError> {
    profile.validate()?;

    let goal = profile.fitness_goal;

    let protein_tenths = match goal {
        FitnessGoal::MuscleGain => PROTEIN_TENTHS_MUSCLE_GAIN,
        FitnessGoal::FatLoss | FitnessGoal::WeightGain => PROTEIN_TENTHS_DEFAULT,
    };
    let protein_intake_grams = profile.weight * f64::from(protein_tenths) / 10.0;

    let carb_range_grams_per_kg = match goal {
        FitnessGoal::FatLoss => CARBS_FAT_LOSS,
        FitnessGoal::MuscleGain | FitnessGoal::WeightGain => CARBS_DEFAULT,
    };

    let creatine_advice_text = match goal {
        FitnessGoal::MuscleGain => CREATINE_MUSCLE_GAIN,
        FitnessGoal::FatLoss | FitnessGoal::WeightGain => CREATINE_DEFAULT,
    };

    let goal_tip = match goal {
        FitnessGoal::FatLoss => TIP_FAT_LOSS,
        FitnessGoal::MuscleGain => TIP_MUSCLE_GAIN,
        FitnessGoal::WeightGain => TIP_WEIGHT_GAIN,
    };
    let tips = format!(
        "Stay consistent with your nutrition plan. Track your progress and adjust portions \
         based on your {} goals. {goal_tip}",
        goal.label()
    );

    Ok(DietPlan {
        protein_intake_grams,
        carb_range_grams_per_kg,
        water_intake_liters: WATER_LITERS,
        creatine_advice_text: creatine_advice_text.to_string(),
        other_nutrients_text: OTHER_NUTRIENTS.to_string(),
        detailed_plan: DetailedPlan {
            overview: format!("Customized nutrition plan for {}", goal.label()),
            breakfast: BREAKFAST.to_string(),
            lunch: LUNCH.to_string(),
            dinner: DINNER.to_string(),
            snacks: SNACKS.to_string(),
            supplements: SUPPLEMENTS.to_string(),
            tips,
        },
    })
}
