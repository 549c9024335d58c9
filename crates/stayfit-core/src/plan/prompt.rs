//! Prompt construction for generated diet plans.

use crate::profile::UserProfile;

/// JSON shape the model is asked to answer with. Mirrors [`super::DietPlan`].
const RESPONSE_SCHEMA: &str = r#"## Response format

Answer with a single JSON object and nothing else:

```json
{
  "proteinIntakeGrams": 0,
  "carbRangeGramsPerKg": { "low": 0, "high": 0 },
  "waterIntakeLiters": { "low": 0, "high": 0 },
  "creatineAdviceText": "specific creatine recommendations",
  "otherNutrientsText": "other important nutrients and vitamins",
  "detailedPlan": {
    "overview": "brief overview of the diet plan",
    "breakfast": "breakfast recommendations",
    "lunch": "lunch recommendations",
    "dinner": "dinner recommendations",
    "snacks": "healthy snack options",
    "supplements": "supplement recommendations",
    "tips": "additional diet tips"
  }
}
```

- `proteinIntakeGrams`: grams of protein per day, a positive number.
- `carbRangeGramsPerKg`: grams of carbohydrate per kg of body weight per day.
- `waterIntakeLiters`: liters of water per day.
- Every text field must be non-empty.
"#;

const GOAL_GUIDELINES: &str = r#"## Guidelines by goal

- Muscle gain: higher protein, adequate carbs, caloric surplus.
- Fat loss: moderate protein, controlled carbs, caloric deficit.
- Weight gain: higher calories, balanced macros, frequent meals.

Keep all recommendations safe, realistic, and based on scientific evidence.
"#;

/// Build the prompt asking for a personalized plan.
pub fn build_plan_prompt(profile: &UserProfile) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("Create a personalized diet plan for a user with the following profile:\n\n");
    prompt.push_str(&format!("- Name: {}\n", profile.name));
    prompt.push_str(&format!("- Age: {} years\n", profile.age));
    prompt.push_str(&format!("- Weight: {} kg\n", profile.weight));
    prompt.push_str(&format!("- Height: {} cm\n", profile.height));
    prompt.push_str(&format!(
        "- Fitness goal: {} ({})\n\n",
        profile.fitness_goal.label(),
        profile.fitness_goal
    ));

    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push('\n');
    prompt.push_str(GOAL_GUIDELINES);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FitnessGoal;

    #[test]
    fn prompt_includes_profile_and_schema() {
        let profile = UserProfile::new("Lee", 41, 92.5, 188.0, FitnessGoal::FatLoss).unwrap();
        let prompt = build_plan_prompt(&profile);

        assert!(prompt.contains("- Name: Lee\n"));
        assert!(prompt.contains("- Age: 41 years\n"));
        assert!(prompt.contains("- Weight: 92.5 kg\n"));
        assert!(prompt.contains("- Height: 188 cm\n"));
        assert!(prompt.contains("- Fitness goal: fat loss (fat_loss)"));
        assert!(prompt.contains("\"proteinIntakeGrams\""));
        assert!(prompt.contains("\"detailedPlan\""));
        assert!(prompt.contains("Fat loss: moderate protein"));
    }
}
