//! Terminal rendering of profiles and plans.

use std::fmt::Write;

use stayfit_core::plan::AmountRange;
use stayfit_core::{DietPlan, StoredDietPlan, UserProfile};

/// Print an amount without a trailing `.0` (`3` rather than `3.0`).
fn amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn range(r: &AmountRange) -> String {
    format!("{}-{}", amount(r.low), amount(r.high))
}

/// Whole grams, with halves rounded up.
pub fn protein(grams: f64) -> String {
    format!("{:.0} g per day", grams.round())
}

pub fn carbs(r: &AmountRange) -> String {
    format!("{} g per kg body weight", range(r))
}

pub fn water(r: &AmountRange) -> String {
    format!("{} liters per day", range(r))
}

pub fn bmi(profile: &UserProfile) -> String {
    format!("{:.1}", profile.bmi())
}

pub fn profile(p: &UserProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name:   {}", p.name);
    let _ = writeln!(out, "Age:    {}", p.age);
    let _ = writeln!(out, "Weight: {} kg", amount(p.weight));
    let _ = writeln!(out, "Height: {} cm", amount(p.height));
    let _ = writeln!(out, "Goal:   {}", p.fitness_goal.label());
    let _ = writeln!(out, "BMI:    {}", bmi(p));
    out
}

/// Render the targets and the narrative sections of a plan.
pub fn plan(plan: &DietPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Daily targets");
    let _ = writeln!(out, "  Protein:  {}", protein(plan.protein_intake_grams));
    let _ = writeln!(out, "  Carbs:    {}", carbs(&plan.carb_range_grams_per_kg));
    let _ = writeln!(out, "  Water:    {}", water(&plan.water_intake_liters));
    let _ = writeln!(out, "  Creatine: {}", plan.creatine_advice_text);
    let _ = writeln!(out, "  Other:    {}", plan.other_nutrients_text);

    let d = &plan.detailed_plan;
    for (title, text) in [
        ("Overview", &d.overview),
        ("Breakfast", &d.breakfast),
        ("Lunch", &d.lunch),
        ("Dinner", &d.dinner),
        ("Snacks", &d.snacks),
        ("Supplements", &d.supplements),
        ("Tips", &d.tips),
    ] {
        let _ = writeln!(out);
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "  {text}");
    }
    out
}

/// A stored plan with its provenance line.
pub fn stored_plan(stored: &StoredDietPlan) -> String {
    let source = if stored.fallback {
        "standard plan (AI service unavailable)"
    } else {
        "AI generated"
    };
    let mut out = String::new();
    let _ = writeln!(out, "Source:  {source}");
    let _ = writeln!(
        out,
        "Updated: {}",
        stored.updated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out);
    out.push_str(&plan(&stored.plan));
    out
}
