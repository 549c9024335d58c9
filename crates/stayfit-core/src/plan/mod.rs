//! Diet plans: data model, fallback generator, prompt and response handling.

pub mod fallback;
pub mod model;
pub mod parser;
pub mod prompt;

pub use fallback::fallback_plan;
pub use model::{AmountRange, DetailedPlan, DietPlan, PlanOutcome, PlanSource};
pub use parser::{PlanParseError, extract_json_object, parse_diet_plan};
pub use prompt::build_plan_prompt;
