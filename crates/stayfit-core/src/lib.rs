//! StayFit domain: profiles, diet plans and the services behind them.
//!
//! The fallback generator ([`plan::fallback_plan`]) is pure. Everything
//! else reaches a collaborator through a trait: [`auth::AuthService`],
//! [`store::DocumentStore`] and [`ai::TextGenerator`]. [`AppSession`]
//! ties them together into the user actions.

pub mod ai;
pub mod auth;
pub mod orchestrator;
pub mod plan;
pub mod profile;
pub mod session;
pub mod store;

pub use orchestrator::PlanOrchestrator;
pub use plan::{DietPlan, PlanOutcome, PlanSource};
pub use profile::{FitnessGoal, ProfileError, UserProfile};
pub use session::{AppSession, LoadOutcome, SessionError};
pub use store::repo::StoredDietPlan;
