//! Plan request policy: ask the generative service first, fall back to the
//! local generator on any failure.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ai::TextGenerator;
use crate::plan::{PlanOutcome, PlanSource, build_plan_prompt, fallback_plan, parse_diet_plan};
use crate::profile::{ProfileError, UserProfile};

/// Produces a [`PlanOutcome`] for a profile.
///
/// Without a generator every plan comes from [`fallback_plan`].
#[derive(Clone, Default)]
pub struct PlanOrchestrator {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl PlanOrchestrator {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// An orchestrator that never calls out.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(Some(generator))
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Get a plan for `profile`.
    ///
    /// Only an invalid profile is an error. Service failures and
    /// undecodable answers degrade to the fallback plan.
    pub async fn request_plan(&self, profile: &UserProfile) -> Result<PlanOutcome, ProfileError> {
        profile.validate()?;

        let Some(generator) = &self.generator else {
            info!("no generative service configured; using fallback plan");
            return Self::fallback(profile);
        };

        let prompt = build_plan_prompt(profile);
        let text = match generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(service = generator.name(), error = %format!("{e:#}"), "plan generation failed; using fallback plan");
                return Self::fallback(profile);
            }
        };

        match parse_diet_plan(&text) {
            Ok(plan) => {
                info!(service = generator.name(), "generated diet plan");
                Ok(PlanOutcome {
                    plan,
                    source: PlanSource::Generated,
                })
            }
            Err(e) => {
                warn!(service = generator.name(), error = %e, "could not decode generated plan; using fallback plan");
                Self::fallback(profile)
            }
        }
    }

    fn fallback(profile: &UserProfile) -> Result<PlanOutcome, ProfileError> {
        Ok(PlanOutcome {
            plan: fallback_plan(profile)?,
            source: PlanSource::Fallback,
        })
    }
}

impl std::fmt::Debug for PlanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanOrchestrator")
            .field("generator", &self.generator.as_ref().map(|g| g.name()))
            .finish()
    }
}
