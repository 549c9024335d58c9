//! Typed access to profile and plan documents.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Document, DocumentKey, DocumentStore};
use crate::auth::UserId;
use crate::plan::{DietPlan, PlanOutcome};
use crate::profile::UserProfile;

/// The `dietPlans/{uid}` document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDietPlan {
    pub user_id: UserId,
    pub plan: DietPlan,
    /// True when the plan came from the local generator.
    pub fallback: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body layout of a plan document: the plan's fields at top level, plus
/// the owner and the fallback flag.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanBody {
    user_id: UserId,
    #[serde(flatten)]
    plan: DietPlan,
    #[serde(default)]
    fallback: bool,
}

fn plan_body(uid: &UserId, outcome: &PlanOutcome) -> Result<serde_json::Value> {
    serde_json::to_value(PlanBody {
        user_id: uid.clone(),
        plan: outcome.plan.clone(),
        fallback: outcome.fallback(),
    })
    .context("failed to encode diet plan")
}

fn stored_plan(document: Document) -> Result<StoredDietPlan> {
    let body: PlanBody = serde_json::from_value(document.body)
        .with_context(|| format!("malformed diet plan document {}", document.key))?;
    Ok(StoredDietPlan {
        user_id: body.user_id,
        plan: body.plan,
        fallback: body.fallback,
        created_at: document.created_at,
        updated_at: document.updated_at,
    })
}

fn profile_body(profile: &UserProfile) -> Result<serde_json::Value> {
    serde_json::to_value(profile).context("failed to encode profile")
}

/// Write `users/{uid}`, replacing any existing profile.
pub async fn create_user_profile(
    store: &dyn DocumentStore,
    uid: &UserId,
    profile: &UserProfile,
) -> Result<()> {
    store
        .set(&DocumentKey::user(uid), profile_body(profile)?)
        .await
        .with_context(|| format!("failed to save profile for {uid}"))?;
    info!(%uid, "profile saved");
    Ok(())
}

pub async fn get_user_profile(store: &dyn DocumentStore, uid: &UserId) -> Result<Option<UserProfile>> {
    let key = DocumentKey::user(uid);
    let Some(document) = store
        .get(&key)
        .await
        .with_context(|| format!("failed to load profile for {uid}"))?
    else {
        return Ok(None);
    };
    let profile = serde_json::from_value(document.body)
        .with_context(|| format!("malformed profile document {key}"))?;
    Ok(Some(profile))
}

/// Merge the profile's fields into an existing `users/{uid}`.
pub async fn update_user_profile(
    store: &dyn DocumentStore,
    uid: &UserId,
    profile: &UserProfile,
) -> Result<()> {
    store
        .update(&DocumentKey::user(uid), profile_body(profile)?)
        .await
        .with_context(|| format!("failed to update profile for {uid}"))?;
    info!(%uid, "profile updated");
    Ok(())
}

/// Write `dietPlans/{uid}`, replacing any existing plan.
pub async fn save_diet_plan(
    store: &dyn DocumentStore,
    uid: &UserId,
    outcome: &PlanOutcome,
) -> Result<StoredDietPlan> {
    let document = store
        .set(&DocumentKey::diet_plan(uid), plan_body(uid, outcome)?)
        .await
        .with_context(|| format!("failed to save diet plan for {uid}"))?;
    info!(%uid, fallback = outcome.fallback(), "diet plan saved");
    stored_plan(document)
}

pub async fn get_diet_plan(store: &dyn DocumentStore, uid: &UserId) -> Result<Option<StoredDietPlan>> {
    store
        .get(&DocumentKey::diet_plan(uid))
        .await
        .with_context(|| format!("failed to load diet plan for {uid}"))?
        .map(stored_plan)
        .transpose()
}

/// Replace the plan fields of an existing `dietPlans/{uid}`, keeping its
/// creation time.
pub async fn update_diet_plan(
    store: &dyn DocumentStore,
    uid: &UserId,
    outcome: &PlanOutcome,
) -> Result<StoredDietPlan> {
    let document = store
        .update(&DocumentKey::diet_plan(uid), plan_body(uid, outcome)?)
        .await
        .with_context(|| format!("failed to update diet plan for {uid}"))?;
    info!(%uid, fallback = outcome.fallback(), "diet plan updated");
    stored_plan(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanSource, fallback_plan};
    use crate::profile::FitnessGoal;
    use crate::store::{MemoryStore, StoreError};
    use serde_json::json;

    fn uid() -> UserId {
        UserId::new("user-1")
    }

    fn profile() -> UserProfile {
        UserProfile::new("Lee", 29, 70.0, 165.0, FitnessGoal::FatLoss).unwrap()
    }

    fn outcome(source: PlanSource) -> PlanOutcome {
        PlanOutcome {
            plan: fallback_plan(&profile()).unwrap(),
            source,
        }
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(get_user_profile(&store, &uid()).await.unwrap(), None);

        create_user_profile(&store, &uid(), &profile()).await.unwrap();
        assert_eq!(
            get_user_profile(&store, &uid()).await.unwrap(),
            Some(profile())
        );
    }

    #[tokio::test]
    async fn profile_body_uses_camel_case_keys() {
        let store = MemoryStore::new();
        create_user_profile(&store, &uid(), &profile()).await.unwrap();
        let body = store.get(&DocumentKey::user(&uid())).await.unwrap().unwrap().body;
        assert_eq!(body["fitnessGoal"], json!("fat_loss"));
        assert_eq!(body["name"], json!("Lee"));
    }

    #[tokio::test]
    async fn update_profile_requires_existing_document() {
        let store = MemoryStore::new();
        let err = update_user_profile(&store, &uid(), &profile())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn plan_document_is_flat() {
        let store = MemoryStore::new();
        let saved = save_diet_plan(&store, &uid(), &outcome(PlanSource::Fallback))
            .await
            .unwrap();
        assert!(saved.fallback);
        assert_eq!(saved.user_id, uid());

        let body = store
            .get(&DocumentKey::diet_plan(&uid()))
            .await
            .unwrap()
            .unwrap()
            .body;
        assert_eq!(body["userId"], json!("user-1"));
        assert_eq!(body["proteinIntakeGrams"], json!(112.0));
        assert_eq!(body["fallback"], json!(true));
    }

    #[tokio::test]
    async fn update_plan_keeps_created_at() {
        let store = MemoryStore::new();
        let first = save_diet_plan(&store, &uid(), &outcome(PlanSource::Fallback))
            .await
            .unwrap();

        let mut generated = outcome(PlanSource::Generated);
        generated.plan.protein_intake_grams = 120.0;
        let second = update_diet_plan(&store, &uid(), &generated).await.unwrap();

        assert!(!second.fallback);
        assert_eq!(second.plan.protein_intake_grams, 120.0);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(get_diet_plan(&store, &uid()).await.unwrap(), Some(second));
    }
}
