//! Session controller: the user actions of the app.
//!
//! An [`AppSession`] owns the signed-in user and their profile. Every
//! action is one async call chain against the auth service, the document
//! store and the plan orchestrator. The session is owned by its caller, so
//! nothing here locks.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::auth::credentials::MIN_PASSWORD_LEN;
use crate::auth::{AuthError, AuthService, AuthUser};
use crate::orchestrator::PlanOrchestrator;
use crate::profile::{ProfileError, UserProfile};
use crate::store::repo::{self, StoredDietPlan};
use crate::store::{DocumentStore, StoreError};

/// What a user action can fail with.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("{service} unavailable: {source:#}")]
    ServiceUnavailable {
        service: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("no profile saved yet")]
    ProfileNotFound,
}

impl SessionError {
    fn store(source: anyhow::Error) -> Self {
        Self::ServiceUnavailable {
            service: "document store",
            source,
        }
    }

    /// Auth rejections are the user's to fix; anything else is an outage.
    fn auth(source: anyhow::Error) -> Self {
        match source.downcast::<AuthError>() {
            Ok(rejected) => Self::InvalidInput(rejected.to_string()),
            Err(source) => Self::ServiceUnavailable {
                service: "auth",
                source,
            },
        }
    }
}

/// Result of loading a user's data.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Signed in but no profile yet; the profile form comes next.
    NeedsProfile,
    Ready {
        profile: UserProfile,
        plan: StoredDietPlan,
    },
}

pub struct AppSession {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn DocumentStore>,
    planner: PlanOrchestrator,
    user: Option<AuthUser>,
    profile: Option<UserProfile>,
}

impl AppSession {
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: Arc<dyn DocumentStore>,
        planner: PlanOrchestrator,
    ) -> Self {
        Self {
            auth,
            store,
            planner,
            user: None,
            profile: None,
        }
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Create an account from the signup form and sign it in.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<AuthUser, SessionError> {
        if email.trim().is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(SessionError::InvalidInput(
                "please fill in all fields".to_string(),
            ));
        }
        if password != confirm {
            return Err(SessionError::InvalidInput(
                "passwords do not match".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let user = self
            .auth
            .sign_up(email, password)
            .await
            .map_err(SessionError::auth)?;
        self.user = Some(user.clone());
        self.profile = None;
        Ok(user)
    }

    /// Sign in and load the user's data.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<LoadOutcome, SessionError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(SessionError::InvalidInput(
                "please enter email and password".to_string(),
            ));
        }

        let user = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(SessionError::auth)?;
        self.user = Some(user);
        self.profile = None;
        self.load_user_data().await
    }

    pub async fn sign_out(&mut self) -> Result<(), SessionError> {
        self.auth.sign_out().await.map_err(SessionError::auth)?;
        self.clear();
        Ok(())
    }

    /// Apply an auth-state change observed on a subscription.
    ///
    /// Returns the loaded data for a signed-in state and `None` after a
    /// sign-out.
    pub async fn handle_auth_change(
        &mut self,
        state: Option<AuthUser>,
    ) -> Result<Option<LoadOutcome>, SessionError> {
        match state {
            Some(user) => {
                debug!(uid = %user.uid, "auth state: signed in");
                if self.user.as_ref() != Some(&user) {
                    self.profile = None;
                }
                self.user = Some(user);
                self.load_user_data().await.map(Some)
            }
            None => {
                debug!("auth state: signed out");
                self.clear();
                Ok(None)
            }
        }
    }

    /// Load the profile and plan, generating and saving a plan if the
    /// profile has none.
    pub async fn load_user_data(&mut self) -> Result<LoadOutcome, SessionError> {
        let uid = self.user.as_ref().ok_or(SessionError::NotSignedIn)?.uid.clone();

        let Some(profile) = repo::get_user_profile(self.store.as_ref(), &uid)
            .await
            .map_err(SessionError::store)?
        else {
            self.profile = None;
            return Ok(LoadOutcome::NeedsProfile);
        };
        self.profile = Some(profile.clone());

        let plan = match repo::get_diet_plan(self.store.as_ref(), &uid)
            .await
            .map_err(SessionError::store)?
        {
            Some(plan) => plan,
            None => {
                info!(%uid, "profile has no diet plan; generating one");
                let outcome = self.planner.request_plan(&profile).await?;
                repo::save_diet_plan(self.store.as_ref(), &uid, &outcome)
                    .await
                    .map_err(SessionError::store)?
            }
        };

        Ok(LoadOutcome::Ready { profile, plan })
    }

    /// Save a new profile, generate its plan, then reload.
    pub async fn submit_profile(&mut self, profile: UserProfile) -> Result<LoadOutcome, SessionError> {
        let uid = self.user.as_ref().ok_or(SessionError::NotSignedIn)?.uid.clone();
        profile.validate()?;

        repo::create_user_profile(self.store.as_ref(), &uid, &profile)
            .await
            .map_err(SessionError::store)?;

        let outcome = self.planner.request_plan(&profile).await?;
        repo::save_diet_plan(self.store.as_ref(), &uid, &outcome)
            .await
            .map_err(SessionError::store)?;

        self.load_user_data().await
    }

    /// Overwrite the stored profile's fields. The plan is left as is.
    pub async fn update_profile(&mut self, profile: UserProfile) -> Result<&UserProfile, SessionError> {
        let uid = self.user.as_ref().ok_or(SessionError::NotSignedIn)?.uid.clone();
        profile.validate()?;

        repo::update_user_profile(self.store.as_ref(), &uid, &profile)
            .await
            .map_err(|e| {
                if matches!(e.downcast_ref::<StoreError>(), Some(StoreError::NotFound(_))) {
                    SessionError::ProfileNotFound
                } else {
                    SessionError::store(e)
                }
            })?;

        Ok(self.profile.insert(profile))
    }

    /// Request a fresh plan for the loaded profile and store it.
    pub async fn regenerate_plan(&mut self) -> Result<StoredDietPlan, SessionError> {
        let uid = self.user.as_ref().ok_or(SessionError::NotSignedIn)?.uid.clone();
        let profile = self.profile.as_ref().ok_or(SessionError::ProfileNotFound)?;

        let outcome = self.planner.request_plan(profile).await?;
        let store = self.store.as_ref();
        let existing = repo::get_diet_plan(store, &uid)
            .await
            .map_err(SessionError::store)?;
        let written = match existing {
            Some(_) => repo::update_diet_plan(store, &uid, &outcome).await,
            None => repo::save_diet_plan(store, &uid, &outcome).await,
        }
        .map_err(SessionError::store)?;

        let reread = repo::get_diet_plan(store, &uid)
            .await
            .map_err(SessionError::store)?;
        Ok(reread.unwrap_or(written))
    }

    fn clear(&mut self) {
        self.user = None;
        self.profile = None;
    }
}

impl std::fmt::Debug for AppSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSession")
            .field("auth", &self.auth.name())
            .field("store", &self.store.name())
            .field("planner", &self.planner)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryAuth, PasswordHasher};
    use crate::plan::fallback_plan;
    use crate::profile::FitnessGoal;
    use crate::store::MemoryStore;

    fn session() -> AppSession {
        let hasher = PasswordHasher::new(b"session-test".to_vec()).unwrap();
        AppSession::new(
            Arc::new(MemoryAuth::new(hasher)),
            Arc::new(MemoryStore::new()),
            PlanOrchestrator::offline(),
        )
    }

    fn profile(goal: FitnessGoal) -> UserProfile {
        UserProfile::new("Sam", 41, 60.0, 170.0, goal).unwrap()
    }

    #[tokio::test]
    async fn signup_form_checks() {
        let mut s = session();
        for (email, pw, confirm) in [
            ("", "secret1", "secret1"),
            ("a@b.com", "secret1", ""),
            ("a@b.com", "secret1", "secret2"),
            ("a@b.com", "12345", "12345"),
        ] {
            let err = s.sign_up(email, pw, confirm).await.unwrap_err();
            assert!(matches!(err, SessionError::InvalidInput(_)), "{err}");
        }
        assert!(s.current_user().is_none());
    }

    #[tokio::test]
    async fn actions_require_sign_in() {
        let mut s = session();
        assert!(matches!(
            s.load_user_data().await,
            Err(SessionError::NotSignedIn)
        ));
        assert!(matches!(
            s.submit_profile(profile(FitnessGoal::WeightGain)).await,
            Err(SessionError::NotSignedIn)
        ));
        assert!(matches!(
            s.regenerate_plan().await,
            Err(SessionError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn submit_profile_saves_fallback_plan() {
        let mut s = session();
        s.sign_up("sam@example.com", "secret1", "secret1").await.unwrap();
        assert_eq!(s.load_user_data().await.unwrap(), LoadOutcome::NeedsProfile);

        let p = profile(FitnessGoal::WeightGain);
        let LoadOutcome::Ready { profile, plan } = s.submit_profile(p.clone()).await.unwrap() else {
            panic!("expected a loaded plan");
        };
        assert_eq!(profile, p);
        assert!(plan.fallback);
        assert_eq!(plan.plan, fallback_plan(&p).unwrap());
        assert_eq!(plan.plan.protein_intake_grams, 96.0);
        assert_eq!(s.profile(), Some(&p));
    }

    #[tokio::test]
    async fn update_profile_keeps_plan() {
        let mut s = session();
        s.sign_up("sam@example.com", "secret1", "secret1").await.unwrap();
        let err = s
            .update_profile(profile(FitnessGoal::FatLoss))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ProfileNotFound));

        s.submit_profile(profile(FitnessGoal::WeightGain)).await.unwrap();
        s.update_profile(profile(FitnessGoal::FatLoss)).await.unwrap();

        let LoadOutcome::Ready { profile: p, plan } = s.load_user_data().await.unwrap() else {
            panic!("expected a loaded plan");
        };
        assert_eq!(p.fitness_goal, FitnessGoal::FatLoss);
        assert_eq!(plan.plan.carb_range_grams_per_kg.low, 4.0);

        let regenerated = s.regenerate_plan().await.unwrap();
        assert_eq!(regenerated.plan.carb_range_grams_per_kg.low, 2.0);
        assert_eq!(regenerated.created_at, plan.created_at);
    }

    #[tokio::test]
    async fn invalid_profile_is_rejected_before_writing() {
        let mut s = session();
        s.sign_up("sam@example.com", "secret1", "secret1").await.unwrap();
        let mut p = profile(FitnessGoal::MuscleGain);
        p.height = 0.0;
        let err = s.submit_profile(p).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidProfile(ProfileError::HeightOutOfRange(_))
        ));
        assert_eq!(s.load_user_data().await.unwrap(), LoadOutcome::NeedsProfile);
    }

    #[tokio::test]
    async fn sign_in_rejection_is_user_facing() {
        let mut s = session();
        s.sign_up("sam@example.com", "secret1", "secret1").await.unwrap();
        s.sign_out().await.unwrap();
        assert!(s.current_user().is_none());

        let err = s.sign_in("sam@example.com", "nope!!").await.unwrap_err();
        assert_eq!(err.to_string(), "incorrect email or password");
        assert!(matches!(
            s.sign_in("", "").await,
            Err(SessionError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn auth_change_to_signed_out_clears_state() {
        let mut s = session();
        s.sign_up("sam@example.com", "secret1", "secret1").await.unwrap();
        s.submit_profile(profile(FitnessGoal::MuscleGain)).await.unwrap();

        assert_eq!(s.handle_auth_change(None).await.unwrap(), None);
        assert!(s.current_user().is_none());
        assert!(s.profile().is_none());
    }
}
