//! Assessment wizard: `Academic → Aptitude → Indicators`, then submit.
//!
//! State is (current step, accumulated profile, last error). Forward
//! navigation is blocked by the current step's rules; backward navigation is
//! unconditional. `submit` re-validates everything, takes the store's busy
//! gate, and dispatches the normalized profile with the session's bearer token.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::{AdvisorApi, ApiError};
use crate::errors::{AdvisorError, SUBMIT_FAILURE_MESSAGE};
use crate::models::profile::{AssessmentStep, StudentProfile};
use crate::session::SessionManager;
use crate::state::AppState;
use crate::store::RecommendationStore;
use crate::validation::{validate_profile, validate_step};

pub mod payload;

pub use payload::build_payload;

/// Where the caller should navigate after a wizard action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Report,
    Login,
}

pub struct AssessmentWizard {
    step: AssessmentStep,
    profile: StudentProfile,
    last_error: Option<String>,
    api: Arc<dyn AdvisorApi>,
    session: Arc<SessionManager>,
    store: Arc<RecommendationStore>,
}

impl AssessmentWizard {
    pub fn new(state: &AppState) -> Self {
        Self::with_profile(state, StudentProfile::default())
    }

    /// Starts at the first step with a pre-filled profile.
    pub fn with_profile(state: &AppState, profile: StudentProfile) -> Self {
        Self {
            step: AssessmentStep::first(),
            profile,
            last_error: None,
            api: state.api.clone(),
            session: state.session.clone(),
            store: state.store.clone(),
        }
    }

    /// Protected entry point: without a session the caller must go to login first.
    pub fn entry_destination(&self) -> Option<Destination> {
        (!self.session.is_authenticated()).then_some(Destination::Login)
    }

    pub fn step(&self) -> AssessmentStep {
        self.step
    }

    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut StudentProfile {
        &mut self.profile
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.store.is_loading()
    }

    /// Validates the current step and moves forward; a no-op at the final step.
    pub fn advance(&mut self) -> Result<AssessmentStep, AdvisorError> {
        if let Err(violation) = validate_step(&self.profile, self.step) {
            self.last_error = Some(violation.to_string());
            return Err(violation.into());
        }
        self.last_error = None;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves back one step without validation, clamped at the first step.
    pub fn retreat(&mut self) -> AssessmentStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Submits the profile for scoring.
    ///
    /// On success the result is published to the store, the profile is
    /// discarded and the caller is sent to the report. On failure the store
    /// holds no result and `last_error` explains what happened. The busy gate
    /// is released on every path, including when this future is dropped.
    pub async fn submit(&mut self) -> Result<Destination, AdvisorError> {
        if !self.step.is_final() {
            return Err(AdvisorError::NotAtFinalStep);
        }

        if let Err(violation) = validate_profile(&self.profile) {
            self.last_error = Some(violation.to_string());
            return Err(violation.into());
        }

        let token = match self.session.authorize() {
            Ok(token) => token,
            Err(e) => {
                self.last_error = Some(e.user_message());
                return Err(e);
            }
        };

        let guard = match self.store.begin_submission() {
            Ok(guard) => guard,
            Err(e) => {
                warn!("Rejected re-entrant submission");
                return Err(e);
            }
        };
        self.last_error = None;

        let payload = build_payload(&self.profile);
        info!(
            "Submitting assessment with {} graded subjects",
            payload.grades.len()
        );

        let outcome = self
            .api
            .recommend(&token, &payload)
            .await
            .and_then(|result| {
                result
                    .check()
                    .map(|()| result)
                    .map_err(ApiError::InvalidResponse)
            });

        match outcome {
            Ok(result) => {
                info!(
                    "Received {} courses and {} careers",
                    result.courses.len(),
                    result.careers.len()
                );
                guard.complete(result);
                self.profile = StudentProfile::default();
                self.step = AssessmentStep::first();
                Ok(Destination::Report)
            }
            Err(e) => {
                error!("Recommendation request failed: {e}");
                self.last_error = Some(SUBMIT_FAILURE_MESSAGE.to_string());
                Err(AdvisorError::Transport(e))
            }
        }
    }
}
