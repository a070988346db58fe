use thiserror::Error;

use crate::api::ApiError;
use crate::validation::Violation;

pub const SUBMIT_FAILURE_MESSAGE: &str =
    "Failed to get recommendations. Please ensure the backend is running and reachable.";

/// Feedback-panel errors the user can correct before retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("Please select a rating star first.")]
    NoScoreSelected,

    #[error("Ratings must be between 1 and 5 stars (got {0}).")]
    ScoreOutOfRange(u8),
}

/// Account-form errors: local checks and rejections reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Invalid or missing reset token.")]
    MissingResetToken,

    #[error("Profile image URL '{0}' is not a valid http(s) URL.")]
    InvalidImageUrl(String),

    #[error("{0}")]
    Rejected(String),
}

/// Workflow-level error type.
/// Every public operation returns `Result<T, AdvisorError>`; `user_message`
/// turns a variant into the text shown to the user.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Validation error: {0}")]
    Validation(#[from] Violation),

    #[error("Authentication failed")]
    Authentication,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Transport error: {0}")]
    Transport(#[from] ApiError),

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Submission is only available at the final step")]
    NotAtFinalStep,

    #[error("Feedback error: {0}")]
    Feedback(#[from] FeedbackError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AdvisorError {
    /// The message to present to the user. Infrastructure failures are logged
    /// here and replaced by a generic, retry-suggesting message.
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::Validation(violation) => violation.to_string(),
            AdvisorError::Authentication => {
                "Failed to log in. Please check your credentials.".to_string()
            }
            AdvisorError::Unauthenticated => "Please log in to continue.".to_string(),
            AdvisorError::SubmissionInProgress => {
                "Your assessment is already being analyzed. Please wait.".to_string()
            }
            AdvisorError::NotAtFinalStep => {
                "Please complete every step before requesting recommendations.".to_string()
            }
            AdvisorError::Feedback(e) => e.to_string(),
            AdvisorError::Account(e) => e.to_string(),
            AdvisorError::Transport(e) => {
                tracing::error!("Transport error: {e}");
                "Could not reach the server. Please try again.".to_string()
            }
            AdvisorError::Storage(e) => {
                tracing::error!("Session storage error: {e}");
                "Could not access local session storage.".to_string()
            }
            AdvisorError::Serialization(e) => {
                tracing::error!("Serialization error: {e}");
                "Local session data is unreadable. Please log in again.".to_string()
            }
            AdvisorError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An unexpected error occurred.".to_string()
            }
        }
    }

    /// True when the caller should send the user to the login entry point.
    pub fn requires_login(&self) -> bool {
        match self {
            AdvisorError::Unauthenticated => true,
            AdvisorError::Transport(e) => e.status() == Some(401),
            _ => false,
        }
    }
}
