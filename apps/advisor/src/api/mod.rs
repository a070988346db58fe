/// Advisor API: the single outbound seam to the recommendation service.
///
/// No other module talks HTTP. Workflow code depends on the [`AdvisorApi`]
/// trait and receives an `Arc<dyn AdvisorApi>`; [`HttpAdvisorApi`] is the
/// reqwest-backed implementation.
use async_trait::async_trait;
use thiserror::Error;

use crate::models::rating::{NewRating, Rating};
use crate::models::recommendation::{
    HistoryEntry, ModelMetrics, RecommendationRequest, RecommendationResult,
};
use crate::models::user::{
    ImageUpload, MessageResponse, NewUser, TokenResponse, UploadResponse, User, UserUpdate,
};

pub mod http;

pub use http::HttpAdvisorApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Gave up after {retries} attempts")]
    RetriesExhausted { retries: u32 },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The service-provided message for a non-success response, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Every endpoint the workflow consumes. `token` is the bearer credential,
/// cloned from the session for the lifetime of one request.
#[async_trait]
pub trait AdvisorApi: Send + Sync {
    /// `POST /token`, form-encoded.
    async fn exchange_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError>;

    async fn register(&self, user: &NewUser) -> Result<User, ApiError>;

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError>;

    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError>;

    async fn fetch_me(&self, token: &str) -> Result<User, ApiError>;

    async fn update_me(&self, token: &str, update: &UserUpdate) -> Result<User, ApiError>;

    async fn upload_profile_image(
        &self,
        token: &str,
        image: &ImageUpload,
    ) -> Result<UploadResponse, ApiError>;

    async fn recommend(
        &self,
        token: &str,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, ApiError>;

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError>;

    async fn model_metrics(&self) -> Result<ModelMetrics, ApiError>;

    async fn list_ratings(&self, token: &str) -> Result<Vec<Rating>, ApiError>;

    async fn create_rating(&self, token: &str, rating: &NewRating) -> Result<Rating, ApiError>;
}
