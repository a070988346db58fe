use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{AdvisorApi, ApiError};
use crate::models::rating::{NewRating, Rating};
use crate::models::recommendation::{
    HistoryEntry, ModelMetrics, RecommendationRequest, RecommendationResult,
};
use crate::models::user::{
    ImageUpload, MessageResponse, NewUser, TokenResponse, UploadResponse, User, UserUpdate,
};

/// Attempts for idempotent GETs. POST/PUT are sent exactly once.
const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// reqwest-backed [`AdvisorApi`]. Cheap to clone; the connection pool is shared.
#[derive(Clone)]
pub struct HttpAdvisorApi {
    client: Client,
    base_url: String,
}

impl HttpAdvisorApi {
    /// Every request carries `timeout`; expiry surfaces as [`ApiError::Http`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_request(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.get(self.url(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// OAuth2 password flow: form-encoded, not JSON.
    fn token_request(&self, username: &str, password: &str) -> RequestBuilder {
        self.client
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
    }

    /// GET with retries on transport failures, 429 and 5xx, backing off 0.5s, 1s.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = retry_delay(attempt);
                warn!(
                    "GET {} attempt {} failed, retrying after {}ms...",
                    path,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.get_request(path, token).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ApiError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("GET {} returned {}", path, status);
                last_error = Some(ApiError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
                continue;
            }

            debug!("GET {} -> {}", path, status);
            return decode(response).await;
        }

        Err(last_error.unwrap_or(ApiError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        debug!("{} {} -> {}", method, path, response.status());
        decode(response).await
    }
}

/// Wait before retry `attempt` (1-based): doubles from the base delay.
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS << attempt.saturating_sub(1))
}

/// Reads the body and maps non-success statuses to [`ApiError::Api`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// Extracts a string `detail` from an error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| match e.detail {
            Value::String(detail) => Some(detail),
            _ => None,
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl AdvisorApi for HttpAdvisorApi {
    async fn exchange_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let request = self.token_request(username, password);
        self.send_once("POST", "/token", request).await
    }

    async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        let request = self.client.post(self.url("/users/")).json(user);
        self.send_once("POST", "/users/", request).await
    }

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let request = self
            .client
            .post(self.url("/forgot-password/"))
            .json(&serde_json::json!({ "email": email }));
        self.send_once("POST", "/forgot-password/", request).await
    }

    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let request = self
            .client
            .post(self.url("/reset-password/"))
            .json(&serde_json::json!({ "token": reset_token, "new_password": new_password }));
        self.send_once("POST", "/reset-password/", request).await
    }

    async fn fetch_me(&self, token: &str) -> Result<User, ApiError> {
        self.get_json("/users/me/", Some(token)).await
    }

    async fn update_me(&self, token: &str, update: &UserUpdate) -> Result<User, ApiError> {
        let request = self
            .client
            .put(self.url("/users/me/"))
            .bearer_auth(token)
            .json(update);
        self.send_once("PUT", "/users/me/", request).await
    }

    async fn upload_profile_image(
        &self,
        token: &str,
        image: &ImageUpload,
    ) -> Result<UploadResponse, ApiError> {
        let mut part =
            multipart::Part::bytes(image.bytes.to_vec()).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(self.url("/upload-profile-image/"))
            .bearer_auth(token)
            .multipart(form);
        self.send_once("POST", "/upload-profile-image/", request)
            .await
    }

    async fn recommend(
        &self,
        token: &str,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, ApiError> {
        let builder = self
            .client
            .post(self.url("/recommend"))
            .bearer_auth(token)
            .json(request);
        self.send_once("POST", "/recommend", builder).await
    }

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get_json("/recommendations/history/", Some(token))
            .await
    }

    async fn model_metrics(&self) -> Result<ModelMetrics, ApiError> {
        self.get_json("/model-metrics/", None).await
    }

    async fn list_ratings(&self, token: &str) -> Result<Vec<Rating>, ApiError> {
        self.get_json("/ratings/", Some(token)).await
    }

    async fn create_rating(&self, token: &str, rating: &NewRating) -> Result<Rating, ApiError> {
        let request = self
            .client
            .post(self.url("/ratings/"))
            .bearer_auth(token)
            .json(rating);
        self.send_once("POST", "/ratings/", request).await
    }
}
