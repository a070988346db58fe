//! Scripted recommendation service shared by the integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use advisor::api::{AdvisorApi, ApiError};
use advisor::config::Config;
use advisor::models::profile::{Grade, StudentProfile, Subject};
use advisor::models::rating::{NewRating, Rating};
use advisor::models::recommendation::{
    HistoryEntry, ModelMetrics, RecommendationRequest, RecommendationResult, ScoredItem,
};
use advisor::models::user::{
    ImageUpload, MessageResponse, NewUser, TokenResponse, UploadResponse, User, UserUpdate,
};
use advisor::session::MemoryTokenStore;
use advisor::state::AppState;

pub const TOKEN: &str = "integration-token";
pub const PASSWORD: &str = "hunter2";

#[derive(Default)]
pub struct ScriptedApi {
    pub requests: Mutex<Vec<RecommendationRequest>>,
    pub ratings: Mutex<Vec<Rating>>,
}

fn unauthorized() -> ApiError {
    ApiError::Api {
        status: 401,
        message: "Could not validate credentials".to_string(),
    }
}

fn check(token: &str) -> Result<(), ApiError> {
    if token == TOKEN {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

fn item(id: i64, name: &str, score: f64) -> ScoredItem {
    ScoredItem {
        id: Some(id),
        name: name.to_string(),
        course_type: Some("Degree".to_string()),
        similarity_score: score,
        description: String::new(),
        reasoning: String::new(),
        job_applicability: String::new(),
        future_trends: String::new(),
        automation_risk: None,
    }
}

fn user() -> User {
    User {
        id: 1,
        username: "wanjiku".to_string(),
        email: "wanjiku@example.com".to_string(),
        profile_image_url: None,
        school_attended: None,
        id_birth_cert_number: None,
        phone_number: None,
    }
}

#[async_trait]
impl AdvisorApi for ScriptedApi {
    async fn exchange_credentials(
        &self,
        _username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        if password != PASSWORD {
            return Err(unauthorized());
        }
        Ok(TokenResponse {
            access_token: TOKEN.to_string(),
            token_type: Some("bearer".to_string()),
        })
    }

    async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        Ok(User {
            username: user.username.clone(),
            email: user.email.clone(),
            ..self::user()
        })
    }

    async fn forgot_password(&self, _email: &str) -> Result<MessageResponse, ApiError> {
        Ok(MessageResponse {
            message: "sent".to_string(),
        })
    }

    async fn reset_password(
        &self,
        _reset_token: &str,
        _new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        Ok(MessageResponse {
            message: "reset".to_string(),
        })
    }

    async fn fetch_me(&self, token: &str) -> Result<User, ApiError> {
        check(token)?;
        Ok(user())
    }

    async fn update_me(&self, token: &str, _update: &UserUpdate) -> Result<User, ApiError> {
        check(token)?;
        Ok(user())
    }

    async fn upload_profile_image(
        &self,
        token: &str,
        _image: &ImageUpload,
    ) -> Result<UploadResponse, ApiError> {
        check(token)?;
        Ok(UploadResponse {
            url: "http://localhost:8000/static/u.png".to_string(),
        })
    }

    async fn recommend(
        &self,
        token: &str,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, ApiError> {
        check(token)?;
        self.requests.lock().unwrap().push(request.clone());
        Ok(RecommendationResult {
            average_points: 8.6,
            profile_rating: "Strong Profile".to_string(),
            model_accuracy: 0.9,
            subject_grades_points: Vec::new(),
            courses: vec![item(11, "Bachelor of Medicine", 0.93)],
            careers: vec![item(12, "Doctor", 0.9)],
        })
    }

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        check(token)?;
        Ok(Vec::new())
    }

    async fn model_metrics(&self) -> Result<ModelMetrics, ApiError> {
        Ok(ModelMetrics::new())
    }

    async fn list_ratings(&self, token: &str) -> Result<Vec<Rating>, ApiError> {
        check(token)?;
        Ok(self.ratings.lock().unwrap().clone())
    }

    async fn create_rating(&self, token: &str, rating: &NewRating) -> Result<Rating, ApiError> {
        check(token)?;
        let mut ratings = self.ratings.lock().unwrap();
        let stored = Rating {
            id: ratings.len() as i64 + 1,
            recommendation_id: rating.recommendation_id,
            score: i64::from(rating.score),
            comment: Some(rating.comment.clone()),
        };
        ratings.push(stored.clone());
        Ok(stored)
    }
}

pub fn app(api: &Arc<ScriptedApi>) -> AppState {
    AppState::with_services(
        Config::default(),
        api.clone(),
        Arc::new(MemoryTokenStore::default()),
    )
    .unwrap()
}

/// Seven graded subjects with English chosen through the language selector.
pub fn complete_profile() -> StudentProfile {
    let mut profile = StudentProfile::default();
    profile.set_grade(Subject::Mathematics, Some(Grade::AMinus));
    profile.set_grade(Subject::Kiswahili, Some(Grade::B));
    profile.set_language_grade(Some(Grade::BPlus));
    profile.set_grade(Subject::Biology, Some(Grade::A));
    profile.set_grade(Subject::Chemistry, Some(Grade::AMinus));
    profile.set_grade(Subject::Geography, Some(Grade::B));
    profile.set_grade(Subject::ComputerStudies, Some(Grade::CPlus));
    profile.set_interests("Medicine, Research");
    profile
}
