//! In-process fake of the recommendation service for unit tests.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{AdvisorApi, ApiError};
use crate::models::profile::{Grade, StudentProfile, Subject};
use crate::models::rating::{NewRating, Rating};
use crate::models::recommendation::{
    ClassifierMetrics, HistoryEntry, ModelMetrics, RecommendationRequest, RecommendationResult,
    ScoredItem, SubjectGradePoints,
};
use crate::models::user::{
    ImageUpload, MessageResponse, NewUser, TokenResponse, UploadResponse, User, UserUpdate,
};

pub struct FakeApi {
    offline: AtomicBool,
    fail_recommend: AtomicBool,
    next_rating_id: AtomicI64,
    pause_recommend: Mutex<Option<Arc<Notify>>>,
    result: Mutex<RecommendationResult>,
    recommend_calls: Mutex<Vec<RecommendationRequest>>,
    ratings: Mutex<Vec<Rating>>,
    created_ratings: Mutex<Vec<NewRating>>,
    user: Mutex<User>,
    updates: Mutex<Vec<UserUpdate>>,
    uploads: Mutex<Vec<String>>,
    registered: Mutex<Vec<NewUser>>,
    history: Mutex<Vec<HistoryEntry>>,
}

impl FakeApi {
    pub const TOKEN: &'static str = "fake-token";
    pub const PASSWORD: &'static str = "secret";
    pub const UPLOAD_URL: &'static str = "http://localhost:8000/static/avatar.png";

    pub fn new() -> Self {
        Self {
            offline: AtomicBool::new(false),
            fail_recommend: AtomicBool::new(false),
            next_rating_id: AtomicI64::new(1),
            pause_recommend: Mutex::new(None),
            result: Mutex::new(sample_result()),
            recommend_calls: Mutex::new(Vec::new()),
            ratings: Mutex::new(Vec::new()),
            created_ratings: Mutex::new(Vec::new()),
            user: Mutex::new(sample_user()),
            updates: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            registered: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_recommend(&self, fail: bool) {
        self.fail_recommend.store(fail, Ordering::SeqCst);
    }

    /// Makes `recommend` wait until the returned handle is notified.
    pub fn pause_recommend(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.pause_recommend.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn set_result(&self, result: RecommendationResult) {
        *self.result.lock().unwrap() = result;
    }

    pub fn set_ratings(&self, ratings: Vec<Rating>) {
        *self.ratings.lock().unwrap() = ratings;
    }

    pub fn set_history(&self, history: Vec<HistoryEntry>) {
        *self.history.lock().unwrap() = history;
    }

    pub fn recommend_calls(&self) -> Vec<RecommendationRequest> {
        self.recommend_calls.lock().unwrap().clone()
    }

    pub fn created_ratings(&self) -> Vec<NewRating> {
        self.created_ratings.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<UserUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn registered(&self) -> Vec<NewUser> {
        self.registered.lock().unwrap().clone()
    }

    fn reachable(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn authorized(&self, token: &str) -> Result<(), ApiError> {
        self.reachable()?;
        if token != Self::TOKEN {
            return Err(ApiError::Api {
                status: 401,
                message: "Could not validate credentials".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AdvisorApi for FakeApi {
    async fn exchange_credentials(
        &self,
        _username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        self.reachable()?;
        if password != Self::PASSWORD {
            return Err(ApiError::Api {
                status: 401,
                message: "Incorrect username or password".to_string(),
            });
        }
        Ok(TokenResponse {
            access_token: Self::TOKEN.to_string(),
            token_type: Some("bearer".to_string()),
        })
    }

    async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        self.reachable()?;
        if user.username == "taken" {
            return Err(ApiError::Api {
                status: 400,
                message: "Username already registered".to_string(),
            });
        }
        self.registered.lock().unwrap().push(user.clone());
        Ok(User {
            id: 2,
            username: user.username.clone(),
            email: user.email.clone(),
            profile_image_url: None,
            school_attended: None,
            id_birth_cert_number: None,
            phone_number: None,
        })
    }

    async fn forgot_password(&self, _email: &str) -> Result<MessageResponse, ApiError> {
        self.reachable()?;
        Ok(MessageResponse {
            message: "If an account with that email exists, a password reset token has been sent."
                .to_string(),
        })
    }

    async fn reset_password(
        &self,
        reset_token: &str,
        _new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.reachable()?;
        if reset_token != "reset-ok" {
            return Err(ApiError::Api {
                status: 400,
                message: "Invalid or expired token".to_string(),
            });
        }
        Ok(MessageResponse {
            message: "Password has been reset successfully.".to_string(),
        })
    }

    async fn fetch_me(&self, token: &str) -> Result<User, ApiError> {
        self.authorized(token)?;
        Ok(self.user.lock().unwrap().clone())
    }

    async fn update_me(&self, token: &str, update: &UserUpdate) -> Result<User, ApiError> {
        self.authorized(token)?;
        self.updates.lock().unwrap().push(update.clone());
        let mut user = self.user.lock().unwrap();
        if let Some(username) = &update.username {
            user.username = username.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(url) = &update.profile_image_url {
            user.profile_image_url = Some(url.clone());
        }
        if let Some(school) = &update.school_attended {
            user.school_attended = Some(school.clone());
        }
        if let Some(id_number) = &update.id_birth_cert_number {
            user.id_birth_cert_number = Some(id_number.clone());
        }
        if let Some(phone) = &update.phone_number {
            user.phone_number = Some(phone.clone());
        }
        Ok(user.clone())
    }

    async fn upload_profile_image(
        &self,
        token: &str,
        image: &ImageUpload,
    ) -> Result<UploadResponse, ApiError> {
        self.authorized(token)?;
        self.uploads.lock().unwrap().push(image.file_name.clone());
        Ok(UploadResponse {
            url: Self::UPLOAD_URL.to_string(),
        })
    }

    async fn recommend(
        &self,
        token: &str,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, ApiError> {
        self.authorized(token)?;
        self.recommend_calls.lock().unwrap().push(request.clone());

        let pause = self.pause_recommend.lock().unwrap().take();
        if let Some(notify) = pause {
            notify.notified().await;
        }

        if self.fail_recommend.load(Ordering::SeqCst) {
            return Err(ApiError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(self.result.lock().unwrap().clone())
    }

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        self.authorized(token)?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn model_metrics(&self) -> Result<ModelMetrics, ApiError> {
        self.reachable()?;
        Ok(ModelMetrics::from([
            ("svm_course".to_string(), metrics(0.81)),
            ("xgboost_course".to_string(), metrics(0.88)),
            ("career_recommendation".to_string(), metrics(0.93)),
        ]))
    }

    async fn list_ratings(&self, token: &str) -> Result<Vec<Rating>, ApiError> {
        self.authorized(token)?;
        Ok(self.ratings.lock().unwrap().clone())
    }

    async fn create_rating(&self, token: &str, rating: &NewRating) -> Result<Rating, ApiError> {
        self.authorized(token)?;
        self.created_ratings.lock().unwrap().push(rating.clone());
        let stored = Rating {
            id: self.next_rating_id.fetch_add(1, Ordering::SeqCst),
            recommendation_id: rating.recommendation_id,
            score: i64::from(rating.score),
            comment: Some(rating.comment.clone()),
        };
        self.ratings.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

fn metrics(accuracy: f64) -> ClassifierMetrics {
    ClassifierMetrics {
        accuracy,
        precision: accuracy - 0.02,
        recall: accuracy - 0.03,
        f1_score: accuracy - 0.025,
    }
}

pub fn sample_user() -> User {
    User {
        id: 1,
        username: "amina".to_string(),
        email: "amina@example.com".to_string(),
        profile_image_url: Some("http://localhost:8000/static/old.png".to_string()),
        school_attended: None,
        id_birth_cert_number: None,
        phone_number: None,
    }
}

pub fn sample_result() -> RecommendationResult {
    RecommendationResult {
        average_points: 9.4,
        profile_rating: "Strong Profile".to_string(),
        model_accuracy: 0.88,
        subject_grades_points: vec![SubjectGradePoints {
            subject: "Mathematics".to_string(),
            grade: "A".to_string(),
            points: 12,
        }],
        courses: vec![scored_item(101, "Bachelor of Science (Computer Science)", 0.91)],
        careers: vec![scored_item(102, "Software Engineer", 0.84)],
    }
}

pub fn scored_item(id: i64, name: &str, similarity_score: f64) -> ScoredItem {
    ScoredItem {
        id: Some(id),
        name: name.to_string(),
        course_type: None,
        similarity_score,
        description: "description".to_string(),
        reasoning: "Recommended based on a predictive model.".to_string(),
        job_applicability: "High".to_string(),
        future_trends: "Growing".to_string(),
        automation_risk: Some("Low".to_string()),
    }
}

pub fn rating(id: i64, recommendation_id: i64, score: i64) -> Rating {
    Rating {
        id,
        recommendation_id,
        score,
        comment: None,
    }
}

/// Mathematics, Kiswahili, English (via selector), Chemistry, Physics,
/// History, Geography.
pub fn valid_profile() -> StudentProfile {
    let mut profile = StudentProfile::default();
    profile.set_grade(Subject::Mathematics, Some(Grade::A));
    profile.set_grade(Subject::Kiswahili, Some(Grade::BPlus));
    profile.set_language_grade(Some(Grade::B));
    profile.set_grade(Subject::Chemistry, Some(Grade::AMinus));
    profile.set_grade(Subject::Physics, Some(Grade::B));
    profile.set_grade(Subject::History, Some(Grade::C));
    profile.set_grade(Subject::Geography, Some(Grade::CPlus));
    profile
}
