use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::api::AdvisorApi;
use crate::errors::{AdvisorError, FeedbackError};
use crate::models::rating::{NewRating, Rating, MAX_SCORE, MIN_SCORE};
use crate::session::SessionManager;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    /// A new rating record was created.
    Submitted(Rating),
    /// Stars were recorded locally; an explicit submit is needed because a comment is pending.
    Pending,
}

/// Per-item star and comment state behind the report's rating widgets.
///
/// Selecting stars on an item with no comment submits immediately; with a
/// comment typed, submission waits for [`FeedbackPanel::submit`]. Every
/// submission creates a new record.
pub struct FeedbackPanel {
    api: Arc<dyn AdvisorApi>,
    session: Arc<SessionManager>,
    stars: HashMap<i64, u8>,
    comments: HashMap<i64, String>,
}

impl FeedbackPanel {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            session: state.session.clone(),
            stars: HashMap::new(),
            comments: HashMap::new(),
        }
    }

    pub fn stars(&self, recommendation_id: i64) -> Option<u8> {
        self.stars.get(&recommendation_id).copied()
    }

    pub fn comment(&self, recommendation_id: i64) -> &str {
        self.comments
            .get(&recommendation_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_comment(&mut self, recommendation_id: i64, text: impl Into<String>) {
        self.comments.insert(recommendation_id, text.into());
    }

    pub async fn select_stars(
        &mut self,
        recommendation_id: i64,
        score: u8,
    ) -> Result<FeedbackOutcome, AdvisorError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(FeedbackError::ScoreOutOfRange(score).into());
        }
        self.stars.insert(recommendation_id, score);

        if !self.comment(recommendation_id).trim().is_empty() {
            return Ok(FeedbackOutcome::Pending);
        }
        self.send(recommendation_id, score)
            .await
            .map(FeedbackOutcome::Submitted)
    }

    /// Explicit submit with the selected stars and the current comment.
    pub async fn submit(&mut self, recommendation_id: i64) -> Result<Rating, AdvisorError> {
        let score = self
            .stars(recommendation_id)
            .ok_or(FeedbackError::NoScoreSelected)?;
        self.send(recommendation_id, score).await
    }

    async fn send(&self, recommendation_id: i64, score: u8) -> Result<Rating, AdvisorError> {
        let token = self.session.authorize()?;
        let rating = NewRating {
            recommendation_id,
            score,
            comment: self.comment(recommendation_id).to_string(),
        };

        match self.api.create_rating(&token, &rating).await {
            Ok(created) => {
                info!(
                    "Recorded {}-star rating for recommendation {}",
                    score, recommendation_id
                );
                Ok(created)
            }
            Err(e) => {
                error!("Failed to submit rating for {recommendation_id}: {e}");
                Err(e.into())
            }
        }
    }
}
