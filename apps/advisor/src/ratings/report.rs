use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use super::{summarize_by_recommendation, summarize_global, GlobalRatingSummary, ItemRatingSummary};
use crate::errors::AdvisorError;
use crate::models::rating::Rating;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingsReport {
    pub ratings: Vec<Rating>,
    pub per_item: BTreeMap<i64, ItemRatingSummary>,
    pub global: GlobalRatingSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatingsView {
    Empty,
    Summary(RatingsReport),
}

impl RatingsReport {
    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        let per_item = summarize_by_recommendation(&ratings);
        let global = summarize_global(&ratings);
        Self {
            ratings,
            per_item,
            global,
        }
    }
}

/// Fetches the caller's ratings and recomputes both summaries.
///
/// Call again after a login or a new submission to refresh; nothing is cached.
pub async fn load_ratings_report(state: &AppState) -> Result<RatingsView, AdvisorError> {
    let token = state.session.authorize()?;
    let fetched = state.api.list_ratings(&token).await?;

    let total = fetched.len();
    let ratings: Vec<Rating> = fetched
        .into_iter()
        .filter(|rating| {
            let valid = rating.has_valid_score();
            if !valid {
                warn!(
                    "Dropping rating {} with out-of-range score {}",
                    rating.id, rating.score
                );
            }
            valid
        })
        .collect();
    info!("Loaded {} of {} ratings", ratings.len(), total);

    if ratings.is_empty() {
        return Ok(RatingsView::Empty);
    }
    Ok(RatingsView::Summary(RatingsReport::from_ratings(ratings)))
}
