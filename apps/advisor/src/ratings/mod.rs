//! Ratings aggregation and the feedback-submission protocol.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::rating::{Rating, MAX_SCORE, MIN_SCORE};

pub mod feedback;
pub mod report;

pub use feedback::{FeedbackOutcome, FeedbackPanel};
pub use report::{load_ratings_report, RatingsReport, RatingsView};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRatingSummary {
    pub average: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalRatingSummary {
    pub average: f64,
    pub total: usize,
    /// Occurrences of each score 1..=5; every key is present.
    pub histogram: BTreeMap<u8, usize>,
}

/// Mean score and count per recommendation. Unrated items are absent.
pub fn summarize_by_recommendation(ratings: &[Rating]) -> BTreeMap<i64, ItemRatingSummary> {
    let mut totals: BTreeMap<i64, (i64, usize)> = BTreeMap::new();
    for rating in ratings {
        let entry = totals.entry(rating.recommendation_id).or_insert((0, 0));
        entry.0 += rating.score;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(id, (sum, count))| {
            (
                id,
                ItemRatingSummary {
                    average: sum as f64 / count as f64,
                    count,
                },
            )
        })
        .collect()
}

/// Mean of all scores (0 when empty) and the score histogram.
pub fn summarize_global(ratings: &[Rating]) -> GlobalRatingSummary {
    let mut histogram: BTreeMap<u8, usize> = (MIN_SCORE..=MAX_SCORE).map(|s| (s, 0)).collect();
    for rating in ratings {
        if let Some(count) = rating.stars().and_then(|s| histogram.get_mut(&s)) {
            *count += 1;
        }
    }

    let average = if ratings.is_empty() {
        0.0
    } else {
        let sum: i64 = ratings.iter().map(|r| r.score).sum();
        sum as f64 / ratings.len() as f64
    };

    GlobalRatingSummary {
        average,
        total: ratings.len(),
        histogram,
    }
}
