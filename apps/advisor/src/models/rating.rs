use serde::{Deserialize, Serialize};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// A submitted feedback record. Immutable; resubmitting creates a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub recommendation_id: i64,
    /// Decoded wide so a stray out-of-range row cannot fail the whole list.
    #[serde(rename = "rating")]
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Rating {
    pub fn has_valid_score(&self) -> bool {
        self.stars().is_some()
    }

    /// The score as stars, when it lies in 1..=5.
    pub fn stars(&self) -> Option<u8> {
        u8::try_from(self.score)
            .ok()
            .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
    }
}

/// `POST /ratings/` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRating {
    pub recommendation_id: i64,
    #[serde(rename = "rating")]
    pub score: u8,
    pub comment: String,
}
