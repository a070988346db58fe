use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::{Grade, PerformanceLevel, Subject};

/// Normalized `/recommend` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub grades: BTreeMap<Subject, Grade>,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub linguistic: u8,
    pub musical: u8,
    pub bodily: u8,
    pub logical_mathematical: u8,
    pub spatial_visualization: u8,
    pub interpersonal: u8,
    pub intrapersonal: u8,
    pub naturalist: u8,
    pub p1: PerformanceLevel,
    pub p2: PerformanceLevel,
    pub p3: PerformanceLevel,
    pub p4: PerformanceLevel,
    pub p5: PerformanceLevel,
    pub p6: PerformanceLevel,
    pub p7: PerformanceLevel,
    pub p8: PerformanceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGradePoints {
    pub subject: String,
    pub grade: String,
    pub points: u32,
}

/// A course or career annotated with a similarity score and narrative fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// Category tag, only meaningful for courses. Sent as `type` by the service.
    #[serde(default, alias = "type")]
    pub course_type: Option<String>,
    pub similarity_score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub job_applicability: String,
    #[serde(default)]
    pub future_trends: String,
    #[serde(default)]
    pub automation_risk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub average_points: f64,
    pub profile_rating: String,
    pub model_accuracy: f64,
    #[serde(default)]
    pub subject_grades_points: Vec<SubjectGradePoints>,
    #[serde(default)]
    pub courses: Vec<ScoredItem>,
    #[serde(default)]
    pub careers: Vec<ScoredItem>,
}

impl RecommendationResult {
    /// Boundary check on a decoded response: accuracy and similarity scores
    /// must be fractions in [0, 1].
    pub fn check(&self) -> Result<(), String> {
        if !is_fraction(self.model_accuracy) {
            return Err(format!(
                "model_accuracy {} is outside [0, 1]",
                self.model_accuracy
            ));
        }
        for item in self.courses.iter().chain(self.careers.iter()) {
            if !is_fraction(item.similarity_score) {
                return Err(format!(
                    "similarity_score {} for '{}' is outside [0, 1]",
                    item.similarity_score, item.name
                ));
            }
        }
        Ok(())
    }

    /// Every scored item that carries an identity, courses first.
    pub fn rateable_items(&self) -> impl Iterator<Item = (i64, &ScoredItem)> {
        self.courses
            .iter()
            .chain(self.careers.iter())
            .filter_map(|item| item.id.map(|id| (id, item)))
    }
}

fn is_fraction(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Local label for a mean-points figure, matching the service's bands.
pub fn profile_band(average_points: f64) -> &'static str {
    match average_points {
        p if p >= 10.0 => "Excellent Profile",
        p if p >= 8.0 => "Strong Profile",
        p if p >= 6.5 => "Good Profile",
        _ => "Developing Profile",
    }
}

/// Qualification tier reachable at a mean-points figure.
pub fn course_tier(average_points: f64) -> &'static str {
    match average_points {
        p if p >= 6.8 => "Bachelor's Degree",
        p if p >= 5.0 => "Diploma",
        _ => "Certificate",
    }
}

/// One row of `/recommendations/history/`: either a course or a career.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub career_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// `/model-metrics/` body, keyed by classifier name (e.g. `svm_course`).
pub type ModelMetrics = BTreeMap<String, ClassifierMetrics>;
