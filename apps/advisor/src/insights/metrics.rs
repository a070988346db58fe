use tracing::info;

use crate::errors::AdvisorError;
use crate::models::recommendation::{ClassifierMetrics, ModelMetrics};
use crate::state::AppState;

const COURSE_MODEL_SUFFIX: &str = "_course";

/// Model performance figures. Public endpoint; no session needed.
pub async fn load_model_metrics(state: &AppState) -> Result<ModelMetrics, AdvisorError> {
    let metrics = state.api.model_metrics().await?;
    info!("Loaded metrics for {} classifiers", metrics.len());
    Ok(metrics)
}

/// The most accurate course classifier, if any are reported.
pub fn best_course_model(metrics: &ModelMetrics) -> Option<(&str, &ClassifierMetrics)> {
    metrics
        .iter()
        .filter(|(name, _)| name.ends_with(COURSE_MODEL_SUFFIX))
        .max_by(|a, b| a.1.accuracy.total_cmp(&b.1.accuracy))
        .map(|(name, figures)| (name.as_str(), figures))
}
