//! Read-only views over past submissions and model performance.

pub mod history;
pub mod metrics;

pub use history::{load_history, summarize_by_day, DailyHistory, HistoryView};
pub use metrics::{best_course_model, load_model_metrics};
