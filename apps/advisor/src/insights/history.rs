use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::errors::AdvisorError;
use crate::models::recommendation::HistoryEntry;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryView {
    Empty,
    Entries(Vec<HistoryEntry>),
}

/// Course and career recommendations received on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyHistory {
    pub date: NaiveDate,
    pub courses: usize,
    pub careers: usize,
}

pub async fn load_history(state: &AppState) -> Result<HistoryView, AdvisorError> {
    let token = state.session.authorize()?;
    let entries = state.api.history(&token).await?;
    info!("Loaded {} history entries", entries.len());

    if entries.is_empty() {
        return Ok(HistoryView::Empty);
    }
    Ok(HistoryView::Entries(entries))
}

/// Per-day counts, oldest day first.
pub fn summarize_by_day(entries: &[HistoryEntry]) -> Vec<DailyHistory> {
    let mut days: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for entry in entries {
        let day = days.entry(entry.created_at.date_naive()).or_default();
        if entry.course_name.is_some() {
            day.0 += 1;
        }
        if entry.career_name.is_some() {
            day.1 += 1;
        }
    }

    days.into_iter()
        .map(|(date, (courses, careers))| DailyHistory {
            date,
            courses,
            careers,
        })
        .collect()
}
