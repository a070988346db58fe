//! Latest recommendation result plus the busy/loading gate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::errors::AdvisorError;
use crate::models::recommendation::RecommendationResult;

#[derive(Debug, Default)]
struct StoreState {
    result: Option<Arc<RecommendationResult>>,
    busy: bool,
}

/// What a report consumer should render.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportView {
    Loading,
    /// No result and nothing in flight: prompt the user to take the assessment.
    Empty,
    Ready(Arc<RecommendationResult>),
}

#[derive(Debug, Default)]
pub struct RecommendationStore {
    state: Mutex<StoreState>,
}

impl RecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raising the flag drops any existing result in the same critical section.
    pub fn set_loading(&self, loading: bool) {
        let mut state = self.lock();
        if loading {
            state.result = None;
        }
        state.busy = loading;
    }

    /// Replaces the result and clears busy.
    pub fn set_result(&self, value: Option<RecommendationResult>) {
        let mut state = self.lock();
        state.result = value.map(Arc::new);
        state.busy = false;
    }

    pub fn result(&self) -> Option<Arc<RecommendationResult>> {
        self.lock().result.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().busy
    }

    pub fn view(&self) -> ReportView {
        let state = self.lock();
        match (&state.result, state.busy) {
            (_, true) => ReportView::Loading,
            (Some(result), false) => ReportView::Ready(result.clone()),
            (None, false) => ReportView::Empty,
        }
    }

    /// Test-and-set of the busy flag. Clears any existing result on success.
    ///
    /// The returned guard releases the flag when dropped, so every exit path
    /// of a submission (error, early return, cancelled future) ends idle.
    pub fn begin_submission(self: &Arc<Self>) -> Result<SubmissionGuard, AdvisorError> {
        let mut state = self.lock();
        if state.busy {
            return Err(AdvisorError::SubmissionInProgress);
        }
        state.result = None;
        state.busy = true;
        debug!("Submission gate acquired");
        Ok(SubmissionGuard {
            store: Arc::clone(self),
            armed: true,
        })
    }
}

#[must_use = "dropping the guard immediately releases the submission gate"]
pub struct SubmissionGuard {
    store: Arc<RecommendationStore>,
    armed: bool,
}

impl SubmissionGuard {
    /// Publishes the result and releases the gate atomically.
    pub fn complete(mut self, result: RecommendationResult) {
        self.store.set_result(Some(result));
        self.armed = false;
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        if self.armed {
            self.store.set_loading(false);
            debug!("Submission gate released without a result");
        }
    }
}
