use std::sync::Arc;

use crate::api::{AdvisorApi, HttpAdvisorApi};
use crate::config::Config;
use crate::errors::AdvisorError;
use crate::session::{FileTokenStore, SessionManager, TokenStore};
use crate::store::RecommendationStore;

/// Shared services injected into every workflow component.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn AdvisorApi>,
    pub session: Arc<SessionManager>,
    pub store: Arc<RecommendationStore>,
    pub config: Config,
}

impl AppState {
    /// Wires the HTTP client, the file-backed session and an empty store.
    pub fn from_config(config: Config) -> Result<Self, AdvisorError> {
        let api: Arc<dyn AdvisorApi> =
            Arc::new(HttpAdvisorApi::new(&config.api_url, config.request_timeout)?);
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_path.clone()));
        Self::with_services(config, api, tokens)
    }

    pub fn with_services(
        config: Config,
        api: Arc<dyn AdvisorApi>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, AdvisorError> {
        let session = Arc::new(SessionManager::restore(api.clone(), tokens)?);
        Ok(Self {
            api,
            session,
            store: Arc::new(RecommendationStore::new()),
            config,
        })
    }
}
