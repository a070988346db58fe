//! Bearer-token lifecycle. The token is written only here; every outbound
//! call reads a clone of it.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::api::AdvisorApi;
use crate::errors::AdvisorError;

pub mod token_store;

pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};

pub struct SessionManager {
    api: Arc<dyn AdvisorApi>,
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
}

impl SessionManager {
    /// Builds a manager, picking up any token persisted by a previous run.
    pub fn restore(
        api: Arc<dyn AdvisorApi>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, AdvisorError> {
        let token = store.load()?;
        if token.is_some() {
            info!("Restored persisted session");
        }
        Ok(Self {
            api,
            store,
            token: RwLock::new(token),
        })
    }

    /// Exchanges credentials for a bearer token and persists it.
    ///
    /// Any failure leaves the previous session, in memory and on disk, untouched.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<(), AdvisorError> {
        let response = match self.api.exchange_credentials(identifier, secret).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Credential exchange failed: {e}");
                return Err(AdvisorError::Authentication);
            }
        };

        if response.access_token.is_empty() {
            warn!("Credential exchange returned an empty token");
            return Err(AdvisorError::Authentication);
        }

        self.store.save(&response.access_token)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(response.access_token);
        info!("Logged in as {identifier}");
        Ok(())
    }

    /// Clears the session and its persisted copy. Safe to call repeatedly.
    pub fn logout(&self) -> Result<(), AdvisorError> {
        let had_session = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        self.store.clear()?;
        if had_session {
            info!("Logged out");
        }
        Ok(())
    }

    pub fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }

    /// The token for a protected call, or `Unauthenticated` (redirect to login).
    pub fn authorize(&self) -> Result<String, AdvisorError> {
        self.current_token().ok_or(AdvisorError::Unauthenticated)
    }
}
