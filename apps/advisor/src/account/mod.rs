//! Account flows outside the login exchange: registration, password reset
//! and profile editing.

use std::sync::Arc;

use reqwest::Url;
use tracing::{error, info};

use crate::api::{AdvisorApi, ApiError};
use crate::errors::{AccountError, AdvisorError};
use crate::models::user::{ImageUpload, NewUser, User, UserUpdate};
use crate::session::SessionManager;
use crate::state::AppState;

/// Service-side rejections carry a `detail` the user can act on; anything
/// else stays a transport error.
fn rejection(e: ApiError) -> AdvisorError {
    match (e.status(), e.detail()) {
        (Some(status), Some(detail)) if (400..500).contains(&status) && status != 401 => {
            AccountError::Rejected(detail.to_string()).into()
        }
        _ => e.into(),
    }
}

pub async fn register(api: &dyn AdvisorApi, user: NewUser) -> Result<User, AdvisorError> {
    if user.password != user.password_confirmation {
        return Err(AccountError::PasswordMismatch.into());
    }
    let created = api.register(&user).await.map_err(|e| {
        error!("Registration failed for {}: {e}", user.username);
        rejection(e)
    })?;
    info!("Registered account {}", created.username);
    Ok(created)
}

pub async fn forgot_password(api: &dyn AdvisorApi, email: &str) -> Result<String, AdvisorError> {
    let response = api.forgot_password(email).await.map_err(rejection)?;
    Ok(response.message)
}

pub async fn reset_password(
    api: &dyn AdvisorApi,
    reset_token: &str,
    new_password: &str,
    confirmation: &str,
) -> Result<String, AdvisorError> {
    if reset_token.trim().is_empty() {
        return Err(AccountError::MissingResetToken.into());
    }
    if new_password != confirmation {
        return Err(AccountError::PasswordMismatch.into());
    }
    let response = api
        .reset_password(reset_token, new_password)
        .await
        .map_err(rejection)?;
    info!("Password reset completed");
    Ok(response.message)
}

/// Requested profile edits. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    /// Manually entered image URL. An empty string clears the image.
    pub profile_image_url: Option<String>,
    pub school_attended: Option<String>,
    pub id_birth_cert_number: Option<String>,
    pub phone_number: Option<String>,
}

fn changed(requested: &Option<String>, current: Option<&str>) -> Option<String> {
    requested
        .as_ref()
        .filter(|value| Some(value.as_str()) != current)
        .cloned()
}

fn check_image_url(raw: &str) -> Result<(), AccountError> {
    if raw.is_empty() {
        return Ok(());
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(AccountError::InvalidImageUrl(raw.to_string())),
    }
}

/// Local form checks. A manual image URL is only checked when no upload
/// will replace it.
pub fn check_form(form: &ProfileForm, uploading: bool) -> Result<(), AccountError> {
    if let Some(password) = form.password.as_deref().filter(|p| !p.is_empty()) {
        if form.password_confirmation.as_deref() != Some(password) {
            return Err(AccountError::PasswordMismatch);
        }
    }
    match &form.profile_image_url {
        Some(manual) if !uploading => check_image_url(manual),
        _ => Ok(()),
    }
}

/// The minimal update turning `current` into the requested form.
///
/// The image URL resolves as: freshly uploaded URL, then a manually changed
/// URL, otherwise the existing one is kept (and not sent).
pub fn build_update(
    current: &User,
    form: &ProfileForm,
    uploaded_url: Option<&str>,
) -> Result<UserUpdate, AccountError> {
    check_form(form, uploaded_url.is_some())?;

    let password = form.password.clone().filter(|p| !p.is_empty());
    let profile_image_url = match uploaded_url {
        Some(url) => Some(url.to_string()),
        None => changed(&form.profile_image_url, current.profile_image_url.as_deref()),
    };

    Ok(UserUpdate {
        username: changed(&form.username, Some(current.username.as_str())),
        email: changed(&form.email, Some(current.email.as_str())),
        password,
        profile_image_url,
        school_attended: changed(&form.school_attended, current.school_attended.as_deref()),
        id_birth_cert_number: changed(
            &form.id_birth_cert_number,
            current.id_birth_cert_number.as_deref(),
        ),
        phone_number: changed(&form.phone_number, current.phone_number.as_deref()),
    })
}

/// Authenticated profile operations.
pub struct AccountService {
    api: Arc<dyn AdvisorApi>,
    session: Arc<SessionManager>,
}

impl AccountService {
    pub fn new(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            session: state.session.clone(),
        }
    }

    pub async fn current_user(&self) -> Result<User, AdvisorError> {
        let token = self.session.authorize()?;
        Ok(self.api.fetch_me(&token).await?)
    }

    /// Checks the form, uploads `image` (if any), then sends only the changed
    /// fields. Returns the current user unchanged when nothing differs.
    pub async fn update_profile(
        &self,
        form: &ProfileForm,
        image: Option<ImageUpload>,
    ) -> Result<User, AdvisorError> {
        check_form(form, image.is_some())?;
        let token = self.session.authorize()?;
        let current = self.api.fetch_me(&token).await?;

        let uploaded = match image {
            Some(image) => {
                let response = self.api.upload_profile_image(&token, &image).await?;
                info!("Uploaded profile image {}", image.file_name);
                Some(response.url)
            }
            None => None,
        };

        let update = build_update(&current, form, uploaded.as_deref())?;
        if update.is_empty() {
            info!("Profile unchanged, skipping update");
            return Ok(current);
        }

        let user = self
            .api
            .update_me(&token, &update)
            .await
            .map_err(rejection)?;
        info!("Updated profile for {}", user.username);
        Ok(user)
    }
}
