//! Account route handlers (signed-in customers).

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::{OrderRepository, ProfileRepository};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentSession, RequireAuth};
use crate::models::{OrderSummary, Profile, ProfileForm};
use crate::services::session::{ProfileLookup, SessionProvider};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

/// The signed-in user's profile.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ProfileResponse>> {
    let profile = ProfileRepository::new(state.pool())
        .get(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_string()))?;

    Ok(Json(ProfileResponse {
        profile,
        message: None,
        notices: Vec::new(),
    }))
}

/// Update the signed-in user's contact details.
///
/// Validation failures list every rejected field. The response carries the
/// row as saved; the session provider re-reads it afterwards.
#[instrument(skip(state, provider, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentSession(mut provider): CurrentSession,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfileResponse>> {
    let Some(user) = provider.user().cloned() else {
        return Err(AppError::Unauthorized(
            "You must be logged in to update your profile.".to_string(),
        ));
    };

    let update = form.validate()?;
    let saved = ProfileRepository::new(state.pool())
        .update(user.id, &update)
        .await?;

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(Json(profile_saved(&mut provider, saved).await))
}

/// Refresh the session after a saved update and answer with the saved row.
///
/// A failed refresh only adds the provider's notice; the save stands.
async fn profile_saved<L: ProfileLookup>(
    provider: &mut SessionProvider<L>,
    saved: Profile,
) -> ProfileResponse {
    provider.refresh_profile().await;

    ProfileResponse {
        profile: saved,
        message: Some("Profile updated successfully!".to_string()),
        notices: provider.notices().to_vec(),
    }
}

/// The signed-in user's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use sweets_core::{Email, UserId};

    use super::*;
    use crate::db::RepositoryError;
    use crate::models::CurrentUser;
    use crate::services::session::{PROFILE_LOAD_FAILED, ProfileFetchError};

    struct Unreachable;

    #[async_trait]
    impl ProfileLookup for Unreachable {
        async fn fetch_profile(&self, _: UserId) -> std::result::Result<Option<Profile>, ProfileFetchError> {
            Err(ProfileFetchError(RepositoryError::NotFound))
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_still_returns_saved_profile() {
        let user = CurrentUser {
            id: UserId::generate(),
            email: Email::parse("dani@sweetsbydani.com").unwrap(),
        };
        let saved = Profile {
            id: user.id,
            full_name: Some("Dani Baker".to_owned()),
            email: Some(user.email.clone()),
            home_address: Some("1 Oven Lane".to_owned()),
            phone_number: None,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut provider = SessionProvider::new(Unreachable);
        provider.initialize(Some(user)).await;
        let response = profile_saved(&mut provider, saved.clone()).await;

        assert_eq!(response.profile, saved);
        assert_eq!(response.message.as_deref(), Some("Profile updated successfully!"));
        assert!(response.notices.contains(&PROFILE_LOAD_FAILED.to_owned()));
    }
}
