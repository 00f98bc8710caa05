//! Authentication extractors.
//!
//! The session cookie only carries the user's identity. Admin status is
//! resolved per request by a [`SessionProvider`] that reads the profile row.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use tower_sessions::Session;

use sweets_core::UserId;

use crate::db::ProfileRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, Profile, session_keys};
use crate::services::session::{ProfileFetchError, ProfileLookup, SessionProvider};
use crate::state::AppState;

/// Profile lookup over an owned pool handle, so a provider can outlive the
/// borrow of `AppState` in an extractor.
#[derive(Clone)]
pub struct PgProfileLookup {
    pool: PgPool,
}

impl PgProfileLookup {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileLookup for PgProfileLookup {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, ProfileFetchError> {
        ProfileRepository::new(&self.pool).fetch_profile(user_id).await
    }
}

/// Session provider used by request handlers.
pub type RequestSession = SessionProvider<PgProfileLookup>;

/// Build an unresolved provider for this request.
#[must_use]
pub fn session_provider(state: &AppState) -> RequestSession {
    SessionProvider::new(PgProfileLookup::new(state.pool().clone()))
}

/// Identity stored in the session, if any. Read errors count as signed out.
pub async fn read_identity(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to read identity from session"))
        .ok()
        .flatten()
}

/// Extractor yielding a resolved session provider. Never rejects anonymous
/// visitors.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentSession(provider): CurrentSession) -> impl IntoResponse {
///     Json(provider.snapshot())
/// }
/// ```
pub struct CurrentSession(pub RequestSession);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let mut provider = session_provider(state);
        provider.initialize(read_identity(session).await).await;

        Ok(Self(provider))
    }
}

/// Extractor that requires a signed-in user. Rejects with 401.
///
/// Only reads the session; no profile lookup is made.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("Please sign in.".to_string()))?;

        read_identity(session)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Please sign in.".to_string()))
    }
}

/// Extractor that requires a signed-in administrator.
///
/// Rejects with 401 when signed out and 403 when the profile is not an admin
/// (including when the profile is missing or could not be loaded).
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(provider) = CurrentSession::from_request_parts(parts, state).await?;

        let Some(user) = provider.user().cloned() else {
            return Err(AppError::Unauthorized("Please sign in.".to_string()));
        };
        if !provider.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Admin access denied");
            return Err(AppError::Forbidden(
                "You do not have permission to access this page.".to_string(),
            ));
        }

        Ok(Self(user))
    }
}

/// Store the signed-in identity in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the identity from the session (logout). The cart slot is kept.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
