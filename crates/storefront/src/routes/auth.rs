//! Authentication route handlers.
//!
//! Registration and login store the identity in the session and resolve the
//! session provider so the response already carries the admin flag.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, session_provider, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::services::session::{AuthEvent, SessionSnapshot};
use crate::state::AppState;

/// Email and password, as submitted by the login and registration forms.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: SecretString,
}

async fn sign_in(state: &AppState, session: &Session, user: User) -> Result<SessionSnapshot> {
    let current = CurrentUser {
        id: user.id,
        email: user.email,
    };

    set_current_user(session, &current).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to store identity in session");
        AppError::Internal("failed to start session".to_string())
    })?;
    set_sentry_user(&current.id, Some(current.email.as_str()));

    let mut provider = session_provider(state);
    provider.handle(AuthEvent::SignedIn(current)).await;
    Ok(provider.snapshot())
}

/// Create an account and sign in.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>)> {
    let user = AuthService::new(state.pool())
        .register(&request.email, request.password.expose_secret())
        .await?;

    let snapshot = sign_in(&state, &session, user).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Sign in with email and password.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<SessionSnapshot>> {
    let user = AuthService::new(state.pool())
        .login(&request.email, request.password.expose_secret())
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    tracing::info!(user_id = %user.id, "User signed in");
    Ok(Json(sign_in(&state, &session, user).await?))
}

/// Sign out. The cart stays in the session.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Json<SessionSnapshot>> {
    clear_current_user(&session).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to clear identity from session");
        AppError::Internal("failed to end session".to_string())
    })?;
    clear_sentry_user();

    let mut provider = session_provider(&state);
    provider.handle(AuthEvent::SignedOut).await;
    Ok(Json(provider.snapshot()))
}
