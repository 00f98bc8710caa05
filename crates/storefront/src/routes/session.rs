//! Session state endpoint.

use axum::Json;

use crate::middleware::CurrentSession;
use crate::services::session::SessionSnapshot;

/// Who is signed in, their profile, and whether they are an admin.
pub async fn show(CurrentSession(provider): CurrentSession) -> Json<SessionSnapshot> {
    Json(provider.snapshot())
}
