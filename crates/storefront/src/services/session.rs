//! Session provider: who is signed in and whether they are an admin.
//!
//! A [`SessionProvider`] is built for each request. It starts in
//! [`SessionState::Loading`], resolves to anonymous or authenticated once
//! [`SessionProvider::initialize`] runs, and re-resolves on every
//! [`AuthEvent`]. The admin flag comes from the user's profile row and is
//! never cached across requests.

use async_trait::async_trait;
use serde::Serialize;

use sweets_core::UserId;

use crate::db::RepositoryError;
use crate::models::{CurrentUser, Profile};

/// Notice recorded when the profile lookup fails.
pub const PROFILE_LOAD_FAILED: &str = "Failed to load user profile.";

/// The profile lookup failed for a reason other than a missing row.
#[derive(Debug, thiserror::Error)]
#[error("failed to load profile: {0}")]
pub struct ProfileFetchError(#[from] pub RepositoryError);

/// Source of profile rows.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// The user's profile, `None` if no row exists.
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, ProfileFetchError>;
}

/// Identity change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(CurrentUser),
    SignedOut,
    /// The signed-in user's identity or profile changed.
    UserUpdated(CurrentUser),
}

/// Resolution state of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Anonymous,
    Authenticated {
        user: CurrentUser,
        profile: Option<Profile>,
        is_admin: bool,
    },
}

/// Serializable view of a session, returned by `GET /api/session`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub loading: bool,
    pub user: Option<CurrentUser>,
    pub profile: Option<Profile>,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

/// Per-request session context.
pub struct SessionProvider<L> {
    lookup: L,
    state: SessionState,
    notices: Vec<String>,
}

impl<L: ProfileLookup> SessionProvider<L> {
    #[must_use]
    pub const fn new(lookup: L) -> Self {
        Self {
            lookup,
            state: SessionState::Loading,
            notices: Vec::new(),
        }
    }

    /// Resolve the initial state from the identity stored in the session.
    pub async fn initialize(&mut self, identity: Option<CurrentUser>) {
        match identity {
            Some(user) => self.resolve(user).await,
            None => self.state = SessionState::Anonymous,
        }
    }

    /// Apply an identity change. Every sign-in or update re-runs the lookup.
    pub async fn handle(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) | AuthEvent::UserUpdated(user) => self.resolve(user).await,
            AuthEvent::SignedOut => self.state = SessionState::Anonymous,
        }
    }

    /// Re-read the profile of the signed-in user. No-op otherwise.
    pub async fn refresh_profile(&mut self) {
        if let SessionState::Authenticated { user, .. } = &self.state {
            let user = user.clone();
            self.resolve(user).await;
        }
    }

    /// End the provider, returning notices that were not yet shown.
    #[must_use]
    pub fn teardown(self) -> Vec<String> {
        self.notices
    }

    async fn resolve(&mut self, user: CurrentUser) {
        let (profile, is_admin) = match self.lookup.fetch_profile(user.id).await {
            Ok(Some(profile)) => {
                let is_admin = profile.is_admin;
                (Some(profile), is_admin)
            }
            Ok(None) => {
                tracing::warn!(user_id = %user.id, "No profile row for user; treating as non-admin");
                (None, false)
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Profile lookup failed");
                self.notices.push(PROFILE_LOAD_FAILED.to_owned());
                (None, false)
            }
        };

        self.state = SessionState::Authenticated {
            user,
            profile,
            is_admin,
        };
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        match &self.state {
            SessionState::Authenticated { profile, .. } => profile.as_ref(),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { is_admin: true, .. })
    }

    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            loading: self.is_loading(),
            user: self.user().cloned(),
            profile: self.profile().cloned(),
            is_admin: self.is_admin(),
            notices: self.notices.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sweets_core::Email;

    struct FixedLookup(Result<Option<bool>, ()>);

    #[async_trait]
    impl ProfileLookup for FixedLookup {
        async fn fetch_profile(
            &self,
            user_id: UserId,
        ) -> Result<Option<Profile>, ProfileFetchError> {
            match self.0 {
                Ok(Some(is_admin)) => Ok(Some(Profile {
                    id: user_id,
                    full_name: None,
                    email: None,
                    home_address: None,
                    phone_number: None,
                    is_admin,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })),
                Ok(None) => Ok(None),
                Err(()) => Err(RepositoryError::DataCorruption("boom".to_owned()).into()),
            }
        }
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            email: Email::parse("dani@sweetsbydani.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_starts_loading_then_anonymous() {
        let mut provider = SessionProvider::new(FixedLookup(Ok(None)));
        assert!(provider.is_loading());

        provider.initialize(None).await;
        assert_eq!(provider.state(), &SessionState::Anonymous);
        assert!(!provider.is_admin());
    }

    #[tokio::test]
    async fn test_admin_flag_comes_from_profile() {
        let mut provider = SessionProvider::new(FixedLookup(Ok(Some(true))));
        provider.initialize(Some(user())).await;
        assert!(provider.is_admin());

        provider.handle(AuthEvent::SignedOut).await;
        assert!(!provider.is_admin());
        assert!(provider.user().is_none());
        assert!(provider.profile().is_none());
    }

    #[tokio::test]
    async fn test_lookup_failure_records_notice() {
        let mut provider = SessionProvider::new(FixedLookup(Err(())));
        provider.initialize(Some(user())).await;

        assert!(provider.user().is_some());
        assert!(!provider.is_admin());
        assert_eq!(provider.teardown(), vec![PROFILE_LOAD_FAILED.to_owned()]);
    }
}
