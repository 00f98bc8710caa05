//! Durable storage for the cart slot.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tower_sessions::Session;

use crate::models::session_keys;

/// Errors from reading or writing the cart slot.
#[derive(Debug, thiserror::Error)]
pub enum CartStoreError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cart storage unavailable: {0}")]
    Unavailable(String),
}

/// A single string slot holding the serialized cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Raw slot contents, `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<String>, CartStoreError>;

    /// Overwrite the slot.
    async fn save(&self, snapshot: String) -> Result<(), CartStoreError>;
}

/// Cart slot kept in the visitor's HTTP session.
#[derive(Debug, Clone)]
pub struct SessionCartStore {
    session: Session,
}

impl SessionCartStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CartStore for SessionCartStore {
    async fn load(&self) -> Result<Option<String>, CartStoreError> {
        Ok(self.session.get::<String>(session_keys::CART).await?)
    }

    async fn save(&self, snapshot: String) -> Result<(), CartStoreError> {
        self.session.insert(session_keys::CART, snapshot).await?;
        Ok(())
    }
}

/// In-process cart slot. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw slot contents, e.g. data written by an older version.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Current raw slot contents.
    pub async fn contents(&self) -> Option<String> {
        self.slot.lock().await.clone()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn load(&self) -> Result<Option<String>, CartStoreError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, snapshot: String) -> Result<(), CartStoreError> {
        *self.slot.lock().await = Some(snapshot);
        Ok(())
    }
}
