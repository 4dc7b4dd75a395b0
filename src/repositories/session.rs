use std::collections::HashMap;
use std::sync::Arc;

use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::session::RefreshSession;

/// Storage interface for refresh session records.
///
/// Same contract as `UserStore`: the implementation owns transactional
/// guarantees, and mutations report rows affected so a write that hit
/// nothing is visible to the caller.
pub trait RefreshTokenStore: Send + Sync {
    /// Inserts a new session record. Fails if the id or token is taken.
    fn insert(&self, session: &RefreshSession) -> impl Future<Output = Result<()>> + Send;

    /// Looks up a session by its opaque token value. Absence is a
    /// normal "not found" outcome, not an error.
    fn find_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<RefreshSession>>> + Send;

    /// Writes back an updated session record.
    fn save(&self, session: &RefreshSession) -> impl Future<Output = Result<u64>> + Send;

    /// Hard-removes a session record.
    fn delete(&self, id: &Uuid) -> impl Future<Output = Result<u64>> + Send;
}

/// An in-process `RefreshTokenStore` for tests and embedding.
#[derive(Clone, Default)]
pub struct InMemoryRefreshTokenStore {
    sessions: Arc<RwLock<HashMap<Uuid, RefreshSession>>>,
}

impl InMemoryRefreshTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn insert(&self, session: &RefreshSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let taken = sessions.contains_key(&session.id)
            || sessions.values().any(|s| s.token == session.token);
        if taken {
            return Err(AppError::Persistence(
                "unique constraint violated on refresh_tokens".to_string(),
            ));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>> {
        let sessions = self.sessions.read().await;
        // Constant-time comparison; the token is a bearer credential.
        Ok(sessions
            .values()
            .find(|s| s.token.as_bytes().ct_eq(token.as_bytes()).into())
            .cloned())
    }

    async fn save(&self, session: &RefreshSession) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        Ok(if sessions.remove(id).is_some() { 1 } else { 0 })
    }
}
