use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::user::User;

/// Storage interface for user records.
///
/// Persistence mechanics live behind this seam: the core assumes the
/// implementation provides at-least read-committed isolation and atomic
/// single-row writes. Mutation methods return the number of rows
/// affected so callers can distinguish a durable write from a no-op.
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Fails if the id, username, or email is taken.
    fn insert(&self, user: &User) -> impl Future<Output = Result<()>> + Send;

    /// Finds a user by ID.
    fn find_by_id(&self, id: &Uuid) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Finds a user by username.
    fn find_by_username(&self, username: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Finds a user by email address.
    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Points the user at a new current refresh session, replacing any
    /// prior link. The prior session record itself is left untouched.
    fn set_current_session(
        &self,
        user_id: &Uuid,
        session_id: Option<Uuid>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Replaces the user's password hash.
    fn update_password(
        &self,
        user_id: &Uuid,
        password_hash: &str,
        changed_at: chrono::DateTime<chrono::Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// An in-process `UserStore` for tests and embedding.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        let taken = users.contains_key(&user.id)
            || users
                .values()
                .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(AppError::Persistence(
                "unique constraint violated on users".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn set_current_session(&self, user_id: &Uuid, session_id: Option<Uuid>) -> Result<u64> {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) => {
                user.current_session_id = session_id;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_password(
        &self,
        user_id: &Uuid,
        password_hash: &str,
        changed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64> {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.last_password_change = Some(changed_at);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
