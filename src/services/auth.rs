use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::crypto::password;
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::repositories::session::RefreshTokenStore;
use crate::repositories::user::UserStore;
use crate::services::jwt::AccessTokenIssuer;
use crate::services::session::RefreshSessionLedger;

/// The token pair handed to a freshly registered user.
#[derive(Clone, Debug)]
pub struct AuthTokens {
    /// Short-lived signed access token.
    pub access_token: String,
    /// Long-lived opaque refresh token.
    pub refresh_token: String,
}

/// Composes password verification, access-token issuance, and the
/// refresh-session ledger into the register / login / logout flows.
#[derive(Clone)]
pub struct AuthService<U, S, C = SystemClock> {
    users: U,
    sessions: RefreshSessionLedger<S, C>,
    tokens: AccessTokenIssuer<C>,
    clock: C,
}

impl<U, S, C> AuthService<U, S, C>
where
    U: UserStore,
    S: RefreshTokenStore,
    C: Clock + Clone,
{
    /// Wires an orchestrator from the process configuration and stores.
    pub fn new(config: &Config, users: U, session_store: S, clock: C) -> Self {
        Self {
            users,
            sessions: RefreshSessionLedger::new(config, session_store, clock.clone()),
            tokens: AccessTokenIssuer::new(config, clock.clone()),
            clock,
        }
    }

    /// The refresh-session ledger, for callers that drive it directly.
    pub fn sessions(&self) -> &RefreshSessionLedger<S, C> {
        &self.sessions
    }

    /// The access-token issuer, for the API boundary's verification side.
    pub fn tokens(&self) -> &AccessTokenIssuer<C> {
        &self.tokens
    }

    /// Registers a new user.
    ///
    /// Hashes the password, persists the user, issues one refresh
    /// session, links it as the user's current session, and mints one
    /// access token.
    ///
    /// # Arguments
    ///
    /// * `username` - The desired username.
    /// * `email` - The user's email address.
    /// * `password` - The account password, consumed for hashing only.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `User` and its token pair.
    /// Fails with `DuplicateIdentity` if the email or username is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthTokens)> {
        tracing::debug!("🔐 Registering user: {}", username);

        if self.users.find_by_email(email).await?.is_some()
            || self.users.find_by_username(username).await?.is_some()
        {
            tracing::warn!("❌ Registration rejected, identity taken: {}", username);
            return Err(AppError::DuplicateIdentity);
        }

        let password_hash = password::hash_password(password)?;

        let mut user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            current_session_id: None,
            created_at: self.clock.now(),
            last_password_change: None,
            is_active: true,
        };
        self.users.insert(&user).await?;

        // The user row is not rolled back if either write below fails;
        // the registration surfaces the persistence error instead.
        let session = self.sessions.issue(user.id).await?;

        let rows = self
            .users
            .set_current_session(&user.id, Some(session.id))
            .await?;
        if rows == 0 {
            return Err(AppError::Persistence(format!(
                "linking session to user {} affected no rows",
                user.id
            )));
        }
        user.current_session_id = Some(session.id);

        let access_token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!("✅ User registered: {}", user.id);
        Ok((
            user,
            AuthTokens {
                access_token,
                refresh_token: session.token,
            },
        ))
    }

    /// Authenticates a user and mints a fresh access token.
    ///
    /// The refresh session is untouched. Unknown user, inactive user,
    /// and wrong password all return the identical `InvalidCredentials`
    /// so the caller learns nothing about which factor failed.
    ///
    /// # Arguments
    ///
    /// * `username` - The user's username.
    /// * `password` - The account password.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        tracing::debug!("🔐 Login attempt: {}", username);

        let user = self
            .users
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash)? {
            tracing::warn!("❌ Login failed for user: {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!("✅ User logged in: {}", user.id);
        Ok(access_token)
    }

    /// Ends a session by hard-deleting its refresh record.
    ///
    /// The already-minted access token expires organically. A second
    /// logout with the same token fails with `InvalidToken`, since the
    /// record no longer resolves.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - The opaque token value presented by the client.
    ///
    /// # Returns
    ///
    /// A `Result<()>`.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let session = self
            .sessions
            .find_by_token(refresh_token)
            .await?
            .ok_or(AppError::InvalidToken)?;

        self.sessions.delete(&session).await?;

        tracing::info!("👋 User logged out: {}", session.user_id);
        Ok(())
    }

    /// Changes a user's password.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The ID of the user.
    /// * `old_password` - The user's current password.
    /// * `new_password` - The replacement password.
    ///
    /// # Returns
    ///
    /// A `Result<()>`. Fails with `InvalidCredentials` if the current
    /// password does not verify.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        tracing::info!("🔑 Changing password for user: {}", user_id);

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(old_password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = password::hash_password(new_password)?;
        let rows = self
            .users
            .update_password(&user_id, &new_hash, self.clock.now())
            .await?;
        if rows == 0 {
            return Err(AppError::Persistence(format!(
                "password update for user {} affected no rows",
                user_id
            )));
        }

        tracing::info!("✅ Password changed for user: {}", user_id);
        Ok(())
    }
}
