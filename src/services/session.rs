use chrono::Duration;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::crypto::token;
use crate::error::{AppError, Result};
use crate::models::session::RefreshSession;
use crate::repositories::session::RefreshTokenStore;

/// Governs the lifecycle of long-lived refresh sessions.
///
/// Issues opaque tokens, answers activity checks, and revokes or
/// deletes sessions. All writes go through the session store; an
/// operation only reports success once the store has committed.
#[derive(Clone)]
pub struct RefreshSessionLedger<S, C = SystemClock> {
    store: S,
    ttl: Duration,
    clock: C,
}

impl<S: RefreshTokenStore, C: Clock> RefreshSessionLedger<S, C> {
    /// Creates a ledger over `store` with the configured session lifetime.
    pub fn new(config: &Config, store: S, clock: C) -> Self {
        Self {
            store,
            ttl: Duration::days(config.refresh_token_ttl_days),
            clock,
        }
    }

    /// Issues a new refresh session for `user_id`.
    ///
    /// The opaque token value carries 512 bits of entropy. Linking the
    /// session as the user's current one is the caller's step; any prior
    /// session record is left in place.
    ///
    /// # Returns
    ///
    /// A `Result` containing the persisted `RefreshSession`.
    pub async fn issue(&self, user_id: Uuid) -> Result<RefreshSession> {
        let now = self.clock.now();
        let session = RefreshSession {
            id: Uuid::new_v4(),
            token: token::generate_refresh_token(),
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        self.store.insert(&session).await?;
        tracing::info!("✅ Refresh session issued for user: {}", user_id);
        Ok(session)
    }

    /// Looks up a session by its opaque token value.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the token does not resolve; that is a normal
    /// outcome, not an error.
    pub async fn find_by_token(&self, token_value: &str) -> Result<Option<RefreshSession>> {
        self.store.find_by_token(token_value).await
    }

    /// Marks a session revoked. Idempotent: revoking an already-revoked
    /// session is a no-op.
    pub async fn revoke(&self, session: &RefreshSession) -> Result<()> {
        if session.revoked_at.is_some() {
            tracing::debug!("Session {} already revoked", session.id);
            return Ok(());
        }

        let mut revoked = session.clone();
        revoked.revoked_at = Some(self.clock.now());

        let rows = self.store.save(&revoked).await?;
        if rows == 0 {
            return Err(AppError::Persistence(format!(
                "revoke of session {} affected no rows",
                session.id
            )));
        }

        tracing::info!("✅ Refresh session revoked: {}", session.id);
        Ok(())
    }

    /// Hard-removes a session record.
    pub async fn delete(&self, session: &RefreshSession) -> Result<()> {
        let rows = self.store.delete(&session.id).await?;
        if rows == 0 {
            return Err(AppError::Persistence(format!(
                "delete of session {} affected no rows",
                session.id
            )));
        }

        tracing::info!("✅ Refresh session deleted: {}", session.id);
        Ok(())
    }

    /// Whether `session` is usable right now: not revoked and not past
    /// its expiry.
    pub fn is_active(&self, session: &RefreshSession) -> bool {
        session.is_active(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::repositories::session::InMemoryRefreshTokenStore;
    use chrono::{TimeZone, Utc};
    use zeroize::Zeroizing;

    fn test_config() -> Config {
        Config {
            secret_key: Zeroizing::new(vec![0u8; 32]),
            jwt_signing_key: Zeroizing::new(vec![1u8; 32]),
            jwt_issuer: "keywarden".to_string(),
            jwt_audience: "keywarden-clients".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
        }
    }

    fn ledger() -> (
        RefreshSessionLedger<InMemoryRefreshTokenStore, FixedClock>,
        FixedClock,
    ) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        let store = InMemoryRefreshTokenStore::new();
        (
            RefreshSessionLedger::new(&test_config(), store, clock.clone()),
            clock,
        )
    }

    #[tokio::test]
    async fn issue_persists_and_resolves_by_token() {
        let (ledger, _) = ledger();
        let user_id = Uuid::new_v4();

        let session = ledger.issue(user_id).await.unwrap();
        let found = ledger.find_by_token(&session.token).await.unwrap().unwrap();

        assert_eq!(found.id, session.id);
        assert_eq!(found.user_id, user_id);
        assert!(ledger.is_active(&found));
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let (ledger, _) = ledger();
        assert!(ledger.find_by_token("no-such-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (ledger, _) = ledger();
        let session = ledger.issue(Uuid::new_v4()).await.unwrap();

        ledger.revoke(&session).await.unwrap();
        let revoked = ledger.find_by_token(&session.token).await.unwrap().unwrap();
        assert!(revoked.revoked_at.is_some());
        assert!(!ledger.is_active(&revoked));

        // Second revoke is a no-op, not an error.
        ledger.revoke(&revoked).await.unwrap();
    }

    #[tokio::test]
    async fn session_expires_with_the_clock() {
        let (ledger, clock) = ledger();
        let session = ledger.issue(Uuid::new_v4()).await.unwrap();

        clock.advance(Duration::days(7) + Duration::seconds(1));
        assert!(session.revoked_at.is_none());
        assert!(!ledger.is_active(&session));
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let (ledger, _) = ledger();
        let session = ledger.issue(Uuid::new_v4()).await.unwrap();

        ledger.delete(&session).await.unwrap();
        assert!(ledger.find_by_token(&session.token).await.unwrap().is_none());

        // A second delete hits no rows and surfaces as a persistence error.
        assert!(matches!(
            ledger.delete(&session).await.unwrap_err(),
            AppError::Persistence(_)
        ));
    }
}
