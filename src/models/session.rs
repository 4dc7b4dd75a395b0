use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted refresh session.
///
/// The `token` field holds the opaque value presented by the client; it
/// is cryptographically random and unique. A session stops being usable
/// the moment it is revoked or its expiry passes, whichever comes first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshSession {
    /// The unique identifier for the session record.
    pub id: Uuid,
    /// The opaque token value presented by the client.
    pub token: String,
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
    /// The timestamp when the session was revoked, if it was.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshSession {
    /// Whether the session is usable at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_in: Duration) -> RefreshSession {
        let now = Utc::now();
        RefreshSession {
            id: Uuid::new_v4(),
            token: "opaque".to_string(),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + expires_in,
            revoked_at: None,
        }
    }

    #[test]
    fn live_session_is_active() {
        let s = session(Duration::days(7));
        assert!(s.is_active(Utc::now()));
    }

    #[test]
    fn expired_session_is_inactive_even_without_revocation() {
        let s = session(Duration::days(7));
        assert!(s.revoked_at.is_none());
        assert!(!s.is_active(s.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn revoked_session_is_inactive_before_expiry() {
        let mut s = session(Duration::days(7));
        s.revoked_at = Some(Utc::now());
        assert!(!s.is_active(Utc::now()));
    }
}
