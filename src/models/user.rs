use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's hashed password (PHC string). Never reversible,
    /// never read back in cleartext.
    pub password_hash: String,
    /// The user's current refresh session, if one has been issued.
    /// Replaced wholesale when a new session is issued.
    pub current_session_id: Option<Uuid>,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp of the user's last password change.
    pub last_password_change: Option<DateTime<Utc>>,
    /// Whether the user is active.
    pub is_active: bool,
}
