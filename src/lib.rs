//! Security core of a password-manager backend.
//!
//! Two responsibilities live here: sealing stored secrets with
//! authenticated encryption, and governing the session lifecycle -
//! access-token issuance and verification, refresh-session issuance,
//! revocation, and the register / login / logout flows around them.
//! Persistence, routing, and presentation are external collaborators
//! behind the store traits in [`repositories`].

pub mod clock;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;

pub mod crypto {
    pub mod cipher;
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod jwt;
    pub mod session;
}

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use crypto::cipher::{SealedSecret, SecretCipher, SecureKey};
pub use error::{AppError, Result};
pub use models::session::RefreshSession;
pub use models::user::User;
pub use services::auth::{AuthService, AuthTokens};
pub use services::jwt::{AccessTokenIssuer, Claims};
pub use services::session::RefreshSessionLedger;
pub use state::AppState;
