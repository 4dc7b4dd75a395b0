use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::crypto::cipher::{SecretCipher, SecureKey};
use crate::error::Result;
use crate::repositories::session::{InMemoryRefreshTokenStore, RefreshTokenStore};
use crate::repositories::user::{InMemoryUserStore, UserStore};
use crate::services::auth::AuthService;

/// The application's wiring: every security component, constructed once
/// at startup from an immutable `Config` and never mutated afterwards.
///
/// Two concurrent requests share nothing mutable here; the cipher and
/// signing keys are read-only, and all session mutations go through the
/// stores' own isolation guarantees.
#[derive(Clone)]
pub struct AppState<U, S, C = SystemClock> {
    /// The application's configuration.
    pub config: Config,
    /// Seals and opens stored secrets.
    pub cipher: SecretCipher,
    /// The register / login / logout orchestrator.
    pub auth: AuthService<U, S, C>,
}

impl<U, S, C> AppState<U, S, C>
where
    U: UserStore + Clone,
    S: RefreshTokenStore + Clone,
    C: Clock + Clone,
{
    /// Creates a new `AppState` over the given stores.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `users` - The user store implementation.
    /// * `sessions` - The refresh session store implementation.
    /// * `clock` - The time source for every expiry check.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config, users: U, sessions: S, clock: C) -> Result<Self> {
        let key = SecureKey::from_slice(&config.secret_key)?;
        let cipher = SecretCipher::new(&key);
        tracing::info!("✅ Secret cipher initialized");

        let auth = AuthService::new(config, users, sessions, clock);
        tracing::info!("✅ Auth service initialized");

        Ok(AppState {
            config: config.clone(),
            cipher,
            auth,
        })
    }
}

impl AppState<InMemoryUserStore, InMemoryRefreshTokenStore, SystemClock> {
    /// Creates an `AppState` backed by in-process stores and the wall
    /// clock, for tests and single-process embedding.
    pub fn in_memory(config: &Config) -> Result<Self> {
        Self::new(
            config,
            InMemoryUserStore::new(),
            InMemoryRefreshTokenStore::new(),
            SystemClock,
        )
    }
}
