use std::env;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// The application's configuration.
///
/// Read once at process start; every key below is immutable for the
/// process lifetime. A missing or malformed key is a fatal startup
/// error, never a runtime error.
#[derive(Clone)]
pub struct Config {
    /// The 256-bit key that seals stored secrets.
    pub secret_key: Zeroizing<Vec<u8>>,
    /// The symmetric key that signs access tokens.
    pub jwt_signing_key: Zeroizing<Vec<u8>>,
    /// The `iss` claim stamped into access tokens.
    pub jwt_issuer: String,
    /// The `aud` claim stamped into access tokens.
    pub jwt_audience: String,
    /// The lifetime of an access token in minutes.
    pub access_token_ttl_minutes: i64,
    /// The lifetime of a refresh session in days.
    pub refresh_token_ttl_days: i64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut secret_key_hex = env::var("SECRET_KEY")
            .context("SECRET_KEY must be set (generate with: openssl rand -hex 32)")?;

        let secret_key_bytes = hex::decode(&secret_key_hex)
            .context("SECRET_KEY must be valid hexadecimal")?;

        secret_key_hex.zeroize();

        if secret_key_bytes.len() != 32 {
            anyhow::bail!("SECRET_KEY must be exactly 32 bytes (64 hex characters)");
        }

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .context("JWT_SIGNING_KEY must be set")?
            .into_bytes();

        if jwt_signing_key.len() < 32 {
            anyhow::bail!("JWT_SIGNING_KEY must be at least 32 bytes");
        }

        Ok(Self {
            secret_key: Zeroizing::new(secret_key_bytes),
            jwt_signing_key: Zeroizing::new(jwt_signing_key),
            jwt_issuer: env::var("JWT_ISSUER")
                .context("JWT_ISSUER must be set")?,
            jwt_audience: env::var("JWT_AUDIENCE")
                .context("JWT_AUDIENCE must be set")?,
            access_token_ttl_minutes: env::var("ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("Invalid ACCESS_TOKEN_TTL_MINUTES")?,
            refresh_token_ttl_days: env::var("REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid REFRESH_TOKEN_TTL_DAYS")?,
        })
    }
}
