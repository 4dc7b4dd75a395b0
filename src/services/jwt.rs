use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{AppError, Result};

/// The claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID (standard JWT `sub` claim).
    pub sub: String,
    /// User email.
    pub email: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
}

/// Mints and verifies short-lived, stateless access tokens.
///
/// Tokens are HS256-signed with a process-wide key loaded once at
/// startup. There is no revocation path: a minted token stays valid
/// until its expiry, and the short lifetime is the only mitigation.
#[derive(Clone)]
pub struct AccessTokenIssuer<C = SystemClock> {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
    clock: C,
}

impl<C: Clock> AccessTokenIssuer<C> {
    /// Creates an issuer from the process configuration.
    pub fn new(config: &Config, clock: C) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_signing_key),
            decoding_key: DecodingKey::from_secret(&config.jwt_signing_key),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl: Duration::minutes(config.access_token_ttl_minutes),
            clock,
        }
    }

    /// Mints a signed access token asserting `user_id`.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The subject of the token.
    /// * `email` - The user's email, carried as a claim.
    ///
    /// # Returns
    ///
    /// A `Result` containing the compact token string.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

        tracing::debug!("🎫 Access token minted for user {}", user_id);
        Ok(token)
    }

    /// Verifies an incoming token's signature, issuer, audience, and
    /// expiry. Expired or badly-signed tokens are rejected outright; no
    /// partial trust.
    ///
    /// # Arguments
    ///
    /// * `token` - The compact token string.
    ///
    /// # Returns
    ///
    /// A `Result` containing the verified claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::warn!("❌ Token rejected: {}", e);
                AppError::InvalidToken
            })?;

        if data.claims.exp <= self.clock.now().timestamp() {
            tracing::warn!("❌ Token expired for subject {}", data.claims.sub);
            return Err(AppError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use zeroize::Zeroizing;

    fn test_config() -> Config {
        Config {
            secret_key: Zeroizing::new(vec![0u8; 32]),
            jwt_signing_key: Zeroizing::new(b"0123456789abcdef0123456789abcdef".to_vec()),
            jwt_issuer: "keywarden".to_string(),
            jwt_audience: "keywarden-clients".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
        }
    }

    fn fixed_clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let issuer = AccessTokenIssuer::new(&test_config(), fixed_clock());
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id, "alice@example.com").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let clock = fixed_clock();
        let issuer = AccessTokenIssuer::new(&test_config(), clock.clone());
        let token = issuer.issue(Uuid::new_v4(), "alice@example.com").unwrap();

        clock.advance(Duration::minutes(16));
        assert!(matches!(
            issuer.verify(&token).unwrap_err(),
            AppError::InvalidToken
        ));
    }

    #[test]
    fn token_valid_just_before_expiry() {
        let clock = fixed_clock();
        let issuer = AccessTokenIssuer::new(&test_config(), clock.clone());
        let token = issuer.issue(Uuid::new_v4(), "alice@example.com").unwrap();

        clock.advance(Duration::minutes(14));
        assert!(issuer.verify(&token).is_ok());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = AccessTokenIssuer::new(&test_config(), fixed_clock());
        let token = issuer.issue(Uuid::new_v4(), "alice@example.com").unwrap();

        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            issuer.verify(&tampered).unwrap_err(),
            AppError::InvalidToken
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let issuer = AccessTokenIssuer::new(&test_config(), fixed_clock());
        let token = issuer.issue(Uuid::new_v4(), "alice@example.com").unwrap();

        let mut other_config = test_config();
        other_config.jwt_audience = "some-other-service".to_string();
        let other = AccessTokenIssuer::new(&other_config, fixed_clock());

        assert!(matches!(
            other.verify(&token).unwrap_err(),
            AppError::InvalidToken
        ));
    }

    #[test]
    fn wrong_signing_key_is_rejected() {
        let issuer = AccessTokenIssuer::new(&test_config(), fixed_clock());
        let token = issuer.issue(Uuid::new_v4(), "alice@example.com").unwrap();

        let mut other_config = test_config();
        other_config.jwt_signing_key =
            Zeroizing::new(b"ffffffffffffffffffffffffffffffff".to_vec());
        let other = AccessTokenIssuer::new(&other_config, fixed_clock());

        assert!(matches!(
            other.verify(&token).unwrap_err(),
            AppError::InvalidToken
        ));
    }
}
