use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// The size of an opaque refresh token in bytes (512 bits of entropy).
const REFRESH_TOKEN_SIZE: usize = 64;

/// Generates a new opaque refresh token value.
///
/// Callers treat the result as an opaque bearer string with no internal
/// structure to parse.
///
/// # Returns
///
/// A URL-safe base64-encoded token.
pub fn generate_refresh_token() -> String {
    let mut token = [0u8; REFRESH_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_refresh_token(), generate_refresh_token());
    }

    #[test]
    fn encodes_full_entropy() {
        // 64 raw bytes -> ceil(64 * 4 / 3) unpadded base64 characters.
        assert_eq!(generate_refresh_token().len(), 86);
    }
}
