use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AppError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// The size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;
/// The smallest decodable sealed payload: nonce plus tag, empty plaintext.
pub const MIN_SEALED_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// A secure key wrapper that ensures the key is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    ///
    /// # Arguments
    ///
    /// * `key` - A 32-byte array representing the AES-256 key.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Creates a `SecureKey` from raw key material, e.g. the configured
    /// secret key.
    ///
    /// # Arguments
    ///
    /// * `key` - The raw key bytes. Must be exactly 32 bytes.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SecureKey`. Any other key length is
    /// rejected here, before a cipher can be built.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = key.try_into().map_err(|_| {
            AppError::Encryption(format!(
                "Secret key must be exactly {} bytes, got {}",
                KEY_SIZE,
                key.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Returns a reference to the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// The persisted form of an encrypted secret: base64 over
/// `nonce(12) || tag(16) || ciphertext`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedSecret(String);

impl SealedSecret {
    /// Wraps an already-encoded sealed value, e.g. one read back from
    /// storage. No validation happens here; `decrypt` validates.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the base64 encoding, as it is persisted.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SealedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated encryption of individual stored secrets.
///
/// Stateless given its key: two concurrent calls share nothing but the
/// read-only key schedule. Each `encrypt` call draws a fresh random
/// 12-byte nonce; a nonce is never reused under the same key.
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Creates a cipher from a 256-bit key.
    ///
    /// # Arguments
    ///
    /// * `key` - The AES-256 key. `SecureKey` construction has already
    ///   enforced the length, so building the cipher cannot fail.
    pub fn new(key: &SecureKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.as_bytes().into()),
        }
    }

    /// Encrypts a plaintext, optionally binding associated data.
    ///
    /// # Arguments
    ///
    /// * `plaintext` - The data to encrypt. Empty input is valid and
    ///   round-trips.
    /// * `associated_data` - Authenticated but not encrypted; must match
    ///   exactly on decrypt. `None` and `Some(b"")` are equivalent.
    ///
    /// # Returns
    ///
    /// A `Result` containing the sealed secret.
    pub fn encrypt(&self, plaintext: &[u8], associated_data: Option<&[u8]>) -> Result<SealedSecret> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        let payload = Payload {
            msg: plaintext,
            aad: associated_data.unwrap_or(&[]),
        };

        // aes-gcm appends the tag to the ciphertext; the sealed layout
        // wants nonce || tag || ciphertext.
        let sealed = self
            .cipher
            .encrypt(&nonce, payload)
            .map_err(|e| AppError::Encryption(format!("Encryption failed: {}", e)))?;
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(tag);
        out.extend_from_slice(ciphertext);

        Ok(SealedSecret(BASE64.encode(out)))
    }

    /// Decrypts a sealed secret.
    ///
    /// # Arguments
    ///
    /// * `sealed` - The sealed secret produced by `encrypt`.
    /// * `associated_data` - The associated data bound at encryption
    ///   time, if any.
    ///
    /// # Returns
    ///
    /// A `Result` containing the plaintext. Any tag mismatch - wrong key,
    /// wrong or missing associated data, a corrupted byte anywhere in the
    /// payload - fails closed with `AuthenticationFailed`.
    pub fn decrypt(&self, sealed: &SealedSecret, associated_data: Option<&[u8]>) -> Result<Vec<u8>> {
        let raw = BASE64
            .decode(sealed.as_str())
            .map_err(|_| AppError::InvalidInput("Sealed secret is not valid base64".to_string()))?;

        if raw.len() < MIN_SEALED_SIZE {
            return Err(AppError::InvalidInput(format!(
                "Sealed secret must be at least {} bytes, got {}",
                MIN_SEALED_SIZE,
                raw.len()
            )));
        }

        let (nonce_bytes, rest) = raw.split_at(NONCE_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);
        let nonce_arr: [u8; NONCE_SIZE] = nonce_bytes
            .try_into()
            .map_err(|_| AppError::InvalidInput("Malformed nonce".to_string()))?;
        let nonce = Nonce::from(nonce_arr);

        let mut joined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
        joined.extend_from_slice(ciphertext);
        joined.extend_from_slice(tag);

        let payload = Payload {
            msg: &joined,
            aad: associated_data.unwrap_or(&[]),
        };

        self.cipher
            .decrypt(&nonce, payload)
            .map_err(|_| AppError::AuthenticationFailed)
    }
}
