use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input (bad base64, truncated sealed payload).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An AEAD tag mismatch. Decryption fails closed; no partial
    /// plaintext is ever returned alongside this error.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The email or username is already taken.
    #[error("Account already exists")]
    DuplicateIdentity,

    /// Unknown user or wrong password. The two cases are deliberately
    /// indistinguishable to the caller.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The presented refresh token does not resolve to a session.
    #[error("Invalid token")]
    InvalidToken,

    /// The underlying store failed or reported zero rows affected.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// An encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;
