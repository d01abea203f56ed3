use thiserror::Error;

/// Application-level error type
///
/// Request handlers map these onto HTTP status codes; the `run()` boundary
/// boxes them like any other error.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password hashing failure while provisioning an account
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Activity log database failure
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem failure (backup copy, database directory)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
