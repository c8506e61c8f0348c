use crate::users::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password reset token is invalid or has expired")]
    InvalidResetToken,
    #[error("user record has no stored password hash")]
    MissingPasswordHash,
    #[error("password hash error: {0}")]
    PasswordHash(String),
    #[error("expiry is out of range")]
    ExpiryOutOfRange,
    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T, E = UserError> = std::result::Result<T, E>;
