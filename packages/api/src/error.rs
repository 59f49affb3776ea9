//! # Error taxonomy
//!
//! Every failure an operation can report is an [`AppError`]. Each variant belongs
//! to exactly one [`ErrorKind`], which is what the web layer uses to decide
//! between a redirect with a flash message and a generic failure page.

use store::StorageError;

/// Broad classes of failure, as seen by the person using the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials or a missing/expired session.
    Authentication,
    /// The record exists but belongs to someone else.
    Authorization,
    NotFound,
    /// Malformed input, including an already-taken username.
    Validation,
    /// The database or object store failed.
    Upstream,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("username is already taken")]
    DuplicateUser,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("please log in to continue")]
    Unauthenticated,
    #[error("you do not have access to this {0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidCredentials | AppError::Unauthenticated => ErrorKind::Authentication,
            AppError::Forbidden(_) => ErrorKind::Authorization,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::DuplicateUser | AppError::Validation(_) => ErrorKind::Validation,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                ErrorKind::Upstream
            }
        }
    }

    /// Whether the message is safe and useful to show to the user as-is.
    pub fn is_user_facing(&self) -> bool {
        self.kind() != ErrorKind::Upstream
    }

    /// The message shown in a flash or form error, capitalised.
    pub fn user_message(&self) -> String {
        if !self.is_user_facing() {
            return "Something went wrong, please try again later".to_string();
        }
        let message = self.to_string();
        let mut chars = message.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => message,
        }
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(AppError::DuplicateUser.kind(), ErrorKind::Validation);
        assert_eq!(AppError::InvalidCredentials.kind(), ErrorKind::Authentication);
        assert_eq!(AppError::Forbidden("note").kind(), ErrorKind::Authorization);
        assert_eq!(AppError::NotFound("file").kind(), ErrorKind::NotFound);
        assert_eq!(
            AppError::Storage(StorageError::Unavailable).kind(),
            ErrorKind::Upstream
        );
        assert!(!AppError::Internal("boom".into()).is_user_facing());
    }

    #[test]
    fn test_messages() {
        assert_eq!(AppError::NotFound("note").to_string(), "note not found");
        assert_eq!(
            AppError::Forbidden("file").to_string(),
            "you do not have access to this file"
        );
        assert_eq!(
            AppError::Forbidden("file").user_message(),
            "You do not have access to this file"
        );
        assert_eq!(
            AppError::Storage(StorageError::Unavailable).user_message(),
            "Something went wrong, please try again later"
        );
    }
}
