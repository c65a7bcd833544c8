use std::fmt;
use thiserror::Error;

/// The base error type shared by the Slotwise crates.
///
/// Feature crates keep their own error enums for domain outcomes and convert
/// into this one where a generic HTTP mapping is enough.
#[derive(Error, Debug)]
pub enum SlotwiseError {
    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Feature switched off or not configured on this deployment
    #[error("Service unavailable: {0}")]
    UnavailableError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SlotwiseError {
    fn status_code(&self) -> u16 {
        match self {
            SlotwiseError::AuthError(_) => 401,
            SlotwiseError::UnavailableError(_) => 503,
            SlotwiseError::InternalError(_) => 500,
        }
    }
}

/// Adds context to foreign errors while converting them into [`SlotwiseError`].
pub trait Context<T, E> {
    fn context<C>(self, context: C) -> Result<T, SlotwiseError>
    where
        C: fmt::Display + Send + Sync + 'static;

    fn with_context<C, F>(self, f: F) -> Result<T, SlotwiseError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, SlotwiseError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| SlotwiseError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, SlotwiseError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| SlotwiseError::InternalError(format!("{}: {}", f(), error)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SlotwiseError::AuthError("admin key".into()).status_code(), 401);
        assert_eq!(
            SlotwiseError::UnavailableError("admin".into()).status_code(),
            503
        );
        assert_eq!(SlotwiseError::InternalError("bind".into()).status_code(), 500);
    }

    #[test]
    fn test_context_wraps_message() {
        let io: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing.json",
        ));
        let err = io.context("reading key").unwrap_err();
        assert!(err.to_string().contains("reading key: missing.json"));
    }
}
