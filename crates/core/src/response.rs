//! HTTP error body.
//!
//! What an HTTP error middleware renders for a classified error. Built from
//! the kind, the mapped status and the localized message only: the driver
//! error text never reaches this type.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// `error` value for every repository failure
pub const REPOSITORY_ERROR: &str = "RepositoryError";

/// JSON body `{error, code, status_code, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub status_code: u16,
    pub message: String,
}

impl ErrorResponse {
    /// Render `err` for the request's `locale`
    pub fn from_domain(err: &DomainError, locale: &str) -> Self {
        Self {
            error: REPOSITORY_ERROR.to_string(),
            code: err.kind().as_str().to_string(),
            status_code: err.http_status(),
            message: err.message_for(locale).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, thiserror::Error)]
    #[error("duplicate key value violates unique constraint \"users_email_key\"")]
    struct RawDriverError;

    #[test]
    fn test_render_localized_body() {
        let err = DomainError::new(ErrorKind::UniqueViolation).with_cause(RawDriverError);

        let body = ErrorResponse::from_domain(&err, "en");
        assert_eq!(body.status_code, 409);
        assert_eq!(body.code, "unique_violation");
        assert_eq!(body.message, "Unique constraint violated");

        let body = ErrorResponse::from_domain(&err, "kk");
        assert_eq!(body.message, "Нарушение уникального ограничения");
    }

    #[test]
    fn test_body_never_contains_driver_text() {
        let err = DomainError::new(ErrorKind::UniqueViolation).with_cause(RawDriverError);
        let json = serde_json::to_string(&ErrorResponse::from_domain(&err, "en")).unwrap();

        assert!(!json.contains("users_email_key"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "RepositoryError");
        assert_eq!(value["status_code"], 409);
    }
}
