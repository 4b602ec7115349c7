// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors → user-friendly responses
// - Provides consistent error format for UI
// - Never exposes internal implementation details
// - Logs errors for debugging

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Resource not found (404)
    NotFound,

    /// Invalid input/validation error (400)
    Validation,

    /// Domain invariant violation (422)
    DomainError,

    /// Missing credential or invalid setting (500)
    Configuration,

    /// Database/persistence error (500)
    Database,

    /// Upstream API error (502)
    ExternalService,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::new(ErrorType::NotFound, "Resource not found", None),

            AppError::Domain(domain_error) => Self::new(
                ErrorType::DomainError,
                "Domain validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Configuration(message) => {
                log::error!("Configuration error: {}", message);
                Self::new(ErrorType::Configuration, "Configuration error", Some(message))
            }

            AppError::Upstream {
                status,
                endpoint,
                message,
            } => {
                log::warn!("Upstream error on {}: {}", endpoint, message);
                let details = match status {
                    Some(code) => format!("{} returned {}", endpoint, code),
                    None => format!("{} unreachable: {}", endpoint, message),
                };
                Self::new(ErrorType::ExternalService, "External service error", Some(details))
            }

            AppError::Serialization(serde_error) => {
                log::warn!("Serialization error: {:?}", serde_error);
                Self::new(
                    ErrorType::ExternalService,
                    "Unexpected response from external service",
                    None,
                )
            }

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::Internal,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    /// Create validation error
    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }

    /// Serialized form handed back across the command boundary
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "Internal error".to_string())
    }
}

/// Helper trait to convert Results to ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| ErrorResponse::from_app_error(e).to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_not_found_error() {
        let error = ErrorResponse::from_app_error(AppError::NotFound);
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Resource not found");
    }

    #[test]
    fn test_validation_error() {
        let error = ErrorResponse::validation("Invalid input".to_string());
        assert_eq!(error.error_type, ErrorType::Validation);
        assert!(!error.success);
    }

    #[test]
    fn test_upstream_error() {
        let error = ErrorResponse::from_app_error(AppError::upstream(
            Some(503),
            "/anime/1/full",
            "503 Service Unavailable",
        ));
        assert_eq!(error.error_type, ErrorType::ExternalService);
        assert_eq!(error.details.as_deref(), Some("/anime/1/full returned 503"));
    }

    #[test]
    fn test_configuration_error() {
        let error =
            ErrorResponse::from_app_error(AppError::Configuration("MAL_CLIENT_ID is not set".into()));
        assert_eq!(error.error_type, ErrorType::Configuration);
    }

    #[test]
    fn test_domain_error_serializes() {
        let result: Result<(), AppError> = Err(AppError::Domain(DomainError::InvariantViolation(
            "bad context".to_string(),
        )));

        let json = result.to_error_response().unwrap_err();
        let parsed: ErrorResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.error_type, ErrorType::DomainError);
        assert!(parsed.details.unwrap().contains("bad context"));
    }
}
