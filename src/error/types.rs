// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Upstream HTTP or network failure, possibly after retries.
    /// `status` is `None` when no response was received at all.
    #[error("Upstream error on {endpoint} (status {status:?}): {message}")]
    Upstream {
        status: Option<u16>,
        endpoint: String,
        message: String,
    },

    /// Setup defect (missing credential, invalid setting). Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Persistence error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

/// Coarse classification used by the batch driver and the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Upstream,
    Configuration,
    Persistence,
    Domain,
    Internal,
}

impl AppError {
    pub fn upstream(status: Option<u16>, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status,
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Upstream { .. } | AppError::Serialization(_) => ErrorCategory::Upstream,
            AppError::Configuration(_) => ErrorCategory::Configuration,
            AppError::Database(_) | AppError::Pool(_) => ErrorCategory::Persistence,
            AppError::Domain(_) | AppError::NotFound => ErrorCategory::Domain,
            AppError::Io(_) | AppError::Other(_) => ErrorCategory::Internal,
        }
    }

    /// HTTP status carried by an upstream failure, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Other(format!("Date parse error: {}", err))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Other(format!("Background task failed: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            AppError::upstream(Some(503), "/anime/1/full", "Service Unavailable").category(),
            ErrorCategory::Upstream
        );
        assert_eq!(
            AppError::Configuration("MAL_CLIENT_ID is not set".to_string()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            AppError::Database(rusqlite::Error::QueryReturnedNoRows).category(),
            ErrorCategory::Persistence
        );
    }

    #[test]
    fn test_upstream_display_names_endpoint() {
        let err = AppError::upstream(Some(404), "/anime/9/full", "Not Found");
        let text = err.to_string();
        assert!(text.contains("/anime/9/full"));
        assert!(text.contains("404"));
        assert_eq!(err.upstream_status(), Some(404));
    }
}
