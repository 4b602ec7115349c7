// src/integrations/http.rs
//
// HTTP transport seam. The fetcher talks to this trait so scheduling and
// retry behaviour can be exercised without a network.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use std::time::Duration;
use thiserror::Error;

use crate::error::{AppError, AppResult};

/// Default timeout for one outbound request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("animegraph/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed HTTP exchange (any status code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to obtain any response (DNS, connect, timeout, reset)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new() -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<HttpResponse, TransportError> {
        let response = self
            .http_client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_is_std_error() {
        let error = TransportError("connection reset".to_string());
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(error.clone());

        assert_eq!(boxed.to_string(), "connection reset");
        assert!(std::error::Error::source(&error).is_none());
        assert_eq!(format!("{}", error), "connection reset");
    }

    #[test]
    fn test_success_range() {
        let response = |status: u16| HttpResponse {
            status,
            reason: String::new(),
            body: String::new(),
        };

        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(301).is_success());
        assert!(!response(429).is_success());
    }
}
