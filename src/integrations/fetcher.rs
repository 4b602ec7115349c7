// src/integrations/fetcher.rs
//
// Rate-limited, retrying request scheduler for one upstream API.
//
// - At most one request in flight; callers queue first-in-first-out
// - A floor interval is enforced before every attempt, retries included
// - 429 / 5xx / network failures are retried with a fixed delay
// - Any other non-2xx status fails immediately
//
// Scheduling state is owned by the instance. Share one fetcher per
// upstream through `Arc` instead of creating several.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::{sleep, Instant};

use crate::config::FetchPolicy;
use crate::error::{AppError, AppResult};
use crate::integrations::http::HttpTransport;

pub struct RateLimitedFetcher {
    /// Short upstream name used in log lines
    label: String,
    base_url: String,
    headers: HeaderMap,
    policy: FetchPolicy,
    transport: Arc<dyn HttpTransport>,
    /// Dispatch time of the previous attempt. The lock doubles as the FIFO queue.
    last_dispatch: Mutex<Option<Instant>>,
    /// Pending + in-flight requests
    depth: watch::Sender<usize>,
}

/// Counts a caller in the queue for as long as it is alive
struct QueueTicket<'a> {
    depth: &'a watch::Sender<usize>,
}

impl<'a> QueueTicket<'a> {
    fn enter(depth: &'a watch::Sender<usize>) -> Self {
        depth.send_modify(|d| *d += 1);
        Self { depth }
    }
}

impl Drop for QueueTicket<'_> {
    fn drop(&mut self) {
        self.depth.send_modify(|d| *d = d.saturating_sub(1));
    }
}

/// Rate limits and server faults are worth another attempt
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

impl RateLimitedFetcher {
    pub fn new(
        label: impl Into<String>,
        base_url: impl Into<String>,
        policy: FetchPolicy,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let (depth, _) = watch::channel(0usize);
        Self {
            label: label.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
            policy,
            transport,
            last_dispatch: Mutex::new(None),
            depth,
        }
    }

    /// Add a header sent with every request (credentials, accept, ...)
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Number of callers waiting or in flight
    pub fn queue_depth(&self) -> usize {
        *self.depth.borrow()
    }

    /// Resolves once no request is pending or in flight
    pub async fn drain(&self) {
        let mut rx = self.depth.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|depth| *depth == 0).await;
    }

    /// Fetch an endpoint and return the parsed JSON body
    pub async fn fetch(&self, endpoint: &str) -> AppResult<serde_json::Value> {
        self.fetch_json(endpoint).await
    }

    /// Fetch an endpoint and decode the body into `T`
    pub async fn fetch_json<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let body = self.fetch_text(endpoint).await?;
        serde_json::from_str(&body).map_err(|e| {
            log::warn!("[{}] Undecodable payload from {}: {}", self.label, endpoint, e);
            AppError::Serialization(e)
        })
    }

    /// Absolute URL of `endpoint`
    pub fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }

    async fn fetch_text(&self, endpoint: &str) -> AppResult<String> {
        let _ticket = QueueTicket::enter(&self.depth);
        let mut last_dispatch = self.last_dispatch.lock().await;

        let url = self.resolve(endpoint);
        let mut last_error: Option<AppError> = None;

        for attempt in 0..=self.policy.retries {
            if attempt > 0 {
                sleep(self.policy.retry_delay).await;
            }

            if let Some(previous) = *last_dispatch {
                let elapsed = previous.elapsed();
                if elapsed < self.policy.min_interval {
                    let wait = self.policy.min_interval - elapsed;
                    log::trace!("[{}] Rate limiting: sleeping {}ms", self.label, wait.as_millis());
                    sleep(wait).await;
                }
            }
            *last_dispatch = Some(Instant::now());

            if attempt == 0 {
                log::debug!("[{}] Requesting {}", self.label, endpoint);
            } else {
                log::debug!("[{}] Requesting {} (attempt {})", self.label, endpoint, attempt + 1);
            }

            match self.transport.get(&url, &self.headers).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    let error = AppError::upstream(
                        Some(response.status),
                        endpoint,
                        format!("{} {}", response.status, response.reason),
                    );
                    if !is_retryable_status(response.status) {
                        return Err(error);
                    }
                    if attempt < self.policy.retries {
                        log::warn!(
                            "[{}] {} returned {}, retrying in {}ms",
                            self.label,
                            endpoint,
                            response.status,
                            self.policy.retry_delay.as_millis()
                        );
                    }
                    last_error = Some(error);
                }
                Err(transport_error) => {
                    if attempt < self.policy.retries {
                        log::warn!(
                            "[{}] {} failed ({}), retrying in {}ms",
                            self.label,
                            endpoint,
                            transport_error,
                            self.policy.retry_delay.as_millis()
                        );
                    }
                    last_error = Some(AppError::upstream(None, endpoint, transport_error.0));
                }
            }
        }

        let error = last_error.unwrap_or_else(|| {
            AppError::upstream(None, endpoint, "Request failed after all retries")
        });
        log::error!("[{}] Giving up on {}: {}", self.label, endpoint, error);
        Err(error)
    }
}
