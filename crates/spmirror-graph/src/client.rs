//! Retrying HTTP transport for the Microsoft Graph API
//!
//! Every wire call in this crate goes through [`GraphClient::execute`],
//! which transparently retries the fixed set of transient status codes
//! with exponential backoff. The transport never decides fatality: after
//! the attempt budget is spent, the last response is handed back as-is
//! and the caller classifies it.

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use spmirror_core::config::RetryPolicy;
use tracing::{debug, warn};

use crate::GraphError;

/// Base URL for Microsoft Graph API v1.0
const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Status codes worth retrying: rate limiting and server-side unavailability.
const TRANSIENT_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Returns true if the status is in the transient set.
fn is_transient(status: StatusCode) -> bool {
    TRANSIENT_STATUSES.contains(&status)
}

// ============================================================================
// GraphClient
// ============================================================================

/// HTTP client for Microsoft Graph API calls
///
/// Wraps `reqwest::Client` with bearer authentication, base URL
/// construction, and the per-run [`RetryPolicy`].
#[derive(Debug)]
pub struct GraphClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// OAuth2 access token, acquired once per process
    access_token: String,
    /// Transient-failure retry policy
    retry: RetryPolicy,
}

impl GraphClient {
    /// Creates a new GraphClient with the given access token and retry policy
    pub fn new(access_token: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            base_url: GRAPH_BASE_URL.to_string(),
            access_token: access_token.into(),
            retry,
        }
    }

    /// Creates a new GraphClient with a custom base URL (useful for testing)
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
            retry,
        }
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization header.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request builder for an absolute URL
    ///
    /// Upload session URLs are absolute and must not have the base URL
    /// prepended.
    pub fn request_url(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Executes one logical request, retrying transient failures.
    ///
    /// If the response status is in {429, 500, 502, 503, 504} and attempts
    /// remain, sleeps `backoff_base ^ attempt` seconds (attempt starting at
    /// 1) and re-sends a clone of the request. Any other status returns
    /// immediately. After `max_attempts` sends, the last response is
    /// returned without error.
    ///
    /// The request body must be buffered (`Vec<u8>`/`String`) so the
    /// builder is clonable; this crate never streams request bodies.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let mut attempt: u32 = 1;
        loop {
            let request = builder
                .try_clone()
                .context("request body is not clonable; buffer it before sending")?;

            let response = request.send().await.context("failed to send request")?;
            let status = response.status();

            if !is_transient(status) || attempt >= self.retry.max_attempts {
                if attempt > 1 {
                    debug!(attempt, %status, "request settled after retries");
                }
                return Ok(response);
            }

            let delay = self.retry.delay(attempt);
            warn!(
                %status,
                attempt,
                delay_secs = delay.as_secs_f64(),
                "transient status, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

// ============================================================================
// Status error helper
// ============================================================================

/// Turns a fatal (non-2xx) response into an error carrying the operation
/// context, status code, and response body.
pub(crate) async fn status_error(context: impl Into<String>, response: Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());

    anyhow::Error::new(GraphError::Status {
        context: context.into(),
        status,
        body,
    })
}

// ============================================================================
// Tests
// ============================================================================
