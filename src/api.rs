//! HTTP client for the stock insight service.
//!
//! Each call is one JSON request and one JSON response; nothing is retried.

use crate::config::ServerConfig;
use crate::error::ClientError;
use crate::models::{
    ClearHistoryResponse, HistoryResponse, PortfolioAnalysisResponse, PortfolioRequest,
    QueryResponse, StockQueryRequest,
};
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use url::Url;

const USER_AGENT: &str = concat!("stocklens/", env!("CARGO_PKG_VERSION"));

/// Longest server error text carried into a message.
const MAX_DETAIL_LEN: usize = 200;

/// The two analysis calls a flow can make.
pub trait Backend {
    async fn query_stock(&self, request: &StockQueryRequest) -> Result<QueryResponse, ClientError>;

    async fn analyze_portfolio(
        &self,
        request: &PortfolioRequest,
    ) -> Result<PortfolioAnalysisResponse, ClientError>;
}

/// Client for the insight service endpoints.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    timeout: Duration,
    query_url: Url,
    portfolio_url: Url,
    history_url: Url,
}

impl AnalysisClient {
    /// Create a client from server settings.
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let timeout = Duration::from_secs(server.timeout);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base = Url::parse(&server.base_url)
            .with_context(|| format!("Invalid server URL: {}", server.base_url))?;
        let endpoint = |path: &str| {
            base.join(path)
                .with_context(|| format!("Invalid endpoint path: {}", path))
        };

        Ok(Self {
            client,
            timeout,
            query_url: endpoint(&server.query_path)?,
            portfolio_url: endpoint(&server.portfolio_path)?,
            history_url: endpoint(&server.history_path)?,
        })
    }

    /// Fetch the queries the service has answered so far.
    pub async fn history(&self) -> Result<HistoryResponse, ClientError> {
        self.send(self.client.get(self.history_url.clone())).await
    }

    /// Ask the service to forget its query history.
    pub async fn clear_history(&self) -> Result<ClearHistoryResponse, ClientError> {
        self.send(self.client.delete(self.history_url.clone())).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        log::debug!(
            "{} answered {} in {}",
            response.url(),
            status,
            humantime::format_duration(round_to_millis(started.elapsed()))
        );

        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                detail: error_detail(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            ClientError::Transport(error)
        }
    }
}

impl Backend for AnalysisClient {
    async fn query_stock(&self, request: &StockQueryRequest) -> Result<QueryResponse, ClientError> {
        log::info!("Querying {} for {:?}", self.query_url, request.user_query);
        self.send(self.client.post(self.query_url.clone()).json(request))
            .await
    }

    async fn analyze_portfolio(
        &self,
        request: &PortfolioRequest,
    ) -> Result<PortfolioAnalysisResponse, ClientError> {
        log::info!(
            "Requesting analysis of {} holdings ({} risk) from {}",
            request.portfolio.len(),
            request.risk,
            self.portfolio_url
        );
        self.send(self.client.post(self.portfolio_url.clone()).json(request))
            .await
    }
}

/// Pull a readable message out of an error response body.
///
/// FastAPI-style `{"detail": ...}` bodies give their detail; anything else
/// falls back to the body text, then to the status reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned())
        .map(|detail| match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }

    truncate(&detail, MAX_DETAIL_LEN)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

fn round_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
