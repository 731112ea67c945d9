//! HTTP client for the remote analytics service.
//!
//! Sends one `POST {base_url}{endpoint}` per attempt with the weighted
//! holdings as JSON and returns the decoded body untouched. Shape checks
//! belong to [`crate::domain::validation`].

use serde_json::Value;

use crate::domain::config_validation::{DEFAULT_BASE_URL, DEFAULT_ENDPOINT};
use crate::domain::error::PortlensError;
use crate::domain::session::{AnalyzeRequest, GENERIC_FAILURE};
use crate::ports::analytics_port::AnalyticsPort;
use crate::ports::config_port::ConfigPort;

pub struct HttpAnalyticsAdapter {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpAnalyticsAdapter {
    pub fn new(base_url: &str, endpoint: &str) -> Result<Self, PortlensError> {
        // No request timeout: a slow analysis is still a valid one.
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| PortlensError::Transport {
                reason: e.to_string(),
            })?;
        Ok(Self {
            url: join_url(base_url, endpoint),
            client,
        })
    }

    /// Build from `[service] base_url` and `[service] endpoint`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PortlensError> {
        let base_url = config.get_string_or("service", "base_url", DEFAULT_BASE_URL);
        let endpoint = config.get_string_or("service", "endpoint", DEFAULT_ENDPOINT);
        Self::new(&base_url, &endpoint)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AnalyticsPort for HttpAnalyticsAdapter {
    fn analyze(&self, request: &AnalyzeRequest) -> Result<Value, PortlensError> {
        tracing::debug!(url = %self.url, holdings = request.holdings.len(), "posting analysis request");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|e| PortlensError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = error_detail(&body);
            tracing::debug!(status = status.as_u16(), %detail, "service returned an error status");
            return Err(PortlensError::Service {
                status: status.as_u16(),
                detail,
            });
        }

        response.json::<Value>().map_err(|e| PortlensError::Transport {
            reason: format!("response body is not JSON: {e}"),
        })
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim().trim_end_matches('/'),
        endpoint.trim().trim_start_matches('/')
    )
}

/// The `detail` string of an error body, or the generic failure message.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}
