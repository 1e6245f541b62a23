//! ML scoring service client
//!
//! Thin passthrough to the external scoring platform. Model runs are slow;
//! the request timeout is generous (300 s by default) and a timeout is
//! reported distinctly from an upstream failure because the remote run may
//! still complete after we stop waiting.

use std::time::Duration;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::config::ScoringConfig;

#[derive(Error, Debug)]
pub enum ScoringError {
    /// The request hit the client-side timeout; the remote run may still
    /// complete.
    #[error("Scoring request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The upstream service answered with a non-success status
    #[error("Scoring service returned status {status}")]
    Upstream { status: u16 },

    /// Transport-level failure (DNS, connect, TLS, ...)
    #[error("Scoring request failed: {0}")]
    Request(reqwest::Error),
}

/// Recommendation decision forwarded to the scoring service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationAction {
    Accept,
    Reject,
}

impl RecommendationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationAction::Accept => "accept",
            RecommendationAction::Reject => "reject",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "accept" => Some(RecommendationAction::Accept),
            "reject" => Some(RecommendationAction::Reject),
            _ => None,
        }
    }
}

/// Client for the external scoring service
#[derive(Clone)]
pub struct ScoringService {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl ScoringService {
    pub fn new(config: &ScoringConfig) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Trigger a model run for a product and return the upstream JSON body
    pub async fn run_model(&self, product_id: &str) -> Result<JsonValue, ScoringError> {
        let url = format!("{}/run-model/{}", self.base_url, product_id);
        tracing::debug!(%url, "Dispatching scoring run");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Scoring service returned error status");
            return Err(ScoringError::Upstream {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| self.classify(e))
    }

    /// Report a recommendation decision. Failures are logged, not surfaced;
    /// callers dispatch this fire-and-forget.
    pub async fn notify_recommendation(&self, id: &str, action: RecommendationAction) {
        let url = format!(
            "{}/recommendations/{}/{}",
            self.base_url,
            id,
            action.as_str()
        );

        match self.client.post(&url).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    %id,
                    action = action.as_str(),
                    status = response.status().as_u16(),
                    "Recommendation notify rejected upstream"
                );
            }
            Ok(_) => {
                tracing::debug!(%id, action = action.as_str(), "Recommendation notify delivered");
            }
            Err(e) => {
                tracing::warn!(%id, action = action.as_str(), error = %e, "Recommendation notify failed");
            }
        }
    }

    fn classify(&self, e: reqwest::Error) -> ScoringError {
        if e.is_timeout() {
            ScoringError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            ScoringError::Request(e)
        }
    }
}
