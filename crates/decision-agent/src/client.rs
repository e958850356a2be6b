use std::time::Duration;

use crate::sanitize::strip_wrappers;
use crate::types::{Decision, GenerateRequest, GenerateResponse, RawDecision};
use crate::{DecisionAgentError, Result};

// ─── ClientConfig ─────────────────────────────────────────────────────────

/// Connection and retry settings for the decision service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the inference endpoint.
    pub endpoint: String,
    /// Model identifier sent in each request.
    pub model_id: String,
    /// API key sent in the `X-API-Key` header.
    pub api_key: String,
    pub max_tokens: u32,
    /// Total attempts per call, including the first (minimum 1).
    pub max_attempts: u32,
    /// First backoff delay; doubles after each failed attempt.
    pub backoff_base: Duration,
    /// Per-request timeout. Exceeding it counts as a transient failure.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: "https://api.pioneer.ai/inference".to_string(),
            model_id: "base:Qwen/Qwen3-32B".to_string(),
            api_key: String::new(),
            max_tokens: 2000,
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

// ─── DecisionClient ───────────────────────────────────────────────────────

/// HTTP client for the generative decision service.
///
/// One [`DecisionClient`] is built at startup and shared; `reqwest::Client`
/// handles connection pooling internally.
#[derive(Debug, Clone)]
pub struct DecisionClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl DecisionClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(DecisionAgentError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(DecisionClient { http, config })
    }

    /// Ask the service for a normalized [`Decision`].
    ///
    /// Content problems (non-JSON, missing fields, fences, thinking tags)
    /// are repaired here and never surface as errors; only HTTP-level
    /// failures beyond the retry budget do.
    pub async fn decide(&self, system_prompt: &str, user_prompt: &str) -> Result<Decision> {
        let raw_text = self.generate(system_prompt, user_prompt).await?;
        let cleaned = strip_wrappers(&raw_text);

        match serde_json::from_str::<RawDecision>(&cleaned) {
            Ok(raw) => Ok(Decision::from_raw(raw)),
            Err(err) => {
                tracing::warn!(%err, "decision payload was not valid JSON; using fallback");
                Ok(Decision::fallback(&raw_text))
            }
        }
    }

    /// Low-level generate call: returns the raw text the model produced.
    ///
    /// Retries 429 responses and transport errors with exponential backoff
    /// up to `max_attempts`; any other HTTP error status is terminal on the
    /// first occurrence.
    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = GenerateRequest::new(
            &self.config.model_id,
            self.config.max_tokens,
            system_prompt,
            user_prompt,
        );
        let attempts = self.config.max_attempts.max(1);

        let mut backoff = self.config.backoff_base;
        for attempt in 1..=attempts {
            let last = attempt == attempts;

            let sent = self
                .http
                .post(&self.config.endpoint)
                .header("X-API-Key", &self.config.api_key)
                .json(&body)
                .send()
                .await;

            match sent {
                Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if last {
                        return Err(DecisionAgentError::RateLimited { attempts });
                    }
                    tracing::warn!(attempt, delay_ms = backoff.as_millis() as u64,
                        "decision service rate limited, backing off");
                }
                Ok(resp) if !resp.status().is_success() => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(DecisionAgentError::Status { status, body });
                }
                Ok(resp) => {
                    let envelope: GenerateResponse = serde_json::from_str(&resp.text().await?)?;
                    return Ok(envelope.into_text());
                }
                Err(err) => {
                    if last {
                        return Err(DecisionAgentError::Request(err));
                    }
                    tracing::warn!(%err, attempt, delay_ms = backoff.as_millis() as u64,
                        "decision service request failed, retrying");
                }
            }

            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }

        // attempts >= 1, so the loop always returns before falling through.
        unreachable!("retry loop exits via return")
    }
}
