use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecisionAgentError {
    #[error("decision service API key is not configured")]
    MissingApiKey,

    #[error("request to decision service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("decision service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decision service rate limited after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    #[error("malformed decision service envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

impl DecisionAgentError {
    /// `true` for failures that are worth another attempt with backoff:
    /// rate limiting and transport-level request errors. Non-429 HTTP
    /// statuses are terminal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DecisionAgentError::Request(_) | DecisionAgentError::RateLimited { .. }
        )
    }
}
