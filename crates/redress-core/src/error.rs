use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RedressError {
    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decision(#[from] decision_agent::DecisionAgentError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RedressError>;
