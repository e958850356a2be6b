//! External collaborators behind capability traits.
//!
//! Every third-party surface (carrier tracking, commerce actions, web
//! search) is a trait with mock and real implementations chosen once at
//! startup from configuration.

pub mod commerce;
pub mod search;
pub mod tracking;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{AdapterConfig, CommerceBackend};

pub use commerce::{CommerceGateway, MockCommerce, RestCommerce};
pub use search::{MockSearch, SignalHit, SignalSearch};
pub use tracking::{MockTracking, TrackingProvider, TrackingReport, TrackingStatus};

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

/// Result of one executed commerce action. The step strings are forwarded,
/// in order, to the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub steps: Vec<String>,
}

// ---------------------------------------------------------------------------
// Startup selection
// ---------------------------------------------------------------------------

/// Build the commerce gateway named by configuration.
pub fn commerce_from_config(config: &AdapterConfig) -> Arc<dyn CommerceGateway> {
    match &config.commerce {
        CommerceBackend::Mock => Arc::new(MockCommerce::default()),
        CommerceBackend::Rest { base_url, token_env } => {
            let token = std::env::var(token_env).unwrap_or_default();
            Arc::new(RestCommerce::new(base_url.clone(), token))
        }
    }
}
