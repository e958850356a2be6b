use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

// ---------------------------------------------------------------------------
// MonitorConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_monitor_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_monitor_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    60
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_monitor_enabled(),
            interval_secs: default_interval_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// DecisionServiceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionServiceConfig {
    #[serde(default = "default_decision_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Name of the environment variable holding the API key. Resolved once
    /// at startup, never sniffed later.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_decision_endpoint() -> String {
    "https://api.pioneer.ai/inference".to_string()
}

fn default_model_id() -> String {
    "base:Qwen/Qwen3-32B".to_string()
}

fn default_api_key_env() -> String {
    "DECISION_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    60
}

impl DecisionServiceConfig {
    /// Build the client configuration, resolving the API key from the
    /// configured environment variable.
    pub fn client_config(&self) -> decision_agent::ClientConfig {
        decision_agent::ClientConfig {
            endpoint: self.endpoint.clone(),
            model_id: self.model_id.clone(),
            api_key: std::env::var(&self.api_key_env).unwrap_or_default(),
            max_tokens: self.max_tokens,
            max_attempts: self.max_attempts,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Default for DecisionServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_decision_endpoint(),
            model_id: default_model_id(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// PolicyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_vip_multiplier")]
    pub vip_multiplier: f64,
    #[serde(default = "default_auto_approve_threshold")]
    pub auto_approve_refund_threshold: f64,
    #[serde(default = "default_brand_voice")]
    pub brand_voice: String,
}

fn default_vip_multiplier() -> f64 {
    2.0
}

fn default_auto_approve_threshold() -> f64 {
    150.0
}

fn default_brand_voice() -> String {
    "warm, direct, never robotic. Use the customer's first name. \
     Never say 'I apologize for the inconvenience'."
        .to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            vip_multiplier: default_vip_multiplier(),
            auto_approve_refund_threshold: default_auto_approve_threshold(),
            brand_voice: default_brand_voice(),
        }
    }
}

// ---------------------------------------------------------------------------
// AdapterConfig
// ---------------------------------------------------------------------------

/// Which commerce backend executes credits/refunds/claims. Selected once at
/// startup — implementations are capability objects, not env probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommerceBackend {
    Mock,
    Rest {
        base_url: String,
        #[serde(default = "default_commerce_token_env")]
        token_env: String,
    },
}

fn default_commerce_token_env() -> String {
    "COMMERCE_ADMIN_TOKEN".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default = "default_commerce_backend")]
    pub commerce: CommerceBackend,
    /// Brand name used in carrier claims and customer copy.
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
}

fn default_commerce_backend() -> CommerceBackend {
    CommerceBackend::Mock
}

fn default_brand_name() -> String {
    "Redress Sneaker Co.".to_string()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            commerce: default_commerce_backend(),
            brand_name: default_brand_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// RedressConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedressConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub decision: DecisionServiceConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub adapters: AdapterConfig,
}

impl RedressConfig {
    /// Load from a YAML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_table() {
        let config = RedressConfig::default();
        assert_eq!(config.monitor.interval_secs, 60);
        assert_eq!(config.policy.vip_multiplier, 2.0);
        assert_eq!(config.policy.auto_approve_refund_threshold, 150.0);
        assert_eq!(config.decision.max_attempts, 3);
        assert_eq!(config.adapters.commerce, CommerceBackend::Mock);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: RedressConfig = serde_yaml::from_str(
            "monitor:\n  interval_secs: 5\nadapters:\n  commerce:\n    type: rest\n    base_url: https://shop.example.com\n",
        )
        .unwrap();
        assert_eq!(config.monitor.interval_secs, 5);
        assert!(config.monitor.enabled);
        assert_eq!(config.server.port, 3001);
        match config.adapters.commerce {
            CommerceBackend::Rest { ref base_url, ref token_env } => {
                assert_eq!(base_url, "https://shop.example.com");
                assert_eq!(token_env, "COMMERCE_ADMIN_TOKEN");
            }
            CommerceBackend::Mock => panic!("expected rest backend"),
        }
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RedressConfig::load(&dir.path().join("redress.yaml")).unwrap();
        assert_eq!(config.server.port, 3001);
    }
}
