//! Global configuration types for Peerline.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! HTTP listener, chat limits, and observability.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Peerline service.
///
/// Loaded from `~/.peerline/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Limits and background behaviour of the chat core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum message length in characters, counted after trimming.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Upper bound for the `wait` parameter of long-poll fetches.
    #[serde(default = "default_long_poll_max_secs")]
    pub long_poll_max_secs: u64,

    /// Interval of the `lastMessageAt` reconciliation sweep. `0` disables it.
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
}

fn default_max_message_chars() -> usize {
    4000
}

fn default_long_poll_max_secs() -> u64 {
    25
}

fn default_reconcile_interval_secs() -> u64 {
    300
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            long_poll_max_secs: default_long_poll_max_secs(),
            reconcile_interval_secs: default_reconcile_interval_secs(),
        }
    }
}

/// Tracing export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Bridge tracing spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}
