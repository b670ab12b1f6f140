//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// User-Agent sent upstream when the caller did not provide one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.98 Safari/537.36";

/// Methods advertised in `Access-Control-Allow-Methods` by the preflight profile.
pub const DEFAULT_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Referer injected by the preflight profile.
pub const LEGACY_REFERER: &str = "https://www.ovh.com/manager/dedicated/index.html";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Handler behavior (CORS headers, User-Agent, Referer).
    pub relay: RelayOptions,

    /// Timeout configuration for upstream calls.
    pub timeouts: TimeoutConfig,

    /// Upstream client settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address. A leading `:` (e.g. ":8080") binds all interfaces.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: ":8080".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Bind address in a form `TcpListener::bind` accepts.
    pub fn socket_address(&self) -> String {
        if self.bind_address.starts_with(':') {
            format!("0.0.0.0{}", self.bind_address)
        } else {
            self.bind_address.clone()
        }
    }
}

/// Named preset of relay options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Only `Access-Control-Allow-Origin`, User-Agent defaulted, no Referer.
    #[default]
    Passthrough,
    /// Full CORS headers plus the fixed Referer.
    Preflight,
}

/// Per-request relay behavior.
///
/// `full_cors_headers` and `fixed_referer` fall back to the profile when unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayOptions {
    pub profile: Profile,

    /// Add `Access-Control-Allow-Methods` and echo `Access-Control-Request-Headers`.
    pub full_cors_headers: Option<bool>,

    /// Value of `Access-Control-Allow-Methods` when full CORS headers are on.
    pub allow_methods: String,

    /// User-Agent used when the inbound request has none. Empty disables.
    pub default_user_agent: String,

    /// Referer set on every outbound request.
    pub fixed_referer: Option<String>,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            full_cors_headers: None,
            allow_methods: DEFAULT_ALLOW_METHODS.to_string(),
            default_user_agent: DEFAULT_USER_AGENT.to_string(),
            fixed_referer: None,
        }
    }
}

impl RelayOptions {
    /// Options matching the preflight profile.
    pub fn preflight() -> Self {
        Self {
            profile: Profile::Preflight,
            ..Self::default()
        }
    }

    /// Whether the preflight CORS headers are emitted.
    pub fn full_cors_headers(&self) -> bool {
        self.full_cors_headers
            .unwrap_or(self.profile == Profile::Preflight)
    }

    /// Referer to inject, if any.
    pub fn referer(&self) -> Option<&str> {
        match (&self.fixed_referer, self.profile) {
            (Some(referer), _) if referer.is_empty() => None,
            (Some(referer), _) => Some(referer),
            (None, Profile::Preflight) => Some(LEGACY_REFERER),
            (None, Profile::Passthrough) => None,
        }
    }

    /// User-Agent fallback, if any.
    pub fn default_user_agent(&self) -> Option<&str> {
        if self.default_user_agent.is_empty() {
            None
        } else {
            Some(&self.default_user_agent)
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for the upstream exchange, body included, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// Upstream client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub use_env_proxy: bool,

    /// Redirects followed before giving up. 0 returns redirects to the caller.
    pub max_redirects: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            use_env_proxy: true,
            max_redirects: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log every requested target URL at info level.
    pub verbose: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            verbose: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
