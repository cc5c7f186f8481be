//! Adapter-level configuration.
//!
//! [`BridgeConfig`] wraps the engine [`ClientConfig`] with the pieces only
//! the adapter cares about: an optional caller-supplied runtime handle and
//! the two shutdown bounds. Values can be loaded from environment variables
//! via [`BridgeConfig::from_env`].

use std::time::Duration;

use tokio::runtime::Handle;
use typed_builder::TypedBuilder;

use hyperbridge_http::ClientConfig;

/// Configuration for one [`BridgeClient`](crate::BridgeClient) instance.
#[derive(Debug, Clone, TypedBuilder)]
pub struct BridgeConfig {
    /// Engine client configuration (TLS, pool, timeouts, SDK toggles).
    #[builder(default)]
    pub client: ClientConfig,

    /// Caller-supplied runtime. When set, the adapter borrows it and never
    /// terminates it; when absent, the adapter lazily creates and owns one.
    #[builder(default, setter(strip_option))]
    pub runtime: Option<Handle>,

    /// How long `close` waits for in-flight requests to finish naturally
    /// before cancelling them.
    #[builder(default = Duration::from_secs(5))]
    pub shutdown_grace: Duration,

    /// Bounded wait for owned-runtime termination during `close`.
    #[builder(default = Duration::from_secs(10))]
    pub runtime_termination_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            runtime: None,
            shutdown_grace: Duration::from_secs(5),
            runtime_termination_timeout: Duration::from_secs(10),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables, starting from the
    /// defaults.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `HYPERBRIDGE_SHUTDOWN_GRACE_SECS` | in-flight drain grace |
    /// | `HYPERBRIDGE_RUNTIME_TERMINATION_SECS` | owned-runtime stop bound |
    ///
    /// Engine variables are read by [`ClientConfig::from_env`].
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            client: ClientConfig::from_env(),
            ..Self::default()
        };
        if let Some(secs) = env_secs("HYPERBRIDGE_SHUTDOWN_GRACE_SECS") {
            config.shutdown_grace = secs;
        }
        if let Some(secs) = env_secs("HYPERBRIDGE_RUNTIME_TERMINATION_SECS") {
            config.runtime_termination_timeout = secs;
        }
        config
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name).ok()?.parse().ok().map(Duration::from_secs)
}
