//! Engine client configuration.
//!
//! [`ClientConfig`] carries everything the factory needs to build the pooled
//! engine client: trust roots, pool sizing, and timeouts, plus the two
//! SDK-facing toggles (addressing style, checksum validation) the transport
//! records for the layer above. Values can be loaded from environment
//! variables via [`ClientConfig::from_env`].

use std::time::Duration;

use typed_builder::TypedBuilder;

use hyperbridge_model::ConfigurationError;

/// Where the TLS trust roots come from.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum TlsTrust {
    /// The platform certificate store.
    #[default]
    Native,
    /// The bundled webpki root set; hermetic, no platform dependency.
    WebPki,
    /// Caller-supplied PEM bundle, e.g. for a private CA in tests.
    CustomRoots(Vec<u8>),
}

impl std::fmt::Debug for TlsTrust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => f.write_str("Native"),
            Self::WebPki => f.write_str("WebPki"),
            Self::CustomRoots(pem) => f.debug_tuple("CustomRoots").field(&pem.len()).finish(),
        }
    }
}

/// Bucket addressing convention the SDK layer should use.
///
/// Recorded and queryable configuration; the transport itself never
/// rewrites URIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressingStyle {
    /// Bucket in the path: `http://host/bucket/key`.
    Path,
    /// Bucket in the hostname: `http://bucket.host/key`.
    #[default]
    VirtualHost,
}

/// Configuration for the pooled engine client.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ClientConfig {
    /// TLS trust roots.
    #[builder(default)]
    pub tls_trust: TlsTrust,

    /// Addressing convention recorded for the SDK layer.
    #[builder(default)]
    pub addressing_style: AddressingStyle,

    /// Whether the response bridge verifies body integrity against the
    /// declared `content-length`.
    #[builder(default = true)]
    pub checksum_validation: bool,

    /// Maximum idle connections kept per host in the engine pool.
    #[builder(default = 50)]
    pub max_connections: usize,

    /// How long an idle pooled connection is kept before being dropped.
    #[builder(default = Duration::from_secs(30))]
    pub idle_timeout: Duration,

    /// TCP connect timeout.
    #[builder(default = Duration::from_secs(10))]
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tls_trust: TlsTrust::Native,
            addressing_style: AddressingStyle::VirtualHost,
            checksum_validation: true,
            max_connections: 50,
            idle_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, starting from the
    /// defaults.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `HYPERBRIDGE_MAX_CONNECTIONS` | pool size per host |
    /// | `HYPERBRIDGE_IDLE_TIMEOUT_SECS` | idle-connection timeout |
    /// | `HYPERBRIDGE_CONNECT_TIMEOUT_SECS` | TCP connect timeout |
    /// | `HYPERBRIDGE_PATH_STYLE` | `1`/`true` selects path addressing |
    /// | `HYPERBRIDGE_CHECKSUM_VALIDATION` | `0`/`false` disables it |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_parse("HYPERBRIDGE_MAX_CONNECTIONS") {
            config.max_connections = v;
        }
        if let Some(v) = env_parse("HYPERBRIDGE_IDLE_TIMEOUT_SECS") {
            config.idle_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_parse("HYPERBRIDGE_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = Duration::from_secs(v);
        }
        if env_flag("HYPERBRIDGE_PATH_STYLE") == Some(true) {
            config.addressing_style = AddressingStyle::Path;
        }
        if let Some(v) = env_flag("HYPERBRIDGE_CHECKSUM_VALIDATION") {
            config.checksum_validation = v;
        }

        config
    }

    /// Reject self-contradictory settings before any network activity.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_connections == 0 {
            return Err(ConfigurationError::InvalidPoolSize);
        }
        if self.idle_timeout.is_zero() {
            return Err(ConfigurationError::InvalidIdleTimeout);
        }
        if let TlsTrust::CustomRoots(pem) = &self.tls_trust {
            if pem.is_empty() {
                return Err(ConfigurationError::EmptyTrustRoots);
            }
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.parse().ok()
}

fn env_flag(name: &str) -> Option<bool> {
    let v = std::env::var(name).ok()?;
    Some(v == "1" || v.eq_ignore_ascii_case("true"))
}
