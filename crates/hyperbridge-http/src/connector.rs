//! Engine client factory.
//!
//! Builds the pooled hyper client the adapter issues every request through.
//! Connection pooling, TLS, and DNS are the engine's own capabilities; this
//! module only configures them from a validated [`ClientConfig`]. One client
//! is built per adapter instance and shared, via cheap clones, by all of its
//! in-flight requests.

use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use hyperbridge_model::ConfigurationError;

use crate::body::EngineRequestBody;
use crate::config::{ClientConfig, TlsTrust};

/// TLS-capable connector over the engine's TCP connector.
pub type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// The pooled engine client handle. `Clone` is cheap and shares the pool.
pub type EngineClient = Client<HttpsConnector, EngineRequestBody>;

/// Build the pooled engine client for one adapter instance.
///
/// Fails with [`ConfigurationError`] before any network activity when the
/// configuration is self-contradictory or the trust roots cannot be loaded.
pub fn build_client(config: &ClientConfig) -> Result<EngineClient, ConfigurationError> {
    config.validate()?;

    let connector = build_tls_connector(config)?;
    let client = Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(config.max_connections)
        .pool_idle_timeout(config.idle_timeout)
        .build(connector);

    Ok(client)
}

fn build_tls_connector(config: &ClientConfig) -> Result<HttpsConnector, ConfigurationError> {
    let mut http = HttpConnector::new();
    // Plaintext endpoints (local object stores, test servers) are allowed;
    // the scheme decides per request.
    http.enforce_http(false);
    http.set_connect_timeout(Some(config.connect_timeout));

    let builder = match &config.tls_trust {
        TlsTrust::Native => hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|source| ConfigurationError::TrustStoreUnavailable(source.to_string()))?,
        TlsTrust::WebPki => hyper_rustls::HttpsConnectorBuilder::new().with_webpki_roots(),
        TlsTrust::CustomRoots(pem) => {
            let tls = tls_config_from_pem(pem)?;
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(tls)
        }
    };

    Ok(builder
        .https_or_http()
        .enable_all_versions()
        .wrap_connector(http))
}

fn tls_config_from_pem(pem: &[u8]) -> Result<rustls::ClientConfig, ConfigurationError> {
    if pem.is_empty() {
        return Err(ConfigurationError::EmptyTrustRoots);
    }

    let mut roots = rustls::RootCertStore::empty();
    let mut reader = std::io::Cursor::new(pem);
    let mut added = 0usize;
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert =
            cert.map_err(|source| ConfigurationError::InvalidTrustRoots(source.to_string()))?;
        roots
            .add(cert)
            .map_err(|source| ConfigurationError::InvalidTrustRoots(source.to_string()))?;
        added += 1;
    }
    if added == 0 {
        return Err(ConfigurationError::EmptyTrustRoots);
    }

    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}
