//! Engine integration for the hyperbridge HTTP adapter.
//!
//! This crate owns everything that touches hyper directly:
//!
//! - [`translate`]: the pure mapping from an abstract
//!   [`HttpRequestSpec`](hyperbridge_model::HttpRequestSpec) to an engine
//!   request.
//! - [`EngineRequestBody`]: lazy outbound bodies, from empty to arbitrarily
//!   large streams.
//! - [`build_client`]: the factory for the pooled, TLS-capable engine
//!   client, configured from a [`ClientConfig`].
//! - [`ResponseBridge`]: the per-request state machine that relays the
//!   engine's streaming response into the push-based handler contract with
//!   1:1 demand propagation.

pub mod body;
pub mod bridge;
pub mod config;
pub mod connector;
pub mod translate;

pub use body::EngineRequestBody;
pub use bridge::{BridgeState, ResponseBridge};
pub use config::{AddressingStyle, ClientConfig, TlsTrust};
pub use connector::{EngineClient, HttpsConnector, build_client};
pub use translate::translate;
