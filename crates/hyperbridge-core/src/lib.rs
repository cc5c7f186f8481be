//! The hyperbridge adapter core.
//!
//! Glues the transport contract (`hyperbridge-model`) to the engine
//! integration (`hyperbridge-http`): a [`BridgeClient`] owns one pooled
//! engine client and one runtime context (borrowed or owned), executes
//! requests through the streaming response bridge, and coordinates ordered,
//! idempotent teardown.
//!
//! # Example
//!
//! ```no_run
//! use hyperbridge_core::{BridgeClient, BridgeConfig};
//! use hyperbridge_model::HttpRequestSpec;
//!
//! # async fn run() -> hyperbridge_model::BridgeResult<()> {
//! let client = BridgeClient::new(BridgeConfig::default())?;
//!
//! let spec = HttpRequestSpec::builder()
//!     .method("GET")
//!     .uri("http://localhost:4566/foo/my-file")
//!     .build();
//! let response = client.execute_collect(spec).await?;
//! println!("{} ({} bytes)", response.status, response.body.len());
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod runtime;

pub use client::BridgeClient;
pub use config::BridgeConfig;
pub use runtime::{RuntimeContext, RuntimeOwnership};
