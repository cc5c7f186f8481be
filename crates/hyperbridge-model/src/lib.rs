//! Transport contract types for the hyperbridge HTTP adapter.
//!
//! This crate defines the boundary between an SDK-style asynchronous HTTP
//! client contract and the engine-facing adapter crates: the abstract
//! request shape ([`HttpRequestSpec`]), the streaming response types
//! ([`HttpResponseEnvelope`], [`ResponseBodyStream`]), the push-based
//! consumer contract ([`ResponseHandler`], [`CompletionSignal`]), and the
//! error taxonomy ([`BridgeError`]).

mod error;
mod handler;
mod request;
mod response;

pub use error::{
    BoxError, BridgeError, BridgeResult, ConfigurationError, TranslationError, TransportFailure,
};
pub use handler::{CompletionSignal, EnvelopeFuture, EnvelopeHandler, ResponseHandler};
pub use request::{BodyDataStream, HttpRequestSpec, HttpRequestSpecBuilder, RequestBody};
pub use response::{
    BODY_CHANNEL_CAPACITY, CollectedResponse, HttpResponseEnvelope, ResponseBodyStream,
};
