//! The push-based response contract the SDK layer programs against.
//!
//! A caller hands [`execute`](https://docs.rs/hyperbridge-core) a
//! [`ResponseHandler`] and receives a [`CompletionSignal`]. The handler is
//! driven by the bridge task in a fixed order: `on_headers` first, then
//! `on_stream` with the body, then nothing — or `on_error` once if the
//! request fails before or during the body. After a terminal outcome the
//! handler is never called again.
//!
//! [`EnvelopeHandler`] adapts the push contract back into a future for
//! callers that prefer `await`-style consumption.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{HeaderMap, StatusCode};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::{BridgeError, BridgeResult};
use crate::response::{HttpResponseEnvelope, ResponseBodyStream};

/// Push-based consumer of one HTTP response.
///
/// Implementations are driven by the adapter's bridge task:
///
/// 1. `on_headers(status, headers)` — exactly once on success, before any
///    body byte.
/// 2. `on_stream(body)` — exactly once on success, immediately after the
///    headers; the handler owns the stream and consumes it at its own pace.
/// 3. `on_error(error)` — at most once, on transport or protocol failure at
///    any point. Not invoked for cooperative cancellation.
pub trait ResponseHandler: Send + 'static {
    /// Response status and headers arrived.
    fn on_headers(&mut self, status: StatusCode, headers: &HeaderMap);

    /// The response body is ready to be consumed.
    fn on_stream(&mut self, body: ResponseBodyStream);

    /// The request failed. A partially delivered body stream is terminated
    /// with the same error.
    fn on_error(&mut self, error: &BridgeError);
}

/// Future-like handle for one in-flight request.
///
/// Resolves exactly once: `Ok(())` when the response was fully delivered,
/// or the error that terminated the request. [`cancel`](Self::cancel)
/// requests cooperative cancellation: delivery stops after the in-flight
/// chunk and the signal resolves with [`BridgeError::Cancelled`].
#[derive(Debug)]
pub struct CompletionSignal {
    done: oneshot::Receiver<BridgeResult<()>>,
    cancel: CancellationToken,
}

impl CompletionSignal {
    /// Pair a completion receiver with the request's cancellation token.
    #[must_use]
    pub fn new(done: oneshot::Receiver<BridgeResult<()>>, cancel: CancellationToken) -> Self {
        Self { done, cancel }
    }

    /// Request cooperative cancellation of the in-flight request.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Future for CompletionSignal {
    type Output = BridgeResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.done).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // The bridge task died without resolving (e.g. a panicking
            // handler). Surface it instead of pending forever.
            Poll::Ready(Err(_)) => Poll::Ready(Err(BridgeError::transport(
                "request task terminated without resolving",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Adapter from the push contract to a single envelope future.
///
/// `on_headers` is buffered until `on_stream` arrives, at which point the
/// paired [`EnvelopeFuture`] resolves with an [`HttpResponseEnvelope`]. An
/// early `on_error` resolves the future with that error instead. Errors
/// after the envelope was handed over travel through the body stream.
#[derive(Debug)]
pub struct EnvelopeHandler {
    head: Option<(StatusCode, HeaderMap)>,
    tx: Option<oneshot::Sender<BridgeResult<HttpResponseEnvelope>>>,
}

impl EnvelopeHandler {
    /// Create the handler and the future it resolves.
    #[must_use]
    pub fn new() -> (Self, EnvelopeFuture) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                head: None,
                tx: Some(tx),
            },
            EnvelopeFuture { rx },
        )
    }
}

impl ResponseHandler for EnvelopeHandler {
    fn on_headers(&mut self, status: StatusCode, headers: &HeaderMap) {
        self.head = Some((status, headers.clone()));
    }

    fn on_stream(&mut self, body: ResponseBodyStream) {
        let Some((status, headers)) = self.head.take() else {
            return;
        };
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Ok(HttpResponseEnvelope {
                status,
                headers,
                body,
            }));
        }
    }

    fn on_error(&mut self, error: &BridgeError) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(error.clone()));
        }
    }
}

/// Future resolving to the response envelope of one request.
#[derive(Debug)]
pub struct EnvelopeFuture {
    rx: oneshot::Receiver<BridgeResult<HttpResponseEnvelope>>,
}

impl Future for EnvelopeFuture {
    type Output = BridgeResult<HttpResponseEnvelope>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Cancellation resolves the completion signal, not the envelope;
            // a dropped handler shows up here as a cancelled request.
            Poll::Ready(Err(_)) => Poll::Ready(Err(BridgeError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}
