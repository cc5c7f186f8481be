//! The streaming response bridge between the engine and the SDK handler.
//!
//! One [`ResponseBridge`] drives one request from issue to terminal state:
//!
//! ```text
//! AwaitingHeaders ──headers──> StreamingBody ──end-of-body──> Completed
//!       │                          │
//!       ├──engine error──> Failed <┘ (engine error / integrity mismatch)
//!       └──cancel────────> Cancelled <── cancel / dropped consumer
//! ```
//!
//! The bridge task is the single writer of the state and of the completion
//! signal: exactly one of the terminal states is reached, the handler sees
//! `on_headers` before any body byte, and no callback ever fires after a
//! terminal state.
//!
//! Backpressure is demand-driven through a bounded channel: a slot is
//! reserved downstream *before* the next frame is pulled from the engine,
//! so the engine is never more than one chunk ahead of consumption.

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode};
use http_body::Body;
use http_body_util::BodyExt;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use hyperbridge_model::{
    BoxError, BridgeError, BridgeResult, ResponseBodyStream, ResponseHandler,
};

/// Protocol state of one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Engine call issued, nothing delivered to the handler yet.
    AwaitingHeaders,
    /// Headers delivered; body chunks are being relayed on demand.
    StreamingBody,
    /// Terminal: full response delivered, completion resolved `Ok`.
    Completed,
    /// Terminal: transport or protocol failure, completion resolved `Err`.
    Failed,
    /// Terminal: cooperative cancellation acknowledged.
    Cancelled,
}

impl BridgeState {
    /// Whether no further transitions are allowed out of this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingHeaders => "awaiting-headers",
            Self::StreamingBody => "streaming-body",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Drives one engine response into the handler contract.
pub struct ResponseBridge {
    handler: Box<dyn ResponseHandler>,
    done: Option<oneshot::Sender<BridgeResult<()>>>,
    cancel: CancellationToken,
    method: Method,
    verify_length: bool,
    request_id: u64,
    state: BridgeState,
}

impl ResponseBridge {
    /// Create a bridge for one accepted request.
    #[must_use]
    pub fn new(
        handler: Box<dyn ResponseHandler>,
        done: oneshot::Sender<BridgeResult<()>>,
        cancel: CancellationToken,
        method: Method,
        verify_length: bool,
        request_id: u64,
    ) -> Self {
        Self {
            handler,
            done: Some(done),
            cancel,
            method,
            verify_length,
            request_id,
            state: BridgeState::AwaitingHeaders,
        }
    }

    /// Drive the request to a terminal state.
    ///
    /// `response_future` is the engine's asynchronous execution of the
    /// already-issued request; the body type is generic so the bridge can be
    /// exercised without a network.
    pub async fn run<F, B, E>(mut self, response_future: F)
    where
        F: Future<Output = Result<Response<B>, E>>,
        B: Body<Data = Bytes> + Unpin,
        B::Error: Into<BoxError>,
        E: Into<BoxError>,
    {
        let cancel = self.cancel.clone();
        let response = tokio::select! {
            () = cancel.cancelled() => {
                self.finish_cancelled(None);
                return;
            }
            response = response_future => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(source) => {
                self.finish_failed(BridgeError::transport(source.into()), None)
                    .await;
                return;
            }
        };

        let (parts, body) = response.into_parts();
        debug!(
            request_id = self.request_id,
            status = parts.status.as_u16(),
            "response headers received"
        );

        // Ordering invariant: headers reach the handler before any body byte.
        self.handler.on_headers(parts.status, &parts.headers);
        let (tx, stream) = ResponseBodyStream::channel();
        self.handler.on_stream(stream);
        self.transition(BridgeState::StreamingBody);

        let expected = if self.verify_length {
            declared_body_length(&self.method, parts.status, &parts.headers)
        } else {
            None
        };
        self.pump_body(body, tx, expected).await;
    }

    /// Relay body frames one at a time, demand first.
    async fn pump_body<B>(
        &mut self,
        mut body: B,
        tx: mpsc::Sender<BridgeResult<Bytes>>,
        expected: Option<u64>,
    ) where
        B: Body<Data = Bytes> + Unpin,
        B::Error: Into<BoxError>,
    {
        let cancel = self.cancel.clone();
        let mut delivered: u64 = 0;
        loop {
            // Reserve downstream capacity before touching the engine: this
            // is the demand signal that keeps the relay 1:1.
            let permit = tokio::select! {
                () = cancel.cancelled() => {
                    self.finish_cancelled(Some(&tx));
                    return;
                }
                permit = tx.reserve() => match permit {
                    Ok(permit) => permit,
                    // The consumer dropped the body stream mid-flight.
                    Err(_) => {
                        self.finish_cancelled(None);
                        return;
                    }
                },
            };

            let frame = tokio::select! {
                () = cancel.cancelled() => {
                    drop(permit);
                    self.finish_cancelled(Some(&tx));
                    return;
                }
                frame = body.frame() => frame,
            };

            match frame {
                None => {
                    drop(permit);
                    if let Some(expected) = expected {
                        if delivered != expected {
                            let error = BridgeError::Protocol(format!(
                                "response body was {delivered} bytes but content-length declared {expected}"
                            ));
                            self.finish_failed(error, Some(tx)).await;
                            return;
                        }
                    }
                    self.finish_completed();
                    return;
                }
                Some(Ok(frame)) => {
                    // Trailer frames carry no body bytes; skip them.
                    if let Ok(data) = frame.into_data() {
                        delivered += data.len() as u64;
                        permit.send(Ok(data));
                    }
                }
                Some(Err(source)) => {
                    drop(permit);
                    self.finish_failed(BridgeError::transport(source.into()), Some(tx))
                        .await;
                    return;
                }
            }
        }
    }

    fn transition(&mut self, next: BridgeState) {
        trace!(
            request_id = self.request_id,
            from = %self.state,
            to = %next,
            "bridge state transition"
        );
        debug_assert!(
            !self.state.is_terminal(),
            "no transitions out of a terminal state"
        );
        self.state = next;
    }

    /// Resolve the completion signal. Single-use by construction; later
    /// calls are no-ops so a terminal state can never resolve twice.
    fn resolve(&mut self, outcome: BridgeResult<()>) {
        if let Some(done) = self.done.take() {
            let _ = done.send(outcome);
        }
    }

    fn finish_completed(&mut self) {
        self.transition(BridgeState::Completed);
        debug!(request_id = self.request_id, "response fully delivered");
        self.resolve(Ok(()));
    }

    async fn finish_failed(
        &mut self,
        error: BridgeError,
        stream: Option<mpsc::Sender<BridgeResult<Bytes>>>,
    ) {
        self.transition(BridgeState::Failed);
        warn!(request_id = self.request_id, error = %error, "request failed");
        self.resolve(Err(error.clone()));
        self.handler.on_error(&error);
        if let Some(tx) = stream {
            // A partially delivered body must end with an error signal,
            // never a silent truncation. The consumer may already be gone
            // or cancelled, so don't wait on it unconditionally.
            tokio::select! {
                () = self.cancel.cancelled() => {}
                _ = tx.send(Err(error)) => {}
            }
        }
    }

    fn finish_cancelled(&mut self, stream: Option<&mpsc::Sender<BridgeResult<Bytes>>>) {
        self.transition(BridgeState::Cancelled);
        debug!(request_id = self.request_id, "request cancelled");
        self.resolve(Err(BridgeError::Cancelled));
        // No handler callbacks after cancellation is acknowledged; the body
        // stream gets a best-effort terminal item.
        if let Some(tx) = stream {
            let _ = tx.try_send(Err(BridgeError::Cancelled));
        }
    }
}

impl fmt::Debug for ResponseBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBridge")
            .field("request_id", &self.request_id)
            .field("state", &self.state)
            .field("method", &self.method)
            .field("verify_length", &self.verify_length)
            .finish_non_exhaustive()
    }
}

/// The body length the response declares, when the response can carry a
/// body at all (not HEAD, 1xx, 204, 304).
fn declared_body_length(method: &Method, status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
    {
        return None;
    }
    headers
        .get(http::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
