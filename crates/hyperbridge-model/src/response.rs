//! Response envelope and body stream delivered back to the SDK layer.
//!
//! The body arrives as a [`ResponseBodyStream`]: a pull-based `Stream`
//! backed by a bounded channel. Polling the stream *is* the demand signal —
//! the bridge will not pull the next chunk from the engine until the
//! previous one has been taken here, so a slow consumer slows the network
//! read instead of growing a buffer.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::Stream;
use http::{HeaderMap, StatusCode};
use tokio::sync::mpsc;

use crate::error::{BridgeError, BridgeResult};

/// Number of chunks the bridge may push ahead of consumption.
///
/// Capacity 1 gives strict 1:1 demand propagation between the engine and
/// the consumer.
pub const BODY_CHANNEL_CAPACITY: usize = 1;

/// Pull-based response body: each item is one chunk in production order,
/// terminated by the channel closing (success) or an error item (failure or
/// cancellation). Chunk buffers transfer ownership to the consumer.
pub struct ResponseBodyStream {
    rx: mpsc::Receiver<BridgeResult<Bytes>>,
}

impl ResponseBodyStream {
    /// Wrap the receiving half of a bridge body channel.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<BridgeResult<Bytes>>) -> Self {
        Self { rx }
    }

    /// Create a connected `(sender, stream)` pair with the bridge's bounded
    /// capacity.
    #[must_use]
    pub fn channel() -> (mpsc::Sender<BridgeResult<Bytes>>, Self) {
        let (tx, rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
        (tx, Self::new(rx))
    }

    /// Drain the stream into one contiguous buffer.
    ///
    /// Convenience for consumers that want the whole payload; large bodies
    /// should be consumed chunk by chunk instead.
    pub async fn collect(mut self) -> BridgeResult<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.rx.recv().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl Stream for ResponseBodyStream {
    type Item = BridgeResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl fmt::Debug for ResponseBodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBodyStream").finish_non_exhaustive()
    }
}

/// One HTTP response as delivered by the adapter: status and headers plus
/// the still-streaming body. Consumed exactly once.
#[derive(Debug)]
pub struct HttpResponseEnvelope {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers, duplicates preserved in wire order.
    pub headers: HeaderMap,
    /// The body stream; see [`ResponseBodyStream`].
    pub body: ResponseBodyStream,
}

impl HttpResponseEnvelope {
    /// Collect the body, yielding a fully buffered response.
    pub async fn collect(self) -> BridgeResult<CollectedResponse> {
        let body = self.body.collect().await?;
        Ok(CollectedResponse {
            status: self.status,
            headers: self.headers,
            body,
        })
    }
}

/// A fully buffered response, for callers that do not need streaming.
#[derive(Debug, Clone)]
pub struct CollectedResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers, duplicates preserved in wire order.
    pub headers: HeaderMap,
    /// The complete body.
    pub body: Bytes,
}
