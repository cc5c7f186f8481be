//! Outbound request body types supporting empty, buffered, and streaming modes.
//!
//! This module provides [`EngineRequestBody`], the HTTP request body type handed
//! to the engine client. It supports three modes:
//!
//! - **Empty**: for requests with no body content (GET, HEAD, DELETE, ...).
//! - **Buffered**: for payloads already resident in memory.
//! - **Streaming**: for arbitrarily large uploads; the caller's chunk
//!   producer is polled frame by frame as the engine writes, never buffered
//!   eagerly.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use http_body::Frame;
use http_body_util::Full;

use hyperbridge_model::{BodyDataStream, BoxError, RequestBody};

/// Request body handed to the engine client.
///
/// Implements [`http_body::Body`] so it can be used directly with
/// hyper requests.
#[derive(Default)]
pub enum EngineRequestBody {
    /// No body bytes at all.
    #[default]
    Empty,
    /// A single chunk already in memory.
    Buffered(Full<Bytes>),
    /// Lazy chunk producer, polled on engine demand.
    Streaming {
        /// The caller's chunk producer.
        stream: BodyDataStream,
        /// Total byte count when known, reported through `size_hint`.
        length: Option<u64>,
    },
}

impl EngineRequestBody {
    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create a streaming body from a chunk producer.
    #[must_use]
    pub fn from_stream<S>(stream: S, length: Option<u64>) -> Self
    where
        S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
    {
        Self::Streaming {
            stream: Box::pin(stream),
            length,
        }
    }
}

impl From<RequestBody> for EngineRequestBody {
    fn from(body: RequestBody) -> Self {
        match body {
            RequestBody::Empty => Self::Empty,
            RequestBody::Buffered(data) => Self::Buffered(Full::new(data)),
            RequestBody::Streaming { stream, length } => Self::Streaming { stream, length },
        }
    }
}

impl http_body::Body for EngineRequestBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Empty => Poll::Ready(None),
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Streaming { stream, .. } => match stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
                Poll::Ready(Some(Err(source))) => Poll::Ready(Some(Err(source))),
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Buffered(full) => full.is_end_stream(),
            Self::Streaming { .. } => false,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Empty => http_body::SizeHint::with_exact(0),
            Self::Buffered(full) => full.size_hint(),
            Self::Streaming { length, .. } => match length {
                Some(len) => http_body::SizeHint::with_exact(*len),
                None => http_body::SizeHint::default(),
            },
        }
    }
}

impl std::fmt::Debug for EngineRequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Buffered(full) => f.debug_tuple("Buffered").field(full).finish(),
            Self::Streaming { length, .. } => {
                f.debug_struct("Streaming").field("length", length).finish()
            }
        }
    }
}
