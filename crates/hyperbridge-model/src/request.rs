//! Abstract HTTP request shape handed to the adapter by the SDK layer.
//!
//! [`HttpRequestSpec`] deliberately carries *unvalidated* strings for the
//! method, URI, and headers: the SDK side builds requests from its own
//! object model, and validation is the translator's job so that a malformed
//! request surfaces as a [`TranslationError`](crate::TranslationError)
//! before any network I/O, never as a mid-flight failure.
//!
//! Bodies are producers of byte chunks, not buffers: a [`RequestBody`] is
//! either empty, a single buffered chunk, or a lazy stream that is polled
//! on demand while the engine writes the request. Arbitrarily large uploads
//! never need to reside wholly in memory.

use std::fmt;

use bytes::Bytes;
use futures::Stream;
use futures::stream::BoxStream;

use crate::error::BoxError;

/// Lazy producer of request-body chunks.
pub type BodyDataStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// Request body payload, from empty to arbitrarily large.
#[derive(Default)]
pub enum RequestBody {
    /// No body bytes at all.
    #[default]
    Empty,
    /// A single chunk already resident in memory.
    Buffered(Bytes),
    /// A lazy chunk producer, with the total length when known up front.
    Streaming {
        /// The chunk producer; polled only as the engine writes.
        stream: BodyDataStream,
        /// Total byte count when the producer knows it, used to set
        /// `content-length` instead of chunked encoding.
        length: Option<u64>,
    },
}

impl RequestBody {
    /// An empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// A buffered body from bytes already in memory.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(data.into())
    }

    /// A streaming body from a chunk producer.
    ///
    /// Pass the total length when the producer knows it so the engine can
    /// emit `content-length`; pass `None` for chunked transfer encoding.
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

    /// The body length when it is known without consuming the producer.
    #[must_use]
    pub fn known_length(&self) -> Option<u64> {
        match self {
            Self::Empty => Some(0),
            Self::Buffered(data) => Some(data.len() as u64),
            Self::Streaming { length, .. } => *length,
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Buffered(data) => f.debug_tuple("Buffered").field(&data.len()).finish(),
            Self::Streaming { length, .. } => {
                f.debug_struct("Streaming").field("length", length).finish()
            }
        }
    }
}

/// One HTTP request as issued by the SDK layer.
///
/// Header names are case-insensitive; duplicates are preserved in insertion
/// order, and the translator forwards them in exactly that order. The spec
/// is immutable once built and consumed by a single `execute` call.
#[derive(Debug)]
pub struct HttpRequestSpec {
    method: String,
    uri: String,
    headers: Vec<(String, String)>,
    body: RequestBody,
}

impl HttpRequestSpec {
    /// Start building a request spec.
    #[must_use]
    pub fn builder() -> HttpRequestSpecBuilder {
        HttpRequestSpecBuilder::default()
    }

    /// The HTTP method as supplied by the caller.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The target URI as supplied by the caller.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// All header pairs in insertion order, duplicates included.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Values for one header, matched case-insensitively, in insertion order.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The request body.
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Decompose the spec for translation.
    #[must_use]
    pub fn into_parts(self) -> (String, String, Vec<(String, String)>, RequestBody) {
        (self.method, self.uri, self.headers, self.body)
    }
}

/// Builder for [`HttpRequestSpec`].
#[derive(Debug, Default)]
pub struct HttpRequestSpecBuilder {
    method: Option<String>,
    uri: Option<String>,
    headers: Vec<(String, String)>,
    body: RequestBody,
}

impl HttpRequestSpecBuilder {
    /// Set the HTTP method. Defaults to `GET`.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the absolute target URI.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Append one header pair. May be called repeatedly for the same name;
    /// duplicates are preserved in call order.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body. Defaults to [`RequestBody::Empty`].
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Finish the spec. Structural validation happens at translation time.
    #[must_use]
    pub fn build(self) -> HttpRequestSpec {
        HttpRequestSpec {
            method: self.method.unwrap_or_else(|| "GET".to_owned()),
            uri: self.uri.unwrap_or_default(),
            headers: self.headers,
            body: self.body,
        }
    }
}
