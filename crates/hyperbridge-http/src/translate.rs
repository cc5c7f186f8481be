//! Translation from the abstract request spec to the engine's representation.
//!
//! [`translate`] is a pure, synchronous mapping with no side effects:
//! method and URI are copied verbatim after validation, header pairs are
//! appended in insertion order with duplicates preserved, and the body is
//! wrapped as a lazy [`EngineRequestBody`] without buffering. Failures here
//! are caller bugs ([`TranslationError`]), surfaced before any network I/O.

use http::header::{CONTENT_LENGTH, HeaderName, HeaderValue};
use http::{Method, Request, Uri};

use hyperbridge_model::{HttpRequestSpec, RequestBody, TranslationError};

use crate::body::EngineRequestBody;

/// Translate one request spec into an engine request.
///
/// Deterministic: equal specs produce equal engine requests. A known body
/// length is reflected in `content-length` when the caller did not set one;
/// unknown-length streams are left to the engine's chunked encoding.
pub fn translate(spec: HttpRequestSpec) -> Result<Request<EngineRequestBody>, TranslationError> {
    let (method, uri, headers, body) = spec.into_parts();

    let method = parse_method(&method)?;
    let uri = parse_uri(&uri)?;

    let known_length = body.known_length();
    let has_payload = !matches!(body, RequestBody::Empty);

    let mut request = Request::new(EngineRequestBody::from(body));
    *request.method_mut() = method;
    *request.uri_mut() = uri;

    let mut caller_set_length = false;
    for (name, value) in &headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TranslationError::InvalidHeaderName(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| TranslationError::InvalidHeaderValue(name.clone()))?;
        if header_name == CONTENT_LENGTH {
            caller_set_length = true;
        }
        request.headers_mut().append(header_name, header_value);
    }

    if !caller_set_length && has_payload {
        if let Some(length) = known_length {
            request
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
    }

    Ok(request)
}

/// Methods the adapter forwards. Anything else is a structural error from
/// the caller, not a runtime condition.
fn parse_method(raw: &str) -> Result<Method, TranslationError> {
    match raw.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "HEAD" => Ok(Method::HEAD),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        "OPTIONS" => Ok(Method::OPTIONS),
        _ => Err(TranslationError::UnsupportedMethod(raw.to_owned())),
    }
}

/// Client requests must be absolute so the engine knows where to connect.
fn parse_uri(raw: &str) -> Result<Uri, TranslationError> {
    let uri: Uri = raw.parse().map_err(|source: http::uri::InvalidUri| {
        TranslationError::InvalidUri {
            uri: raw.to_owned(),
            reason: source.to_string(),
        }
    })?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(TranslationError::RelativeUri(raw.to_owned()));
    }
    Ok(uri)
}
