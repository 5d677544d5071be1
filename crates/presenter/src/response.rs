//! The response value exchanged between presenters.
//!
//! A [`Response`] is plain data: an optional status code, a header multi-map and an
//! opaque body. Presenters build one and hand it back, only the [`Writer`](crate::Writer)
//! ever turns it into bytes on the wire.
//!
//! A response whose status was never set is "unset". [`DefaultResp`](crate::DefaultResp)
//! and [`ErrHandler`](crate::ErrHandler) treat an unset response as "no meaningful
//! response was produced" and fall back to another presenter.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, IntoHeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;
use mime::Mime;

/// The response a presenter produces for a request.
///
/// Responses are built with the consuming `with_*` methods and are not mutated after
/// they are returned: adapters replace a response, they never patch one.
///
/// # Example
///
/// ```
/// use http::{header, HeaderValue, StatusCode};
/// use micro_presenter::Response;
///
/// let response = Response::new()
///     .with_status(StatusCode::CREATED)
///     .with_header(header::LOCATION, HeaderValue::from_static("/items/1"))
///     .with_body("created");
///
/// assert_eq!(response.status(), Some(StatusCode::CREATED));
/// assert_eq!(&response.body()[..], b"created");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates an unset response with no headers and an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the status code, `None` when the status was never set.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns true if no status was set.
    #[inline]
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.status.is_none()
    }

    #[inline]
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Appends a header value, keeping any value already present under the same name.
    #[must_use]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the `content-type` header, replacing a previous one.
    #[must_use]
    pub fn with_content_type(mut self, content_type: &Mime) -> Self {
        // a parsed mime only holds token characters, which are always a valid header value
        if let Ok(value) = HeaderValue::from_str(content_type.as_ref()) {
            self.headers.insert(CONTENT_TYPE, value);
        }
        self
    }

    /// Sets a `text/plain; charset=utf-8` body.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_content_type(&mime::TEXT_PLAIN_UTF_8).with_body(text.into())
    }

    /// Splits the response into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (Option<StatusCode>, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// Converts into an [`http::Response`], an unset status becomes `200 OK`.
    ///
    /// This is the same convention the [`Writer`](crate::Writer) applies on the wire, and
    /// lets a presenter tree be served by any server built on the `http` crate.
    #[must_use]
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<StatusCode> for Response {
    fn from(status: StatusCode) -> Self {
        Response::new().with_status(status)
    }
}

/// A status with a body, the body is sent as is without any content type.
impl<T: Into<Bytes>> From<(StatusCode, T)> for Response {
    fn from((status, body): (StatusCode, T)) -> Self {
        Response::new().with_status(status).with_body(body)
    }
}

impl From<Response> for http::Response<Full<Bytes>> {
    fn from(response: Response) -> Self {
        response.into_http()
    }
}
