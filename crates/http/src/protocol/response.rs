//! HTTP response representation.
//!
//! [`ResponseHead`] keeps the status code and the composed status text as
//! separate fields: the text is what the status line carries after the
//! protocol token (`200 OK`, `404 Not Found`), and parsing composes it from
//! the code plus the reason remainder of the line.

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Version};

use crate::protocol::Body;

/// The head of an HTTP response: the status line and the header block.
#[derive(Debug)]
pub struct ResponseHead {
    version: Version,
    status: StatusCode,
    reason: String,
    headers: HeaderMap,
    content_length: Option<u64>,
}

/// A complete HTTP response.
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    body: Body,
}

/// Composes the status line text for a code from the canonical reason
/// phrase table, e.g. `200 OK`.
pub(crate) fn canonical_status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

impl ResponseHead {
    pub(crate) fn new(version: Version, status: StatusCode, reason: String) -> Self {
        Self { version, status, reason, headers: HeaderMap::new(), content_length: None }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The status line text, e.g. `200 OK`.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The declared body length, independent of any `Content-Length` header.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub(crate) fn set_content_length(&mut self, length: u64) {
        self.content_length = Some(length);
    }

    /// Attaches a body, turning the head into a full [`Response`].
    pub fn body(self, body: Body) -> Response {
        Response { head: self, body }
    }
}

impl Default for ResponseHead {
    fn default() -> Self {
        Self::new(Version::HTTP_11, StatusCode::OK, canonical_status_text(StatusCode::OK))
    }
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    /// The status line text, e.g. `200 OK`.
    pub fn reason(&self) -> &str {
        self.head.reason()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.head.headers_mut()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.head.content_length()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn into_parts(self) -> (ResponseHead, Body) {
        (self.head, self.body)
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}

/// Builder for [`Response`]. The status text defaults to the canonical
/// reason phrase of the status code unless set explicitly.
#[derive(Debug)]
pub struct ResponseBuilder {
    head: Result<ResponseHead, http::Error>,
    reason: Option<String>,
    body: Body,
}

impl ResponseBuilder {
    fn new() -> Self {
        Self { head: Ok(ResponseHead::default()), reason: None, body: Body::Empty }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        if let Ok(head) = &mut self.head {
            head.status = status;
        }
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        if let Ok(head) = &mut self.head {
            head.version = version;
        }
        self
    }

    /// Overrides the status line text.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn content_length(mut self, length: u64) -> Self {
        if let Ok(head) = &mut self.head {
            head.content_length = Some(length);
        }
        self
    }

    /// Appends a header, keeping any previous values for the same name.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.head = self.head.and_then(|mut head| {
            let name = <HeaderName as TryFrom<K>>::try_from(key).map_err(Into::into)?;
            let value = <HeaderValue as TryFrom<V>>::try_from(value).map_err(Into::into)?;
            head.headers.append(name, value);
            Ok(head)
        });
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Response, http::Error> {
        let mut head = self.head?;
        head.reason = match self.reason {
            Some(reason) => reason,
            None => canonical_status_text(head.status),
        };
        Ok(Response { head, body: self.body })
    }
}
