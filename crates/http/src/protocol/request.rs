//! HTTP request representation.
//!
//! [`RequestHead`] carries everything up to the blank line: method, target,
//! version, host, headers and the declared content length. [`Request`] is a
//! head with a [`Body`] attached. The host and the declared content length
//! are fields of their own, distinct from the `Host` and `Content-Length`
//! headers: parsing fills both, and the write side treats the fields as a
//! fallback when the headers are absent.

use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};

use crate::protocol::Body;

/// The head of an HTTP request: the request line and the header block.
#[derive(Debug, Default)]
pub struct RequestHead {
    method: Method,
    uri: Uri,
    version: Version,
    host: Option<String>,
    headers: HeaderMap,
    content_length: Option<u64>,
}

/// A complete HTTP request.
#[derive(Debug, Default)]
pub struct Request {
    head: RequestHead,
    body: Body,
}

impl RequestHead {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The path component of the request target.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The query string of the request target, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
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

    pub(crate) fn set_host(&mut self, host: impl Into<String>) {
        self.host = Some(host.into());
    }

    pub(crate) fn set_content_length(&mut self, length: u64) {
        self.content_length = Some(length);
    }

    pub(crate) fn from_parts(method: Method, uri: Uri, version: Version) -> Self {
        Self { method, uri, version, ..Default::default() }
    }

    /// Attaches a body, turning the head into a full [`Request`].
    pub fn body(self, body: Body) -> Request {
        Request { head: self, body }
    }
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn uri(&self) -> &Uri {
        self.head.uri()
    }

    pub fn path(&self) -> &str {
        self.head.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.head.query()
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn host(&self) -> Option<&str> {
        self.head.host()
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

    pub fn into_parts(self) -> (RequestHead, Body) {
        (self.head, self.body)
    }

    pub fn into_body(self) -> Body {
        self.body
    }
}

/// Builder for [`Request`], mirroring the `http` crate's builder shape:
/// conversion errors are remembered and surfaced by [`build`](Self::build).
#[derive(Debug)]
pub struct RequestBuilder {
    head: Result<RequestHead, http::Error>,
    body: Body,
}

impl RequestBuilder {
    fn new() -> Self {
        Self { head: Ok(RequestHead::default()), body: Body::Empty }
    }

    pub fn method(mut self, method: Method) -> Self {
        if let Ok(head) = &mut self.head {
            head.method = method;
        }
        self
    }

    pub fn uri<T>(mut self, uri: T) -> Self
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.head = self.head.and_then(|mut head| {
            head.uri = TryFrom::try_from(uri).map_err(Into::into)?;
            Ok(head)
        });
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        if let Ok(head) = &mut self.head {
            head.version = version;
        }
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        if let Ok(head) = &mut self.head {
            head.host = Some(host.into());
        }
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

    pub fn build(self) -> Result<Request, http::Error> {
        Ok(Request { head: self.head?, body: self.body })
    }
}
