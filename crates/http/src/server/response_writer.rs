//! The accumulator a handler builds its response in.

use bytes::BytesMut;
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode, Version};
use tracing::trace;

use crate::protocol::{canonical_status_text, Body, Response, ResponseHead};

/// Per-invocation response accumulator.
///
/// Starts as a `200 OK` with no headers and no body. Headers and the status
/// can be edited until the first body write, which freezes the status;
/// [`to_response`](Self::to_response) finalizes without consuming the
/// writer, so the connection driver can call it after the handler returns.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    body_written: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: BytesMut::new(), body_written: false }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replaces every value stored for the header.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Appends a value, keeping any already stored for the header.
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Sets the status code. Ignored once body bytes have been written.
    pub fn set_status(&mut self, status: StatusCode) {
        if self.body_written {
            trace!(current = %self.status, ignored = %status, "status is frozen after the first body write");
            return;
        }
        self.status = status;
    }

    /// Appends to the body and freezes the status. Always accepts the whole
    /// slice.
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.body_written = true;
        self.body.extend_from_slice(data);
        data.len()
    }

    /// Finalizes the accumulated state into a [`Response`].
    ///
    /// `Content-Length` is set to the exact body byte count, zero included,
    /// the status text comes from the canonical reason table and the
    /// protocol is pinned to HTTP/1.1. The writer is untouched, so repeated
    /// calls return equivalent responses.
    pub fn to_response(&self) -> Response {
        let mut headers = self.headers.clone();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.body.len() as u64));

        let mut head = ResponseHead::new(Version::HTTP_11, self.status, canonical_status_text(self.status));
        *head.headers_mut() = headers;
        head.set_content_length(self.body.len() as u64);

        let body = if self.body.is_empty() { Body::Empty } else { Body::Full(self.body.clone().freeze()) };
        head.body(body)
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}
