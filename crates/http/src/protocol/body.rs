//! Message body representation.
//!
//! A body is either absent, fully buffered in memory, or a lazy stream of
//! chunks still attached to the connection it arrives on. The server
//! buffers request bodies before invoking the handler; the client hands
//! back response bodies as streams and leaves draining to the caller.

use std::fmt;
use std::mem;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use crate::protocol::ParseError;

type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, ParseError>> + Send>>;

/// An HTTP message body.
pub enum Body {
    /// No body
    Empty,
    /// A fully buffered body
    Full(Bytes),
    /// A body read lazily from a live connection
    Stream(BodyStream),
}

/// A lazy body: chunks are pulled from the underlying connection on demand.
///
/// Dropping the stream without draining it closes the connection early,
/// which is allowed since connections carry a single exchange.
pub struct BodyStream {
    inner: ChunkStream,
}

impl Body {
    pub fn empty() -> Self {
        Self::Empty
    }

    pub fn full(data: impl Into<Bytes>) -> Self {
        Self::Full(data.into())
    }

    pub(crate) fn stream(inner: impl Stream<Item = Result<Bytes, ParseError>> + Send + 'static) -> Self {
        Self::Stream(BodyStream { inner: Box::pin(inner) })
    }

    /// Returns true if the body is known to hold no bytes.
    ///
    /// A not-yet-drained stream reports false: its length is unknown until
    /// it is collected.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Full(bytes) => bytes.is_empty(),
            Body::Stream(_) => false,
        }
    }

    /// Returns the buffered bytes, or `None` when absent or not yet drained.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Full(bytes) => Some(bytes),
            Body::Empty | Body::Stream(_) => None,
        }
    }

    /// Drains the body into a single buffer, leaving `Body::Empty` behind.
    ///
    /// For streamed bodies this reads from the connection until the framed
    /// end of the body; a peer that closes before the declared length has
    /// arrived surfaces as [`ParseError::TruncatedBody`].
    pub async fn collect(&mut self) -> Result<Bytes, ParseError> {
        match mem::replace(self, Body::Empty) {
            Body::Empty => Ok(Bytes::new()),
            Body::Full(bytes) => Ok(bytes),
            Body::Stream(stream) => stream.collect().await,
        }
    }
}

impl BodyStream {
    /// Reads the remaining chunks into one buffer.
    pub async fn collect(mut self) -> Result<Bytes, ParseError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.inner.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl Stream for BodyStream {
    type Item = Result<Bytes, ParseError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> std::task::Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::Empty
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Full(bytes)
    }
}

impl From<&'static str> for Body {
    fn from(data: &'static str) -> Self {
        Self::Full(Bytes::from_static(data.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(data: String) -> Self {
        Self::Full(Bytes::from(data))
    }
}

impl From<Vec<u8>> for Body {
    fn from(data: Vec<u8>) -> Self {
        Self::Full(Bytes::from(data))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Full(bytes) => f.debug_tuple("Body::Full").field(&bytes.len()).finish(),
            Body::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyStream")
    }
}
