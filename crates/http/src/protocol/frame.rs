//! Units exchanged between the codec layer and the message operations.
//!
//! A message travels through the codecs as one [`Frame::Head`] followed by
//! zero or more data chunks and a final end marker. [`Framing`] names the
//! three ways a body can appear on the wire and is decided once per
//! message, when the head passes through.

use bytes::Bytes;

/// One codec item: a message head, or a piece of its body.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame<H> {
    /// The start line and header block
    Head(H),
    /// A piece of the message body
    Body(BodyChunk),
}

/// A chunk of body data, or the marker that the body is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyChunk {
    Data(Bytes),
    End,
}

/// How a message body is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// No body, and no body-framing header
    Empty,
    /// A `Content-Length` body of exactly this many bytes
    Length(u64),
    /// A `Transfer-Encoding: chunked` body
    Chunked,
}

impl<H> Frame<H> {
    pub fn is_head(&self) -> bool {
        matches!(self, Frame::Head(_))
    }

    pub fn into_head(self) -> Option<H> {
        match self {
            Frame::Head(head) => Some(head),
            Frame::Body(_) => None,
        }
    }

    pub fn into_body_chunk(self) -> Option<BodyChunk> {
        match self {
            Frame::Body(chunk) => Some(chunk),
            Frame::Head(_) => None,
        }
    }
}

impl BodyChunk {
    pub fn is_end(&self) -> bool {
        matches!(self, BodyChunk::End)
    }
}

impl Framing {
    pub fn is_empty(&self) -> bool {
        matches!(self, Framing::Empty)
    }
}
