//! Message codec: parsing and serializing HTTP messages against byte
//! streams.
//!
//! The lower half of the module is a set of symmetric [`tokio_util::codec`]
//! state machines ([`RequestDecoder`]/[`RequestEncoder`] and
//! [`ResponseDecoder`]/[`ResponseEncoder`]) that move [`Frame`]s to and from
//! the wire: a head first, then body chunks under the framing the head
//! selected. [`head`] handles start lines and header blocks, [`body`] the
//! three body framing modes.
//!
//! The upper half is four message-level operations built on top of them:
//!
//! - [`read_request`] / [`write_request`] used by the server's read side and
//!   the client's write side,
//! - [`read_response`] / [`write_response`] for the opposite directions.
//!
//! The write side owns the body framing decision: an explicit
//! `Content-Length` header wins, then a declared content length field (the
//! header is derived from it), then chunked transfer for a body of unknown
//! size, and nothing at all for bodiless messages. Declared lengths are
//! enforced as a contract: a body longer than declared is cropped, a body
//! that falls short is a [`SendError::ShortBody`].

pub(crate) mod body;
pub(crate) mod head;

mod request;
pub use request::RequestDecoder;
pub use request::RequestEncoder;

mod response;
pub use response::ResponseDecoder;
pub use response::ResponseEncoder;

use std::io;

use bytes::{BufMut, BytesMut};
use futures::{SinkExt, StreamExt};
use http::header;
use http::{HeaderMap, HeaderValue};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Encoder, FramedRead, FramedWrite};
use tracing::trace;

use crate::codec::head::MAX_HEAD_BYTES;
use crate::protocol::{Body, BodyChunk, Frame, Framing, ParseError, Request, Response, SendError};

/// Adapter so `write!` can format straight into a `BytesMut`.
pub(crate) struct FmtWriter<'a>(pub(crate) &'a mut BytesMut);

impl io::Write for FmtWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads one complete request off the stream, body fully buffered.
///
/// A stream that ends before any request line arrived is an
/// [`ParseError::EmptyMessage`]; one that ends mid-body is a
/// [`ParseError::TruncatedBody`].
pub async fn read_request<R>(reader: R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut framed = FramedRead::with_capacity(reader, RequestDecoder::new(), MAX_HEAD_BYTES);

    let Some(first) = framed.next().await else {
        return Err(ParseError::EmptyMessage);
    };
    let Some((head, framing)) = first?.into_head() else {
        return Err(ParseError::io(io::Error::new(io::ErrorKind::InvalidData, "decoder yielded a body frame before the head")));
    };
    trace!(method = %head.method(), path = head.path(), ?framing, "request head parsed");

    let mut buf = BytesMut::new();
    loop {
        match framed.next().await {
            Some(Ok(frame)) => match frame.into_body_chunk() {
                Some(BodyChunk::Data(bytes)) => buf.extend_from_slice(&bytes),
                Some(BodyChunk::End) | None => break,
            },
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }

    let body = if buf.is_empty() { Body::Empty } else { Body::Full(buf.freeze()) };
    Ok(head.body(body))
}

/// Serializes one request onto the writer and flushes it.
pub async fn write_request<W>(writer: &mut W, request: Request) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
{
    let (mut head, body) = request.into_parts();
    let content_length = head.content_length();
    let framing = send_framing(head.headers_mut(), content_length, &body)?;

    let mut framed = FramedWrite::new(writer, RequestEncoder::new());
    framed.feed(Frame::Head((head, framing))).await?;
    write_body(&mut framed, body).await
}

/// Reads a response head off the stream; the body stays lazily attached.
///
/// The returned response's body pulls from the reader on demand, so the
/// caller decides when (and whether) to drain it.
pub async fn read_response<R>(reader: R) -> Result<Response, ParseError>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut framed = FramedRead::with_capacity(reader, ResponseDecoder::new(), MAX_HEAD_BYTES);

    let Some(first) = framed.next().await else {
        return Err(ParseError::EmptyMessage);
    };
    let Some((head, framing)) = first?.into_head() else {
        return Err(ParseError::io(io::Error::new(io::ErrorKind::InvalidData, "decoder yielded a body frame before the head")));
    };
    trace!(status = %head.status(), ?framing, "response head parsed");

    let body = match framing {
        Framing::Length(_) => Body::stream(futures::stream::try_unfold(framed, |mut framed| async move {
            match framed.next().await {
                Some(Ok(frame)) => match frame.into_body_chunk() {
                    Some(BodyChunk::Data(bytes)) => Ok(Some((bytes, framed))),
                    Some(BodyChunk::End) | None => Ok(None),
                },
                Some(Err(e)) => Err(e),
                None => Ok(None),
            }
        })),
        Framing::Empty | Framing::Chunked => Body::Empty,
    };

    Ok(head.body(body))
}

/// Serializes one response onto the writer and flushes it.
pub async fn write_response<W>(writer: &mut W, response: Response) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
{
    let (mut head, body) = response.into_parts();
    let content_length = head.content_length();
    let framing = send_framing(head.headers_mut(), content_length, &body)?;

    let mut framed = FramedWrite::new(writer, ResponseEncoder::new());
    framed.feed(Frame::Head((head, framing))).await?;
    write_body(&mut framed, body).await
}

/// The write-side framing decision, in priority order: explicit
/// `Content-Length` header, declared content length field (the header is
/// derived), chunked transfer for a body of unknown size, nothing.
///
/// Mutates the header map so the framing header goes out with the head.
fn send_framing(headers: &mut HeaderMap, declared: Option<u64>, body: &Body) -> Result<Framing, SendError> {
    if let Some(value) = headers.get(header::CONTENT_LENGTH) {
        let length = value
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| SendError::invalid_content_length(format!("header value {value:?} is not an unsigned integer")))?;
        return Ok(Framing::Length(length));
    }

    if let Some(length) = declared {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        return Ok(Framing::Length(length));
    }

    if !body.is_empty() {
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        return Ok(Framing::Chunked);
    }

    Ok(Framing::Empty)
}

/// Feeds the body through the framed writer and flushes with the end marker.
async fn write_body<W, E, H>(framed: &mut FramedWrite<W, E>, body: Body) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
    E: Encoder<Frame<H>, Error = SendError>,
{
    match body {
        Body::Empty => {}
        Body::Full(bytes) => {
            if !bytes.is_empty() {
                framed.feed(Frame::Body(BodyChunk::Data(bytes))).await?;
            }
        }
        Body::Stream(mut stream) => {
            while let Some(chunk) = stream.next().await {
                let bytes = chunk.map_err(|e| SendError::io(io::Error::other(e)))?;
                framed.feed(Frame::Body(BodyChunk::Data(bytes))).await?;
            }
        }
    }
    framed.send(Frame::Body(BodyChunk::End)).await
}
