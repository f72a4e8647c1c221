//! Request codec: the decoder the server reads with and the encoder the
//! client writes with.
//!
//! Both halves are two-phase state machines. The decoder parses the head
//! first, then switches to the body decoder the head's framing selects;
//! the encoder mirrors this for writing. The phase is the `Option` around
//! the body codec: `None` means the head has not passed through yet.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::body::{BodyDecoder, BodyEncoder};
use crate::codec::head::{encode_request_head, RequestHeadDecoder};
use crate::protocol::{BodyChunk, Frame, Framing, ParseError, RequestHead, SendError};

/// Streaming decoder for HTTP requests.
#[derive(Debug)]
pub struct RequestDecoder {
    head_decoder: RequestHeadDecoder,
    body_decoder: Option<BodyDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { head_decoder: RequestHeadDecoder, body_decoder: None }
    }
}

impl Decoder for RequestDecoder {
    type Item = Frame<(RequestHead, Framing)>;
    type Error = ParseError;

    /// Yields the head frame first, then body chunks until the end marker.
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(body_decoder) = &mut self.body_decoder {
            let frame = match body_decoder.decode(src)? {
                Some(chunk @ BodyChunk::Data(_)) => Some(Frame::Body(chunk)),
                Some(chunk @ BodyChunk::End) => {
                    // body finished, the next message starts with a head
                    self.body_decoder.take();
                    Some(Frame::Body(chunk))
                }
                None => None,
            };
            return Ok(frame);
        }

        let frame = match self.head_decoder.decode(src)? {
            Some((head, framing)) => {
                self.body_decoder = Some(framing.into());
                Some(Frame::Head((head, framing)))
            }
            None => None,
        };

        Ok(frame)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(body_decoder) = &mut self.body_decoder {
            let frame = match body_decoder.decode_eof(src)? {
                Some(chunk @ BodyChunk::Data(_)) => Some(Frame::Body(chunk)),
                Some(chunk @ BodyChunk::End) => {
                    self.body_decoder.take();
                    Some(Frame::Body(chunk))
                }
                None => None,
            };
            return Ok(frame);
        }

        if src.is_empty() {
            // clean end of stream before any head bytes
            return Ok(None);
        }

        match self.head_decoder.decode(src)? {
            Some((head, framing)) => {
                self.body_decoder = Some(framing.into());
                Ok(Some(Frame::Head((head, framing))))
            }
            None => Err(ParseError::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed in the middle of a message head",
            ))),
        }
    }
}

/// Streaming encoder for HTTP requests.
///
/// Expects one [`Frame::Head`] followed by body frames; the head's framing
/// selects the body encoder that the following chunks run through.
#[derive(Debug)]
pub struct RequestEncoder {
    body_encoder: Option<BodyEncoder>,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestEncoder {
    fn default() -> Self {
        Self { body_encoder: None }
    }
}

impl Encoder<Frame<(RequestHead, Framing)>> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Frame<(RequestHead, Framing)>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Frame::Head((head, framing)) => {
                if self.body_encoder.is_some() {
                    return Err(SendError::io(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "expected body frame but received a head",
                    )));
                }
                self.body_encoder = Some(framing.into());
                encode_request_head(&head, dst)
            }
            Frame::Body(chunk) => {
                let Some(body_encoder) = &mut self.body_encoder else {
                    return Err(SendError::io(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "expected head frame but received a body chunk",
                    )));
                };
                let is_end = chunk.is_end();
                let result = body_encoder.encode(chunk, dst);
                if is_end {
                    self.body_encoder.take();
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::Method;

    #[test]
    fn decodes_head_then_body() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(
            "POST /submit HTTP/1.1\r\n\
             Host: api.example.com\r\n\
             Content-Length: 16\r\n\
             \r\n\
             {\"key\": \"value\"}",
        );

        let frame = decoder.decode(&mut buffer).unwrap().unwrap();
        let Frame::Head((head, framing)) = frame else {
            panic!("expected a head frame");
        };
        assert_eq!(head.method(), &Method::POST);
        assert_eq!(framing, Framing::Length(16));

        let frame = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(frame.into_body_chunk(), Some(BodyChunk::Data(Bytes::from_static(br#"{"key": "value"}"#))));

        let frame = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(frame.into_body_chunk(), Some(BodyChunk::End));
    }

    #[test]
    fn decode_eof_on_partial_head_fails() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from("GET / HTTP/1.1\r\nHost: trunc");

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }

    #[test]
    fn decode_eof_on_empty_stream_yields_none() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::new();

        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn encoder_rejects_body_before_head() {
        let mut encoder = RequestEncoder::new();
        let mut dst = BytesMut::new();

        let result = encoder.encode(Frame::Body(BodyChunk::End), &mut dst);
        assert!(matches!(result, Err(SendError::Io { .. })));
    }
}
