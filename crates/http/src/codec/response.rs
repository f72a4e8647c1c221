//! Response codec: the encoder the server writes with and the decoder the
//! client reads with. Mirrors the request codec frame for frame.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::body::{BodyDecoder, BodyEncoder};
use crate::codec::head::{encode_response_head, ResponseHeadDecoder};
use crate::protocol::{BodyChunk, Frame, Framing, ParseError, ResponseHead, SendError};

/// Streaming decoder for HTTP responses.
#[derive(Debug)]
pub struct ResponseDecoder {
    head_decoder: ResponseHeadDecoder,
    body_decoder: Option<BodyDecoder>,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { head_decoder: ResponseHeadDecoder, body_decoder: None }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Frame<(ResponseHead, Framing)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(body_decoder) = &mut self.body_decoder {
            let frame = match body_decoder.decode(src)? {
                Some(chunk @ BodyChunk::Data(_)) => Some(Frame::Body(chunk)),
                Some(chunk @ BodyChunk::End) => {
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

/// Streaming encoder for HTTP responses.
#[derive(Debug)]
pub struct ResponseEncoder {
    body_encoder: Option<BodyEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { body_encoder: None }
    }
}

impl Encoder<Frame<(ResponseHead, Framing)>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Frame<(ResponseHead, Framing)>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Frame::Head((head, framing)) => {
                if self.body_encoder.is_some() {
                    return Err(SendError::io(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "expected body frame but received a head",
                    )));
                }
                self.body_encoder = Some(framing.into());
                encode_response_head(&head, dst)
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
