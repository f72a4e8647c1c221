//! Body codecs for the three wire framing modes.
//!
//! Decoding only ever runs in fixed-length mode: the parse side reads
//! bodies by `Content-Length` and treats everything else as bodiless.
//! Encoding supports all three modes; the fixed-length encoder enforces
//! the declared length asymmetrically (excess bytes are cropped, missing
//! bytes are an error) and the chunked encoder emits the single-chunk
//! shape `<len>\r\n<data>\r\n0`.

use std::cmp;
use std::io::Write;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::codec::FmtWriter;
use crate::ensure;
use crate::protocol::{BodyChunk, Framing, ParseError, SendError};

/// Decoder for a body with a known content length.
///
/// Tracks the bytes still owed by the peer; a stream that ends before the
/// declared count arrived fails with [`ParseError::TruncatedBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LengthDecoder {
    declared: u64,
    remaining: u64,
}

impl LengthDecoder {
    pub(crate) fn new(length: u64) -> Self {
        Self { declared: length, remaining: length }
    }
}

impl Decoder for LengthDecoder {
    type Item = BodyChunk;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(BodyChunk::End));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = cmp::min(self.remaining, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();
        self.remaining -= bytes.len() as u64;
        Ok(Some(BodyChunk::Data(bytes)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseError::truncated_body(self.declared, self.declared - self.remaining)),
        }
    }
}

/// Encoder for a body with a declared content length.
///
/// The declared length is the contract: bytes past it are dropped, and an
/// [`BodyChunk::End`] arriving before the count is satisfied fails with
/// [`SendError::ShortBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LengthEncoder {
    declared: u64,
    remaining: u64,
}

impl LengthEncoder {
    pub(crate) fn new(length: u64) -> Self {
        Self { declared: length, remaining: length }
    }
}

impl Encoder<BodyChunk> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: BodyChunk, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            BodyChunk::Data(bytes) => {
                let take = cmp::min(self.remaining, bytes.len() as u64) as usize;
                if take < bytes.len() {
                    warn!(declared = self.declared, dropped = bytes.len() - take, "body exceeds declared length, cropping");
                }
                dst.extend_from_slice(&bytes[..take]);
                self.remaining -= take as u64;
                Ok(())
            }
            BodyChunk::End => {
                ensure!(self.remaining == 0, SendError::short_body(self.declared, self.declared - self.remaining));
                Ok(())
            }
        }
    }
}

/// Encoder for a chunked-transfer body.
///
/// The whole body goes out as a single chunk: the size line (decimal), the
/// data, then a bare `0` terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChunkedEncoder {
    terminated: bool,
}

impl ChunkedEncoder {
    pub(crate) fn new() -> Self {
        Self { terminated: false }
    }
}

impl Encoder<BodyChunk> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: BodyChunk, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.terminated {
            return Ok(());
        }

        match item {
            BodyChunk::Data(bytes) if bytes.is_empty() => Ok(()),
            BodyChunk::Data(bytes) => {
                write!(FmtWriter(dst), "{}\r\n", bytes.len())?;
                dst.extend_from_slice(&bytes);
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            BodyChunk::End => {
                self.terminated = true;
                dst.extend_from_slice(b"0");
                Ok(())
            }
        }
    }
}

/// Unified body decoder, dispatching on the framing of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BodyDecoder {
    kind: DecodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecodeKind {
    /// Read exactly the declared number of bytes
    Length(LengthDecoder),
    /// Nothing to read, yield the end marker immediately
    None,
}

impl BodyDecoder {
    pub(crate) fn empty() -> Self {
        Self { kind: DecodeKind::None }
    }

    pub(crate) fn length(size: u64) -> Self {
        Self { kind: DecodeKind::Length(LengthDecoder::new(size)) }
    }
}

impl From<Framing> for BodyDecoder {
    fn from(framing: Framing) -> Self {
        match framing {
            Framing::Length(length) => Self::length(length),
            // chunked bodies are not read back on the parse side
            Framing::Empty | Framing::Chunked => Self::empty(),
        }
    }
}

impl Decoder for BodyDecoder {
    type Item = BodyChunk;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            DecodeKind::Length(decoder) => decoder.decode(src),
            DecodeKind::None => Ok(Some(BodyChunk::End)),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            DecodeKind::Length(decoder) => decoder.decode_eof(src),
            DecodeKind::None => Ok(Some(BodyChunk::End)),
        }
    }
}

/// Unified body encoder, dispatching on the framing of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BodyEncoder {
    kind: EncodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EncodeKind {
    Length(LengthEncoder),
    Chunked(ChunkedEncoder),
    None,
}

impl From<Framing> for BodyEncoder {
    fn from(framing: Framing) -> Self {
        let kind = match framing {
            Framing::Length(length) => EncodeKind::Length(LengthEncoder::new(length)),
            Framing::Chunked => EncodeKind::Chunked(ChunkedEncoder::new()),
            Framing::Empty => EncodeKind::None,
        };
        Self { kind }
    }
}

impl Encoder<BodyChunk> for BodyEncoder {
    type Error = SendError;

    fn encode(&mut self, item: BodyChunk, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            EncodeKind::Length(encoder) => encoder.encode(item, dst),
            EncodeKind::Chunked(encoder) => encoder.encode(item, dst),
            EncodeKind::None => Ok(()),
        }
    }
}
