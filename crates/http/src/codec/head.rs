//! Start-line and header-block codec, shared by both message directions.
//!
//! The head of a message is everything up to and including the blank line.
//! Decoding buffers until the blank line is seen, then parses in one pass:
//!
//! - A request line must split into exactly three whitespace-separated
//!   tokens (method, target, version); more or fewer is malformed.
//! - A status line has at least three fields; the reason phrase is the
//!   remainder of the line and may itself contain spaces.
//! - Header lines split on the first `": "`. A `Host` header additionally
//!   populates the request's host field, and `Content-Length` the declared
//!   body length that drives the body framing.
//!
//! Encoding mirrors this: the start line, `Host` first (for requests),
//! then every header value on its own line in map order, then the blank
//! line.

use std::io::Write;
use std::str;

use bytes::{BufMut, BytesMut};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::codec::FmtWriter;
use crate::protocol::{Framing, ParseError, RequestHead, ResponseHead, SendError};

/// Maximum size in bytes allowed for a message head
pub(crate) const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Initial buffer size reserved for head serialization
const INIT_HEAD_SIZE: usize = 4 * 1024;

const HEAD_END: &[u8] = b"\r\n\r\n";

/// Decoder for request heads implementing the [`Decoder`] trait.
#[derive(Debug)]
pub(crate) struct RequestHeadDecoder;

/// Decoder for response heads implementing the [`Decoder`] trait.
#[derive(Debug)]
pub(crate) struct ResponseHeadDecoder;

impl Decoder for RequestHeadDecoder {
    type Item = (RequestHead, Framing);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(text) = take_head_block(src)? else {
            return Ok(None);
        };
        parse_request_head(&text).map(Some)
    }
}

impl Decoder for ResponseHeadDecoder {
    type Item = (ResponseHead, Framing);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(text) = take_head_block(src)? else {
            return Ok(None);
        };
        parse_response_head(&text).map(Some)
    }
}

/// Splits a complete head block (through the blank line) off the buffer.
///
/// Returns `Ok(None)` while the blank line has not arrived yet.
fn take_head_block(src: &mut BytesMut) -> Result<Option<String>, ParseError> {
    let Some(end) = src.windows(HEAD_END.len()).position(|window| window == HEAD_END) else {
        ensure!(src.len() <= MAX_HEAD_BYTES, ParseError::too_large_head(src.len(), MAX_HEAD_BYTES));
        return Ok(None);
    };
    let end = end + HEAD_END.len();
    ensure!(end <= MAX_HEAD_BYTES, ParseError::too_large_head(end, MAX_HEAD_BYTES));

    trace!(head_size = end, "parsed head size");
    let head_bytes = src.split_to(end);
    match str::from_utf8(&head_bytes) {
        Ok(text) => Ok(Some(text.to_owned())),
        Err(_) => Err(ParseError::invalid_header("head is not valid utf-8")),
    }
}

fn parse_request_head(text: &str) -> Result<(RequestHead, Framing), ParseError> {
    let mut lines = text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    // Exactly three tokens; a fourth or a missing one is malformed.
    let mut tokens = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ParseError::malformed_request_line(request_line));
    };

    let method = Method::from_bytes(method.as_bytes()).map_err(|_| ParseError::malformed_request_line(request_line))?;
    let uri: Uri = target.parse().map_err(|_| ParseError::malformed_request_line(request_line))?;
    let version = parse_version(version)?;

    let mut head = RequestHead::from_parts(method, uri, version);
    let block = parse_header_block(lines)?;
    *head.headers_mut() = block.headers;
    if let Some(host) = block.host {
        head.set_host(host);
    }
    if let Some(length) = block.content_length {
        head.set_content_length(length);
    }

    let framing = parse_framing(block.content_length);
    Ok((head, framing))
}

fn parse_response_head(text: &str) -> Result<(ResponseHead, Framing), ParseError> {
    let mut lines = text.split("\r\n");
    let status_line = lines.next().unwrap_or_default();

    // Three fields minimum; the reason is the remainder and may contain
    // spaces.
    let mut fields = status_line.splitn(3, ' ');
    let (Some(version), Some(code), Some(reason)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ParseError::malformed_status_line(status_line));
    };
    ensure!(!reason.is_empty(), ParseError::malformed_status_line(status_line));

    let version = parse_version(version)?;
    let code: u16 = code.parse().map_err(|_| ParseError::malformed_status_line(status_line))?;
    ensure!((100..=599).contains(&code), ParseError::malformed_status_line(status_line));
    let status = StatusCode::from_u16(code).map_err(|_| ParseError::malformed_status_line(status_line))?;

    // The stored status text is the composed `<code> <reason>` form.
    let mut head = ResponseHead::new(version, status, format!("{code} {reason}"));
    let block = parse_header_block(lines)?;
    *head.headers_mut() = block.headers;
    if let Some(length) = block.content_length {
        head.set_content_length(length);
    }

    let framing = parse_framing(block.content_length);
    Ok((head, framing))
}

struct HeaderBlock {
    headers: HeaderMap,
    host: Option<String>,
    content_length: Option<u64>,
}

fn parse_header_block<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HeaderBlock, ParseError> {
    let mut headers = HeaderMap::new();
    let mut host = None;
    let mut content_length = None;

    for line in lines {
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(": ") else {
            return Err(ParseError::invalid_header(format!("missing ': ' separator in {line:?}")));
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| ParseError::invalid_header(format!("invalid header name {name:?}")))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ParseError::invalid_header(format!("invalid value for header {name:?}")))?;

        if header_name == header::HOST && host.is_none() {
            host = Some(value.to_owned());
        }
        if header_name == header::CONTENT_LENGTH {
            let length = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {value:?} is not an unsigned integer")))?;
            content_length = Some(length);
        }

        headers.append(header_name, header_value);
    }

    Ok(HeaderBlock { headers, host, content_length })
}

/// Body framing on the parse side is driven by `Content-Length` alone;
/// chunked peers are not read back, their body stays empty.
fn parse_framing(content_length: Option<u64>) -> Framing {
    match content_length {
        Some(0) | None => Framing::Empty,
        Some(length) => Framing::Length(length),
    }
}

fn parse_version(token: &str) -> Result<Version, ParseError> {
    match token {
        "HTTP/1.1" => Ok(Version::HTTP_11),
        "HTTP/1.0" => Ok(Version::HTTP_10),
        _ => Err(ParseError::invalid_version(token)),
    }
}

pub(crate) fn version_token(version: Version) -> &'static str {
    if version == Version::HTTP_10 { "HTTP/1.0" } else { "HTTP/1.1" }
}

pub(crate) fn encode_request_head(head: &RequestHead, dst: &mut BytesMut) -> Result<(), SendError> {
    dst.reserve(INIT_HEAD_SIZE);

    let target = head.uri().path_and_query().map_or("/", |path_and_query| path_and_query.as_str());
    write!(FmtWriter(dst), "{} {} {}\r\n", head.method(), target, version_token(head.version()))?;

    // Host goes out first; the host field (or the uri authority) shadows
    // any Host entries in the map.
    let host = head.host().or_else(|| head.uri().authority().map(|authority| authority.as_str()));
    if let Some(host) = host {
        write!(FmtWriter(dst), "Host: {host}\r\n")?;
    }

    for (name, value) in head.headers() {
        if host.is_some() && *name == header::HOST {
            continue;
        }
        put_header_line(dst, name, value);
    }
    dst.put_slice(b"\r\n");
    Ok(())
}

pub(crate) fn encode_response_head(head: &ResponseHead, dst: &mut BytesMut) -> Result<(), SendError> {
    dst.reserve(INIT_HEAD_SIZE);

    // The stored status text already leads with the code (`200 OK`), so the
    // status line is the protocol token plus the text.
    write!(FmtWriter(dst), "{} {}\r\n", version_token(head.version()), head.reason())?;

    for (name, value) in head.headers() {
        put_header_line(dst, name, value);
    }
    dst.put_slice(b"\r\n");
    Ok(())
}

fn put_header_line(dst: &mut BytesMut, name: &HeaderName, value: &HeaderValue) {
    dst.put_slice(name.as_str().as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value.as_bytes());
    dst.put_slice(b"\r\n");
}
