use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("malformed status line: {line:?}")]
    MalformedStatusLine { line: String },

    #[error("unsupported http version: {token:?}")]
    InvalidVersion { token: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("body ended early: declared {declared} bytes, received {received}")]
    TruncatedBody { declared: u64, received: u64 },

    #[error("head size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHead { current_size: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn malformed_status_line<S: ToString>(line: S) -> Self {
        Self::MalformedStatusLine { line: line.to_string() }
    }

    pub fn invalid_version<S: ToString>(token: S) -> Self {
        Self::InvalidVersion { token: token.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn truncated_body(declared: u64, received: u64) -> Self {
        Self::TruncatedBody { declared, received }
    }

    pub fn too_large_head(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHead { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("body ended early: declared {declared} bytes, only {available} available")]
    ShortBody { declared: u64, available: u64 },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn short_body(declared: u64, available: u64) -> Self {
        Self::ShortBody { declared, available }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request has no host or target url to connect to")]
    InvalidRequest,

    #[error("connection to {address} failed: {source}")]
    Connection { address: String, source: io::Error },

    #[error("send request error: {source}")]
    Send {
        #[from]
        source: SendError,
    },

    #[error("parse response error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },
}

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("bind listener error: {source}")]
    Bind {
        #[from]
        source: io::Error,
    },
}
