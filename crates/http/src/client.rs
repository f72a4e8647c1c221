//! HTTP client over a single-use connection.

use std::io;

use tokio::net::TcpStream;
use tracing::trace;

use crate::codec::{read_response, write_request};
use crate::protocol::{ClientError, ParseError, Request, Response};

const DEFAULT_PORT: u16 = 80;

/// Performs one request/response exchange per connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct Client;

impl Client {
    pub fn new() -> Self {
        Self
    }

    /// Opens a connection to the request's target, sends the request and
    /// parses the response.
    ///
    /// The response body may still be attached to the connection; draining
    /// it (via [`Body::collect`](crate::protocol::Body::collect)) is the
    /// caller's job. The connection carries this one exchange only.
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let address = connect_address(&request)?;
        trace!(%address, "connecting");

        let stream = TcpStream::connect(&address)
            .await
            .map_err(|source| ClientError::Connection { address: address.clone(), source })?;
        let (read_half, mut write_half) = stream.into_split();

        write_request(&mut write_half, request).await?;

        // A peer that hangs up before a full status line arrived is a
        // transport failure, not a malformed message.
        read_response(read_half).await.map_err(|error| match error {
            ParseError::EmptyMessage => ClientError::Connection {
                address,
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before a response arrived"),
            },
            ParseError::Io { source } => ClientError::Connection { address, source },
            error => ClientError::Parse { source: error },
        })
    }
}

/// Resolves the `host:port` to connect to: the request target's authority
/// when the uri is absolute, the host field otherwise. Port 80 is the
/// default for the plain scheme.
fn connect_address(request: &Request) -> Result<String, ClientError> {
    if let Some(authority) = request.uri().authority() {
        return Ok(match authority.port_u16() {
            Some(port) => format!("{}:{port}", authority.host()),
            None => format!("{}:{DEFAULT_PORT}", authority.host()),
        });
    }

    match request.host() {
        Some(host) if !host.is_empty() => {
            Ok(if host.contains(':') { host.to_owned() } else { format!("{host}:{DEFAULT_PORT}") })
        }
        _ => Err(ClientError::InvalidRequest),
    }
}
