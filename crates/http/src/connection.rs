//! Per-connection server driver: one request in, one response out.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::codec::{read_request, write_response};
use crate::handler::Handler;
use crate::protocol::{HttpError, Request, Response, SendError};
use crate::server::ResponseWriter;

/// Drives a single accepted connection through its exchange.
///
/// The lifecycle is strict: parse the request, invoke the handler against a
/// fresh [`ResponseWriter`], frame the finalized response, shut the stream
/// down. Connections are never reused.
pub struct ServerConnection<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> ServerConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Runs the exchange to completion.
    ///
    /// A request that cannot be parsed closes the connection without
    /// writing anything back: no response is attempted against a message
    /// the server could not decode.
    pub async fn process<H>(mut self, handler: &H) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let request = read_request(&mut self.reader).await?;
        let response = invoke(handler, request).await;
        write_response(&mut self.writer, response).await?;
        self.writer.shutdown().await.map_err(SendError::io)?;
        Ok(())
    }
}

/// Invokes the handler, catching errors and panics at the connection
/// boundary so a broken handler becomes a plain 500 instead of a torn
/// connection or a dead accept loop.
async fn invoke<H>(handler: &H, request: Request) -> Response
where
    H: Handler + ?Sized,
{
    let mut writer = ResponseWriter::new();
    match AssertUnwindSafe(handler.handle(request, &mut writer)).catch_unwind().await {
        Ok(Ok(())) => writer.to_response(),
        Ok(Err(e)) => {
            error!(cause = %e, "handler failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(_) => {
            error!("handler panicked");
            error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn error_response(status: StatusCode) -> Response {
    let mut writer = ResponseWriter::new();
    writer.set_status(status);
    writer.to_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::Method;
    use std::io::Cursor;

    use crate::handler::BoxError;
    use crate::protocol::ParseError;

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn handle(&self, request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
            writer.write(request.path().as_bytes());
            Ok(())
        }
    }

    struct Faulty;

    #[async_trait]
    impl Handler for Faulty {
        async fn handle(&self, _request: Request, _writer: &mut ResponseWriter) -> Result<(), BoxError> {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn serves_one_exchange() {
        let reader = Cursor::new(b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec());
        let mut out = Vec::new();

        ServerConnection::new(reader, &mut out).process(&Echo).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("content-length: 6\r\n"));
        assert!(text.ends_with("\r\n\r\n/hello"));
    }

    #[tokio::test]
    async fn parse_error_closes_without_response() {
        let reader = Cursor::new(b"GET /\r\nHost: example.com\r\n\r\n".to_vec());
        let mut out = Vec::new();

        let result = ServerConnection::new(reader, &mut out).process(&Echo).await;

        assert!(matches!(result, Err(HttpError::Parse { source: ParseError::MalformedRequestLine { .. } })));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn handler_panic_becomes_a_500() {
        let reader = Cursor::new(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec());
        let mut out = Vec::new();

        ServerConnection::new(reader, &mut out).process(&Faulty).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(text.contains("content-length: 0\r\n"));
    }

    #[tokio::test]
    async fn request_body_reaches_the_handler() {
        struct BodyCheck;

        #[async_trait]
        impl Handler for BodyCheck {
            async fn handle(&self, mut request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
                assert_eq!(request.method(), &Method::POST);
                let body = request.body_mut().collect().await?;
                assert_eq!(&body[..], b"ping");
                writer.write(b"pong");
                Ok(())
            }
        }

        let reader = Cursor::new(b"POST /data HTTP/1.1\r\nHost: example.com\r\nContent-Length: 4\r\n\r\nping".to_vec());
        let mut out = Vec::new();

        ServerConnection::new(reader, &mut out).process(&BodyCheck).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("\r\n\r\npong"));
    }
}
