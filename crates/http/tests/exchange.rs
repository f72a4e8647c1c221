//! Whole-transport exchanges over real sockets.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderValue, Method, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use mono_http::client::Client;
use mono_http::handler::{BoxError, Handler};
use mono_http::protocol::{ClientError, Request};
use mono_http::server::{ResponseWriter, Server};

async fn spawn_server<H>(handler: H) -> (Server, SocketAddr, JoinHandle<()>)
where
    H: Handler + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new();
    let serve = {
        let server = server.clone();
        let handler = Arc::new(handler);
        tokio::spawn(async move { server.serve(listener, handler).await })
    };
    (server, addr, serve)
}

struct Greeter;

#[async_trait]
impl Handler for Greeter {
    async fn handle(&self, request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
        let name = request
            .query()
            .and_then(|query| query.split('&').find_map(|pair| pair.strip_prefix("name=")))
            .unwrap_or("stranger");
        writer.set_header(http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        writer.write(format!("Hello, {name}!").as_bytes());
        Ok(())
    }
}

#[tokio::test]
async fn get_exchange_round_trips() {
    let (server, addr, serve) = spawn_server(Greeter).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("http://{addr}/hello?name=World"))
        .header("Authorization", "Bearer token")
        .build()
        .unwrap();

    let mut response = Client::new().send(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.reason(), "200 OK");
    assert_eq!(response.headers().get("content-type"), Some(&HeaderValue::from_static("text/plain")));

    let body = response.body_mut().collect().await.unwrap();
    assert_eq!(&body[..], b"Hello, World!");

    server.close().await;
    serve.await.unwrap();
}

#[tokio::test]
async fn post_exchange_carries_the_body_both_ways() {
    struct EchoBody;

    #[async_trait]
    impl Handler for EchoBody {
        async fn handle(&self, mut request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
            let body = request.body_mut().collect().await?;
            writer.set_status(StatusCode::CREATED);
            writer.write(&body);
            Ok(())
        }
    }

    let (server, addr, serve) = spawn_server(EchoBody).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("http://{addr}/data"))
        .content_length(4)
        .body("ping")
        .build()
        .unwrap();

    let mut response = Client::new().send(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.content_length(), Some(4));

    let body = response.body_mut().collect().await.unwrap();
    assert_eq!(&body[..], b"ping");

    server.close().await;
    serve.await.unwrap();
}

#[tokio::test]
async fn response_headers_keep_repeated_values_in_order() {
    struct MultiHeader;

    #[async_trait]
    impl Handler for MultiHeader {
        async fn handle(&self, _request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
            writer.append_header(http::header::HeaderName::from_static("x-resp-test"), HeaderValue::from_static("3"));
            writer.append_header(http::header::HeaderName::from_static("x-resp-test"), HeaderValue::from_static("4"));
            Ok(())
        }
    }

    let (server, addr, serve) = spawn_server(MultiHeader).await;

    let request = Request::builder().uri(format!("http://{addr}/multi-header")).build().unwrap();
    let response = Client::new().send(request).await.unwrap();

    let values: Vec<_> = response.headers().get_all("x-resp-test").iter().collect();
    assert_eq!(values, [&HeaderValue::from_static("3"), &HeaderValue::from_static("4")]);

    server.close().await;
    serve.await.unwrap();
}

#[tokio::test]
async fn close_unblocks_the_serve_loop_and_drains() {
    let (server, _addr, serve) = spawn_server(Greeter).await;

    server.close().await;

    tokio::time::timeout(Duration::from_secs(5), serve).await.expect("serve loop did not stop").unwrap();
}

#[tokio::test]
async fn malformed_request_closes_the_connection_without_a_response() {
    struct MustNotRun(Arc<AtomicBool>);

    #[async_trait]
    impl Handler for MustNotRun {
        async fn handle(&self, _request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
            self.0.store(true, Ordering::SeqCst);
            writer.write(b"should never be sent");
            Ok(())
        }
    }

    let invoked = Arc::new(AtomicBool::new(false));
    let (server, addr, serve) = spawn_server(MustNotRun(Arc::clone(&invoked))).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // two request-line tokens, not three
    stream.write_all(b"GET /\r\nHost: example.com\r\n\r\n").await.unwrap();

    let mut buf = Vec::new();
    let n = stream.read_to_end(&mut buf).await.unwrap();
    assert_eq!(n, 0, "server wrote bytes against an undecodable request");
    assert!(!invoked.load(Ordering::SeqCst), "handler ran for an undecodable request");

    server.close().await;
    serve.await.unwrap();
}

#[tokio::test]
async fn handler_error_surfaces_as_500() {
    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        async fn handle(&self, _request: Request, _writer: &mut ResponseWriter) -> Result<(), BoxError> {
            Err("database on fire".into())
        }
    }

    let (server, addr, serve) = spawn_server(Failing).await;

    let request = Request::builder().uri(format!("http://{addr}/")).build().unwrap();
    let response = Client::new().send(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.reason(), "500 Internal Server Error");

    server.close().await;
    serve.await.unwrap();
}

#[tokio::test]
async fn handler_panic_surfaces_as_500_and_keeps_the_listener_alive() {
    struct Panicking;

    #[async_trait]
    impl Handler for Panicking {
        async fn handle(&self, request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
            if request.path() == "/boom" {
                panic!("handler exploded");
            }
            writer.write(b"still alive");
            Ok(())
        }
    }

    let (server, addr, serve) = spawn_server(Panicking).await;

    let boom = Request::builder().uri(format!("http://{addr}/boom")).build().unwrap();
    let response = Client::new().send(boom).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // the accept loop must survive the panic
    let ok = Request::builder().uri(format!("http://{addr}/fine")).build().unwrap();
    let mut response = Client::new().send(ok).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.body_mut().collect().await.unwrap();
    assert_eq!(&body[..], b"still alive");

    server.close().await;
    serve.await.unwrap();
}

#[tokio::test]
async fn server_hangup_before_status_line_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // accept one connection, swallow the request, close without answering
    let accept = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).await;
        drop(stream);
    });

    let request = Request::builder().uri(format!("http://{addr}/")).build().unwrap();
    let result = Client::new().send(request).await;

    assert!(matches!(result, Err(ClientError::Connection { .. })));
    accept.await.unwrap();
}
