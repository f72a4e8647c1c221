//! A single-exchange HTTP/1.1 message transport.
//!
//! This crate implements the hard middle of an HTTP stack and nothing
//! around it: parsing and serializing request/response messages against
//! raw byte streams, a client that performs one full exchange over a fresh
//! connection, and a server that accepts connections, decodes requests,
//! dispatches to a handler and frames the handler's output back onto the
//! wire. Every connection carries exactly one exchange; there is no
//! keep-alive, no TLS and no routing here.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mono_http::client::Client;
//! use mono_http::handler::handler_fn;
//! use mono_http::protocol::Request;
//! use mono_http::server::Server;
//! use tracing::Level;
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let handler = Arc::new(handler_fn(|_request, writer| {
//!         Box::pin(async move {
//!             writer.write(b"Hello World!\r\n");
//!             Ok(())
//!         })
//!     }));
//!
//!     let server = Server::new();
//!     let serve = {
//!         let server = server.clone();
//!         tokio::spawn(async move {
//!             if let Err(e) = server.listen_and_serve("127.0.0.1:8080", handler).await {
//!                 eprintln!("serve failed: {e}");
//!             }
//!         })
//!     };
//!
//!     let request = Request::builder().uri("http://127.0.0.1:8080/").build().unwrap();
//!     let mut response = Client::new().send(request).await.unwrap();
//!     let body = response.body_mut().collect().await.unwrap();
//!     println!("{}", String::from_utf8_lossy(&body));
//!
//!     server.close().await;
//!     serve.await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: message types, bodies, frames and the error catalogue
//! - [`codec`]: wire parsing and serialization, head and body halves
//! - [`connection`]: the per-connection server driver
//! - [`server`]: listener lifecycle and the [`server::ResponseWriter`]
//! - [`client`]: the single-exchange client
//! - [`handler`]: the trait business logic plugs into
//!
//! # Limitations
//!
//! - HTTP/1.0 and 1.1 only, one request per connection
//! - No TLS (terminate it in front of the server)
//! - Maximum head size: 8 KiB
//! - Chunked bodies are written, not read back

pub mod client;
pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
