//! The thin web layer over the `mono-http` transport.
//!
//! Three pieces, all of them plain [`Handler`](mono_http::handler::Handler)
//! implementations that compose by wrapping:
//!
//! - [`Router`]: an explicit routing table built once and handed to the
//!   server at construction. Nothing is registered globally; a path with no
//!   route answers `404 page not found`.
//! - [`RequireAuthorization`]: a guard that answers 401 before the inner
//!   handler runs when the `Authorization` header is missing.
//! - [`Greeting`]: the demo service behind the end-to-end tests, answering
//!   plain-text greetings to `GET ?name=` and JSON greetings to `POST`
//!   bodies.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mono_http::server::Server;
//! use mono_web::{Greeting, RequireAuthorization, Router};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .route("/myhandler", RequireAuthorization::new(Greeting))
//!         .build();
//!
//!     let server = Server::new();
//!     if let Err(e) = server.listen_and_serve("127.0.0.1:8080", Arc::new(router)).await {
//!         eprintln!("serve failed: {e}");
//!     }
//! }
//! ```

mod auth;
pub use auth::RequireAuthorization;

mod greeting;
pub use greeting::Greeting;

mod router;
pub use router::Router;
pub use router::RouterBuilder;
