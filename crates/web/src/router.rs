//! Explicit routing table.
//!
//! Routes are collected on a builder and the finished table is handed to
//! the server as its handler, so the wiring is visible at the call site
//! instead of living in process-wide state. Matching is by path only;
//! method dispatch belongs to the handlers behind the routes.

use async_trait::async_trait;
use http::{header, HeaderValue, StatusCode};
use tracing::trace;

use mono_http::handler::{BoxError, Handler};
use mono_http::protocol::Request;
use mono_http::server::ResponseWriter;

type InnerRouter = matchit::Router<Box<dyn Handler>>;

/// Routing table dispatching requests by path.
pub struct Router {
    inner: InnerRouter,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }
}

#[async_trait]
impl Handler for Router {
    async fn handle(&self, request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
        match self.inner.at(request.path()) {
            Ok(matched) => matched.value.handle(request, writer).await,
            Err(_) => {
                trace!(path = request.path(), "no route matched");
                writer.set_status(StatusCode::NOT_FOUND);
                writer.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
                writer.write(b"404 page not found\n");
                Ok(())
            }
        }
    }
}

/// Builder for [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<(String, Box<dyn Handler>)>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers a handler for a path.
    pub fn route(mut self, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.routes.push((path.into(), Box::new(handler)));
        self
    }

    /// Builds the routing table.
    ///
    /// # Panics
    ///
    /// Panics when two routes conflict; routes are static wiring, so a
    /// conflict is a programming error caught at startup.
    pub fn build(self) -> Router {
        let mut inner = InnerRouter::new();
        for (path, handler) in self.routes {
            inner.insert(path, handler).unwrap();
        }
        Router { inner }
    }
}
