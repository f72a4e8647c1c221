//! Request handler boundary.
//!
//! Business logic plugs into the server through [`Handler`]: the server
//! parses a request, hands it to the handler together with a fresh
//! [`ResponseWriter`], and frames whatever the writer accumulated onto the
//! wire once the handler returns. Handlers never touch the connection.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::protocol::Request;
use crate::server::ResponseWriter;

/// Boxed error a handler may return; the connection driver converts it
/// into a 500 response.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Boxed future alias used by closure handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The integration point for business logic.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError>;
}

/// A [`Handler`] backed by a closure, see [`handler_fn`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(Request, &'a mut ResponseWriter) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    async fn handle(&self, request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
        (self.f)(request, writer).await
    }
}

/// Wraps a closure returning a boxed future into a [`Handler`].
///
/// ```
/// use mono_http::handler::handler_fn;
///
/// let handler = handler_fn(|_request, writer| {
///     Box::pin(async move {
///         writer.write(b"Hello World!");
///         Ok(())
///     })
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(Request, &'a mut ResponseWriter) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    HandlerFn { f }
}
