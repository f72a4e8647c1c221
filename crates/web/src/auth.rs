//! Authorization guard.

use async_trait::async_trait;
use http::{header, StatusCode};

use mono_http::handler::{BoxError, Handler};
use mono_http::protocol::Request;
use mono_http::server::ResponseWriter;

/// Answers 401 before the inner handler runs when the request carries no
/// `Authorization` header. The credential itself is not validated here.
#[derive(Debug)]
pub struct RequireAuthorization<H> {
    inner: H,
}

impl<H> RequireAuthorization<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: Handler> Handler for RequireAuthorization<H> {
    async fn handle(&self, request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
        if !request.headers().contains_key(header::AUTHORIZATION) {
            writer.set_status(StatusCode::UNAUTHORIZED);
            return Ok(());
        }
        self.inner.handle(request, writer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct Recording(Arc<AtomicBool>);

    #[async_trait]
    impl Handler for Recording {
        async fn handle(&self, _request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
            self.0.store(true, Ordering::SeqCst);
            writer.write(b"inner ran");
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_header_is_rejected_before_the_inner_handler() {
        let invoked = Arc::new(AtomicBool::new(false));
        let guard = RequireAuthorization::new(Recording(Arc::clone(&invoked)));

        let mut writer = ResponseWriter::new();
        let request = Request::builder().uri("/?name=John").build().unwrap();
        guard.handle(request, &mut writer).await.unwrap();

        let response = writer.to_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.body().is_empty());
        assert!(!invoked.load(Ordering::SeqCst), "inner handler ran without authorization");
    }

    #[tokio::test]
    async fn present_header_passes_through() {
        let invoked = Arc::new(AtomicBool::new(false));
        let guard = RequireAuthorization::new(Recording(Arc::clone(&invoked)));

        let mut writer = ResponseWriter::new();
        let request = Request::builder().uri("/").header("Authorization", "Bearer token").build().unwrap();
        guard.handle(request, &mut writer).await.unwrap();

        assert_eq!(writer.to_response().status(), StatusCode::OK);
        assert!(invoked.load(Ordering::SeqCst));
    }
}
