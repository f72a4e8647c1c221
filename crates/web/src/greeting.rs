//! The greeting service.
//!
//! `GET ?name=N` answers a plain-text `Hello, N!`; `POST` with a JSON
//! `{"name": "N"}` body answers `{"greeting": "Hello, N!"}`. A missing or
//! empty name and an undecodable body are a 400, any other method a 405.

use async_trait::async_trait;
use http::{header, HeaderName, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};

use mono_http::handler::{BoxError, Handler};
use mono_http::protocol::Request;
use mono_http::server::ResponseWriter;

const RESULT_HEADER: HeaderName = HeaderName::from_static("x-custom-result");

#[derive(Debug, Clone, Copy)]
pub struct Greeting;

#[derive(Debug, Deserialize)]
struct GreetingParams {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct GreetingReply {
    greeting: String,
}

#[async_trait]
impl Handler for Greeting {
    async fn handle(&self, mut request: Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
        match *request.method() {
            Method::GET => greet_from_query(&request, writer),
            Method::POST => greet_from_json(&mut request, writer).await,
            _ => {
                writer.set_status(StatusCode::METHOD_NOT_ALLOWED);
                Ok(())
            }
        }
    }
}

fn greet_from_query(request: &Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
    let params: GreetingParams = match serde_urlencoded::from_str(request.query().unwrap_or_default()) {
        Ok(params) => params,
        Err(_) => return bad_request(writer),
    };
    let Some(name) = params.name.filter(|name| !name.is_empty()) else {
        return bad_request(writer);
    };

    writer.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    writer.set_header(RESULT_HEADER, HeaderValue::from_static("success"));
    writer.write(format!("Hello, {name}!").as_bytes());
    Ok(())
}

async fn greet_from_json(request: &mut Request, writer: &mut ResponseWriter) -> Result<(), BoxError> {
    if !has_json_content_type(request) {
        return bad_request(writer);
    }

    let body = request.body_mut().collect().await?;
    let params: GreetingParams = match serde_json::from_slice(&body) {
        Ok(params) => params,
        Err(_) => return bad_request(writer),
    };
    let Some(name) = params.name.filter(|name| !name.is_empty()) else {
        return bad_request(writer);
    };

    let reply = serde_json::to_string(&GreetingReply { greeting: format!("Hello, {name}!") })?;
    writer.set_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    writer.set_header(RESULT_HEADER, HeaderValue::from_static("success"));
    writer.write(reply.as_bytes());
    Ok(())
}

/// An absent `Content-Type` is accepted as JSON; a present one must carry
/// the JSON essence.
fn has_json_content_type(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_none_or(|content_type| content_type.essence_str() == mime::APPLICATION_JSON.essence_str())
}

fn bad_request(writer: &mut ResponseWriter) -> Result<(), BoxError> {
    writer.set_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn respond(request: Request) -> mono_http::protocol::Response {
        let mut writer = ResponseWriter::new();
        Greeting.handle(request, &mut writer).await.unwrap();
        writer.to_response()
    }

    #[tokio::test]
    async fn get_with_name_succeeds() {
        let request = Request::builder().uri("/?name=John").build().unwrap();
        let response = respond(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type"), Some(&HeaderValue::from_static("text/plain")));
        assert_eq!(response.headers().get("x-custom-result"), Some(&HeaderValue::from_static("success")));
        assert_eq!(response.body().as_bytes().map(|bytes| &bytes[..]), Some(&b"Hello, John!"[..]));
    }

    #[tokio::test]
    async fn get_without_name_is_rejected() {
        let request = Request::builder().uri("/").build().unwrap();
        assert_eq!(respond(request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_with_empty_name_is_rejected() {
        let request = Request::builder().uri("/?name=").build().unwrap();
        assert_eq!(respond(request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        for method in [Method::PUT, Method::DELETE] {
            let request = Request::builder().method(method).uri("/").build().unwrap();
            assert_eq!(respond(request).await.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
    }

    #[tokio::test]
    async fn post_with_name_succeeds() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("Content-Type", "application/json")
            .body(r#"{"name":"John"}"#)
            .build()
            .unwrap();
        let response = respond(request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type"), Some(&HeaderValue::from_static("application/json")));
        assert_eq!(response.headers().get("x-custom-result"), Some(&HeaderValue::from_static("success")));
        assert_eq!(response.body().as_bytes().map(|bytes| &bytes[..]), Some(&br#"{"greeting":"Hello, John!"}"#[..]));
    }

    #[tokio::test]
    async fn post_with_invalid_json_is_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("Content-Type", "application/json")
            .body("invalid json")
            .build()
            .unwrap();
        assert_eq!(respond(request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_without_name_field_is_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("Content-Type", "application/json")
            .body("{}")
            .build()
            .unwrap();
        assert_eq!(respond(request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_with_empty_name_is_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("Content-Type", "application/json")
            .body(r#"{"name":""}"#)
            .build()
            .unwrap();
        assert_eq!(respond(request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_with_wrong_content_type_is_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("Content-Type", "text/xml")
            .body(r#"{"name":"John"}"#)
            .build()
            .unwrap();
        assert_eq!(respond(request).await.status(), StatusCode::BAD_REQUEST);
    }
}
