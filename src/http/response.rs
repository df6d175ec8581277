//! Building responses.

use std::fmt;
use std::convert::Infallible;
use bytes::Bytes;
use hyper::{Body, StatusCode};
use hyper::http::response::Builder;
use serde_json::{json, Value};
use super::request::Request;


//------------ Response ------------------------------------------------------

#[derive(Debug)]
pub struct Response(hyper::Response<Body>);

impl Response {
    /// Returns a Bad Request response with the given message.
    pub fn bad_request(message: impl fmt::Display) -> Self {
        Self::error_message(StatusCode::BAD_REQUEST, "Bad Request", message)
    }

    /// Returns a Not Found response for a request without a route.
    pub fn no_route(req: &Request) -> Self {
        Self::error_message(
            StatusCode::NOT_FOUND, "Not Found",
            format_args!("Cannot {} {}", req.method(), req.path())
        )
    }

    /// Returns a Payload Too Large response.
    pub fn payload_too_large(limit: usize) -> Self {
        Self::error_message(
            StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large",
            format_args!("Request body exceeds limit of {} bytes", limit)
        )
    }

    /// Returns the generic response for a failed request.
    ///
    /// The response contains nothing but the request ID so that the
    /// details can be found in the journal.
    pub fn internal_error(request_id: &str) -> Self {
        Self::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json!({
                "error": "Internal Server Error",
                "requestId": request_id,
            })
        )
    }

    /// Creates an error response with only an `error` member.
    pub fn error(status: StatusCode, error: &str) -> Self {
        Self::json(status, &json!({ "error": error }))
    }

    /// Creates an error response with `error` and `message` members.
    pub fn error_message(
        status: StatusCode,
        error: &str,
        message: impl fmt::Display
    ) -> Self {
        Self::json(
            status,
            &json!({
                "error": error,
                "message": message.to_string(),
            })
        )
    }

    /// Creates a response with a JSON body.
    pub fn json(status: StatusCode, body: &Value) -> Self {
        ResponseBuilder::new(status).content_type(ContentType::JSON).body(
            body.to_string()
        )
    }

    /// Returns the status code of the response.
    pub fn status(&self) -> StatusCode {
        self.0.status()
    }

    /// Converts the response into a hyper response.
    pub fn into_hyper(self) -> Result<hyper::Response<Body>, Infallible> {
        Ok(self.0)
    }
}


//------------ ResponseBuilder ----------------------------------------------

#[derive(Debug)]
pub struct ResponseBuilder {
    builder: Builder,
}

impl ResponseBuilder {
    /// Creates a new builder with the given status.
    pub fn new(status: StatusCode) -> Self {
        ResponseBuilder {
            builder:  Builder::new().status(status).header(
                "Access-Control-Allow-Origin", "*"
            )
        }
    }

    /// Creates a new builder for a 200 OK response.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Adds the content type header.
    pub fn content_type(self, content_type: ContentType) -> Self {
        ResponseBuilder {
            builder: self.builder.header("Content-Type", content_type.0)
        }
    }

    /// Finalizes the response by adding a body.
    pub fn body(self, body: impl Into<Bytes>) -> Response {
        Response(
            self.builder.body(
                Body::from(body.into())
            ).expect("broken HTTP response builder")
        )
    }
}


//------------ ContentType ---------------------------------------------------

#[derive(Clone, Debug)]
pub struct ContentType(&'static [u8]);

impl ContentType {
    pub const JSON: ContentType = ContentType(
        b"application/json; charset=utf-8"
    );
    pub const TEXT: ContentType = ContentType(b"text/plain; charset=utf-8");
}


//============ Tests =========================================================

#[cfg(test)]
impl Response {
    /// Takes the response apart for inspection.
    pub async fn into_parts(self) -> (StatusCode, hyper::HeaderMap, Bytes) {
        let (parts, body) = self.0.into_parts();
        let body = hyper::body::to_bytes(body).await.unwrap();
        (parts.status, parts.headers, body)
    }

    /// Returns the status and the body parsed as JSON.
    pub async fn into_json(self) -> (StatusCode, Value) {
        let (status, _, body) = self.into_parts().await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hyper::Method;

    #[tokio::test]
    async fn error_bodies() {
        let (status, headers, body) = Response::error(
            StatusCode::NOT_FOUND, "Log file not found"
        ).into_parts().await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            headers.get("Content-Type").unwrap(),
            "application/json; charset=utf-8"
        );
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"error": "Log file not found"})
        );

        let req = Request::new(Method::PUT, "/mock/status", &[], "");
        assert_eq!(
            Response::no_route(&req).into_json().await,
            (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Not Found",
                    "message": "Cannot PUT /mock/status"
                })
            )
        );

        assert_eq!(
            Response::internal_error("abc").into_json().await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Internal Server Error", "requestId": "abc"})
            )
        );
    }
}
