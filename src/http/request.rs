//! Request handling.

use bytes::Bytes;
use hyper::{Body, Method, Uri};
use hyper::body::HttpBody;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap};
#[cfg(test)] use hyper::header::HeaderName;
use log::debug;
use serde_json::{Map, Value};
use super::response::Response;


//------------ Request -------------------------------------------------------

/// A request with its body fully read.
///
/// Handlers never see the body as a stream. It is collected up front by
/// [`from_hyper`] which also enforces the size limit.
///
/// [`from_hyper`]: #method.from_hyper
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Collects a hyper request.
    ///
    /// If the body is larger than `limit` bytes, returns a 413 response
    /// instead. This happens as early as possible, i.e., right away if the
    /// request declares its length and as soon as the limit is crossed
    /// otherwise.
    pub async fn from_hyper(
        req: hyper::Request<Body>,
        limit: usize,
    ) -> Result<Self, Response> {
        let (parts, mut body) = req.into_parts();
        if let Some(len) = content_length(&parts.headers) {
            if len > limit as u64 {
                debug!(
                    "Rejecting {} {}: declared body size {} exceeds limit.",
                    parts.method, parts.uri, len
                );
                return Err(Response::payload_too_large(limit))
            }
        }
        let mut data = Vec::new();
        while let Some(chunk) = body.data().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    debug!(
                        "Failed to read body of {} {}: {}",
                        parts.method, parts.uri, err
                    );
                    return Err(Response::bad_request(
                        "Failed to read request body"
                    ))
                }
            };
            if data.len() + chunk.len() > limit {
                debug!(
                    "Rejecting {} {}: body exceeds limit.",
                    parts.method, parts.uri
                );
                return Err(Response::payload_too_large(limit))
            }
            data.extend_from_slice(&chunk);
        }
        Ok(Request {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: data.into(),
        })
    }

    /// Creates a request from its parts.
    #[cfg(test)]
    pub fn new(
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                value.parse().unwrap()
            );
        }
        Request {
            method,
            uri: uri.parse().unwrap(),
            headers: map,
            body: body.into(),
        }
    }

    /// Returns the method of the request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URI of the request.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the content of the Content-Type header if there is one.
    ///
    /// A header value that isn’t visible ASCII is treated as missing.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }

    /// Returns the body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the headers as a JSON object for the journal.
    ///
    /// Header names are lowercase. Repeated headers are joined with a
    /// comma. Values that aren’t valid UTF-8 are converted lossily.
    pub fn headers_json(&self) -> Value {
        let mut res = Map::new();
        for name in self.headers.keys() {
            let value = self.headers.get_all(name).iter().map(|value| {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            }).collect::<Vec<_>>().join(", ");
            res.insert(name.as_str().into(), value.into());
        }
        Value::Object(res)
    }
}


//------------ Helpers -------------------------------------------------------

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use hyper::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn collect_body() {
        let req = hyper::Request::post("/api/data?x=1")
            .header("Content-Type", "application/json")
            .body(Body::from("{\"users\":[]}"))
            .unwrap();
        let req = Request::from_hyper(req, 1024).await.unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/api/data");
        assert_eq!(req.content_type(), Some("application/json"));
        assert_eq!(req.body().as_ref(), b"{\"users\":[]}");
    }

    #[tokio::test]
    async fn body_limit() {
        let req = hyper::Request::post("/api/data")
            .header("Content-Length", "11")
            .body(Body::from("01234567890"))
            .unwrap();
        let res = Request::from_hyper(req, 10).await.unwrap_err();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Without a declared length, we find out while reading.
        let (mut sender, body) = Body::channel();
        tokio::spawn(async move {
            let _ = sender.send_data(Bytes::from_static(b"012345")).await;
            let _ = sender.send_data(Bytes::from_static(b"678901")).await;
        });
        let req = hyper::Request::post("/api/data").body(body).unwrap();
        let res = Request::from_hyper(req, 10).await.unwrap_err();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Exactly at the limit is fine.
        let req = hyper::Request::post("/api/data")
            .body(Body::from("0123456789"))
            .unwrap();
        assert!(Request::from_hyper(req, 10).await.is_ok());
    }

    #[test]
    fn headers_json() {
        let req = Request::new(
            Method::GET, "/",
            &[
                ("Accept", "text/plain"),
                ("X-Thing", "a"),
                ("X-Thing", "b"),
            ],
            Bytes::new(),
        );
        assert_eq!(
            req.headers_json(),
            json!({"accept": "text/plain", "x-thing": "a, b"})
        );
    }
}
