//! The HTTP listener.

use std::io;
use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener as StdListener};
use std::sync::Arc;
use hyper::Server;
use hyper::service::{make_service_fn, service_fn};
use log::error;
use crate::error::Failed;
use super::dispatch::State;


//------------ HttpListener --------------------------------------------------

/// A bound but not yet running HTTP listener.
///
/// Binding happens synchronously so that a failure to bind is reported
/// before anything else starts up.
#[derive(Debug)]
pub struct HttpListener {
    listener: StdListener,
}

impl HttpListener {
    /// Binds a listener to the given address.
    pub fn bind(addr: SocketAddr) -> Result<Self, Failed> {
        let listener = match StdListener::bind(addr) {
            Ok(listener) => listener,
            Err(err) => {
                error!("Fatal: error listening on {}: {}", addr, err);
                return Err(Failed)
            }
        };
        if let Err(err) = listener.set_nonblocking(true) {
            error!("Fatal: error switching {} to nonblocking: {}", addr, err);
            return Err(Failed)
        }
        Ok(HttpListener { listener })
    }

    /// Returns the address the listener is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.listener.local_addr()
    }

    /// Serves requests until the server breaks.
    ///
    /// Must be run inside a Tokio runtime. Normally, the returned future
    /// never resolves. If it does, the error has been logged.
    pub async fn run(self, state: Arc<State>) -> Result<(), Failed> {
        let make_service = make_service_fn(|_conn| {
            let state = state.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    let state = state.clone();
                    async move {
                        state.handle_hyper(req).await.into_hyper()
                    }
                }))
            }
        });
        let server = match Server::from_tcp(self.listener) {
            Ok(server) => server,
            Err(err) => {
                error!("Failed on HTTP listener: {}", err);
                return Err(Failed)
            }
        };
        if let Err(err) = server.serve(make_service).await {
            error!("HTTP server error: {}", err);
            return Err(Failed)
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use hyper::{Body, Client, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use crate::config::Config;
    use crate::journal::Journal;
    use crate::mock::SharedMock;

    async fn request(
        client: &Client<hyper::client::HttpConnector>,
        method: Method, uri: String, body: &'static str,
    ) -> (StatusCode, hyper::HeaderMap, Value) {
        let res = client.request(
            Request::builder()
                .method(method).uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body)).unwrap()
        ).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
        (status, headers, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn serve_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            listen: "127.0.0.1:0".parse().unwrap(),
            journal_file: dir.path().join("simple-mock.log"),
            max_body_size: 48,
            ..Default::default()
        };
        let listener = HttpListener::bind(config.listen).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(State::new(
            &config, SharedMock::default(),
            Arc::new(Journal::new(config.journal_file.clone()))
        ));
        tokio::spawn(listener.run(state));

        let client = Client::new();
        let (status, headers, body) = request(
            &client, Method::POST, format!("http://{}/mock/control", addr),
            r#"{"statusCode": 202}"#
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        assert_eq!(body["config"]["statusCode"], json!(202));

        let (status, _, body) = request(
            &client, Method::POST, format!("http://{}/api/data", addr),
            r#"{"users": [{"login": "x"}]}"#
        ).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["success"], json!(true));

        let (status, _, body) = request(
            &client, Method::POST, format!("http://{}/api/data", addr),
            r#"{"users": [{"login": "this is going to be way too long"}]}"#
        ).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], json!("Payload Too Large"));
    }

    #[test]
    fn bind_conflict() {
        let first = HttpListener::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        assert!(HttpListener::bind(first.local_addr().unwrap()).is_err());
    }
}
