//! Rules on how to dispatch a request.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::FutureExt;
use hyper::{Body, Method};
use log::error;
use uuid::Uuid;
use crate::config::Config;
use crate::error::InternalError;
use crate::journal::Journal;
use crate::mock::SharedMock;
use super::{control, fallback, logs, status, submit};
use super::request::Request;
use super::response::Response;


//------------ State ---------------------------------------------------------

/// Everything the handlers need.
pub struct State {
    mock: SharedMock,
    journal: Arc<Journal>,
    max_body_size: usize,
}

impl State {
    pub fn new(
        config: &Config,
        mock: SharedMock,
        journal: Arc<Journal>,
    ) -> Self {
        State {
            mock,
            journal,
            max_body_size: config.max_body_size,
        }
    }

    pub fn mock(&self) -> &SharedMock {
        &self.mock
    }

    pub fn journal(&self) -> &Arc<Journal> {
        &self.journal
    }

    /// Handles a request as received from hyper.
    pub async fn handle_hyper(&self, req: hyper::Request<Body>) -> Response {
        match Request::from_hyper(req, self.max_body_size).await {
            Ok(req) => self.handle_request(req).await,
            Err(response) => response,
        }
    }

    /// Handles a request.
    pub async fn handle_request(&self, req: Request) -> Response {
        self.recover(&req, self.route(&req)).await
    }

    /// Runs a handler, turning errors and panics into a 500 response.
    ///
    /// The failure is recorded in the journal under a fresh request ID and
    /// the client receives a generic response with nothing but that ID.
    async fn recover<F>(&self, req: &Request, handler: F) -> Response
    where F: Future<Output = Result<Response, InternalError>> {
        let err = match AssertUnwindSafe(handler).catch_unwind().await {
            Ok(Ok(response)) => return response,
            Ok(Err(err)) => err,
            Err(panic) => InternalError::from_panic(panic),
        };
        let request_id = Uuid::new_v4().to_string();
        error!(
            "Request {} {} ({}) failed: {}",
            req.method(), req.uri(), request_id, err
        );
        self.journal.record(
            format!("[{}] Error: {}", request_id, err)
        ).await;
        self.journal.record(
            format!("[{}] URL: {} {}", request_id, req.method(), req.uri())
        ).await;
        self.journal.record(
            format!("[{}] Headers: {}", request_id, req.headers_json())
        ).await;
        Response::internal_error(&request_id)
    }

    /// Picks the handler for a request.
    ///
    /// HEAD requests are routed like GET requests. Hyper drops the body.
    async fn route(&self, req: &Request) -> Result<Response, InternalError> {
        let method = match *req.method() {
            Method::HEAD => &Method::GET,
            ref method => method,
        };
        match (method, req.path()) {
            (&Method::POST, "/api/data") => {
                submit::handle_post(req, self).await
            }
            (&Method::POST, "/mock/control") => {
                Ok(control::handle_post(req, self).await)
            }
            (&Method::GET, "/mock/status") => Ok(status::handle_get(self)),
            (&Method::GET, "/mock/logs") => Ok(logs::handle_get(self).await),
            (&Method::DELETE, "/mock/logs") => {
                Ok(logs::handle_delete(self).await)
            }
            (&Method::GET, _) => Ok(fallback::handle_get(req, self)),
            _ => Ok(Response::no_route(req))
        }
    }
}


//============ Tests =========================================================
