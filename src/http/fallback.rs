//! Answers all GET requests nobody else wants.

use hyper::StatusCode;
use serde_json::json;
use crate::utils::date::now_iso;
use super::dispatch::State;
use super::request::Request;
use super::response::Response;


//------------ handle_get ----------------------------------------------------

/// Confirms that the server is running.
///
/// The journal entry is written in the background. The response may well
/// be sent before it is.
pub fn handle_get(req: &Request, state: &State) -> Response {
    state.journal().record_detached(
        format!("GET request to {}", req.path())
    );
    Response::json(
        StatusCode::OK,
        &json!({
            "message": "Mock API is running",
            "path": req.path(),
            "timestamp": now_iso(),
        })
    )
}
