//! The control endpoint.

use hyper::StatusCode;
use serde_json::{json, Map, Value};
use crate::mock::MockUpdate;
use crate::validate::check_content_type;
use super::dispatch::State;
use super::request::Request;
use super::response::Response;


//------------ handle_post ---------------------------------------------------

/// Updates the mock response.
///
/// A request that doesn’t declare a JSON body results in an empty update,
/// as does a JSON body that isn’t an object. Only a body declared as JSON
/// that fails to parse is an error.
pub async fn handle_post(req: &Request, state: &State) -> Response {
    let update = match decode_body(req) {
        Ok(value) => MockUpdate::from_json(value),
        Err(response) => return response,
    };
    let config = state.mock().set(update).to_json();
    state.journal().record(
        format!("Mock configuration updated: {}", config)
    ).await;
    Response::json(
        StatusCode::OK,
        &json!({
            "message": "Mock configuration updated",
            "config": config,
        })
    )
}

fn decode_body(req: &Request) -> Result<Value, Response> {
    let is_json = check_content_type(req.content_type()).is_ok();
    if !is_json || req.body().iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()))
    }
    serde_json::from_slice(req.body()).map_err(|_| {
        Response::bad_request("Malformed JSON body")
    })
}


//============ Tests =========================================================
