//! The status endpoint.

use hyper::StatusCode;
use serde_json::json;
use crate::utils::date::now_iso;
use super::dispatch::State;
use super::response::Response;


//------------ handle_get ----------------------------------------------------

pub fn handle_get(state: &State) -> Response {
    Response::json(
        StatusCode::OK,
        &json!({
            "status": "running",
            "timestamp": now_iso(),
            "config": state.mock().get().to_json(),
        })
    )
}
