//! Handles endpoints related to the journal.

use std::io;
use hyper::StatusCode;
use log::error;
use serde_json::json;
use super::dispatch::State;
use super::response::{ContentType, Response, ResponseBuilder};


//------------ handle_get ----------------------------------------------------

/// Returns the journal as plain text.
pub async fn handle_get(state: &State) -> Response {
    match state.journal().read_all().await {
        Ok(content) => {
            ResponseBuilder::ok().content_type(ContentType::TEXT).body(content)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Response::error(StatusCode::NOT_FOUND, "Log file not found")
        }
        Err(err) => {
            error!(
                "Failed to read journal {}: {}",
                state.journal().path().display(), err
            );
            Response::error_message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read log file", err
            )
        }
    }
}


//------------ handle_delete -------------------------------------------------

/// Clears the journal.
pub async fn handle_delete(state: &State) -> Response {
    match state.journal().clear().await {
        Ok(()) => {
            Response::json(
                StatusCode::OK,
                &json!({"message": "Logs cleared successfully"})
            )
        }
        Err(err) => {
            error!(
                "Failed to clear journal {}: {}",
                state.journal().path().display(), err
            );
            Response::error_message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to clear logs", err
            )
        }
    }
}
