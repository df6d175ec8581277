//! The data endpoint.
//!
//! Requests are validated and then answered with whatever the mock response
//! is currently configured to.

use crate::error::InternalError;
use crate::mock::simulate_delay;
use crate::validate::validate;
use super::dispatch::State;
use super::request::Request;
use super::response::Response;


//------------ handle_post ---------------------------------------------------

pub async fn handle_post(
    req: &Request,
    state: &State,
) -> Result<Response, InternalError> {
    let journal = state.journal();
    journal.record(
        format!("Received {} {}", req.method(), req.path())
    ).await;

    let body = match validate(req.content_type(), req.body()) {
        Ok(body) => body,
        Err(rejection) => {
            journal.record(format!(
                "Validation failed ({}): {}",
                rejection.status().as_u16(), rejection
            )).await;
            return Ok(Response::error_message(
                rejection.status(), rejection.error(), rejection
            ))
        }
    };

    journal.record(format!(
        "Request: {} {} headers={} body={}",
        req.method(), req.path(), req.headers_json(), body
    )).await;

    let mock = state.mock().get();
    if let Some(delay) = mock.delay() {
        journal.record(format!("Delaying response by {:?}", delay)).await;
        simulate_delay(delay).await;
    }

    let status = mock.status()?;
    journal.record(format!(
        "Responding with status {}: {}",
        status.as_u16(), mock.response_body
    )).await;
    Ok(Response::json(status, &mock.response_body))
}


//============ Tests =========================================================
