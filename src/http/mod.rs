//! The HTTP server.
//!
//! The module provides everything the mock server exposes via HTTP. A
//! [`HttpListener`] is bound to the configured address and then run with a
//! [`State`] that holds the mock response and the journal shared by all
//! requests.
//!
//! Requests are dispatched by method and path:
//!
//! * `POST /api/data` validates the request and answers with the mock
//!   response,
//! * `POST /mock/control` changes the mock response,
//! * `GET /mock/status` shows the mock response,
//! * `GET /mock/logs` and `DELETE /mock/logs` read and clear the journal,
//! * any other `GET` request is answered with a short liveness message.
//!
//! Everything else results in a 404 response.

pub use self::dispatch::State;
pub use self::listener::HttpListener;

mod control;
mod dispatch;
mod fallback;
mod listener;
mod logs;
mod request;
mod response;
mod status;
mod submit;
