/// Error types used by multiple modules.
///
/// There are three error types that are used widely within the crate.
///
/// The most common is [`Failed`]. This error indicates that an operation
/// had to be canceled for some reason and callers can assume that all
/// diagnostic information has been logged and they need not do anything
/// further.
///
/// [`ExitError`] is used when the program should be terminated. It provides
/// enough information to determine the exit code of the program.
///
/// Finally, [`InternalError`] is what a request handler returns when it
/// cannot produce a response. It ends up at the recovery boundary of the
/// HTTP server which turns it into a generic 500 response.

use std::{error, fmt};
use std::any::Any;


//------------ Failed --------------------------------------------------------

/// An operation has failed to complete.
///
/// This error types is used to indicate that an operation has failed,
/// diagnostic information has been printed or logged, and the caller can’t
/// really do anything to recover.
#[derive(Clone, Copy, Debug)]
pub struct Failed;


//------------ ExitError -----------------------------------------------------

/// An error happened that should lead to terminating the program.
#[derive(Clone, Copy, Debug)]
pub enum ExitError {
    /// Something has happened.
    ///
    /// This should be exit status 1.
    Generic,
}

impl ExitError {
    /// Returns the process exit code for the error.
    pub fn exit_code(self) -> i32 {
        match self {
            ExitError::Generic => 1,
        }
    }
}

impl From<Failed> for ExitError {
    fn from(_: Failed) -> ExitError {
        ExitError::Generic
    }
}


//------------ InternalError -------------------------------------------------

/// A request handler could not produce a response.
#[derive(Clone, Debug)]
pub struct InternalError {
    message: String,
}

impl InternalError {
    /// Creates a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        InternalError { message: message.into() }
    }

    /// Creates an error from the payload of a caught panic.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        }
        else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        }
        else {
            String::from("handler panicked")
        };
        InternalError { message }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl error::Error for InternalError { }


//============ Tests =========================================================
