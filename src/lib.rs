//! A configurable mock HTTP API.
//!
//! This crate contains all the moving parts of the mock server. The
//! application itself, via `main.rs` is only a very tiny frontend.

pub use self::config::Config;
pub use self::error::ExitError;
pub use self::operation::Operation;

pub mod config;
pub mod error;
pub mod http;
pub mod journal;
pub mod log;
pub mod mock;
pub mod operation;
pub mod process;
pub mod utils;
pub mod validate;
