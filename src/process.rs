//! Managing the process the mock server runs in.

use std::future::Future;
use std::panic;
use std::sync::Arc;
use log::error;
use tokio::runtime::Runtime;
use crate::config::Config;
use crate::error::Failed;
use crate::journal::Journal;
use crate::log::Logger;


//------------ Process -------------------------------------------------------

/// A representation of the process the mock server runs in.
///
/// This type provides access to the configuration and takes care of the
/// process-wide bits of the environment: logging, the panic hook, and the
/// async runtime.
pub struct Process {
    config: Config,
}

impl Process {
    /// Prepares the process.
    ///
    /// Call this before doing anything else. It sets up logging to stderr so
    /// that problems with the command line can be reported.
    pub fn init() -> Result<(), Failed> {
        Logger::init()
    }

    /// Creates a new process object.
    pub fn new(config: Config) -> Self {
        Process { config }
    }

    /// Returns a reference to the config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Switches logging to the configured target.
    pub fn switch_logging(&self) -> Result<(), Failed> {
        Logger::switch_logging(&self.config)
    }

    /// Installs a panic hook that records panics in the journal.
    ///
    /// The previous hook is kept and called afterwards. Panics inside
    /// request handlers are caught and answered, but they still pass
    /// through here first.
    pub fn install_panic_hook(&self, journal: Arc<Journal>) {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            error!("Uncaught error: {}", info);
            journal.record_blocking(format!("Uncaught error: {}", info));
            prev(info)
        }));
    }
}

/// # Tokio Runtime
///
impl Process {
    /// Returns a Tokio runtime based on the configuration.
    pub fn runtime(&self) -> Result<Runtime, Failed> {
        Runtime::new().map_err(|err| {
            error!("Failed to create runtime: {}", err);
            Failed
        })
    }

    /// Runs a future to completion atop a Tokio runtime.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output, Failed> {
        Ok(self.runtime()?.block_on(future))
    }
}
