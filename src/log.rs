//! Operator logging.
//!
//! All diagnostic output of the mock server goes through the `log` crate.
//! This module provides the backend that writes it out, either to stderr
//! or to a file. It is unrelated to the request journal that clients can
//! read over HTTP; see the [`journal`][crate::journal] module for that.

use std::{fs, io, process};
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use log::{LevelFilter, error};
use crate::config::{Config, LogTarget};
use crate::error::Failed;
use crate::utils::date::format_local_iso_date;
use crate::utils::sync::Mutex;


//------------ Logger --------------------------------------------------------

/// Format and write log messages.
pub struct Logger {
    /// Where to write messages to.
    target: Mutex<LogBackend>,

    /// The maximum log level.
    log_level: LevelFilter,
}

/// The actual target for logging
enum LogBackend {
    File {
        file: fs::File,
        path: PathBuf,
    },
    Stderr {
        stderr: io::Stderr,
    }
}

impl Logger {
    /// Initialize logging.
    ///
    /// It is important to initialize logging before doing anything else
    /// that may result in diagnostic output. This function does exactly
    /// that. It sets a maximum log level of `warn`, leading only printing
    /// important information, and directs all logging to stderr.
    pub fn init() -> Result<(), Failed> {
        log::set_max_level(LevelFilter::Warn);
        if let Err(err) = log::set_logger(&GLOBAL_LOGGER) {
            eprintln!("Failed to initialize logger: {err}.\nAborting.");
            return Err(Failed)
        }
        Ok(())
    }

    /// Switches logging to the configured target.
    ///
    /// Once the configuration has been successfully loaded, logging should
    /// be switched to whatever the user asked for via this method.
    pub fn switch_logging(config: &Config) -> Result<(), Failed> {
        let logger = Logger::new(config)?;
        GLOBAL_LOGGER.switch(logger)?;
        log::set_max_level(config.log_level);
        Ok(())
    }

    /// Creates a new logger from the config.
    fn new(config: &Config) -> Result<Self, Failed> {
        let target = match config.log_target {
            LogTarget::File(ref path) => {
                Self::new_file_target(path.clone())?
            }
            LogTarget::Stderr => {
                LogBackend::Stderr { stderr: io::stderr() }
            }
        };
        Ok(Self {
            target: Mutex::new(target),
            log_level: config.log_level,
        })
    }

    fn new_file_target(path: PathBuf) -> Result<LogBackend, Failed> {
        Ok(LogBackend::File {
            file: match Self::open_log_file(&path) {
                Ok(file) => file,
                Err(err) => {
                    error!(
                        "Failed to open log file '{}': {}",
                        path.display(), err
                    );
                    return Err(Failed)
                }
            },
            path
        })
    }

    /// Opens a log file.
    fn open_log_file(path: &Path) -> Result<fs::File, io::Error> {
        fs::OpenOptions::new().create(true).append(true).open(path)
    }

    /// Logs a message.
    ///
    /// This method may exit the whole process if logging fails.
    fn log(&self, record: &log::Record) {
        if self.should_ignore(record) {
            return;
        }
        if let Err(err) = self.try_log(record) {
            self.log_failure(err);
        }
    }

    /// Tries logging a message and returns an error if there is one.
    fn try_log(&self, record: &log::Record) -> Result<(), io::Error> {
        match self.target.lock().deref_mut() {
            LogBackend::File { ref mut file, .. } => {
                writeln!(
                    file, "[{}] [{}] {}",
                    format_local_iso_date(chrono::Local::now()),
                    record.level(),
                    record.args()
                )
            }
            LogBackend::Stderr { ref mut stderr } => {
                // We never fail when writing to stderr.
                let _ = writeln!(
                    stderr, "[{}] [{}] {}",
                    format_local_iso_date(chrono::Local::now()),
                    record.level(),
                    record.args()
                );
                Ok(())
            }
        }
    }

    /// Handles an error that happened during logging.
    fn log_failure(&self, err: io::Error) -> ! {
        // We try to write a meaningful message to stderr and then abort.
        if let LogBackend::File { ref path, .. } = self.target.lock().deref() {
            eprintln!(
                "Logging to file {} failed: {}. Exiting.",
                path.display(),
                err
            );
        }
        process::exit(1)
    }

    /// Flushes the logging backend.
    fn flush(&self) {
        match self.target.lock().deref_mut() {
            LogBackend::File { ref mut file, .. } => {
                let _ = file.flush();
            }
            LogBackend::Stderr { ref mut stderr } => {
                let _  = stderr.lock().flush();
            }
        }
    }

    /// Determines whether a log record should be ignored.
    ///
    /// This filters out messages by libraries that we don’t really want to
    /// see.
    fn should_ignore(&self, record: &log::Record) -> bool {
        let module = match record.module_path() {
            Some(module) => module,
            None => return false,
        };

        if self.log_level >= LevelFilter::Trace {
            // Don’t filter anything if we are in trace.
            return false
        }

        // Ignore these modules unless INFO or more important.
        //
        // log::Level sorts more important first.
        record.level() > log::Level::Info && (
               module.starts_with("hyper")
            || module.starts_with("tokio")
            || module.starts_with("mio")
        )
    }
}


//------------ GlobalLogger --------------------------------------------------

/// The global logger.
///
/// A value of this type can go into a static. Until a proper logger is
/// installed, it just writes all log output to stderr.
struct GlobalLogger {
    /// The real logger. Can only be set once.
    inner: OnceLock<Logger>,
}

/// The static for the log crate.
static GLOBAL_LOGGER: GlobalLogger = GlobalLogger::new();

impl GlobalLogger {
    /// Creates a new provisional logger.
    const fn new() -> Self {
        GlobalLogger { inner: OnceLock::new() }
    }

    /// Switches to the proper logger.
    fn switch(&self, logger: Logger) -> Result<(), Failed> {
        if self.inner.set(logger).is_err() {
            error!("Tried to switch logger more than once.");
            return Err(Failed)
        }
        Ok(())
    }
}


impl log::Log for GlobalLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        match self.inner.get() {
            Some(logger) => logger.log(record),
            None => {
                let _ = writeln!(
                    io::stderr().lock(), "[{}] {}",
                    record.level(), record.args()
                );
            }
        }
    }

    fn flush(&self) {
        if let Some(logger) = self.inner.get() {
            logger.flush()
        }
    }
}


//============ Tests =========================================================
