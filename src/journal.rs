//! The request journal.
//!
//! The journal is a plain text file that receives one line for everything
//! of interest happening to a request. Each line starts with the UTC time
//! of the event in square brackets, followed by a free-form message:
//!
//! ```text
//! [2026-10-19T08:15:30.123Z] Received POST /api/data
//! ```
//!
//! The file is only ever appended to, except that it can be cleared
//! completely. Clients can read and clear it through the HTTP interface.
//!
//! Writing to the journal should never keep a request from being answered.
//! Handlers therefore use [`Journal::record`] which only logs failures to
//! the operator log.

use std::{fmt, fs, io};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::Utc;
use log::error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use crate::utils::date::format_iso_date;


//------------ Journal -------------------------------------------------------

/// Access to the journal file.
#[derive(Debug)]
pub struct Journal {
    /// The path of the journal file.
    path: PathBuf,

    /// Serializes writes so lines from concurrent requests stay intact.
    write_lock: Mutex<()>,
}

impl Journal {
    /// The message written after the journal has been cleared.
    pub const CLEAR_MARKER: &'static str = "Log file cleared";

    /// Creates a journal writing to the given path.
    ///
    /// The file is not touched until the first entry is appended.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Journal {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an entry with the given message.
    ///
    /// The file is created if it doesn’t exist yet.
    pub async fn append(
        &self, message: impl fmt::Display
    ) -> Result<(), io::Error> {
        let line = format_entry(message);
        let _guard = self.write_lock.lock().await;
        self.append_line(&line).await
    }

    /// Appends an entry, logging but otherwise ignoring any failure.
    pub async fn record(&self, message: impl fmt::Display) {
        if let Err(err) = self.append(message).await {
            error!(
                "Failed to write to journal {}: {}",
                self.path.display(), err
            );
        }
    }

    /// Appends an entry in a separately spawned task.
    ///
    /// The method returns immediately. There is no guarantee when the
    /// entry will be written relative to anything the caller does next,
    /// and it may be lost entirely if the process shuts down first.
    ///
    /// This must be called from within a Tokio runtime.
    pub fn record_detached(self: &Arc<Self>, message: String) {
        let journal = self.clone();
        tokio::spawn(async move {
            journal.record(message).await
        });
    }

    /// Appends an entry synchronously.
    ///
    /// This is for places where we cannot wait for a future, most notably
    /// the panic hook. It bypasses the write lock. Failures are logged.
    pub fn record_blocking(&self, message: impl fmt::Display) {
        let line = format_entry(message);
        let res = fs::OpenOptions::new()
            .create(true).append(true).open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(err) = res {
            error!(
                "Failed to write to journal {}: {}",
                self.path.display(), err
            );
        }
    }

    /// Returns the complete content of the journal.
    ///
    /// If the file doesn’t exist, returns an error of kind
    /// `io::ErrorKind::NotFound`.
    pub async fn read_all(&self) -> Result<String, io::Error> {
        tokio::fs::read_to_string(&self.path).await
    }

    /// Clears the journal.
    ///
    /// Truncates the file, creating it if necessary, and then appends a
    /// single entry noting that it has been cleared.
    pub async fn clear(&self) -> Result<(), io::Error> {
        let line = format_entry(Self::CLEAR_MARKER);
        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&self.path, b"").await?;
        self.append_line(&line).await
    }

    /// Appends an already formatted line to the file.
    async fn append_line(&self, line: &str) -> Result<(), io::Error> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}


//------------ Helpers -------------------------------------------------------

/// Formats a journal entry for the current time.
///
/// The returned string includes the final line feed.
fn format_entry(message: impl fmt::Display) -> String {
    format!("[{}] {}\n", format_iso_date(Utc::now()), message)
}


//============ Tests =========================================================
