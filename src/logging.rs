//! Logging setup
//!
//! - CLI commands log to stderr through `tracing_subscriber::fmt`.
//! - The panel cannot write to the terminal it draws on, so it captures events for its
//!   diagnostics overlay (`tui_logger`) and mirrors them to a size-rotated file.
//!
//! Both honour `RUST_LOG`; otherwise only `bpctl` events at the configured level pass.

use color_eyre::eyre::{self, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// File name of the panel's log inside [`log_dir`]
pub const PANEL_LOG_FILE: &str = "panel.log";

/// Size at which the panel log is rotated
pub const PANEL_LOG_MAX_BYTES: u64 = 1_000_000;

/// Filter from `RUST_LOG`, falling back to `bpctl=<level>`
#[must_use]
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("bpctl={log_level}")))
}

/// Directory holding the panel log (`$XDG_DATA_HOME/bpctl`)
///
/// # Errors
/// Returns an error if the data directory cannot be determined.
pub fn log_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .ok_or_else(|| eyre::eyre!("Could not determine data directory"))?
        .join("bpctl"))
}

/// Initialize logging for one-shot CLI commands
pub fn init_cli(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .with_writer(io::stderr)
        .init();
}

/// Initialize logging for the interactive panel
///
/// Returns the guard of the background file writer; keep it alive until the panel exits
/// so buffered lines are flushed.
///
/// # Errors
/// Returns an error if the log directory cannot be determined.
#[cfg(feature = "tui")]
pub fn init_tui(log_level: &str) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tui_logger::TuiTracingSubscriberLayer;

    let appender = RotatingFileAppender::new(log_dir()?, PANEL_LOG_FILE, PANEL_LOG_MAX_BYTES);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(TuiTracingSubscriberLayer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    Ok(guard)
}

/// Panel log file that is moved to `<name>.old` once it reaches a size limit
///
/// At most two files exist: the live one and a single backup. A live file removed by
/// someone else is created again on the next write. New files are private (0o600).
pub struct RotatingFileAppender {
    path: PathBuf,
    backup_path: PathBuf,
    max_size_bytes: u64,
    open: Mutex<Option<OpenLog>>,
}

/// Live file handle with the number of bytes it holds
struct OpenLog {
    file: File,
    len: u64,
}

impl RotatingFileAppender {
    pub fn new(dir: impl Into<PathBuf>, filename: &str, max_size_bytes: u64) -> Self {
        let dir = dir.into();
        Self {
            path: dir.join(filename),
            backup_path: dir.join(format!("{filename}.old")),
            max_size_bytes,
            open: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    fn create_live(&self, truncate: bool) -> io::Result<OpenLog> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut options = fs::OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        #[cfg(unix)]
        options.mode(0o600);

        let file = options.open(&self.path)?;
        let len = file.metadata()?.len();
        Ok(OpenLog { file, len })
    }

    /// Live handle, re-created if the file vanished and rotated if it is full
    fn live<'a>(&self, slot: &'a mut Option<OpenLog>) -> io::Result<&'a mut OpenLog> {
        if slot.is_some() && !self.path.exists() {
            *slot = None;
        }

        let full = slot.as_ref().is_some_and(|log| log.len >= self.max_size_bytes);
        if full {
            *slot = None;
            // Stderr belongs to the panel; a failed rename just keeps appending
            if fs::rename(&self.path, &self.backup_path).is_ok() {
                *slot = Some(self.create_live(true)?);
            }
        }

        if slot.is_none() {
            *slot = Some(self.create_live(false)?);
        }
        slot.as_mut()
            .ok_or_else(|| io::Error::other("panel log not open"))
    }
}

fn lock_poisoned<T>(e: &std::sync::PoisonError<T>) -> io::Error {
    io::Error::other(format!("panel log lock poisoned: {e}"))
}

impl Write for RotatingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut slot = self.open.lock().map_err(|e| lock_poisoned(&e))?;
        let log = self.live(&mut slot)?;
        log.file.write_all(buf)?;
        log.len += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut slot = self.open.lock().map_err(|e| lock_poisoned(&e))?;
        match slot.as_mut() {
            Some(log) => log.file.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_into_single_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut appender = RotatingFileAppender::new(dir.path(), "panel.log", 10);

        appender.write_all(b"0123456789").unwrap();
        appender.write_all(b"second").unwrap();
        appender.write_all(b"third").unwrap();
        appender.flush().unwrap();

        assert_eq!(fs::read_to_string(appender.backup_path()).unwrap(), "0123456789");
        assert_eq!(fs::read_to_string(appender.path()).unwrap(), "secondthird");
    }

    #[test]
    fn recreates_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut appender = RotatingFileAppender::new(dir.path().join("nested"), "panel.log", 1024);

        appender.write_all(b"one\n").unwrap();
        fs::remove_file(appender.path()).unwrap();
        appender.write_all(b"two\n").unwrap();

        assert_eq!(fs::read_to_string(appender.path()).unwrap(), "two\n");
    }
}
