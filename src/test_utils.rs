#![allow(dead_code)]
//! Shared fakes for unit tests

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::gateway::{ByteStream, EventSource, GatewayError, ServiceApi};
use crate::model::{ConfigDocument, LogEntry, ServiceState, ServiceStatus};

/// RAII helper: set `XDG_CONFIG_HOME` to a tempdir for the lifetime of this guard.
///
/// Tests that use it must hold [`XDG_LOCK`] so no other test reads the variable meanwhile.
pub(crate) struct XdgTemp {
    prev: Option<OsString>,
    dir: tempfile::TempDir,
}

/// Serializes tests that touch process environment
pub(crate) static XDG_LOCK: Mutex<()> = Mutex::new(());

impl XdgTemp {
    /// Create and activate a temporary `XDG_CONFIG_HOME`.
    ///
    /// # Panics
    ///
    /// Panics if a temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir for XDG_CONFIG_HOME");
        let prev = std::env::var_os("XDG_CONFIG_HOME");
        // SAFETY: callers hold XDG_LOCK, so no other thread reads the environment concurrently
        unsafe { std::env::set_var("XDG_CONFIG_HOME", dir.path()) };
        Self { prev, dir }
    }

    /// Path to the temporary `XDG_CONFIG_HOME` directory.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Drop for XdgTemp {
    fn drop(&mut self) {
        // SAFETY: see `XdgTemp::new`
        unsafe {
            if let Some(ref val) = self.prev {
                std::env::set_var("XDG_CONFIG_HOME", val);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }
}

/// JSON text of an `INFO` entry, as the service would put in an event's `data` field
pub(crate) fn entry_json(created: f64, message: &str) -> String {
    serde_json::to_string(&LogEntry::new(created, "INFO", message)).expect("serialize entry")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceMode {
    Scripted,
    Refusing,
    Pending,
}

/// Counts itself out of `open` when the connection's stream is dropped
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

type Chunk = Result<Bytes, GatewayError>;

/// In-memory [`EventSource`]
///
/// - `new(script)`: every connection replays `script` and then ends; `Err(text)` items
///   become an I/O error mid-stream.
/// - `refusing()`: every connect fails with a 503.
/// - `pending()`: connections stay open until dropped; [`ScriptedSource::push`] feeds them.
pub(crate) struct ScriptedSource {
    mode: SourceMode,
    script: Vec<Result<String, String>>,
    senders: Mutex<Vec<mpsc::UnboundedSender<Chunk>>>,
    open: Arc<AtomicUsize>,
    connects: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self::with_mode(SourceMode::Scripted, script)
    }

    pub fn refusing() -> Self {
        Self::with_mode(SourceMode::Refusing, Vec::new())
    }

    pub fn pending() -> Self {
        Self::with_mode(SourceMode::Pending, Vec::new())
    }

    fn with_mode(mode: SourceMode, script: Vec<Result<String, String>>) -> Self {
        Self {
            mode,
            script,
            senders: Mutex::new(Vec::new()),
            open: Arc::new(AtomicUsize::new(0)),
            connects: AtomicUsize::new(0),
        }
    }

    /// Send raw bytes to every connection that is still open
    pub fn push(&self, chunk: String) {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|tx| tx.send(Ok(Bytes::from(chunk.clone()))).is_ok());
    }

    /// Connections whose stream has not been dropped yet
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn total_connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn connect(&self) -> Result<ByteStream, GatewayError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.mode == SourceMode::Refusing {
            return Err(GatewayError::Status {
                status: 503,
                message: "stream unavailable".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        match self.mode {
            SourceMode::Scripted => {
                for item in &self.script {
                    let chunk = match item {
                        Ok(text) => Ok(Bytes::from(text.clone())),
                        Err(text) => Err(GatewayError::Io(std::io::Error::other(text.clone()))),
                    };
                    let _ = tx.send(chunk);
                }
                // Sender dropped here: the stream ends after the script
            }
            SourceMode::Pending => self.senders.lock().unwrap().push(tx),
            SourceMode::Refusing => unreachable!(),
        }

        self.open.fetch_add(1, Ordering::SeqCst);
        let guard = ConnectionGuard(Arc::clone(&self.open));
        let stream = futures_util::stream::unfold((rx, guard), |(mut rx, guard)| async move {
            rx.recv().await.map(|chunk| (chunk, (rx, guard)))
        });
        Ok(stream.boxed())
    }
}

/// Calls recorded by [`FakeService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Status,
    Start,
    Stop,
    Reload,
    Config,
    SaveConfig { content: String, reload: bool },
    Logs,
}

/// In-memory service
///
/// Start and stop flip the reported state. [`FakeService::fail_next`] queues a failure for
/// the next call of any kind (a 500 carrying the given body); [`FakeService::pass_next`]
/// queues a success, so a later call in a sequence can be the one that fails.
pub(crate) struct FakeService {
    state: Mutex<ServiceState>,
    config: Mutex<ConfigDocument>,
    logs: Mutex<Vec<LogEntry>>,
    failures: Mutex<VecDeque<Option<String>>>,
    calls: Mutex<Vec<Call>>,
    events: ScriptedSource,
}

impl FakeService {
    pub fn new(state: ServiceState) -> Self {
        Self {
            state: Mutex::new(state),
            config: Mutex::new(ConfigDocument {
                content: "poster:\n  enabled: true\n".to_string(),
                path: Some("/etc/poster/config.yaml".to_string()),
            }),
            logs: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            events: ScriptedSource::pending(),
        }
    }

    pub fn with_logs(self, entries: Vec<LogEntry>) -> Self {
        *self.logs.lock().unwrap() = entries;
        self
    }

    pub fn fail_next(&self, body: &str) {
        self.failures.lock().unwrap().push_back(Some(body.to_string()));
    }

    pub fn pass_next(&self) {
        self.failures.lock().unwrap().push_back(None);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> &ScriptedSource {
        &self.events
    }

    pub fn config_content(&self) -> String {
        self.config.lock().unwrap().content.clone()
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front().flatten() {
            Some(message) => Err(GatewayError::Status {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ServiceApi for FakeService {
    async fn status(&self) -> Result<ServiceStatus, GatewayError> {
        self.record(Call::Status)?;
        let mut status = ServiceStatus::with_state(*self.state.lock().unwrap());
        status.config_path = self.config.lock().unwrap().path.clone();
        Ok(status)
    }

    async fn start(&self) -> Result<(), GatewayError> {
        self.record(Call::Start)?;
        *self.state.lock().unwrap() = ServiceState::Running;
        Ok(())
    }

    async fn stop(&self) -> Result<(), GatewayError> {
        self.record(Call::Stop)?;
        *self.state.lock().unwrap() = ServiceState::Stopped;
        Ok(())
    }

    async fn reload(&self) -> Result<(), GatewayError> {
        self.record(Call::Reload)
    }

    async fn config(&self) -> Result<ConfigDocument, GatewayError> {
        self.record(Call::Config)?;
        Ok(self.config.lock().unwrap().clone())
    }

    async fn save_config(&self, content: &str, reload: bool) -> Result<(), GatewayError> {
        self.record(Call::SaveConfig {
            content: content.to_string(),
            reload,
        })?;
        self.config.lock().unwrap().content = content.to_string();
        Ok(())
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, GatewayError> {
        self.record(Call::Logs)?;
        Ok(self.logs.lock().unwrap().clone())
    }
}

#[async_trait]
impl EventSource for FakeService {
    async fn connect(&self) -> Result<ByteStream, GatewayError> {
        self.events.connect().await
    }
}
