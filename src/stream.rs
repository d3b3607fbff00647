//! Live log channel
//!
//! Opens the service's server-sent events endpoint and forwards every decoded
//! [`LogEntry`] to a subscriber callback.
//!
//! ## Closure policy
//!
//! - A payload that is not a valid `LogEntry` is dropped with a `warn!`; the channel keeps running.
//! - Any transport failure (connect error, non-2xx, I/O error mid-stream, end of stream) closes
//!   the channel for good, as does an unfinished event larger than [`MAX_PENDING_BYTES`]. There is no automatic reconnect; the owner re-opens it.
//! - [`Subscription::cancel`] is idempotent and also runs on drop, so an owner going away
//!   always releases the connection.

use bytes::BytesMut;
use futures_util::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::gateway::EventSource;
use crate::model::LogEntry;

/// Largest event the decoder will hold while waiting for its terminator
pub const MAX_PENDING_BYTES: usize = 1 << 20;

/// The server sent more than the decoder's limit without finishing an event
#[derive(Debug, thiserror::Error)]
#[error("event stream sent more than {limit} bytes without completing an event")]
pub struct EventTooLarge {
    pub limit: usize,
}

/// Incremental decoder for the `text/event-stream` wire format
///
/// Feed it raw chunks as they arrive; it yields the `data` payload of every complete
/// event. Chunk boundaries may fall anywhere, including inside a UTF-8 sequence or
/// between `\r` and `\n`.
#[derive(Debug)]
pub struct SseDecoder {
    buf: BytesMut,
    data: Vec<String>,
    data_len: usize,
    limit: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_PENDING_BYTES)
    }
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that gives up once an unfinished event exceeds `limit` bytes
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            data: Vec::new(),
            data_len: 0,
            limit,
        }
    }

    /// Append a chunk and return the payloads of all events it completed
    ///
    /// # Errors
    /// Returns [`EventTooLarge`] when the pending, unterminated input grows past the
    /// limit. The decoder should not be used after that.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, EventTooLarge> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw = self.buf.split_to(pos + 1);
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');

            if line.is_empty() {
                // Blank line dispatches the pending event
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                    self.data_len = 0;
                }
                continue;
            }

            // Comment / keep-alive
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            // `event`, `id` and `retry` carry nothing the panel uses
            if field == "data" {
                self.data_len += value.len();
                self.data.push(value.to_string());
            }
        }

        if self.buf.len() + self.data_len > self.limit {
            return Err(EventTooLarge { limit: self.limit });
        }
        Ok(events)
    }
}

/// Parse one event payload into a log entry
///
/// # Errors
/// Returns the JSON error if the payload is not a `LogEntry` record.
pub fn parse_entry(payload: &str) -> Result<LogEntry, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Handle to one open live log connection
///
/// Cancelling (or dropping) it stops delivery immediately: the subscriber is not called
/// again even if bytes are already in flight.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Close the connection. Safe to call any number of times.
    pub fn cancel(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("log stream subscription cancelled");
        }
    }

    /// Whether the channel is still delivering
    ///
    /// Turns false after `cancel` and after the channel closed itself on a transport error.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Open the live log channel on `source` and deliver entries to `handler`
///
/// Must be called from within a tokio runtime. Entries are delivered in the order the
/// connection received them.
pub fn subscribe<S, F>(source: Arc<S>, mut handler: F) -> Subscription
where
    S: EventSource + ?Sized + 'static,
    F: FnMut(LogEntry) + Send + 'static,
{
    let active = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&active);

    let task = tokio::spawn(async move {
        let mut stream = match source.connect().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Log stream connect failed: {e}");
                flag.store(false, Ordering::SeqCst);
                return;
            }
        };

        let mut decoder = SseDecoder::new();
        loop {
            match stream.next().await {
                Some(Ok(chunk)) => {
                    let payloads = match decoder.push(&chunk) {
                        Ok(payloads) => payloads,
                        Err(e) => {
                            warn!("Log stream closed: {e}");
                            break;
                        }
                    };
                    for payload in payloads {
                        if !flag.load(Ordering::SeqCst) {
                            return;
                        }
                        match parse_entry(&payload) {
                            Ok(entry) => handler(entry),
                            Err(e) => warn!("Dropping malformed log stream payload: {e}"),
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!("Log stream closed after transport error: {e}");
                    break;
                }
                None => {
                    debug!("Log stream ended by server");
                    break;
                }
            }
        }
        flag.store(false, Ordering::SeqCst);
    });

    Subscription {
        active,
        task: Some(task),
    }
}

/// Single-owner wrapper around the live log channel
///
/// Holds at most one [`Subscription`]. Opening a new one closes the previous one first,
/// so a subscriber never sees duplicate deliveries.
pub struct LogFeed<S: ?Sized> {
    source: Arc<S>,
    current: Option<Subscription>,
}

impl<S: EventSource + ?Sized + 'static> LogFeed<S> {
    #[must_use]
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            current: None,
        }
    }

    /// Open (or re-open) the channel
    pub fn open<F>(&mut self, handler: F)
    where
        F: FnMut(LogEntry) + Send + 'static,
    {
        self.close();
        self.current = Some(subscribe(Arc::clone(&self.source), handler));
    }

    /// Close the channel if open. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.current.take() {
            subscription.cancel();
        }
    }

    /// Whether a channel is open and still delivering
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.current.as_ref().is_some_and(Subscription::is_active)
    }
}
