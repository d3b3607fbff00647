//! Operation orchestrator
//!
//! Runs the operator's actions (start, stop, reload, save) against the service and owns
//! everything the panel shows about them:
//!
//! - `busy` while a control operation is in flight, `saving` while a save is in flight
//! - a transient success message and a transient error
//! - the last fetched [`ServiceStatus`]
//!
//! Each flag is a tiny state machine, `idle -> in_flight -> idle`. Entering `in_flight`
//! is refused if the flag is already set; leaving it happens through a drop guard, so it
//! runs on success, on failure, and when the operation future is dropped half-way.
//!
//! No error escapes this module: every gateway failure becomes a transient error.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::gateway::{GatewayError, ServiceApi};
use crate::model::{ConfigDocument, ControlOp, LogEntry, ServiceStatus};
use crate::transient::{ERROR_TTL, MESSAGE_TTL, TransientSlot};

/// Snapshot of the operation flags and visible messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub busy: bool,
    pub saving: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Result of asking the orchestrator to run something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Succeeded,
    /// The call failed; a transient error was recorded
    Failed,
    /// Another operation of the same kind was already in flight; nothing was sent
    Rejected,
}

/// How long transient texts stay up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTimings {
    pub message_ttl: Duration,
    pub error_ttl: Duration,
}

impl Default for MessageTimings {
    fn default() -> Self {
        Self {
            message_ttl: MESSAGE_TTL,
            error_ttl: ERROR_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Busy,
    Saving,
}

#[derive(Debug)]
struct Inner {
    busy: bool,
    saving: bool,
    message: TransientSlot,
    error: TransientSlot,
    status: Option<ServiceStatus>,
    /// Bumped on every visible change so renderers can skip identical frames
    revision: u64,
}

impl Inner {
    fn flag_mut(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::Busy => &mut self.busy,
            Flag::Saving => &mut self.saving,
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    // State stays consistent even if a holder panicked: every write is a single field store
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns its flag to idle when dropped
struct InFlight {
    inner: Arc<Mutex<Inner>>,
    flag: Flag,
}

impl InFlight {
    /// Move `flag` to in-flight, or `None` if it already is
    fn enter(inner: &Arc<Mutex<Inner>>, flag: Flag) -> Option<Self> {
        let mut state = lock(inner);
        let slot = state.flag_mut(flag);
        if *slot {
            return None;
        }
        *slot = true;
        state.touch();
        Some(Self {
            inner: Arc::clone(inner),
            flag,
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = lock(&self.inner);
        *state.flag_mut(self.flag) = false;
        state.touch();
    }
}

/// Coordinates user actions against the service
///
/// Cheap to clone; clones share state.
pub struct Orchestrator<G: ?Sized> {
    gateway: Arc<G>,
    inner: Arc<Mutex<Inner>>,
}

impl<G: ?Sized> Clone for Orchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: ServiceApi + ?Sized + 'static> Orchestrator<G> {
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_timings(gateway, MessageTimings::default())
    }

    #[must_use]
    pub fn with_timings(gateway: Arc<G>, timings: MessageTimings) -> Self {
        Self {
            gateway,
            inner: Arc::new(Mutex::new(Inner {
                busy: false,
                saving: false,
                message: TransientSlot::new(timings.message_ttl),
                error: TransientSlot::new(timings.error_ttl),
                status: None,
                revision: 0,
            })),
        }
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Run a control operation
    ///
    /// `busy` is set before this returns, not when the future is first polled, so the
    /// caller's gates see it immediately. The returned future refreshes the status on
    /// success and records a transient error on failure; `busy` is cleared when it
    /// completes or is dropped.
    pub fn run_control_op(&self, op: ControlOp) -> impl Future<Output = OpOutcome> + Send + 'static {
        let guard = InFlight::enter(&self.inner, Flag::Busy);
        let this = self.clone();
        async move {
            let Some(_guard) = guard else {
                debug!(op = op.name(), "control operation rejected: another one is in flight");
                return OpOutcome::Rejected;
            };

            info!(op = op.name(), "running control operation");
            match this.gateway.control(op).await {
                Ok(()) => {
                    this.refresh_status().await;
                    OpOutcome::Succeeded
                }
                Err(e) => {
                    this.report("control operation failed", &e);
                    OpOutcome::Failed
                }
            }
        }
    }

    /// Save the config text, optionally asking the service to reload it
    ///
    /// Uses the `saving` flag, independent of `busy`.
    pub fn run_save(
        &self,
        content: String,
        reload_after: bool,
    ) -> impl Future<Output = OpOutcome> + Send + 'static {
        let guard = InFlight::enter(&self.inner, Flag::Saving);
        let this = self.clone();
        async move {
            let Some(_guard) = guard else {
                debug!("save rejected: another save is in flight");
                return OpOutcome::Rejected;
            };

            info!(bytes = content.len(), reload_after, "saving service config");
            match this.gateway.save_config(&content, reload_after).await {
                Ok(()) => {
                    let text = if reload_after {
                        "Configuration saved and reloaded"
                    } else {
                        "Configuration saved"
                    };
                    this.set_message(text);
                    this.refresh_status().await;
                    OpOutcome::Succeeded
                }
                Err(e) => {
                    this.report("config save failed", &e);
                    OpOutcome::Failed
                }
            }
        }
    }

    /// Fetch the status from the service and replace the cached one
    pub async fn refresh_status(&self) -> OpOutcome {
        match self.gateway.status().await {
            Ok(status) => {
                let mut state = lock(&self.inner);
                state.status = Some(status);
                state.touch();
                OpOutcome::Succeeded
            }
            Err(e) => {
                self.report("status refresh failed", &e);
                OpOutcome::Failed
            }
        }
    }

    /// Fetch the service config text; failures become a transient error
    pub async fn load_config(&self) -> Option<ConfigDocument> {
        match self.gateway.config().await {
            Ok(doc) => Some(doc),
            Err(e) => {
                self.report("config fetch failed", &e);
                None
            }
        }
    }

    /// Fetch the bulk log history; failures become a transient error
    pub async fn load_logs(&self) -> Option<Vec<LogEntry>> {
        match self.gateway.logs().await {
            Ok(entries) => Some(entries),
            Err(e) => {
                self.report("log fetch failed", &e);
                None
            }
        }
    }

    fn report(&self, what: &str, error: &GatewayError) {
        warn!("{what}: {error}");
        let mut state = lock(&self.inner);
        state.error.set(error.user_message(), Instant::now());
        state.touch();
    }

    fn set_message(&self, text: &str) {
        let mut state = lock(&self.inner);
        state.message.set(text, Instant::now());
        state.touch();
    }
}

impl<G: ?Sized> Orchestrator<G> {
    /// Flags and currently visible texts
    #[must_use]
    pub fn operation_state(&self) -> OperationState {
        let now = Instant::now();
        let state = lock(&self.inner);
        OperationState {
            busy: state.busy,
            saving: state.saving,
            message: state.message.get(now).map(str::to_string),
            error: state.error.get(now).map(str::to_string),
        }
    }

    /// Last fetched status, if any fetch has succeeded yet
    #[must_use]
    pub fn status(&self) -> Option<ServiceStatus> {
        lock(&self.inner).status.clone()
    }

    /// Clear expired texts; returns true if anything visible changed
    pub fn expire_messages(&self) -> bool {
        let now = Instant::now();
        let mut state = lock(&self.inner);
        let cleared = state.message.expire(now) | state.error.expire(now);
        if cleared {
            state.touch();
        }
        cleared
    }

    /// Changes whenever anything visible changes
    #[must_use]
    pub fn revision(&self) -> u64 {
        lock(&self.inner).revision
    }

    /// Whether the panel should offer `op` right now
    #[must_use]
    pub fn can_run(&self, op: ControlOp) -> bool {
        let state = lock(&self.inner);
        let running = state.status.as_ref().is_some_and(|s| s.state.is_running());
        match op {
            ControlOp::Start => !state.busy && !running,
            ControlOp::Stop => !state.busy && running,
            ControlOp::Reload => !state.busy,
        }
    }

    /// Whether the panel should offer saving right now
    #[must_use]
    pub fn can_save(&self) -> bool {
        let state = lock(&self.inner);
        !state.busy && !state.saving
    }
}
