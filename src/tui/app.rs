//! Application state for the panel

use ratatui::widgets::TableState;
use std::future::Future;
use std::sync::Arc;
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::PanelBackend;
use super::editor::ConfigEditor;
use crate::buffer::LogBuffer;
use crate::config::Config;
use crate::layout::{LayoutController, PanelProbe, Viewport};
use crate::model::{ConfigDocument, ControlOp, LogEntry};
use crate::orchestrator::{OpOutcome, Orchestrator};
use crate::stream::LogFeed;

/// Which tab is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tab {
    Control,
    Config,
    Logs,
}

impl Tab {
    pub(crate) const fn all() -> &'static [Self] {
        &[Self::Control, Self::Config, Self::Logs]
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Control => "Control",
            Self::Config => "Config",
            Self::Logs => "Logs",
        }
    }

    pub(crate) const fn key(self) -> char {
        match self {
            Self::Control => '1',
            Self::Config => '2',
            Self::Logs => '3',
        }
    }

    pub(crate) fn from_key(key: char) -> Option<Self> {
        Self::all().iter().copied().find(|tab| tab.key() == key)
    }

    pub(crate) fn next(self) -> Self {
        let tabs = Self::all();
        let idx = tabs.iter().position(|&t| t == self).unwrap_or(0);
        tabs[(idx + 1) % tabs.len()]
    }

    pub(crate) fn prev(self) -> Self {
        let tabs = Self::all();
        let idx = tabs.iter().position(|&t| t == self).unwrap_or(0);
        tabs[(idx + tabs.len() - 1) % tabs.len()]
    }
}

/// Results of background work, applied on the UI task
#[derive(Debug)]
pub(crate) enum AppUpdate {
    /// A control operation finished; the orchestrator already holds the outcome
    OperationFinished(OpOutcome),
    SaveFinished { outcome: OpOutcome, content: String },
    StatusRefreshed,
    ConfigLoaded(Option<ConfigDocument>),
    /// Bulk history fetched; the live channel opens once this is applied
    LogsLoaded(Option<Vec<LogEntry>>),
    LogEntry(LogEntry),
}

/// Geometry recorded while drawing, read back once the frame is on screen
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PanelProbes {
    pub(crate) config: Option<PanelProbe>,
    pub(crate) logs: Option<PanelProbe>,
}

/// What the last tick saw, to detect visible changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Observed {
    revision: u64,
    message_shown: bool,
    error_shown: bool,
    feed_open: bool,
}

/// Panel state
pub(crate) struct App {
    pub(crate) orch: Orchestrator<dyn PanelBackend>,
    feed: LogFeed<dyn PanelBackend>,
    update_tx: UnboundedSender<AppUpdate>,
    pub(crate) update_rx: UnboundedReceiver<AppUpdate>,

    pub(crate) base_url: String,
    pub(crate) tab: Tab,
    pub(crate) should_quit: bool,
    /// Second `q` needed because the editor has unsaved changes
    pub(crate) confirm_quit: bool,
    pub(crate) dirty: bool,

    // Control tab
    pub(crate) selected_op: usize,

    // Config tab
    pub(crate) editor: ConfigEditor,
    pub(crate) editing: bool,
    pub(crate) config_path: Option<String>,
    pub(crate) config_loaded: bool,

    // Logs tab
    pub(crate) logs: LogBuffer,
    pub(crate) log_scroll: usize,
    pub(crate) show_logger: bool,

    // Layout
    pub(crate) layout: LayoutController,
    pub(crate) viewport: Viewport,
    pub(crate) probes: PanelProbes,

    // Overlays
    pub(crate) show_help: bool,
    pub(crate) help_state: TableState,
    pub(crate) show_diagnostics: bool,

    /// Local hint shown in the footer (not a service message)
    pub(crate) hint: Option<String>,
    pub(crate) throbber_state: ThrobberState,
    observed: Observed,
}

impl App {
    pub(crate) fn new(config: &Config, backend: Arc<dyn PanelBackend>) -> Self {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        Self {
            orch: Orchestrator::with_timings(Arc::clone(&backend), config.panel.timings()),
            feed: LogFeed::new(backend),
            update_tx,
            update_rx,
            base_url: config.service.base_url.clone(),
            tab: Tab::Control,
            should_quit: false,
            confirm_quit: false,
            dirty: true,
            selected_op: 0,
            editor: ConfigEditor::default(),
            editing: false,
            config_path: None,
            config_loaded: false,
            logs: LogBuffer::new(config.panel.log_capacity),
            log_scroll: 0,
            show_logger: config.panel.show_logger,
            layout: LayoutController::new(config.panel.bottom_spacing),
            viewport: Viewport::default(),
            probes: PanelProbes::default(),
            show_help: false,
            help_state: TableState::default(),
            show_diagnostics: false,
            hint: None,
            throbber_state: ThrobberState::default(),
            observed: Observed::default(),
        }
    }

    /// Kick off the initial loads
    ///
    /// Status, config and the bulk log history are fetched concurrently. The live log
    /// channel is opened only when the history has been applied (see [`AppUpdate::LogsLoaded`]).
    pub(crate) fn start(&mut self) {
        self.refresh_status();
        self.refresh_config();
        self.load_logs();
    }

    fn spawn_update<F>(&self, work: F)
    where
        F: Future<Output = AppUpdate> + Send + 'static,
    {
        let tx = self.update_tx.clone();
        tokio::spawn(async move {
            // Receiver gone means the panel is shutting down
            let _ = tx.send(work.await);
        });
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    pub(crate) fn selected_op(&self) -> ControlOp {
        ControlOp::ALL[self.selected_op % ControlOp::ALL.len()]
    }

    /// Run a control operation if the current state allows it
    pub(crate) fn run_op(&mut self, op: ControlOp) {
        if !self.orch.can_run(op) {
            self.set_hint(format!("{} is not available right now", op.name()));
            return;
        }
        // `busy` is set before the task is spawned, so a second key press is gated
        let operation = self.orch.run_control_op(op);
        self.spawn_update(async move { AppUpdate::OperationFinished(operation.await) });
        self.dirty = true;
    }

    /// Save the editor text and ask the service to reload it
    pub(crate) fn save(&mut self) {
        // The editor is empty until the service's text arrives
        if !self.config_loaded {
            self.set_hint("Configuration has not been loaded yet");
            return;
        }
        if !self.orch.can_save() {
            self.set_hint("Save is not available while an operation is running");
            return;
        }
        let content = self.editor.text();
        let saving = self.orch.run_save(content.clone(), true);
        self.spawn_update(async move {
            AppUpdate::SaveFinished {
                outcome: saving.await,
                content,
            }
        });
        self.dirty = true;
    }

    pub(crate) fn refresh_status(&mut self) {
        let orch = self.orch.clone();
        self.spawn_update(async move {
            orch.refresh_status().await;
            AppUpdate::StatusRefreshed
        });
    }

    /// Re-fetch the config text, discarding local edits when it arrives
    pub(crate) fn refresh_config(&mut self) {
        let orch = self.orch.clone();
        self.spawn_update(async move { AppUpdate::ConfigLoaded(orch.load_config().await) });
    }

    /// Close the live channel and reload the history; the channel re-opens afterwards
    pub(crate) fn load_logs(&mut self) {
        self.feed.close();
        let orch = self.orch.clone();
        self.spawn_update(async move { AppUpdate::LogsLoaded(orch.load_logs().await) });
        self.dirty = true;
    }

    /// Re-open the live channel without touching the history
    pub(crate) fn reconnect_logs(&mut self) {
        debug!("reconnecting live log channel");
        self.open_feed();
        self.dirty = true;
    }

    pub(crate) fn is_feed_open(&self) -> bool {
        self.feed.is_open()
    }

    fn open_feed(&mut self) {
        let tx = self.update_tx.clone();
        self.feed.open(move |entry| {
            let _ = tx.send(AppUpdate::LogEntry(entry));
        });
    }

    // ------------------------------------------------------------------------
    // Background updates
    // ------------------------------------------------------------------------

    pub(crate) fn apply_update(&mut self, update: AppUpdate) {
        match update {
            AppUpdate::OperationFinished(_) | AppUpdate::StatusRefreshed => {}
            AppUpdate::SaveFinished { outcome, content } => {
                if outcome == OpOutcome::Succeeded {
                    self.editor.set_baseline(content);
                }
            }
            AppUpdate::ConfigLoaded(Some(document)) => {
                self.editor.load(&document.content);
                self.config_path = document.path;
                self.config_loaded = true;
            }
            AppUpdate::ConfigLoaded(None) => {}
            AppUpdate::LogsLoaded(entries) => {
                if let Some(entries) = entries {
                    self.logs.replace_all(entries);
                    self.log_scroll = 0;
                }
                // A failed history load still gets live entries
                self.open_feed();
            }
            AppUpdate::LogEntry(entry) => {
                self.logs.append(entry);
                // Newest rows are on top; keep a scrolled view where it was
                if self.log_scroll > 0 {
                    self.log_scroll = (self.log_scroll + 1).min(self.logs.len().saturating_sub(1));
                }
            }
        }
        self.dirty = true;
    }

    /// Periodic housekeeping: expire transient texts and notice visible changes
    pub(crate) fn on_tick(&mut self) {
        self.orch.expire_messages();

        let state = self.orch.operation_state();
        let now = Observed {
            revision: self.orch.revision(),
            message_shown: state.message.is_some(),
            error_shown: state.error.is_some(),
            feed_open: self.feed.is_open(),
        };
        if now == self.observed {
            return;
        }

        // Banners take rows above the panels
        if now.message_shown != self.observed.message_shown
            || now.error_shown != self.observed.error_shown
        {
            self.layout.schedule();
        }
        self.observed = now;
        self.dirty = true;
    }

    pub(crate) fn on_resize(&mut self, height: u16) {
        self.viewport = Viewport::new(f64::from(height));
        self.layout.schedule();
        self.dirty = true;
    }

    /// Run a scheduled layout recompute against the frame just drawn
    pub(crate) fn after_paint(&mut self) {
        if self
            .layout
            .on_paint(self.viewport, self.probes.config, self.probes.logs)
            .is_some()
        {
            self.dirty = true;
        }
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub(crate) fn set_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        self.editing = false;
        self.layout.schedule();
        self.dirty = true;
    }

    pub(crate) fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = Some(hint.into());
        self.dirty = true;
    }

    /// Quit, asking for confirmation once if there are unsaved edits
    pub(crate) fn request_quit(&mut self) {
        if self.editor.is_dirty() && !self.confirm_quit {
            self.confirm_quit = true;
            self.dirty = true;
            return;
        }
        self.should_quit = true;
    }

    pub(crate) fn quit(&mut self) {
        self.should_quit = true;
    }
}
