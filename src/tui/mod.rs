//! Terminal User Interface (TUI) for bpctl
//!
//! Three tabs over one service: control (status plus start/stop/reload), config (edit and
//! save the configuration text), and logs (history plus live entries).

use color_eyre::eyre::{Context, Result};
use crossterm::cursor::Show;
use crossterm::event::EventStream;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
};
use std::io;
use std::sync::Arc;

use crate::config::Config;
use crate::gateway::{EventSource, HttpGateway, ServiceApi};
use crate::style::colors;

mod app;
mod editor;
mod input;
mod screens;
mod widgets;

#[cfg(test)]
mod tests;

use app::{App, Tab};
use input::handle_event;
use screens::{
    ConfigRenderContext, ControlRenderContext, LogsRenderContext, render_config, render_control,
    render_help, render_logs,
};
use widgets::{centered_modal, key_hints, modal_size};

/// Everything the panel needs from the service
pub(crate) trait PanelBackend: ServiceApi + EventSource {}

impl<T: ServiceApi + EventSource> PanelBackend for T {}

/// Run the panel against the configured service
///
/// # Errors
/// Returns an error if terminal setup fails or drawing fails.
pub async fn run(config: Config) -> Result<()> {
    // Restore the terminal before color-eyre prints the panic report
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, Show);
        original_hook(info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = execute!(std::io::stdout(), LeaveAlternateScreen, Show);
        }
    }
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    tracing::info!(base_url = %config.service.base_url, "panel starting");
    let gateway: Arc<dyn PanelBackend> = Arc::new(HttpGateway::new(&config.service.base_url));
    let mut app = App::new(&config, gateway);
    app.on_resize(terminal.size().context("Failed to read terminal size")?.height);
    app.start();

    let result = run_app(&mut terminal, &mut app).await;

    terminal.show_cursor().context("Failed to show cursor")?;
    tracing::info!("panel stopped");
    result
}

/// Main application loop
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    use std::time::Instant;

    const TARGET_FPS: u64 = 60;
    const MIN_FRAME_TIME_MS: u64 = 1000 / TARGET_FPS;
    const ANIM_MS: u64 = 120;

    let mut last_frame = Instant::now();
    let mut last_anim = Instant::now();
    app.dirty = true;

    let mut tick = tokio::time::interval(std::time::Duration::from_millis(MIN_FRAME_TIME_MS));
    let mut events = EventStream::new();

    loop {
        tokio::select! {
            _ = tick.tick() => {
                app.on_tick();
                let state = app.orch.operation_state();
                let now = Instant::now();
                if (state.busy || state.saving)
                    && now.duration_since(last_anim).as_millis() >= u128::from(ANIM_MS)
                {
                    app.throbber_state.calc_next();
                    last_anim = now;
                    app.dirty = true;
                }
            }
            Some(Ok(event)) = events.next() => {
                handle_event(app, &event);
            }
            Some(update) = app.update_rx.recv() => {
                app.apply_update(update);
            }
        }

        if app.dirty {
            let now = Instant::now();
            if now.duration_since(last_frame).as_millis() >= u128::from(MIN_FRAME_TIME_MS) {
                terminal.draw(|frame| render_ui(frame, app))?;
                app.dirty = false;
                last_frame = now;
                // Geometry read back from the frame just drawn
                app.after_paint();
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Render the complete UI
pub(crate) fn render_ui(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let state = app.orch.operation_state();

    let mut constraints = vec![Constraint::Length(3)];
    if state.message.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if state.error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size);

    render_header(frame, chunks[0], app);

    let mut next = 1;
    if let Some(message) = &state.message {
        let line = Line::from(vec![
            Span::styled(" ✓ ", Style::default().fg(colors::UI_SUCCESS)),
            Span::styled(message.as_str(), Style::default().fg(colors::UI_SUCCESS)),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[next]);
        next += 1;
    }
    if let Some(error) = &state.error {
        let line = Line::from(vec![
            Span::styled(" ✗ ", Style::default().fg(colors::UI_ERROR)),
            Span::styled(
                error.as_str(),
                Style::default()
                    .fg(colors::UI_ERROR)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[next]);
        next += 1;
    }
    let content = chunks[next];
    let footer = chunks[next + 1];

    let heights = app.layout.heights();
    app.probes = app::PanelProbes::default();
    match app.tab {
        Tab::Control => {
            let status = app.orch.status();
            let ctx = ControlRenderContext {
                status: status.as_ref(),
                base_url: &app.base_url,
                selected: app.selected_op(),
                enabled: crate::model::ControlOp::ALL.map(|op| app.orch.can_run(op)),
                busy: state.busy,
            };
            render_control(frame, content, &ctx);
        }
        Tab::Config => {
            let mut ctx = ConfigRenderContext {
                editor: &mut app.editor,
                editing: app.editing,
                path: app.config_path.as_deref(),
                loaded: app.config_loaded,
                can_save: !state.busy && !state.saving,
                saving: state.saving,
                height: heights.config,
            };
            app.probes.config = Some(render_config(frame, content, &mut ctx));
        }
        Tab::Logs => {
            let live = app.is_feed_open();
            let mut ctx = LogsRenderContext {
                logs: &app.logs,
                scroll: &mut app.log_scroll,
                live,
                show_logger: app.show_logger,
                height: heights.logs,
            };
            app.probes.logs = Some(render_logs(frame, content, &mut ctx));
        }
    }

    render_footer(frame, footer, app, state.busy || state.saving);

    if app.show_help {
        render_help(frame, size, app.tab, &mut app.help_state);
    }
    if app.show_diagnostics {
        render_diagnostics(frame, size);
    }
    if app.confirm_quit {
        render_quit_confirm(frame, size);
    }
}

/// Header: tabs, version, and the service state pill
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<String> = Tab::all()
        .iter()
        .map(|t| format!("[{}] {}", t.key(), t.name()))
        .collect();
    let selected = Tab::all().iter().position(|&t| t == app.tab).unwrap_or(0);

    let mut left = vec![Span::raw(format!(" bpctl {} ", crate::version_string()))];
    if app.editor.is_dirty() {
        left.push(Span::styled(
            "[unsaved] ",
            Style::default()
                .fg(colors::UI_WARNING)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let pill = match app.orch.status() {
        Some(status) => Span::styled(
            format!(" {} ", status.state.label()),
            Style::default()
                .fg(ratatui::style::Color::Black)
                .bg(colors::state(status.state))
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled(" … ", Style::default().fg(colors::UI_SECONDARY)),
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(left))
                .title_top(Line::from(vec![pill, Span::raw(" ")]).alignment(Alignment::Right)),
        )
        .select(selected)
        .style(Style::default().fg(colors::UI_SECONDARY))
        .highlight_style(
            Style::default()
                .fg(colors::UI_SELECTED)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Footer: throbber while an operation runs, then the local hint or key reminders
fn render_footer(frame: &mut Frame, area: Rect, app: &mut App, pending: bool) {
    let text = match &app.hint {
        Some(hint) => Line::from(Span::styled(
            hint.clone(),
            Style::default().fg(colors::UI_WARNING),
        )),
        None => key_hints(&[("Tab", "Switch tab"), ("?", "Help"), ("q", "Quit")]),
    };

    if pending {
        use throbber_widgets_tui::Throbber;

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let throb = Throbber::default().style(Style::default().fg(colors::UI_WARNING));
        frame.render_stateful_widget(throb, chunks[0], &mut app.throbber_state);
        frame.render_widget(Paragraph::new(text), chunks[1]);
    } else {
        frame.render_widget(Paragraph::new(text), area);
    }
}

/// The panel's own tracing events
fn render_diagnostics(frame: &mut Frame, area: Rect) {
    let popup = centered_modal(modal_size::DIAGNOSTICS, area);
    frame.render_widget(Clear, popup);
    let widget = tui_logger::TuiLoggerWidget::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Diagnostics ")
                .title_bottom(Line::from(" [Esc] Close ").right_aligned()),
        )
        .style_error(Style::default().fg(colors::UI_ERROR))
        .style_warn(Style::default().fg(colors::UI_WARNING))
        .style_info(Style::default().fg(colors::UI_SUCCESS))
        .style_debug(Style::default().fg(colors::UI_HIGHLIGHT));
    frame.render_widget(widget, popup);
}

fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let popup = centered_modal(modal_size::SMALL, area);
    frame.render_widget(Clear, popup);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "The configuration has unsaved changes.",
            Style::default().fg(colors::UI_WARNING),
        )),
        Line::from(""),
        key_hints(&[("q/y/Enter", "Quit anyway"), ("any other key", "Stay")]),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Quit? "));
    frame.render_widget(dialog, popup);
}
