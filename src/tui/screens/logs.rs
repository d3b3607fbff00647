//! Logs tab - bulk history plus live entries, newest first

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{panel_with_controls, probe};
use crate::buffer::LogBuffer;
use crate::layout::PanelProbe;
use crate::model::LogEntry;
use crate::style::colors;
use crate::tui::widgets::{key_hints, render_scroll_arrows};

pub(crate) struct LogsRenderContext<'a> {
    pub logs: &'a LogBuffer,
    /// Rows skipped from the top (newest) end
    pub scroll: &'a mut usize,
    pub live: bool,
    pub show_logger: bool,
    pub height: Option<f64>,
}

/// One log entry as a panel row: time, level pill, optional logger, message
pub(crate) fn log_line(entry: &LogEntry, show_logger: bool) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            entry.local_time(),
            Style::default().fg(colors::LOG_TIMESTAMP),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" {:<7}", entry.level),
            Style::default()
                .fg(Color::Black)
                .bg(colors::level(&entry.level))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    if show_logger {
        if let Some(logger) = &entry.logger {
            spans.push(Span::styled(
                format!("{logger} "),
                Style::default().fg(colors::LOG_LOGGER),
            ));
        }
    }
    spans.push(Span::styled(
        entry.message.clone(),
        Style::default().fg(colors::LOG_MESSAGE),
    ));
    Line::from(spans)
}

/// Render the logs tab and return the log panel's geometry
pub(crate) fn render_logs(frame: &mut Frame, area: Rect, ctx: &mut LogsRenderContext<'_>) -> PanelProbe {
    let (panel, controls) = panel_with_controls(area, ctx.height);

    let indicator = if ctx.live {
        Span::styled(" ● live ", Style::default().fg(colors::UI_SUCCESS))
    } else {
        Span::styled(" ○ disconnected ", Style::default().fg(colors::UI_ERROR))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if ctx.live {
            colors::UI_BORDER_ACTIVE
        } else {
            colors::UI_BORDER_INACTIVE
        }))
        .title(format!(" Logs ({}/{}) ", ctx.logs.len(), ctx.logs.capacity()))
        .title_top(Line::from(indicator).alignment(Alignment::Right));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    if ctx.logs.is_empty() {
        let empty = Paragraph::new("No logs yet")
            .style(Style::default().fg(colors::UI_SECONDARY))
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
    } else {
        let view_height = inner.height as usize;
        let total = ctx.logs.len();
        *ctx.scroll = (*ctx.scroll).min(total.saturating_sub(view_height.max(1)));

        let lines: Vec<Line> = ctx
            .logs
            .to_display_order()
            .into_iter()
            .skip(*ctx.scroll)
            .take(view_height)
            .map(|entry| log_line(entry, ctx.show_logger))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
        render_scroll_arrows(
            frame,
            inner,
            *ctx.scroll > 0,
            *ctx.scroll + view_height < total,
        );
    }

    let mut hints = key_hints(&[
        ("↑↓/PgUp/PgDn", "Scroll"),
        ("u", "Refresh"),
        ("c", "Reconnect"),
    ]);
    if !ctx.live {
        hints.spans.push(Span::styled(
            "  Live updates stopped",
            Style::default().fg(colors::UI_WARNING),
        ));
    }
    frame.render_widget(Paragraph::new(hints), controls);

    probe(panel)
}
