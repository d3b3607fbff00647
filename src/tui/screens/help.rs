//! Help overlay - keyboard shortcut reference

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Padding, Row, Table, TableState},
};

use crate::style::colors;
use crate::tui::app::Tab;
use crate::tui::widgets::{centered_modal, modal_size, render_scroll_arrows};

/// `None` key marks a section header
const HELP: &[(Option<&str>, &str)] = &[
    (None, "Global"),
    (Some("Tab / Shift+Tab"), "Next / previous tab"),
    (Some("1 2 3"), "Control, Config, Logs"),
    (Some("?"), "Toggle this help"),
    (Some("D"), "Toggle diagnostics (panel's own log)"),
    (Some("q"), "Quit (asks again with unsaved config edits)"),
    (Some("Ctrl+C"), "Quit immediately"),
    (None, "Control"),
    (Some("←→ / ↑↓"), "Select action"),
    (Some("Enter"), "Run selected action"),
    (Some("s / x / r"), "Start / Stop / Reload"),
    (Some("u"), "Refresh status"),
    (None, "Config"),
    (Some("Enter / e"), "Start editing"),
    (Some("Esc"), "Stop editing"),
    (Some("Ctrl+S"), "Save and reload"),
    (Some("u"), "Refresh config (discards edits)"),
    (Some("Ctrl+←→"), "Move by word while editing"),
    (Some("Ctrl+Backspace"), "Delete word while editing"),
    (None, "Logs"),
    (Some("↑↓ / PgUp / PgDn"), "Scroll"),
    (Some("Home"), "Jump to newest"),
    (Some("u"), "Reload history and reconnect"),
    (Some("c"), "Reconnect live updates"),
];

/// Number of rows in the help table
pub(crate) const fn row_count() -> usize {
    HELP.len()
}

pub(crate) fn render_help(frame: &mut Frame, area: Rect, current: Tab, state: &mut TableState) {
    let popup_area = centered_modal(modal_size::HELP, area);
    frame.render_widget(Clear, popup_area);

    let rows: Vec<Row> = HELP
        .iter()
        .map(|(key, desc)| match key {
            None => {
                let mut style = Style::default()
                    .fg(colors::UI_HIGHLIGHT)
                    .add_modifier(Modifier::BOLD);
                if *desc == current.name() {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                Row::new(vec![Cell::from(Span::styled(*desc, style)), Cell::from("")])
            }
            Some(key) => Row::new(vec![
                Cell::from(Span::styled(*key, Style::default().fg(colors::UI_WARNING))),
                Cell::from(*desc),
            ]),
        })
        .collect();

    let version = format!(" bpctl {} ", crate::version_string());
    let table = Table::new(rows, [Constraint::Length(20), Constraint::Fill(1)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1))
                .title(" Help ")
                .title_bottom(Line::from(version).right_aligned()),
        )
        .column_spacing(2);

    let inner = popup_area.inner(ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let view_height = inner.height as usize;
    let max_offset = row_count().saturating_sub(view_height);
    if state.offset() > max_offset {
        *state.offset_mut() = max_offset;
    }

    frame.render_stateful_widget(table, popup_area, state);
    render_scroll_arrows(
        frame,
        inner,
        state.offset() > 0,
        state.offset() + view_height < row_count(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tab_has_a_section() {
        for tab in Tab::all() {
            assert!(
                HELP.iter().any(|(key, desc)| key.is_none() && *desc == tab.name()),
                "no help section for {}",
                tab.name()
            );
        }
    }
}
