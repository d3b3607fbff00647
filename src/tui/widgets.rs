//! Shared TUI widget helpers

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::style::colors;

/// Area of `percent` width and height, centered in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [modal] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    modal
}

/// Standard modal sizes (width%, height%)
pub mod modal_size {
    /// Quit confirmation
    pub(crate) const SMALL: (u16, u16) = (50, 30);
    pub(crate) const HELP: (u16, u16) = (65, 75);
    pub(crate) const DIAGNOSTICS: (u16, u16) = (85, 80);
}

pub(crate) fn centered_modal(size: (u16, u16), r: Rect) -> Rect {
    centered_rect(size.0, size.1, r)
}

/// Cyan border for focused elements, dark gray otherwise
pub(crate) const fn focus_border_style(focused: bool) -> Style {
    if focused {
        Style::new().fg(Color::Cyan)
    } else {
        Style::new().fg(Color::DarkGray)
    }
}

/// `[key] action  [key] action` hint line
pub(crate) fn key_hints(items: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(items.len() * 2);
    for (i, (key, action)) in items.iter().enumerate() {
        let action = if i + 1 == items.len() {
            format!(" {action}")
        } else {
            format!(" {action}  ")
        };
        spans.push(Span::styled(
            format!("[{key}]"),
            Style::default().fg(colors::UI_HIGHLIGHT),
        ));
        spans.push(Span::raw(action));
    }
    Line::from(spans)
}

/// A bracketed button; disabled buttons are dimmed and never highlighted
pub(crate) fn button(label: &str, selected: bool, enabled: bool) -> Span<'static> {
    let style = if !enabled {
        Style::default().fg(colors::UI_DISABLED)
    } else if selected {
        Style::default()
            .fg(colors::UI_SELECTED)
            .bg(colors::UI_SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::UI_TEXT)
    };
    Span::styled(format!("[ {label} ]"), style)
}

/// Render small up/down arrows at the right edge of `inner` to indicate scroll
pub(crate) fn render_scroll_arrows(frame: &mut Frame, inner: Rect, has_above: bool, has_below: bool) {
    let x = inner.x + inner.width.saturating_sub(1);
    if has_above {
        let r = Rect {
            x,
            y: inner.y,
            width: 1,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled("↑", Style::default().fg(colors::UI_WARNING))),
            r,
        );
    }
    if has_below && inner.height > 0 {
        let r = Rect {
            x,
            y: inner.y + inner.height - 1,
            width: 1,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled("↓", Style::default().fg(colors::UI_WARNING))),
            r,
        );
    }
}
