//! Config tab - edit and save the service configuration

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{panel_with_controls, probe};
use crate::layout::PanelProbe;
use crate::style::colors;
use crate::tui::editor::{ConfigEditor, visible_slice};
use crate::tui::widgets::{button, focus_border_style, render_scroll_arrows};

/// Width of the line number gutter, including its trailing space
const GUTTER: u16 = 5;

pub(crate) struct ConfigRenderContext<'a> {
    pub editor: &'a mut ConfigEditor,
    pub editing: bool,
    pub path: Option<&'a str>,
    pub loaded: bool,
    pub can_save: bool,
    pub saving: bool,
    pub height: Option<f64>,
}

/// Render the config tab and return the editor panel's geometry
pub(crate) fn render_config(frame: &mut Frame, area: Rect, ctx: &mut ConfigRenderContext<'_>) -> PanelProbe {
    let (panel, controls) = panel_with_controls(area, ctx.height);

    let mut title = vec![Span::raw(" Config")];
    if let Some(path) = ctx.path {
        title.push(Span::styled(
            format!(": {path}"),
            Style::default().fg(colors::UI_SECONDARY),
        ));
    }
    title.push(Span::raw(" "));
    if ctx.editor.is_dirty() {
        title.push(Span::styled(
            "[modified] ",
            Style::default()
                .fg(colors::UI_WARNING)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border_style(ctx.editing))
        .title(Line::from(title));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    if ctx.loaded {
        render_editor(frame, inner, ctx);
    } else {
        let loading = Paragraph::new("Loading configuration...")
            .style(Style::default().fg(colors::UI_SECONDARY))
            .alignment(Alignment::Center);
        frame.render_widget(loading, inner);
    }

    let save_label = if ctx.saving { "Saving..." } else { "Save & Reload" };
    let line = Line::from(vec![
        button(save_label, false, ctx.can_save && ctx.loaded),
        Span::raw(" "),
        button("Refresh", false, ctx.can_save),
        Span::raw("  "),
        Span::styled(
            if ctx.editing {
                "Editing: Esc to stop, Ctrl+S to save"
            } else {
                "Enter/e to edit, Ctrl+S to save, u to refresh"
            },
            Style::default().fg(colors::UI_SECONDARY),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), controls);

    probe(panel)
}

fn render_editor(frame: &mut Frame, inner: Rect, ctx: &mut ConfigRenderContext<'_>) {
    let text_width = inner.width.saturating_sub(GUTTER) as usize;
    ctx.editor
        .scroll_into_view(inner.height as usize, text_width);
    let (top, left) = ctx.editor.scroll();
    let (row, col) = ctx.editor.cursor();

    let lines: Vec<Line> = ctx
        .editor
        .lines()
        .iter()
        .enumerate()
        .skip(top)
        .take(inner.height as usize)
        .map(|(i, text)| {
            let number_style = if i == row && ctx.editing {
                Style::default().fg(colors::UI_HIGHLIGHT)
            } else {
                Style::default().fg(colors::UI_DISABLED)
            };
            Line::from(vec![
                Span::styled(format!("{:>4} ", i + 1), number_style),
                Span::styled(
                    visible_slice(text, left, text_width).to_string(),
                    Style::default().fg(colors::UI_TEXT),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);

    let total = ctx.editor.lines().len();
    render_scroll_arrows(frame, inner, top > 0, top + (inner.height as usize) < total);

    if ctx.editing && inner.height > 0 {
        let x = inner.x + GUTTER + (col - left) as u16;
        let y = inner.y + (row - top) as u16;
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), y));
    }
}
