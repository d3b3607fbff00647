//! Control tab - service status and start/stop/reload

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::model::{ControlOp, ServiceStatus};
use crate::style::colors;
use crate::tui::widgets::{button, key_hints};

pub(crate) struct ControlRenderContext<'a> {
    pub status: Option<&'a ServiceStatus>,
    pub base_url: &'a str,
    pub selected: ControlOp,
    /// Whether each of [`ControlOp::ALL`] may run now
    pub enabled: [bool; 3],
    pub busy: bool,
}

fn field<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{label:<17}"),
            Style::default().fg(colors::UI_SECONDARY),
        ),
        value,
    ])
}

fn status_lines<'a>(ctx: &ControlRenderContext<'a>) -> Vec<Line<'a>> {
    let mut lines = vec![field("Service", Span::raw(ctx.base_url))];

    let Some(status) = ctx.status else {
        lines.push(field(
            "State",
            Span::styled("not loaded yet", Style::default().fg(colors::UI_SECONDARY)),
        ));
        return lines;
    };

    lines.push(field(
        "State",
        Span::styled(
            status.state.label(),
            Style::default()
                .fg(colors::state(status.state))
                .add_modifier(Modifier::BOLD),
        ),
    ));
    if let Some(version) = &status.config_version {
        lines.push(field("Config version", Span::raw(version.as_str())));
    }
    if let Some(path) = &status.config_path {
        lines.push(field("Config path", Span::raw(path.as_str())));
    }
    let executors = if status.media_executors.is_empty() {
        Span::styled("none", Style::default().fg(colors::UI_SECONDARY))
    } else {
        Span::raw(status.media_executors.join(", "))
    };
    lines.push(field("Media executors", executors));
    lines
}

pub(crate) fn render_control(frame: &mut Frame, area: Rect, ctx: &ControlRenderContext<'_>) {
    let [status_area, actions_area, hints_area] = Layout::vertical([
        Constraint::Min(5),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let status = Paragraph::new(status_lines(ctx))
        .block(Block::default().borders(Borders::ALL).title(" Status "))
        .wrap(Wrap { trim: false });
    frame.render_widget(status, status_area);

    let mut spans = Vec::new();
    for (op, enabled) in ControlOp::ALL.iter().zip(ctx.enabled) {
        spans.push(button(op.name(), *op == ctx.selected, enabled));
        spans.push(Span::raw("  "));
    }
    if ctx.busy {
        spans.push(Span::styled(
            "working...",
            Style::default().fg(colors::UI_WARNING),
        ));
    }
    let actions = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Actions "));
    frame.render_widget(actions, actions_area);

    let hints = key_hints(&[
        ("←→", "Select"),
        ("Enter", "Run"),
        ("s/x/r", "Start/Stop/Reload"),
        ("u", "Refresh status"),
    ]);
    frame.render_widget(Paragraph::new(hints), hints_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceState;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn shows_optional_status_fields() {
        let mut status = ServiceStatus::with_state(ServiceState::Stopping);
        status.config_version = Some("7".to_string());
        status.media_executors = vec!["vlc".to_string(), "mpv".to_string()];
        let ctx = ControlRenderContext {
            status: Some(&status),
            base_url: "http://poster.lan",
            selected: ControlOp::Start,
            enabled: [true; 3],
            busy: false,
        };

        let lines = texts(&status_lines(&ctx));
        assert!(lines.iter().any(|l| l.ends_with("Stopping")));
        assert!(lines.iter().any(|l| l.ends_with("7")));
        assert!(lines.iter().any(|l| l.ends_with("vlc, mpv")));
        assert!(!lines.iter().any(|l| l.starts_with("Config path")));
    }

    #[test]
    fn missing_status_says_so() {
        let ctx = ControlRenderContext {
            status: None,
            base_url: "http://poster.lan",
            selected: ControlOp::Stop,
            enabled: [false; 3],
            busy: true,
        };
        let lines = texts(&status_lines(&ctx));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("not loaded yet"));
    }
}
