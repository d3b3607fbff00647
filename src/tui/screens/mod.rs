//! Tab screens and overlays

pub(crate) mod config;
pub(crate) mod control;
pub(crate) mod help;
pub(crate) mod logs;

pub(crate) use config::{ConfigRenderContext, render_config};
pub(crate) use control::{ControlRenderContext, render_control};
pub(crate) use help::render_help;
pub(crate) use logs::{LogsRenderContext, render_logs};

use ratatui::layout::{Constraint, Layout, Rect};

use crate::layout::PanelProbe;

/// Rows of the control line under a scrollable panel
pub(crate) const CONTROLS_HEIGHT: u16 = 1;

/// Blank rows between a scrollable panel and its controls
pub(crate) const CONTROLS_MARGIN: u16 = 1;

/// Split `area` into `[panel, margin, controls]`
///
/// Without a measured height the panel takes whatever is left; once measured it gets
/// exactly that many rows.
pub(crate) fn panel_with_controls(area: Rect, height: Option<f64>) -> (Rect, Rect) {
    let mut constraints = vec![
        Constraint::Fill(1),
        Constraint::Length(CONTROLS_MARGIN),
        Constraint::Length(CONTROLS_HEIGHT),
    ];
    if let Some(rows) = height {
        constraints[0] = Constraint::Length(rows.floor() as u16);
        constraints.push(Constraint::Min(0));
    }
    let chunks = Layout::vertical(constraints).split(area);
    (chunks[0], chunks[2])
}

/// Geometry of a panel laid out by [`panel_with_controls`]
pub(crate) fn probe(panel: Rect) -> PanelProbe {
    PanelProbe {
        content_top: f64::from(panel.y),
        controls_height: f64::from(CONTROLS_HEIGHT),
        controls_margin: f64::from(CONTROLS_MARGIN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measured_height_is_used_exactly() {
        let (panel, controls) = panel_with_controls(Rect::new(0, 5, 80, 30), Some(12.6));
        assert_eq!(panel.height, 12);
        assert_eq!(controls.y, 5 + 12 + CONTROLS_MARGIN);
    }

    #[test]
    fn unmeasured_panel_fills_the_area() {
        let (panel, controls) = panel_with_controls(Rect::new(0, 5, 80, 30), None);
        assert_eq!(panel.height, 30 - CONTROLS_MARGIN - CONTROLS_HEIGHT);
        assert_eq!(controls.bottom(), 35);
    }
}
