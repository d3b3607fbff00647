//! Adaptive panel sizing
//!
//! Works out how tall the scrollable config and log panels may be so the whole panel fits
//! the viewport. Units are whatever the viewport is measured in (terminal rows for the TUI).
//!
//! Recomputation is never done synchronously with the change that triggers it: callers
//! [`LayoutController::schedule`] it and the shell runs [`LayoutController::on_paint`] once the
//! next frame has been drawn, so probes read geometry that reflects the change.

use tracing::trace;

/// Space kept free under each panel
pub const BOTTOM_SPACING: f64 = 64.0;

/// Largest share of the viewport a panel may take
pub const MAX_VIEWPORT_FRACTION: f64 = 0.9;

/// Current viewport size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub inner_height: f64,
    /// Height of the visible part when something (an on-screen keyboard, a split pane)
    /// covers the rest
    pub visual_height: Option<f64>,
}

impl Viewport {
    #[must_use]
    pub const fn new(inner_height: f64) -> Self {
        Self {
            inner_height,
            visual_height: None,
        }
    }

    /// Effective height: the visual height when known, otherwise the inner height
    #[must_use]
    pub fn height(&self) -> f64 {
        self.visual_height.unwrap_or(self.inner_height)
    }
}

/// Geometry read from a mounted panel after it was drawn
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelProbe {
    /// Offset of the panel's content from the top of the root container
    pub content_top: f64,
    /// Height of the controls rendered next to the panel
    pub controls_height: f64,
    /// Gap above those controls
    pub controls_margin: f64,
}

/// Height limits for the scrollable panels; `None` until first measured
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutHeights {
    pub config: Option<f64>,
    pub logs: Option<f64>,
}

/// Height available to one panel
///
/// Non-positive results clamp to zero; positive ones are capped at
/// [`MAX_VIEWPORT_FRACTION`] of the viewport. Returns `None` if the inputs produce a
/// non-finite value.
#[must_use]
pub fn available_height(viewport_height: f64, probe: &PanelProbe, bottom_spacing: f64) -> Option<f64> {
    let available = viewport_height
        - probe.content_top
        - probe.controls_height
        - probe.controls_margin
        - bottom_spacing;

    if !available.is_finite() {
        return None;
    }
    if available <= 0.0 {
        return Some(0.0);
    }
    Some(available.min(viewport_height * MAX_VIEWPORT_FRACTION))
}

/// Caches the last heights and decides whether a recompute changed anything
#[derive(Debug, Clone)]
pub struct LayoutController {
    bottom_spacing: f64,
    heights: LayoutHeights,
    pending: bool,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new(BOTTOM_SPACING)
    }
}

impl LayoutController {
    #[must_use]
    pub const fn new(bottom_spacing: f64) -> Self {
        Self {
            bottom_spacing,
            heights: LayoutHeights {
                config: None,
                logs: None,
            },
            pending: false,
        }
    }

    /// Request a recompute at the next paint
    ///
    /// Call on viewport resize, tab switch, and when a transient message appears or goes away.
    pub fn schedule(&mut self) {
        self.pending = true;
    }

    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.pending
    }

    /// Last computed heights
    #[must_use]
    pub const fn heights(&self) -> LayoutHeights {
        self.heights
    }

    /// Recompute both panels
    ///
    /// A `None` probe means the panel is not mounted; its cached height is kept. Returns the
    /// new heights only if at least one of them changed.
    pub fn recompute(
        &mut self,
        viewport: Viewport,
        config: Option<PanelProbe>,
        logs: Option<PanelProbe>,
    ) -> Option<LayoutHeights> {
        let vh = viewport.height();
        let measure = |probe: Option<PanelProbe>, cached: Option<f64>| {
            probe
                .and_then(|p| available_height(vh, &p, self.bottom_spacing))
                .or(cached)
        };

        let next = LayoutHeights {
            config: measure(config, self.heights.config),
            logs: measure(logs, self.heights.logs),
        };

        if next == self.heights {
            return None;
        }
        trace!(?next, viewport_height = vh, "panel heights changed");
        self.heights = next;
        Some(next)
    }

    /// Run a scheduled recompute, if any; clears the request
    pub fn on_paint(
        &mut self,
        viewport: Viewport,
        config: Option<PanelProbe>,
        logs: Option<PanelProbe>,
    ) -> Option<LayoutHeights> {
        if !std::mem::take(&mut self.pending) {
            return None;
        }
        self.recompute(viewport, config, logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn probe(content_top: f64) -> PanelProbe {
        PanelProbe {
            content_top,
            controls_height: 40.0,
            controls_margin: 12.0,
        }
    }

    #[test_case(800.0, 100.0, Some(584.0) ; "fits under the cap")]
    #[test_case(800.0, 900.0, Some(0.0) ; "negative clamps to zero")]
    #[test_case(800.0, 684.0, Some(0.0) ; "exactly zero")]
    #[test_case(2000.0, -500.0, Some(1800.0) ; "capped at 90 percent")]
    #[test_case(f64::NAN, 100.0, None ; "non finite is ignored")]
    fn available_height_cases(viewport: f64, content_top: f64, expected: Option<f64>) {
        assert_eq!(available_height(viewport, &probe(content_top), BOTTOM_SPACING), expected);
    }

    #[test]
    fn recompute_reports_new_heights() {
        let mut layout = LayoutController::default();
        let heights = layout.recompute(Viewport::new(800.0), Some(probe(100.0)), Some(probe(200.0)));
        assert_eq!(
            heights,
            Some(LayoutHeights {
                config: Some(584.0),
                logs: Some(484.0),
            })
        );
    }

    #[test]
    fn unchanged_recompute_yields_nothing() {
        let mut layout = LayoutController::default();
        assert!(layout.recompute(Viewport::new(800.0), Some(probe(100.0)), None).is_some());
        assert_eq!(layout.recompute(Viewport::new(800.0), Some(probe(100.0)), None), None);
    }

    #[test]
    fn unmounted_panel_keeps_cached_height() {
        let mut layout = LayoutController::default();
        layout.recompute(Viewport::new(800.0), Some(probe(100.0)), Some(probe(100.0)));

        // Logs tab is hidden now; viewport shrinks
        let heights = layout
            .recompute(Viewport::new(700.0), Some(probe(100.0)), None)
            .unwrap();
        assert_eq!(heights.config, Some(484.0));
        assert_eq!(heights.logs, Some(584.0));
    }

    #[test]
    fn visual_viewport_takes_precedence() {
        let mut layout = LayoutController::default();
        let viewport = Viewport {
            inner_height: 800.0,
            visual_height: Some(500.0),
        };
        let heights = layout.recompute(viewport, Some(probe(100.0)), None).unwrap();
        assert_eq!(heights.config, Some(284.0));
    }

    #[test]
    fn paint_runs_only_scheduled_recomputes() {
        let mut layout = LayoutController::new(1.0);
        assert_eq!(layout.on_paint(Viewport::new(40.0), Some(probe(0.0)), None), None);
        assert_eq!(layout.heights(), LayoutHeights::default());

        layout.schedule();
        assert!(layout.is_scheduled());
        let heights = layout.on_paint(Viewport::new(100.0), Some(probe(10.0)), None).unwrap();
        assert_eq!(heights.config, Some(37.0));
        assert!(!layout.is_scheduled());
    }
}
