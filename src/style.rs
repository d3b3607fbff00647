//! Terminal styling utilities
//!
//! One palette for CLI output and the panel:
//! - Semantic colors for service state and log levels (green/yellow/red)
//! - Cyan for headers and technical terms
//! - Dark gray for timestamps and secondary information

use crossterm::style::{StyledContent, Stylize};

use crate::model::ServiceState;

/// Extension trait for consistent bpctl styling
///
/// Use these methods instead of direct color calls in CLI output.
///
/// # Examples
///
/// ```
/// use bpctl::style::BpctlStyle;
///
/// println!("{}", "Service".header());
/// println!("{}", "Configuration saved".success());
/// println!("{}", "http://127.0.0.1:8080".technical());
/// ```
pub trait BpctlStyle: Stylize {
    /// Style for section headers (cyan bold)
    fn header(self) -> <<Self as Stylize>::Styled as Stylize>::Styled
    where
        Self: Sized,
        <Self as Stylize>::Styled: Stylize,
    {
        self.cyan().bold()
    }

    /// Style for success/running status (green)
    fn success(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.green()
    }

    /// Style for error status (red)
    fn error(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.red()
    }

    /// Style for warning/transitional status (yellow)
    fn warning(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.yellow()
    }

    /// Style for technical terms and identifiers: URLs, paths, versions (cyan)
    fn technical(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.cyan()
    }

    /// Style for log timestamps (dark gray)
    fn log_timestamp(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.dark_grey()
    }

    /// Style for secondary information (dark gray)
    fn secondary(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.dark_grey()
    }
}

impl<T: Stylize> BpctlStyle for T {}

/// Severity bucket of a service log level name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Error,
    Warn,
    Info,
    Debug,
    Other,
}

impl LevelKind {
    /// Classify a level name as sent by the service (case-insensitive)
    #[must_use]
    pub fn of(level: &str) -> Self {
        match level.to_ascii_uppercase().as_str() {
            "ERROR" | "CRITICAL" | "FATAL" => Self::Error,
            "WARN" | "WARNING" => Self::Warn,
            "INFO" => Self::Info,
            "DEBUG" | "TRACE" => Self::Debug,
            _ => Self::Other,
        }
    }
}

/// Level name padded and colored for CLI log output
#[must_use]
pub fn styled_level(level: &str) -> StyledContent<String> {
    let text = format!("{level:<7}");
    match LevelKind::of(level) {
        LevelKind::Error => text.red().bold(),
        LevelKind::Warn => text.yellow().bold(),
        LevelKind::Info => text.green(),
        LevelKind::Debug => text.cyan(),
        LevelKind::Other => text.grey(),
    }
}

/// Service state label colored for CLI output
#[must_use]
pub fn styled_state(state: ServiceState) -> StyledContent<&'static str> {
    let label = state.label();
    match state {
        ServiceState::Running => label.success(),
        ServiceState::Stopping => label.warning(),
        ServiceState::Error => label.error(),
        ServiceState::Stopped | ServiceState::Unknown => label.grey(),
    }
}

// ============================================================================
// Ratatui TUI Color Helpers
// ============================================================================

/// Semantic color palette for the panel
#[cfg(feature = "tui")]
pub mod colors {
    use ratatui::style::Color;

    use super::LevelKind;
    use crate::model::ServiceState;

    /// Color for log timestamps (dark gray)
    pub const LOG_TIMESTAMP: Color = Color::DarkGray;

    /// Color for log message text
    pub const LOG_MESSAGE: Color = Color::White;

    /// Color for the service-side logger name
    pub const LOG_LOGGER: Color = Color::Cyan;

    /// Color for active/live UI borders (green)
    pub const UI_BORDER_ACTIVE: Color = Color::Green;

    /// Color for inactive UI borders (gray)
    pub const UI_BORDER_INACTIVE: Color = Color::Gray;

    /// Color for selected UI elements (cyan, use with bold)
    pub const UI_SELECTED: Color = Color::Cyan;

    /// Background color for selected UI elements (dark gray)
    pub const UI_SELECTED_BG: Color = Color::DarkGray;

    /// Color for UI highlights (cyan)
    pub const UI_HIGHLIGHT: Color = Color::Cyan;

    /// Color for success states (green)
    pub const UI_SUCCESS: Color = Color::Green;

    /// Color for error states (red)
    pub const UI_ERROR: Color = Color::Red;

    /// Color for warning states (yellow)
    pub const UI_WARNING: Color = Color::Yellow;

    /// Color for secondary/dimmed text (gray)
    pub const UI_SECONDARY: Color = Color::Gray;

    /// Color for disabled controls
    pub const UI_DISABLED: Color = Color::DarkGray;

    /// Color for normal UI text (white)
    pub const UI_TEXT: Color = Color::White;

    /// Badge color for a service state
    #[must_use]
    pub const fn state(state: ServiceState) -> Color {
        match state {
            ServiceState::Running => UI_SUCCESS,
            ServiceState::Stopping => UI_WARNING,
            ServiceState::Error => UI_ERROR,
            ServiceState::Stopped | ServiceState::Unknown => UI_SECONDARY,
        }
    }

    /// Pill color for a log level name
    #[must_use]
    pub fn level(level: &str) -> Color {
        match LevelKind::of(level) {
            LevelKind::Error => Color::Red,
            LevelKind::Warn => Color::Yellow,
            LevelKind::Info => Color::Green,
            LevelKind::Debug => Color::Cyan,
            LevelKind::Other => Color::Gray,
        }
    }
}
