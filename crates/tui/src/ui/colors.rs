use crossterm::style::Color;
use sensmon_core::{GpuStatus, SensorKind, Theme};

/// Color scheme for the TUI
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub border: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
    pub muted: Color,
    pub device_heading: Color,
    pub table_header: Color,
    pub table_row_alt: Color,
}

impl ColorScheme {
    pub fn new(theme: &Theme, no_color: bool) -> Self {
        if no_color {
            Self::no_color()
        } else {
            match theme {
                Theme::Dark => Self::dark(),
                Theme::Light => Self::light(),
            }
        }
    }

    fn dark() -> Self {
        Self {
            background: Color::Black,
            foreground: Color::White,
            accent: Color::Cyan,
            border: Color::DarkGrey,
            warning: Color::DarkYellow,
            error: Color::Red,
            success: Color::Green,
            muted: Color::DarkGrey,
            device_heading: Color::Yellow,
            table_header: Color::Cyan,
            table_row_alt: Color::DarkGrey,
        }
    }

    fn light() -> Self {
        Self {
            background: Color::White,
            foreground: Color::Black,
            accent: Color::Blue,
            border: Color::Grey,
            warning: Color::DarkYellow,
            error: Color::DarkRed,
            success: Color::DarkGreen,
            muted: Color::Grey,
            device_heading: Color::DarkBlue,
            table_header: Color::DarkBlue,
            table_row_alt: Color::Grey,
        }
    }

    fn no_color() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::Reset,
            accent: Color::Reset,
            border: Color::Reset,
            warning: Color::Reset,
            error: Color::Reset,
            success: Color::Reset,
            muted: Color::Reset,
            device_heading: Color::Reset,
            table_header: Color::Reset,
            table_row_alt: Color::Reset,
        }
    }

    /// Get color for a temperature in °C
    pub fn temperature_color(&self, celsius: f64) -> Color {
        if celsius >= 80.0 {
            self.error
        } else if celsius >= 65.0 {
            self.warning
        } else {
            self.foreground
        }
    }

    pub fn group_color(&self, kind: SensorKind) -> Color {
        match kind {
            SensorKind::Temperature => self.warning,
            SensorKind::Voltage | SensorKind::Power => self.accent,
            SensorKind::Rpm | SensorKind::Clock => self.success,
            SensorKind::Other => self.muted,
        }
    }

    pub fn gpu_status_color(&self, status: &GpuStatus) -> Color {
        match status {
            GpuStatus::Active => self.success,
            GpuStatus::QueryFailed(_) => self.warning,
            GpuStatus::Disabled | GpuStatus::Unavailable(_) => self.muted,
        }
    }
}
