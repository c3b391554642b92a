//! Color themes.

use crossterm::style::Color;

/// Colors for each kind of output, tuned for dark terminals.
#[derive(Debug, Clone)]
pub struct Theme {
    pub timestamp: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    pub highlight: Color,
    pub job_name: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            timestamp: Color::Cyan,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
            highlight: Color::Cyan,
            job_name: Color::Yellow,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
