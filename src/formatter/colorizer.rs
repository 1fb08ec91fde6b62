//! Color output support for terminal messages

/// ANSI color codes for terminal output
pub struct AnsiColors;

impl AnsiColors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Colors status messages printed by the command-line tool
#[derive(Debug, Clone, Copy)]
pub struct Colorizer {
    /// Enable colors
    enabled: bool,
}

impl Colorizer {
    /// Create a new colorizer
    ///
    /// # Arguments
    /// * `enabled` - Enable color output
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colorize text as success (green)
    pub fn success(&self, text: &str) -> String {
        self.paint(AnsiColors::GREEN, text)
    }

    /// Colorize text as error (red), with an "Error: " prefix
    pub fn error(&self, text: &str) -> String {
        self.paint(AnsiColors::RED, &format!("Error: {}", text))
    }

    /// Colorize text as warning (yellow)
    pub fn warning(&self, text: &str) -> String {
        self.paint(AnsiColors::YELLOW, text)
    }

    /// Colorize a heading (bold cyan)
    pub fn heading(&self, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}{}", AnsiColors::BOLD, AnsiColors::CYAN, text, AnsiColors::RESET)
        } else {
            text.to_string()
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", color, text, AnsiColors::RESET)
        } else {
            text.to_string()
        }
    }
}
