//! Per-severity text templates for the async pipeline
//!
//! Each level maps to a distinct ANSI style:
//!
//! | level | style                      |
//! |-------|----------------------------|
//! | DEBUG | bold magenta               |
//! | INFO  | green                      |
//! | WARN  | bold yellow                |
//! | ERROR | bold, underlined red       |
//!
//! Escape sequences are written directly rather than through
//! `colored::ColoredString`, whose output depends on terminal detection.
//! Rendering is therefore a pure function of its inputs.

use super::log_level::LogLevel;
use std::fmt::{self, Display, Write};

const RESET: &str = "\x1b[0m";

struct LevelTemplate {
    tag: &'static str,
    /// SGR attributes preceding the color code
    attributes: &'static str,
}

const fn template(level: LogLevel) -> LevelTemplate {
    match level {
        LogLevel::Debug => LevelTemplate {
            tag: "[DEBUG]",
            attributes: "1;",
        },
        LogLevel::Info => LevelTemplate {
            tag: "[INFO]",
            attributes: "",
        },
        LogLevel::Warn => LevelTemplate {
            tag: "[WARN]",
            attributes: "1;",
        },
        LogLevel::Error => LevelTemplate {
            tag: "[ERROR]",
            attributes: "1;4;",
        },
    }
}

/// Renders leveled messages into human-readable, optionally colorized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    use_colors: bool,
}

impl Formatter {
    pub const fn new() -> Self {
        Self { use_colors: true }
    }

    /// Same templates, no escape sequences
    pub const fn plain() -> Self {
        Self { use_colors: false }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    /// Join pre-rendered values with single spaces
    pub fn join(values: &[&dyn Display]) -> String {
        let mut out = String::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            // Writing into a String cannot fail
            let _ = write!(out, "{}", value);
        }
        out
    }

    pub fn render(&self, level: LogLevel, values: &[&dyn Display]) -> String {
        self.render_message(level, &Self::join(values))
    }

    /// Positional-format variant: `renderf(l, format_args!("{} items", 5))`
    /// equals `render(l, &[&"5 items"])`.
    pub fn renderf(&self, level: LogLevel, args: fmt::Arguments<'_>) -> String {
        self.render_message(level, &fmt::format(args))
    }

    /// Apply the level's template to an already-joined message
    pub fn render_message(&self, level: LogLevel, message: &str) -> String {
        let template = template(level);
        if self.use_colors {
            format!(
                "\x1b[{}{}m{} {}{}",
                template.attributes,
                level.color_code().to_fg_str(),
                template.tag,
                message,
                RESET
            )
        } else {
            format!("{} {}", template.tag, message)
        }
    }

    /// The one-per-burst overflow notice, rendered with the warn template
    pub fn render_drop_notice(&self, dropped: u64) -> String {
        self.render_message(LogLevel::Warn, &format!("{} messages dropped", dropped))
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}
