//! Terminal output helpers
//!
//! A small palette of semantic colors and icons; color is applied only on a
//! tty and `NO_COLOR` is respected.

use crossterm::style::{Color, Stylize};
use is_terminal::IsTerminal;

pub mod colors {
    use super::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const BUILD: &str = "📦";
    pub const WATCH: &str = "👀";
    pub const SERVER: &str = "📡";
    pub const CLEAN: &str = "🧹";
    pub const CHANGE: &str = "📝";
    pub const RERUN: &str = "🔄";
}

/// Whether stdout wants colored output
pub fn supports_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Apply `color` to `text` when `enabled`, otherwise pass through
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_disabled_passes_through() {
        assert_eq!(paint("ok", colors::SUCCESS, false), "ok");
    }

    #[test]
    fn paint_enabled_wraps_with_escapes() {
        let painted = paint("ok", colors::SUCCESS, true);
        assert!(painted.contains("ok"));
        assert!(painted.len() > 2);
    }
}
