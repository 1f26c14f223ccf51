use chrono::Local;
use crossterm::terminal;
use ciphershell_core::theme::{hex_to_rgb, Theme};

pub(crate) const PROMPT: &str = "~/ciphershell";
pub(crate) const PROMPT_ARROW: &str = "➜";
pub(crate) const GHOST_HINT: &str = " [Tab]";

pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            while let Some(&next) = chars.peek() {
                chars.next();
                if next == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Printable width of a string that may carry SGR sequences.
pub(crate) fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/// 24-bit foreground escape for a `#rrggbb` colour. Falls back to plain
/// green for malformed input.
pub(crate) fn fg_hex(hex: &str) -> String {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m"),
        None => "\x1b[32m".to_string(),
    }
}

pub(crate) fn accent(theme: &Theme) -> String {
    fg_hex(theme.accent)
}

pub(crate) fn accent2(theme: &Theme) -> String {
    fg_hex(theme.accent2)
}

pub(crate) fn clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub(crate) fn term_width() -> u16 {
    terminal::size().map(|(w, _)| w).unwrap_or(80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphershell_core::theme::find_theme;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1;32mok\x1b[0m done"), "ok done");
        assert_eq!(visible_width("\x1b[38;2;1;2;3m➜\x1b[0m x"), 3);
    }

    #[test]
    fn test_fg_hex() {
        let nord = find_theme("nord").unwrap();
        assert_eq!(accent(nord), "\x1b[38;2;136;192;208m");
        assert_eq!(fg_hex("nope"), "\x1b[32m");
    }

    #[test]
    fn test_clock_shape() {
        let now = clock();
        assert_eq!(now.len(), 8);
        assert_eq!(now.matches(':').count(), 2);
    }
}
