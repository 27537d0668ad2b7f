// flightcheck/src/ui/output_format.rs
//! Themed status messages and small formatting helpers.
//! License: MIT OR APACHE 2.0

use owo_colors::OwoColorize;
use std::io::{self, Write};

use crate::ui::theme::{color_for, ThemeEntry, ThemeMap};

/// Renders `text` in the color configured for `entry`, or plain when color is off.
pub fn paint(text: &str, entry: ThemeEntry, theme: &ThemeMap, supports_color: bool) -> String {
    match color_for(theme, entry) {
        Some(color) if supports_color => text.color(color.to_ansi_color()).to_string(),
        _ => text.to_string(),
    }
}

fn print_message(
    writer: &mut dyn Write,
    prefix: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{}", paint(&format!("{}{}", prefix, msg), entry, theme, supports_color))
}

pub fn print_info_message(writer: &mut dyn Write, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "", msg, ThemeEntry::Info, theme, supports_color)
}

pub fn print_success_message(writer: &mut dyn Write, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "", msg, ThemeEntry::Success, theme, supports_color)
}

pub fn print_warn_message(writer: &mut dyn Write, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "Warning: ", msg, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message(writer: &mut dyn Write, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "Error: ", msg, ThemeEntry::Error, theme, supports_color)
}

/// Human-readable byte count using binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;

    #[test]
    fn test_messages_without_color() {
        let theme = ThemeStyle::default_theme_map();
        let mut out = Vec::new();
        print_error_message(&mut out, "boom", &theme, false).unwrap();
        print_warn_message(&mut out, "careful", &theme, false).unwrap();
        print_success_message(&mut out, "done", &theme, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Error: boom\nWarning: careful\ndone\n");
    }

    #[test]
    fn test_paint_with_color_adds_escapes() {
        let theme = ThemeStyle::default_theme_map();
        let painted = paint("x", ThemeEntry::Error, &theme, true);
        assert!(painted.contains("\u{1b}["));
        assert!(painted.contains('x'));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2.00 GiB");
    }
}
