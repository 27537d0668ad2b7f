//! Module for managing the application's command-line interface (CLI) theme.
//!
//! A theme maps each kind of output element to an optional 16-color ANSI foreground.
//! Themes are loaded from YAML; entries missing from a custom theme keep their defaults.

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Type alias for the theme map, providing a consistent type definition.
pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// The different logical parts of the output that can be styled.
///
/// Each variant names one kind of message or table element that can have a
/// configurable foreground color in the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    /// Style for table headers.
    Header,
    /// Style for success messages and clean summaries.
    Success,
    /// Style for general informational messages.
    Info,
    /// Style for warnings and diff summaries with differences.
    Warn,
    /// Style for error messages and failed checks.
    Error,
    /// Style for parameter names in diff tables.
    ParamName,
    /// Style for parameters present only in the current dump.
    DiffAdded,
    /// Style for parameters present only in the reference dump.
    DiffRemoved,
    /// Style for parameters whose value differs between the dumps.
    DiffChanged,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 9] = [
        ThemeEntry::Header,
        ThemeEntry::Success,
        ThemeEntry::Info,
        ThemeEntry::Warn,
        ThemeEntry::Error,
        ThemeEntry::ParamName,
        ThemeEntry::DiffAdded,
        ThemeEntry::DiffRemoved,
        ThemeEntry::DiffChanged,
    ];
}

/// An ANSI color that can be used in the theme.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// A named ANSI color (e.g., "red", "brightgreen").
    Named(String),
}

/// Error type for parsing an invalid `ThemeColor` string.
#[derive(Debug, Clone)]
pub struct ParseThemeColorError;

impl fmt::Display for ParseThemeColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid theme color; expected one of: black, red, green, yellow, blue, \
            magenta, cyan, white, brightblack, brightred, brightgreen, brightyellow, \
            brightblue, brightmagenta, brightcyan, brightwhite."
        )
    }
}

impl std::error::Error for ParseThemeColorError {}

const COLOR_NAMES: [&str; 16] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
    "brightblack", "brightred", "brightgreen", "brightyellow", "brightblue",
    "brightmagenta", "brightcyan", "brightwhite",
];

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if COLOR_NAMES.contains(&lower.as_str()) {
            Ok(ThemeColor::Named(lower))
        } else {
            Err(ParseThemeColorError)
        }
    }
}

impl ThemeColor {
    fn named(name: &str) -> Option<Self> {
        Some(ThemeColor::Named(name.to_string()))
    }

    /// Converts the color into its `owo_colors::AnsiColors` counterpart.
    pub fn to_ansi_color(&self) -> AnsiColors {
        let ThemeColor::Named(name) = self;
        match name.to_lowercase().as_str() {
            "black" => AnsiColors::Black,
            "red" => AnsiColors::Red,
            "green" => AnsiColors::Green,
            "yellow" => AnsiColors::Yellow,
            "blue" => AnsiColors::Blue,
            "magenta" => AnsiColors::Magenta,
            "cyan" => AnsiColors::Cyan,
            "brightblack" => AnsiColors::BrightBlack,
            "brightred" => AnsiColors::BrightRed,
            "brightgreen" => AnsiColors::BrightGreen,
            "brightyellow" => AnsiColors::BrightYellow,
            "brightblue" => AnsiColors::BrightBlue,
            "brightmagenta" => AnsiColors::BrightMagenta,
            "brightcyan" => AnsiColors::BrightCyan,
            "brightwhite" => AnsiColors::BrightWhite,
            _ => AnsiColors::White,
        }
    }

    /// Converts the color for use in `comfy_table` cells.
    pub fn to_table_color(&self) -> comfy_table::Color {
        use comfy_table::Color;
        let ThemeColor::Named(name) = self;
        match name.to_lowercase().as_str() {
            "black" => Color::Black,
            "red" => Color::DarkRed,
            "green" => Color::DarkGreen,
            "yellow" => Color::DarkYellow,
            "blue" => Color::DarkBlue,
            "magenta" => Color::DarkMagenta,
            "cyan" => Color::DarkCyan,
            "white" => Color::Grey,
            "brightblack" => Color::DarkGrey,
            "brightred" => Color::Red,
            "brightgreen" => Color::Green,
            "brightyellow" => Color::Yellow,
            "brightblue" => Color::Blue,
            "brightmagenta" => Color::Magenta,
            "brightcyan" => Color::Cyan,
            "brightwhite" => Color::White,
            _ => Color::Reset,
        }
    }
}

/// The style configuration for a specific `ThemeEntry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeStyle {
    /// An optional `ThemeColor` to apply as the foreground color.
    pub fg: Option<ThemeColor>,
}

/// Loads a theme from a YAML file, or returns the default theme.
pub fn build_theme_map(theme_path: Option<&Path>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

/// The foreground color configured for `entry`, if any.
pub fn color_for(theme: &ThemeMap, entry: ThemeEntry) -> Option<&ThemeColor> {
    theme.get(&entry).and_then(|style| style.fg.as_ref())
}

impl ThemeStyle {
    /// Loads a theme from a YAML file and fills missing entries from the default theme.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let mut custom: ThemeMap = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

        for (entry, style) in Self::default_theme_map() {
            custom.entry(entry).or_insert(style);
        }
        Ok(custom)
    }

    /// Returns the default theme.
    pub fn default_theme_map() -> ThemeMap {
        ThemeEntry::ALL
            .into_iter()
            .map(|entry| {
                let fg = match entry {
                    ThemeEntry::Header => ThemeColor::named("brightwhite"),
                    ThemeEntry::Success => ThemeColor::named("green"),
                    ThemeEntry::Info => ThemeColor::named("cyan"),
                    ThemeEntry::Warn => ThemeColor::named("yellow"),
                    ThemeEntry::Error => ThemeColor::named("red"),
                    ThemeEntry::ParamName => ThemeColor::named("white"),
                    ThemeEntry::DiffAdded => ThemeColor::named("green"),
                    ThemeEntry::DiffRemoved => ThemeColor::named("red"),
                    ThemeEntry::DiffChanged => ThemeColor::named("yellow"),
                };
                (entry, ThemeStyle { fg })
            })
            .collect()
    }
}
