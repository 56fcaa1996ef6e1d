//! Color theme for the explorer
//!
//! Provides built-in presets (dark, classic, light) and custom color configuration.

use ratatui::style::Color;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete theme definition with all UI colors
#[derive(Debug, Clone)]
pub struct Theme {
    // List frame
    pub border: Color,
    pub header: Color,
    pub header_bg: Color,
    pub background: Color,
    /// Tint applied to even rows
    pub stripe_bg: Color,

    // Rows
    pub file_normal: Color,
    pub file_directory: Color,
    pub file_size: Color,
    pub icon: Color,
    pub selected_border: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,
    pub status_error_bg: Color,
    pub status_error_fg: Color,
    pub status_loading: Color,

    /// Compiled name highlighting rules (first match wins)
    pub highlights: Vec<CompiledHighlight>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        let teal = Color::Rgb(0, 150, 136);
        let gold = Color::Rgb(200, 170, 100);
        let light_gray = Color::Rgb(171, 178, 191);
        let charcoal = Color::Rgb(58, 58, 58);

        Self {
            border: Color::Rgb(160, 160, 160),
            header: gold,
            header_bg: Color::Rgb(95, 135, 135),
            background: charcoal,
            stripe_bg: Color::Rgb(66, 66, 66),

            file_normal: Color::Rgb(220, 220, 220),
            file_directory: Color::Rgb(171, 175, 135),
            file_size: light_gray,
            icon: gold,
            selected_border: teal,
            selected_bg: Color::Rgb(0, 95, 95),
            selected_fg: Color::Rgb(220, 220, 220),

            status_bg: Color::Rgb(45, 45, 45),
            status_fg: light_gray,
            status_error_bg: Color::Rgb(180, 60, 60),
            status_error_fg: Color::White,
            status_loading: gold,

            highlights: Vec::new(),
        }
    }

    /// Classic Norton Commander blue theme
    pub fn classic() -> Self {
        Self {
            border: Color::Cyan,
            header: Color::Yellow,
            header_bg: Color::Cyan,
            background: Color::Blue,
            stripe_bg: Color::Rgb(16, 16, 150),

            file_normal: Color::LightCyan,
            file_directory: Color::White,
            file_size: Color::LightCyan,
            icon: Color::Yellow,
            selected_border: Color::Yellow,
            selected_bg: Color::Cyan,
            selected_fg: Color::Black,

            status_bg: Color::Cyan,
            status_fg: Color::Black,
            status_error_bg: Color::Red,
            status_error_fg: Color::White,
            status_loading: Color::Yellow,

            highlights: Vec::new(),
        }
    }

    /// Light theme - for light terminal backgrounds
    pub fn light() -> Self {
        Self {
            border: Color::DarkGray,
            header: Color::Blue,
            header_bg: Color::Gray,
            background: Color::White,
            stripe_bg: Color::Rgb(238, 238, 238),

            file_normal: Color::Black,
            file_directory: Color::Blue,
            file_size: Color::DarkGray,
            icon: Color::Blue,
            selected_border: Color::Blue,
            selected_bg: Color::Blue,
            selected_fg: Color::White,

            status_bg: Color::Gray,
            status_fg: Color::Black,
            status_error_bg: Color::Red,
            status_error_fg: Color::White,
            status_loading: Color::Magenta,

            highlights: Vec::new(),
        }
    }

    /// Get a theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "classic" => Some(Self::classic()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Apply color overrides from a key -> color map
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, value) in overrides {
            let Some(color) = parse_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring unparseable theme color");
                continue;
            };
            match key.as_str() {
                "border" => self.border = color,
                "header" => self.header = color,
                "header_bg" => self.header_bg = color,
                "background" => self.background = color,
                "stripe_bg" => self.stripe_bg = color,
                "file_normal" => self.file_normal = color,
                "file_directory" => self.file_directory = color,
                "file_size" => self.file_size = color,
                "icon" => self.icon = color,
                "selected_border" => self.selected_border = color,
                "selected_bg" => self.selected_bg = color,
                "selected_fg" => self.selected_fg = color,
                "status_bg" => self.status_bg = color,
                "status_fg" => self.status_fg = color,
                "status_error_bg" => self.status_error_bg = color,
                "status_error_fg" => self.status_error_fg = color,
                "status_loading" => self.status_loading = color,
                _ => {} // Ignore unknown keys
            }
        }
        self
    }

    /// Find the first highlight rule matching an entry
    pub fn find_highlight(&self, name: &str, is_dir: bool, has_thumbnail: bool) -> Option<(Color, Option<&str>)> {
        self.highlights.iter().find_map(|h| {
            let matches = match (h.special, &h.regex) {
                (Some(SpecialPattern::Directory), _) => is_dir,
                (Some(SpecialPattern::Thumbnail), _) => has_thumbnail,
                (None, Some(regex)) => !is_dir && regex.is_match(name),
                (None, None) => false,
            };
            matches.then(|| (h.color, h.suffix.as_deref()))
        })
    }
}

/// A user-defined custom theme
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CustomTheme {
    /// Base theme to inherit from: "dark", "classic", "light", or another custom theme name
    pub base: Option<String>,
    /// Color overrides
    #[serde(flatten)]
    pub colors: HashMap<String, String>,
}

/// Name highlighting rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHighlight {
    /// Regex matched against file names, or one of the special values
    /// "directory" and "thumbnail"
    pub pattern: String,
    /// Color for matching entries (name, hex, or rgb)
    pub color: String,
    /// Optional suffix shown after the name
    #[serde(default)]
    pub suffix: Option<String>,
}

/// Compiled highlighting rule
#[derive(Debug, Clone)]
pub struct CompiledHighlight {
    pub regex: Option<Regex>,
    pub special: Option<SpecialPattern>,
    pub color: Color,
    pub suffix: Option<String>,
}

/// Special pattern types that aren't regex-based
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialPattern {
    Directory,
    Thumbnail,
}

/// Theme configuration for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Active theme name: "dark", "classic", "light", or a custom theme name
    pub preset: String,
    /// Color overrides for the active theme
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// User-defined themes
    #[serde(default)]
    pub themes: HashMap<String, CustomTheme>,
    /// Name highlighting rules (first match wins)
    #[serde(default = "default_highlights")]
    pub highlights: Vec<FileHighlight>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            preset: "dark".to_string(),
            colors: HashMap::new(),
            themes: HashMap::new(),
            highlights: default_highlights(),
        }
    }
}

fn highlight(pattern: &str, color: &str) -> FileHighlight {
    FileHighlight {
        pattern: pattern.to_string(),
        color: color.to_string(),
        suffix: None,
    }
}

/// Default highlighting rules
fn default_highlights() -> Vec<FileHighlight> {
    vec![
        FileHighlight {
            pattern: "directory".to_string(),
            color: "#abaf87".to_string(),
            suffix: Some("/".to_string()),
        },
        highlight(r"\.(tar|gz|bz2|xz|zip|rar|7z|tgz|zst)$", "#b05050"),
        highlight(r"\.(jpg|jpeg|png|gif|bmp|svg|webp|heic|tiff?)$", "magenta"),
        highlight(r"\.(mp3|mp4|mkv|avi|mov|wav|flac|ogg|webm|m4a)$", "cyan"),
        highlight(r"\.(pdf|doc|docx|odt|xls|xlsx|ppt|pptx)$", "yellow"),
        highlight(r"\.(rs|py|js|ts|c|cpp|h|hpp|java|go|rb|sh)$", "lightblue"),
    ]
}

impl ThemeConfig {
    /// Build a Theme from this config
    pub fn build_theme(&self) -> Theme {
        let mut theme = self.resolve_theme(&self.preset, &mut Vec::new())
            .with_overrides(&self.colors);
        theme.highlights = self.compile_highlights();
        theme
    }

    fn compile_highlights(&self) -> Vec<CompiledHighlight> {
        self.highlights.iter().filter_map(|h| {
            let color = parse_color(&h.color)?;

            let (regex, special) = match h.pattern.to_lowercase().as_str() {
                "directory" | "dir" => (None, Some(SpecialPattern::Directory)),
                "thumbnail" => (None, Some(SpecialPattern::Thumbnail)),
                _ => match Regex::new(&format!("(?i){}", h.pattern)) {
                    Ok(re) => (Some(re), None),
                    Err(e) => {
                        tracing::warn!(pattern = %h.pattern, error = %e, "skipping invalid highlight pattern");
                        return None;
                    }
                },
            };

            Some(CompiledHighlight {
                regex,
                special,
                color,
                suffix: h.suffix.clone(),
            })
        }).collect()
    }

    /// Resolve a theme by name, following `base` links; `visited` breaks cycles
    fn resolve_theme(&self, name: &str, visited: &mut Vec<String>) -> Theme {
        if visited.iter().any(|v| v == name) {
            return Theme::default();
        }
        visited.push(name.to_string());

        if let Some(theme) = Theme::by_name(name) {
            return theme;
        }

        if let Some(custom) = self.themes.get(name) {
            let base_name = custom.base.as_deref().unwrap_or("dark");
            let base = self.resolve_theme(base_name, visited);
            return base.with_overrides(&custom.colors);
        }

        tracing::warn!(theme = %name, "unknown theme, using dark");
        Theme::default()
    }
}

/// Parse a color string into a ratatui Color
///
/// Supports:
/// - Named colors: "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white", "gray"
/// - Light variants: "light_red", "light_green", etc.
/// - RGB hex: "#RRGGBB" or "RRGGBB"
/// - RGB decimal: "rgb(R,G,B)"
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "black" => return Some(Color::Black),
        "red" => return Some(Color::Red),
        "green" => return Some(Color::Green),
        "yellow" => return Some(Color::Yellow),
        "blue" => return Some(Color::Blue),
        "magenta" => return Some(Color::Magenta),
        "cyan" => return Some(Color::Cyan),
        "white" => return Some(Color::White),
        "gray" | "grey" => return Some(Color::Gray),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => return Some(Color::DarkGray),
        "light_red" | "lightred" => return Some(Color::LightRed),
        "light_green" | "lightgreen" => return Some(Color::LightGreen),
        "light_yellow" | "lightyellow" => return Some(Color::LightYellow),
        "light_blue" | "lightblue" => return Some(Color::LightBlue),
        "light_magenta" | "lightmagenta" => return Some(Color::LightMagenta),
        "light_cyan" | "lightcyan" => return Some(Color::LightCyan),
        "reset" => return Some(Color::Reset),
        _ => {}
    }

    let hex = s.strip_prefix('#').unwrap_or(&s);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }

    if let Some(inner) = s.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        let parts: Vec<&str> = inner.split(',').collect();
        if parts.len() == 3 {
            let r = parts[0].trim().parse().ok()?;
            let g = parts[1].trim().parse().ok()?;
            let b = parts[2].trim().parse().ok()?;
            return Some(Color::Rgb(r, g, b));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("BLUE"), Some(Color::Blue));
        assert_eq!(parse_color("dark_gray"), Some(Color::DarkGray));
        assert_eq!(parse_color("lightcyan"), Some(Color::LightCyan));
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn test_parse_hex_and_rgb_colors() {
        assert_eq!(parse_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_color("00ff00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_color("rgb(0, 128, 255)"), Some(Color::Rgb(0, 128, 255)));
        assert_eq!(parse_color("rgb(0,128)"), None);
    }

    #[test]
    fn test_theme_presets() {
        assert!(Theme::by_name("dark").is_some());
        assert!(Theme::by_name("Classic").is_some());
        assert!(Theme::by_name("light").is_some());
        assert!(Theme::by_name("nonexistent").is_none());
    }

    #[test]
    fn test_unknown_override_keys_are_ignored() {
        let overrides = HashMap::from([
            ("column_separator".to_string(), "red".to_string()),
            ("border".to_string(), "blue".to_string()),
        ]);
        let theme = Theme::dark().with_overrides(&overrides);
        let dark = Theme::dark();
        assert_eq!(theme.border, Color::Blue);
        assert_eq!(theme.header, dark.header);
        assert_eq!(theme.background, dark.background);
        assert_eq!(theme.stripe_bg, dark.stripe_bg);
    }

    #[test]
    fn test_default_highlights() {
        let theme = ThemeConfig::default().build_theme();
        assert!(!theme.highlights.is_empty());

        let (_, suffix) = theme.find_highlight("src", true, false).unwrap();
        assert_eq!(suffix, Some("/"));

        assert!(theme.find_highlight("backup.tar.gz", false, false).is_some());
        assert!(theme.find_highlight("IMG_0001.JPG", false, false).is_some());
        assert!(theme.find_highlight("notes", false, false).is_none());
    }

    #[test]
    fn test_custom_theme_inheritance_and_overrides() {
        let toml_str = r##"
            preset = "mine"
            highlights = [{ pattern = "thumbnail", color = "green" }, { pattern = "([", color = "red" }]
            [colors]
            status_fg = "#010203"
            [themes.mine]
            base = "classic"
            background = "black"
        "##;
        let config: ThemeConfig = toml_edit::de::from_str(toml_str).unwrap();
        let theme = config.build_theme();
        assert_eq!(theme.background, Color::Black);
        assert_eq!(theme.header, Color::Yellow);
        assert_eq!(theme.status_fg, Color::Rgb(1, 2, 3));
        // Invalid regex is dropped
        assert_eq!(theme.highlights.len(), 1);
        assert_eq!(theme.find_highlight("a.png", false, true).map(|h| h.0), Some(Color::Green));
    }

    #[test]
    fn test_cyclic_custom_themes_fall_back() {
        let toml_str = r#"
            preset = "a"
            [themes.a]
            base = "b"
            [themes.b]
            base = "a"
        "#;
        let config: ThemeConfig = toml_edit::de::from_str(toml_str).unwrap();
        let theme = config.build_theme();
        assert_eq!(theme.border, Theme::dark().border);
    }

    #[test]
    fn test_highlights_from_toml() {
        let toml_str = r#"
            preset = "dark"
        "#;
        let config: ThemeConfig = toml_edit::de::from_str(toml_str).unwrap();
        assert!(!config.highlights.is_empty(), "Should use default highlights when not in TOML");
    }
}
