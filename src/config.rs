//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::state::viewport::DEFAULT_OVERSCAN;
use crate::ui::ThemeConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Display settings
    pub display: DisplayConfig,
    /// Theme settings
    pub theme: ThemeConfig,
    /// Keyboard shortcuts
    pub keybindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Location the explorer browses
    pub location_id: i64,
    /// Maximum number of entries requested per directory
    pub limit: usize,
    /// Directory shown on start (defaults to the working directory)
    pub start_path: Option<String>,
    /// Log filter, e.g. "info" or "dirview=debug"
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            location_id: 1,
            limit: 500,
            start_path: None,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows materialized beyond each edge of the visible window
    pub overscan: usize,
    /// Show the title and column header above the list
    pub show_header: bool,
    /// Maximum gap between two clicks that open a directory
    pub double_click_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            overscan: DEFAULT_OVERSCAN,
            show_header: true,
            double_click_ms: 500,
        }
    }
}

/// Keyboard shortcut configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeyBindings {
    /// Custom keybindings (action -> key)
    #[serde(flatten)]
    pub bindings: HashMap<String, String>,
}

impl KeyBindings {
    /// Get the key binding for an action, falling back to default
    pub fn get(&self, action: &str) -> &str {
        self.bindings.get(action)
            .map(|s| s.as_str())
            .unwrap_or_else(|| default_keybinding(action))
    }

    /// Check if a key event matches an action
    pub fn matches(&self, action: &str, key: &crossterm::event::KeyEvent) -> bool {
        use crossterm::event::KeyCode;

        parse_key_binding(self.get(action))
            .map(|(code, mods)| {
                if key.modifiers != mods {
                    return false;
                }
                // Char keys compare case-insensitively
                match (&key.code, &code) {
                    (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(b),
                    _ => key.code == code,
                }
            })
            .unwrap_or(false)
    }
}

/// Parse a key binding string like "Ctrl+C", "Alt+F1", "F10", etc.
pub fn parse_key_binding(s: &str) -> Option<(crossterm::event::KeyCode, crossterm::event::KeyModifiers)> {
    use crossterm::event::KeyModifiers;

    let s = s.trim();
    let mut modifiers = KeyModifiers::NONE;
    let mut parts: Vec<&str> = s.split('+').collect();

    while parts.len() > 1 {
        let modifier = parts.remove(0).to_lowercase();
        match modifier.as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = parse_key_code(parts[0])?;
    Some((code, modifiers))
}

fn parse_key_code(s: &str) -> Option<crossterm::event::KeyCode> {
    use crossterm::event::KeyCode;

    let s_lower = s.to_lowercase();

    if s_lower.starts_with('f') && s_lower.len() >= 2
        && let Ok(n) = s_lower[1..].parse::<u8>()
            && (1..=12).contains(&n) {
                return Some(KeyCode::F(n));
            }

    match s_lower.as_str() {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "backspace" | "bs" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "space" => Some(KeyCode::Char(' ')),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

/// Get the default key binding for an action
pub fn default_keybinding(action: &str) -> &'static str {
    match action {
        "quit" => "q",
        "quit_alt" => "Ctrl+C",
        "move_up" => "Up",
        "move_down" => "Down",
        "page_up" => "PageUp",
        "page_down" => "PageDown",
        "activate" => "Enter",
        "go_parent" => "Backspace",
        "go_back" => "Alt+Left",
        "select_first" => "Space",
        "clear_selection" => "Esc",
        "refresh" => "Ctrl+R",
        _ => "",
    }
}

/// Get the config directory path for the current platform
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("dirview"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        // $XDG_CONFIG_HOME first, then ~/.config
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|p| PathBuf::from(p).join(".config")))
            .map(|p| p.join("dirview"))
    }
}

/// Get the config file path
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Default config file content with comments
fn default_config() -> String {
    r##"# dirview configuration
# This file is auto-generated. Edit as needed.

[general]
# Location whose directories are browsed
location_id = 1

# Maximum number of entries fetched per directory
limit = 500

# Directory to open on start (default: current directory)
# start_path = "/home/me"

# Log filter written to dirview.log next to this file
log_level = "info"

[display]
# Rows rendered beyond each edge of the visible list
overscan = 3

# Show the directory title and column header
show_header = true

# Two clicks on the same row within this many milliseconds open it
double_click_ms = 500

[theme]
# Theme preset: "dark", "classic", "light" or the name of a [theme.themes.*] entry
preset = "dark"

# Override individual colors (name, #RRGGBB or rgb(R,G,B))
# [theme.colors]
# stripe_bg = "#404040"
# selected_border = "cyan"

# Name highlighting rules, first match wins.
# pattern is a case-insensitive regex, or "directory" / "thumbnail"
# [[theme.highlights]]
# pattern = "\\.(jpg|png)$"
# color = "magenta"

[keybindings]
# Action = "Key" with optional Ctrl+, Alt+, Shift+ prefixes
# quit = "q"
# move_up = "Up"
# move_down = "Down"
# page_up = "PageUp"
# page_down = "PageDown"
# activate = "Enter"
# go_parent = "Backspace"
# go_back = "Alt+Left"
# select_first = "Space"
# clear_selection = "Esc"
# refresh = "Ctrl+R"
"##
    .to_string()
}

impl Config {
    /// Load configuration from the default location, creating it if it
    /// doesn't exist. Problems fall back to defaults with a warning.
    pub fn load() -> Self {
        let Some(config_path) = config_file() else {
            eprintln!("Warning: Could not determine config directory");
            return Config::default();
        };

        if !config_path.exists()
            && let Err(e) = write_default(&config_path) {
                eprintln!("Warning: Could not create config file: {}", e);
                return Config::default();
            }

        Self::load_or_default(&config_path)
    }

    /// Load from an explicit path, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}", e);
                eprintln!("Using default configuration");
                Config::default()
            }
        }
    }

    /// Read and parse a config file
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, toml_edit::de::Error> {
        toml_edit::de::from_str(content)
    }

    /// Request limit, never below one
    pub fn limit(&self) -> usize {
        self.general.limit.max(1)
    }
}

fn write_default(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, default_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config = Config::parse(&default_config()).unwrap();
        assert_eq!(config.general.location_id, 1);
        assert_eq!(config.general.limit, 500);
        assert_eq!(config.general.start_path, None);
        assert_eq!(config.display.overscan, 3);
        assert!(config.display.show_header);
        assert_eq!(config.display.double_click_ms, 500);
        assert_eq!(config.theme.preset, "dark");
        assert!(config.keybindings.bindings.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [general]
            limit = 0
            [keybindings]
            quit = "Ctrl+Q"
            "#,
        )
        .unwrap();
        assert_eq!(config.general.location_id, 1);
        assert_eq!(config.limit(), 1);
        assert_eq!(config.keybindings.get("quit"), "Ctrl+Q");
        assert_eq!(config.keybindings.get("move_up"), "Up");
    }

    #[test]
    fn test_invalid_config_falls_back() {
        assert!(Config::parse("[general]\nlimit = \"many\"").is_err());

        let path = std::env::temp_dir().join(format!("dirview-config-{}.toml", std::process::id()));
        fs::write(&path, "[general\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
        assert_eq!(Config::load_or_default(&path).general.limit, 500);
        let _ = fs::remove_file(&path);

        assert!(matches!(Config::load_from(&path), Err(AppError::Io(_))));
    }

    #[test]
    fn test_parse_key_binding() {
        assert_eq!(parse_key_binding("Ctrl+R"), Some((KeyCode::Char('R'), KeyModifiers::CONTROL)));
        assert_eq!(parse_key_binding("F10"), Some((KeyCode::F(10), KeyModifiers::NONE)));
        assert_eq!(parse_key_binding("space"), Some((KeyCode::Char(' '), KeyModifiers::NONE)));
        assert_eq!(parse_key_binding("PgDn"), Some((KeyCode::PageDown, KeyModifiers::NONE)));
        assert_eq!(parse_key_binding("Hyper+X"), None);
        assert_eq!(parse_key_binding("F13"), None);
        assert_eq!(parse_key_binding(""), None);
    }

    #[test]
    fn test_keybinding_matches() {
        let bindings = KeyBindings::default();
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(bindings.matches("refresh", &ctrl_r));
        assert!(!bindings.matches("quit", &ctrl_r));

        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(bindings.matches("quit", &q));
        assert!(!bindings.matches("no_such_action", &q));
    }
}
