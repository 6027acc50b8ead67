use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DAYLIGHT_BACKGROUND: &str = "#f8fafc";
const DAYLIGHT_TEXT: &str = "#1f2937";
const DAYLIGHT_MUTED: &str = "#6b7280";
const DAYLIGHT_CARD: &str = "#ffffff";
const DAYLIGHT_SELECTION: &str = "#3b82f6";
const DAYLIGHT_BADGE: &str = "#16a34a";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("daylight", include_str!("../themes/daylight.toml")),
    ("midnight", include_str!("../themes/midnight.toml")),
    ("solarized_light", include_str!("../themes/solarized_light.toml")),
];

const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE_LABEL: f32 = 12.0;
const FONT_SIZE_SMALL: f32 = 10.0;

/// Page-level colors. Category and trust-tier palettes are fixed and live in
/// `graph::style`; a theme only decides what surrounds them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_text")]
    pub text_color: String,
    #[serde(default = "default_muted")]
    pub muted_text_color: String,
    #[serde(default = "default_card")]
    pub card_color: String,
    #[serde(default = "default_selection")]
    pub selection_color: String,
    #[serde(default = "default_badge")]
    pub badge_color: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size_label")]
    pub font_size_label: f32,
    #[serde(default = "default_font_size_small")]
    pub font_size_small: f32,
}

fn default_background() -> String {
    DAYLIGHT_BACKGROUND.to_string()
}
fn default_text() -> String {
    DAYLIGHT_TEXT.to_string()
}
fn default_muted() -> String {
    DAYLIGHT_MUTED.to_string()
}
fn default_card() -> String {
    DAYLIGHT_CARD.to_string()
}
fn default_selection() -> String {
    DAYLIGHT_SELECTION.to_string()
}
fn default_badge() -> String {
    DAYLIGHT_BADGE.to_string()
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_font_size_label() -> f32 {
    FONT_SIZE_LABEL
}
fn default_font_size_small() -> f32 {
    FONT_SIZE_SMALL
}

impl Default for Theme {
    fn default() -> Self {
        Self::daylight()
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
    normal: AlacrittyNormal,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyNormal {
    black: String,
    green: String,
    blue: String,
    white: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

impl Theme {
    pub fn daylight() -> Self {
        Theme {
            background_color: DAYLIGHT_BACKGROUND.to_string(),
            text_color: DAYLIGHT_TEXT.to_string(),
            muted_text_color: DAYLIGHT_MUTED.to_string(),
            card_color: DAYLIGHT_CARD.to_string(),
            selection_color: DAYLIGHT_SELECTION.to_string(),
            badge_color: DAYLIGHT_BADGE.to_string(),
            font_family: FONT_FAMILY.to_string(),
            font_size_label: FONT_SIZE_LABEL,
            font_size_small: FONT_SIZE_SMALL,
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                Error::Theme(format!(
                    "Unknown built-in theme '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                ))
            })?;
        Self::from_alacritty_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| Error::Theme(format!("Failed to parse Alacritty YAML: {}", e)))?;
        Ok(Self::from_alacritty_theme(alacritty))
    }

    pub fn from_alacritty_toml(content: &str) -> Result<Self> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| Error::Theme(format!("Failed to parse Alacritty TOML: {}", e)))?;
        Ok(Self::from_alacritty_theme(alacritty))
    }

    /// Resolve a `--theme` argument: an existing file path is parsed as TOML,
    /// then YAML; anything else is looked up among the built-ins.
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = std::path::Path::new(name_or_path);
        if path.is_file() {
            let content = std::fs::read_to_string(path)?;
            if let Ok(theme) = Self::from_alacritty_toml(&content) {
                return Ok(theme);
            }
            return Self::from_alacritty_yaml(&content).map_err(|_| {
                Error::Theme(format!(
                    "Failed to parse theme file as TOML or YAML: {}",
                    path.display()
                ))
            });
        }
        Self::from_builtin(name_or_path)
    }

    fn from_alacritty_theme(alacritty: AlacrittyTheme) -> Self {
        let colors = alacritty.colors;

        Theme {
            background_color: colors.primary.background,
            text_color: colors.primary.foreground,
            muted_text_color: colors.normal.white,
            card_color: colors.normal.black,
            selection_color: colors.normal.blue,
            badge_color: colors.normal.green,
            font_family: FONT_FAMILY.to_string(),
            font_size_label: FONT_SIZE_LABEL,
            font_size_small: FONT_SIZE_SMALL,
        }
    }
}
