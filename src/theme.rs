//! Theme system for the grid
//!
//! Provides YAML-based theming with compile-time embedded presets and
//! user-defined themes from the config directory.
//!
//! Theme loading priority:
//! 1. User config: `~/.config/gridcanvas/themes/{id}.yaml`
//! 2. Embedded: Built-in presets compiled into the binary
//!
//! A resolved [`Theme`] is an immutable value; switching themes replaces it
//! wholesale.

use std::path::Path;

use serde::Deserialize;

use crate::error::{GridError, Result};

// Embed theme YAML files at compile time
pub const DEFAULT_LIGHT_YAML: &str = include_str!("../themes/default-light.yaml");
pub const DEFAULT_DARK_YAML: &str = include_str!("../themes/default-dark.yaml");
pub const COMPACT_LIGHT_YAML: &str = include_str!("../themes/compact-light.yaml");

/// A built-in theme entry
pub struct BuiltinTheme {
    /// Stable identifier for config (e.g. "default-light")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

/// Registry of all built-in themes
pub const BUILTIN_THEMES: &[BuiltinTheme] = &[
    BuiltinTheme {
        id: "default-light",
        yaml: DEFAULT_LIGHT_YAML,
    },
    BuiltinTheme {
        id: "default-dark",
        yaml: DEFAULT_DARK_YAML,
    },
    BuiltinTheme {
        id: "compact-light",
        yaml: COMPACT_LIGHT_YAML,
    },
];

/// Where the theme came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    /// User-defined theme in ~/.config/gridcanvas/themes/
    User,
    /// Built-in theme embedded in binary
    Builtin,
}

/// Information about an available theme
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    pub id: String,
    /// Display name from YAML (e.g., "Default Light")
    pub name: String,
    pub source: ThemeSource,
}

/// Load a theme from a YAML file
pub fn from_file(path: &Path) -> Result<Theme> {
    let content = std::fs::read_to_string(path).map_err(|source| GridError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Theme::from_yaml(&content)
}

/// Load theme by id with priority: user → builtin
pub fn load_theme(id: &str) -> Result<Theme> {
    if let Some(user_dir) = crate::config_paths::themes_dir() {
        let user_path = user_dir.join(format!("{}.yaml", id));
        if user_path.exists() {
            tracing::info!("Loading user theme from {}", user_path.display());
            return from_file(&user_path);
        }
    }

    tracing::info!("Loading builtin theme: {}", id);
    Theme::from_builtin(id)
}

/// List all available themes; user themes override builtins with the same id
pub fn list_available_themes() -> Vec<ThemeInfo> {
    let mut themes = Vec::new();
    let mut seen_ids = std::collections::HashSet::new();

    if let Some(user_dir) = crate::config_paths::themes_dir() {
        if let Ok(entries) = std::fs::read_dir(&user_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if path
                    .extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
                {
                    if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                        if seen_ids.insert(id.to_string()) {
                            let name = extract_theme_name(&path).unwrap_or_else(|| id.to_string());
                            themes.push(ThemeInfo {
                                id: id.to_string(),
                                name,
                                source: ThemeSource::User,
                            });
                        }
                    }
                }
            }
        }
    }

    for builtin in BUILTIN_THEMES {
        if seen_ids.insert(builtin.id.to_string()) {
            let name = Theme::from_yaml(builtin.yaml)
                .map(|t| t.name)
                .unwrap_or_else(|_| builtin.id.to_string());
            themes.push(ThemeInfo {
                id: builtin.id.to_string(),
                name,
                source: ThemeSource::Builtin,
            });
        }
    }

    themes
}

/// Extract theme name from YAML file without full parsing
fn extract_theme_name(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("name:") {
            let value = trimmed.strip_prefix("name:")?.trim();
            let value = value.trim_matches('"').trim_matches('\'');
            return Some(value.to_string());
        }
    }
    None
}

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to ARGB u32 for the pixel buffer
    pub fn to_argb_u32(&self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub const fn with_alpha(&self, a: u8) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xFF
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
                .ok_or_else(|| GridError::InvalidColor(s.to_string()))
        };
        match hex.len() {
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(GridError::InvalidColor(s.to_string())),
        }
    }
}

/// Raw theme data as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeData {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub colors: ColorsData,
    #[serde(default)]
    pub fonts: FontsData,
    #[serde(default)]
    pub spacing: SpacingData,
}

/// Colors (raw strings from YAML)
#[derive(Debug, Clone, Deserialize)]
pub struct ColorsData {
    pub background: String,
    pub header_background: String,
    pub text: String,
    pub border: String,
    #[serde(default)]
    pub header_text: Option<String>,
    #[serde(default)]
    pub hover: Option<String>,
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub stripe: Option<String>,
    #[serde(default)]
    pub indicator: Option<String>,
}

/// Font metrics for one row class
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FontStyle {
    /// Size in logical pixels
    pub size: f32,
    /// CSS-like weight; 600 and above renders bold
    #[serde(default = "default_weight")]
    pub weight: u16,
}

fn default_weight() -> u16 {
    400
}

impl FontStyle {
    pub const fn new(size: f32, weight: u16) -> Self {
        Self { size, weight }
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            size: self.size * factor,
            weight: self.weight,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FontsData {
    #[serde(default = "FontsData::default_header")]
    pub header: FontStyle,
    #[serde(default = "FontsData::default_cell")]
    pub cell: FontStyle,
    #[serde(default = "FontsData::default_footer")]
    pub footer: FontStyle,
}

impl FontsData {
    fn default_header() -> FontStyle {
        FontStyle::new(14.0, 600)
    }
    fn default_cell() -> FontStyle {
        FontStyle::new(14.0, 400)
    }
    fn default_footer() -> FontStyle {
        FontStyle::new(12.0, 400)
    }
}

impl Default for FontsData {
    fn default() -> Self {
        Self {
            header: Self::default_header(),
            cell: Self::default_cell(),
            footer: Self::default_footer(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpacingData {
    #[serde(default = "SpacingData::default_header_height")]
    pub header_height: f32,
    #[serde(default = "SpacingData::default_cell_height")]
    pub cell_height: f32,
    #[serde(default = "SpacingData::default_border_width")]
    pub border_width: f32,
    #[serde(default = "SpacingData::default_padding")]
    pub padding: f32,
}

impl SpacingData {
    fn default_header_height() -> f32 {
        40.0
    }
    fn default_cell_height() -> f32 {
        36.0
    }
    fn default_border_width() -> f32 {
        1.0
    }
    fn default_padding() -> f32 {
        12.0
    }
}

impl Default for SpacingData {
    fn default() -> Self {
        Self {
            header_height: Self::default_header_height(),
            cell_height: Self::default_cell_height(),
            border_width: Self::default_border_width(),
            padding: Self::default_padding(),
        }
    }
}

/// Resolved colors
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub background: Color,
    pub header_background: Color,
    pub header_text: Color,
    pub border: Color,
    pub text: Color,
    /// Translucent tint laid over the hovered/highlighted cell
    pub hover: Color,
    /// Translucent tint laid over selected rows
    pub selected: Color,
    pub stripe: Color,
    /// Sort/filter glyphs when active
    pub indicator: Color,
}

/// Resolved fonts per row class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeFonts {
    pub header: FontStyle,
    pub cell: FontStyle,
    pub footer: FontStyle,
}

/// Resolved spacing, in logical pixels
pub type Spacing = SpacingData;

/// Resolved theme with parsed colors
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
    pub fonts: ThemeFonts,
    pub spacing: Spacing,
}

impl Theme {
    /// Load theme from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let data: ThemeData = serde_yaml::from_str(yaml)?;
        Self::from_data(data)
    }

    /// Load a built-in theme by id
    pub fn from_builtin(id: &str) -> Result<Self> {
        let entry = BUILTIN_THEMES
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| GridError::UnknownTheme(id.to_string()))?;
        Theme::from_yaml(entry.yaml)
    }

    /// Convert raw theme data to resolved theme
    pub fn from_data(data: ThemeData) -> Result<Self> {
        let optional = |value: &Option<String>, fallback: Color| -> Result<Color> {
            value
                .as_deref()
                .map(Color::from_hex)
                .transpose()
                .map(|c| c.unwrap_or(fallback))
        };

        let text = Color::from_hex(&data.colors.text)?;
        let background = Color::from_hex(&data.colors.background)?;
        let indicator = optional(&data.colors.indicator, Color::rgb(0x20, 0x80, 0xF0))?;

        Ok(Theme {
            name: data.name,
            colors: ThemeColors {
                background,
                header_background: Color::from_hex(&data.colors.header_background)?,
                header_text: optional(&data.colors.header_text, text)?,
                border: Color::from_hex(&data.colors.border)?,
                text,
                hover: optional(&data.colors.hover, indicator.with_alpha(0x24))?,
                selected: optional(&data.colors.selected, indicator.with_alpha(0x38))?,
                stripe: optional(&data.colors.stripe, background)?,
                indicator,
            },
            fonts: ThemeFonts {
                header: data.fonts.header,
                cell: data.fonts.cell,
                footer: data.fonts.footer,
            },
            spacing: data.spacing,
        })
    }

    /// Default light theme (YAML-backed with Rust fallback)
    pub fn default_light() -> Self {
        match Theme::from_yaml(DEFAULT_LIGHT_YAML) {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!("builtin light theme failed to parse: {}", e);
                Theme {
                    name: "Default Light".to_string(),
                    colors: ThemeColors {
                        background: Color::rgb(0xFF, 0xFF, 0xFF),
                        header_background: Color::rgb(0xFA, 0xFA, 0xFC),
                        header_text: Color::rgb(0x1F, 0x22, 0x25),
                        border: Color::rgb(0xEF, 0xEF, 0xF5),
                        text: Color::rgb(0x33, 0x36, 0x39),
                        hover: Color::rgba(0x20, 0x80, 0xF0, 0x24),
                        selected: Color::rgba(0x20, 0x80, 0xF0, 0x38),
                        stripe: Color::rgb(0xFA, 0xFA, 0xFC),
                        indicator: Color::rgb(0x20, 0x80, 0xF0),
                    },
                    fonts: ThemeFonts {
                        header: FontsData::default_header(),
                        cell: FontsData::default_cell(),
                        footer: FontsData::default_footer(),
                    },
                    spacing: Spacing::default(),
                }
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_light()
    }
}
