//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root and is layered over stock defaults: a user file only needs
//! the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_title = "Portfolio"
//! language = "en"
//! # base_url = "https://example.com"   # enables canonical/og:url tags
//!
//! [theme]
//! accent = "#b08d57"
//! max_width = "72rem"
//! section_padding = "6rem"
//! grid_gap = "2rem"
//!
//! [reveal]
//! threshold = 0.1               # or a list, e.g. [0.0, 0.5]
//! root_margin = "0px 0px -10% 0px"
//! trigger_once = true
//! stagger_ms = 100
//!
//! [lazy_images]
//! threshold = 0.1
//! root_margin = "50px 0px"
//! eager_images = 3              # first N gallery images load immediately
//!
//! [colors.light]
//! background = "#fafaf9"
//! text = "#1c1917"
//! text_muted = "#78716c"
//! border = "#e7e5e4"
//! surface = "#ffffff"
//!
//! [colors.dark]
//! background = "#0c0a09"
//! text = "#f5f5f4"
//! text_muted = "#a8a29e"
//! border = "#292524"
//! surface = "#1c1917"
//!
//! [processing]
//! max_processes = 4             # asset copy workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early. Visibility settings are
//! validated through [`VisibilityConfig`], so an out-of-range threshold fails
//! the build instead of being clamped.

use crate::visibility::{Threshold, VisibilityConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// `<title>` suffix and footer name.
    pub site_title: String,
    /// `lang` attribute of the document.
    pub language: String,
    /// Public URL of the site; enables canonical and Open Graph URL tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub colors: ColorConfig,
    pub theme: ThemeConfig,
    /// Scroll-triggered section entrance.
    pub reveal: RevealConfig,
    /// Deferred gallery image loading.
    pub lazy_images: LazyImagesConfig,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Portfolio".to_string(),
            language: "en".to_string(),
            base_url: None,
            colors: ColorConfig::default(),
            theme: ThemeConfig::default(),
            reveal: RevealConfig::default(),
            lazy_images: LazyImagesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::Validation("language must not be empty".into()));
        }
        self.reveal
            .visibility_config()
            .map_err(|e| ConfigError::Validation(format!("reveal: {e}")))?;
        self.lazy_images
            .visibility_config()
            .map_err(|e| ConfigError::Validation(format!("lazy_images: {e}")))?;
        Ok(())
    }
}

/// Section reveal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    pub threshold: Threshold,
    pub root_margin: String,
    pub trigger_once: bool,
    /// Delay between consecutive children of a revealed block.
    pub stagger_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::Single(0.1),
            root_margin: "0px 0px -10% 0px".to_string(),
            trigger_once: true,
            stagger_ms: 100,
        }
    }
}

impl RevealConfig {
    pub fn visibility_config(&self) -> Result<VisibilityConfig, crate::visibility::VisibilityError> {
        VisibilityConfig::parse(self.threshold.clone(), &self.root_margin, self.trigger_once)
    }
}

/// Gallery image loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyImagesConfig {
    pub threshold: Threshold,
    pub root_margin: String,
    /// Number of leading gallery images loaded eagerly.
    pub eager_images: usize,
}

impl Default for LazyImagesConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::Single(0.1),
            root_margin: "50px 0px".to_string(),
            eager_images: 3,
        }
    }
}

impl LazyImagesConfig {
    /// Image observation is always one-shot: once a fetch starts it is never
    /// taken back.
    pub fn visibility_config(&self) -> Result<VisibilityConfig, crate::visibility::VisibilityError> {
        VisibilityConfig::parse(self.threshold.clone(), &self.root_margin, true)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel asset workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

/// Theme/layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Accent color for links, active nav items, and highlights.
    pub accent: String,
    /// Maximum content width (CSS value).
    pub max_width: String,
    /// Vertical padding of each section (CSS value).
    pub section_padding: String,
    /// Gap between gallery cards (CSS value).
    pub grid_gap: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: "#b08d57".to_string(),
            max_width: "72rem".to_string(),
            section_padding: "6rem".to_string(),
            grid_gap: "2rem".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (captions, metadata, timeline periods).
    pub text_muted: String,
    pub border: String,
    /// Card and dialog background.
    pub surface: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fafaf9".to_string(),
            text: "#1c1917".to_string(),
            text_muted: "#78716c".to_string(),
            border: "#e7e5e4".to_string(),
            surface: "#ffffff".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0c0a09".to_string(),
            text: "#f5f5f4".to_string(),
            text_muted: "#a8a29e".to_string(),
            border: "#292524".to_string(),
            surface: "#1c1917".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# archfolio configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Shown in the browser tab and the footer.
site_title = "Portfolio"

# Document language (<html lang="...">).
language = "en"

# Public URL of the site. Enables canonical and Open Graph URL tags.
# base_url = "https://example.com"

# ---------------------------------------------------------------------------
# Theme / layout
# ---------------------------------------------------------------------------
[theme]
accent = "#b08d57"
max_width = "72rem"
section_padding = "6rem"
grid_gap = "2rem"

# ---------------------------------------------------------------------------
# Section reveal (scroll-triggered entrance animation)
# ---------------------------------------------------------------------------
[reveal]
# Fraction of a section that must be on screen, 0.0-1.0.
# A list such as [0.0, 0.5] reveals when any value is reached.
threshold = 0.1

# Grows (positive) or shrinks (negative) the viewport before checking,
# CSS shorthand: "top right bottom left" in px or %.
root_margin = "0px 0px -10% 0px"

# Reveal once and stay revealed. With false, sections hide again when
# scrolled out of view.
trigger_once = true

# Delay between consecutive cards/entries of a revealed block.
stagger_ms = 100

# ---------------------------------------------------------------------------
# Gallery images
# ---------------------------------------------------------------------------
[lazy_images]
threshold = 0.1

# Positive margin starts loading just before an image scrolls into view.
root_margin = "50px 0px"

# The first N gallery images are above the fold and load immediately.
eager_images = 3

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fafaf9"
text = "#1c1917"
text_muted = "#78716c"
border = "#e7e5e4"
surface = "#ffffff"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0c0a09"
text = "#f5f5f4"
text_muted = "#a8a29e"
border = "#292524"
surface = "#1c1917"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel asset workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-surface: {light_surface};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-surface: {dark_surface};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_surface = colors.light.surface,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_surface = colors.dark.surface,
    )
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --accent: {accent};
    --max-width: {max_width};
    --section-padding: {section_padding};
    --grid-gap: {grid_gap};
}}"#,
        accent = theme.accent,
        max_width = theme.max_width,
        section_padding = theme.section_padding,
        grid_gap = theme.grid_gap,
    )
}
