//! Viewer configuration module.
//!
//! Handles loading and validating `config.toml`. The user's file is laid over
//! the serialized stock defaults, so it only needs the keys it wants to change
//! and a partial `[colors.light]` table keeps the light scheme's other values.
//!
//! ## Config File Location
//!
//! `config.toml` is read from the directory given by `--config-dir`
//! (default: the current directory). A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! base_url = "https://images-api.nasa.gov"  # Search endpoint is <base_url>/search
//! media_type = "image"      # image | video | audio
//! timeout_secs = 30         # Per-request timeout
//!
//! [retry]
//! retries = 2               # Extra attempts after a transient failure
//! backoff_ms = 1000         # Fixed pause between attempts
//!
//! [cache]
//! ttl_secs = 300            # Reuse identical responses this long (0 = off)
//!
//! [feed]
//! title = "This Day in Space"
//! description_preview = 150 # Characters shown on a collapsed card
//! keyword_preview = 5       # Keywords shown on an expanded card
//!
//! [colors.light]
//! background = "#f5f7fb"
//! text = "#10131a"
//! text_muted = "#5b6473"
//! card = "#ffffff"
//! border = "#dde2ea"
//! accent = "#2957c6"
//!
//! [colors.dark]
//! background = "#05070d"
//! text = "#e8ecf4"
//! text_muted = "#8b93a3"
//! card = "#111625"
//! border = "#232b3d"
//! accent = "#7aa2ff"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::display::Preview;
use crate::search::DEFAULT_API_BASE;
use crate::transport::RetryPolicy;
use crate::types::DEFAULT_MEDIA_TYPE;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
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

/// Media types the search endpoint understands.
pub const MEDIA_TYPES: &[&str] = &["image", "video", "audio"];

/// Viewer configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Upstream endpoint and request settings.
    pub api: ApiConfig,
    /// Transport retry budget.
    pub retry: RetryConfig,
    /// In-memory response reuse.
    pub cache: CacheConfig,
    /// Feed presentation.
    pub feed: FeedConfig,
    /// Color schemes for light and dark modes (HTML output).
    pub colors: ColorConfig,
}

impl ViewerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Validation(format!("api.base_url is not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "api.base_url must use http or https".into(),
            ));
        }
        if !MEDIA_TYPES.contains(&self.api.media_type.as_str()) {
            return Err(ConfigError::Validation(format!(
                "api.media_type must be one of {}",
                MEDIA_TYPES.join(", ")
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be non-zero".into(),
            ));
        }
        if self.retry.retries > 10 {
            return Err(ConfigError::Validation(
                "retry.retries must be 0-10".into(),
            ));
        }
        if self.feed.description_preview == 0 {
            return Err(ConfigError::Validation(
                "feed.description_preview must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Parsed base URL. Only call on a validated config.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::Validation(format!("api.base_url: {e}")))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retry.retries,
            backoff: Duration::from_millis(self.retry.backoff_ms),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn preview(&self) -> Preview {
        Preview {
            description_chars: self.feed.description_preview,
            keywords: self.feed.keyword_preview,
        }
    }
}

/// Upstream endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL; requests go to `<base_url>/search`.
    pub base_url: String,
    /// `media_type` sent with every query.
    pub media_type: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Fixed retry budget for transient transport failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Extra attempts after the first.
    pub retries: u32,
    /// Pause between attempts in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            retries: policy.retries,
            backoff_ms: policy.backoff.as_millis() as u64,
        }
    }
}

/// Staleness window for identical queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds a response may be reused; `0` disables reuse.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

/// Feed presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Page title.
    pub title: String,
    /// Characters of description shown on a collapsed card.
    pub description_preview: usize,
    /// Keywords listed on an expanded card.
    pub keyword_preview: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let preview = Preview::default();
        Self {
            title: "This Day in Space".to_string(),
            description_preview: preview.description_chars,
            keyword_preview: preview.keywords,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
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
    /// Page background.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Secondary text (dates, centers, captions).
    pub text_muted: String,
    /// Card background.
    pub card: String,
    /// Card and separator borders.
    pub border: String,
    /// Links, toggles, and the timeline rail.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f5f7fb".to_string(),
            text: "#10131a".to_string(),
            text_muted: "#5b6473".to_string(),
            card: "#ffffff".to_string(),
            border: "#dde2ea".to_string(),
            accent: "#2957c6".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#05070d".to_string(),
            text: "#e8ecf4".to_string(),
            text_muted: "#8b93a3".to_string(),
            card: "#111625".to_string(),
            border: "#232b3d".to_string(),
            accent: "#7aa2ff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_dark()
    }
}

// =============================================================================
// Config loading
// =============================================================================

/// Load config from `config.toml` in the given directory.
///
/// The file is laid over the serialized stock defaults before decoding, so a
/// partial `[colors.light]` table fills its gaps from the light scheme rather
/// than from `ColorScheme::default()`. Unknown keys are rejected and the
/// result is validated. A missing file yields the stock defaults.
pub fn load_config(dir: &Path) -> Result<ViewerConfig, ConfigError> {
    let path = dir.join("config.toml");
    let mut merged = toml::Value::try_from(ViewerConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))?;
    if path.exists() {
        let user: toml::Value = toml::from_str(&fs::read_to_string(&path)?)?;
        overlay(&mut merged, user);
    }
    let config: ViewerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Lay `user` over `base` in place; nested tables merge key by key.
fn overlay(base: &mut toml::Value, user: toml::Value) {
    match (base, user) {
        (toml::Value::Table(base), toml::Value::Table(user)) => {
            for (key, value) in user {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, user) => *base = user,
    }
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command. `base_url` is the compiled-in
/// [`DEFAULT_API_BASE`].
pub fn stock_config_toml() -> String {
    STOCK_CONFIG_TEMPLATE.replace("{base_url}", DEFAULT_API_BASE)
}

const STOCK_CONFIG_TEMPLATE: &str = r##"# Space Timeline Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Upstream API
# ---------------------------------------------------------------------------
[api]
# Base URL of the image search service. Requests go to <base_url>/search.
base_url = "{base_url}"

# Media type requested for every query: image, video, or audio.
media_type = "image"

# Per-request timeout in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Transport retries
# ---------------------------------------------------------------------------
[retry]
# Extra attempts after a transient failure (network error, 5xx, 429).
retries = 2

# Fixed pause between attempts, in milliseconds.
backoff_ms = 1000

# ---------------------------------------------------------------------------
# Response reuse
# ---------------------------------------------------------------------------
[cache]
# Identical queries within this many seconds reuse the previous response.
# Set to 0 to always ask upstream.
ttl_secs = 300

# ---------------------------------------------------------------------------
# Feed
# ---------------------------------------------------------------------------
[feed]
title = "This Day in Space"

# Characters of description shown on a collapsed card.
description_preview = 150

# Keywords listed on an expanded card.
keyword_preview = 5

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f5f7fb"
text = "#10131a"
text_muted = "#5b6473"    # Dates, centers, captions
card = "#ffffff"
border = "#dde2ea"
accent = "#2957c6"        # Links, toggles, timeline rail

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#05070d"
text = "#e8ecf4"
text_muted = "#8b93a3"
card = "#111625"
border = "#232b3d"
accent = "#7aa2ff"
"##;

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-card: {light_card};
    --color-border: {light_border};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-card: {dark_card};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_card = colors.light.card,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_card = colors.dark.card,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_upstream_contract() {
        let config = ViewerConfig::default();
        assert_eq!(config.api.media_type, "image");
        assert_eq!(config.retry.retries, 2);
        assert_eq!(config.retry.backoff_ms, 1000);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.feed.description_preview, 150);
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[retry]
retries = 0
"#;
        let config: ViewerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.retry.retries, 0);
        // Default values preserved
        assert_eq!(config.retry.backoff_ms, 1000);
        assert_eq!(config.api.media_type, "image");
    }

    #[test]
    fn derived_values() {
        let mut config = ViewerConfig::default();
        config.retry.backoff_ms = 250;
        config.feed.keyword_preview = 3;
        assert_eq!(config.retry_policy().backoff, Duration::from_millis(250));
        assert_eq!(config.retry_policy().attempts(), 3);
        assert_eq!(config.preview().keywords, 3);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.accent = "#ff8800".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-accent: #ff8800"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[api]
base_url = "http://localhost:9000"
media_type = "video"

[feed]
title = "Night Sky"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.media_type, "video");
        assert_eq!(config.feed.title, "Night Sky");
        // Unspecified values should be defaults
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.colors.dark.background, "#05070d");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[retry]
retires = 3
"#,
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ViewerConfig, _> = toml::from_str("[pagination]\npage = 2\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = ViewerConfig::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.api.base_url = "ftp://images-api.nasa.gov".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn validate_rejects_unknown_media_type() {
        let mut config = ViewerConfig::default();
        config.api.media_type = "hologram".into();
        assert!(config.validate().is_err());
        config.api.media_type = "audio".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_zero_timeout_and_preview() {
        let mut config = ViewerConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.feed.description_preview = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_retry_budget_is_bounded() {
        let mut config = ViewerConfig::default();
        config.retry.retries = 10;
        assert!(config.validate().is_ok());
        config.retry.retries = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[api]
timeout_secs = 0
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn partial_light_colors_keep_light_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        let light = ColorScheme::default_light();
        assert_eq!(config.colors.light.background, "#fafafa");
        assert_eq!(config.colors.light.text, light.text);
        assert_eq!(config.colors.light.accent, light.accent);
        assert_eq!(config.colors.dark.text, ColorScheme::default_dark().text);
    }

    #[test]
    fn overlay_merges_tables_and_replaces_scalars() {
        let mut base: toml::Value =
            toml::from_str("[retry]\nretries = 2\nbackoff_ms = 1000\n").unwrap();
        let user: toml::Value = toml::from_str("[retry]\nretries = 5\n[cache]\nttl_secs = 0\n").unwrap();
        overlay(&mut base, user);
        let retry = base.get("retry").unwrap();
        assert_eq!(retry.get("retries").unwrap().as_integer(), Some(5));
        assert_eq!(retry.get("backoff_ms").unwrap().as_integer(), Some(1000));
        assert_eq!(base.get("cache").unwrap().get("ttl_secs").unwrap().as_integer(), Some(0));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ViewerConfig = toml::from_str(&stock_config_toml()).unwrap();
        let defaults = ViewerConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(config.retry.retries, defaults.retry.retries);
        assert_eq!(config.retry.backoff_ms, defaults.retry.backoff_ms);
        assert_eq!(config.cache.ttl_secs, defaults.cache.ttl_secs);
        assert_eq!(config.feed.title, defaults.feed.title);
        assert_eq!(config.colors.light.accent, defaults.colors.light.accent);
        assert_eq!(config.colors.dark.card, defaults.colors.dark.card);
    }
}
