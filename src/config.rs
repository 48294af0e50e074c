//! Display configuration.
//!
//! Layout and cadence defaults are compile-time constants; everything a
//! cockpit author can change lives in a TOML file:
//!
//! ```toml
//! id = "mfd-left"
//! columns = 40
//! rows = 20
//! refresh_draw_rate = 1
//! text_color = [255, 176, 0]
//! font = "latin1"
//!
//! [[page]]
//! name = "orbit"
//! text = "AP: <=0:SIP6=>m$&$APOAPSIS"
//! button = "B1"
//! default = true
//! ```
//!
//! Every field has a default, so an empty file is a valid single-display
//! configuration (it still needs at least one `[[page]]` to come up).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compositor::font::FontChoice;
use crate::error::ConfigError;
use crate::pages::PageDefinition;
use crate::persistence::is_valid_key;
use crate::scheduler::{DEFAULT_DATA_RATE, DEFAULT_DRAW_RATE, DEFAULT_TEXT_RATE, RefreshRates};

// =============================================================================
// Display Configuration
// =============================================================================

/// Default pixel width (320x240 panel).
pub const SCREEN_WIDTH: u32 = 320;

/// Default pixel height.
pub const SCREEN_HEIGHT: u32 = 240;

/// Default character columns; 8 px cells on a 320 px panel.
pub const DEFAULT_COLUMNS: usize = 40;

/// Default character rows; 12 px cells on a 240 px panel.
pub const DEFAULT_ROWS: usize = 20;

/// Display id used when the config does not name one.
pub const DEFAULT_DISPLAY_ID: &str = "mfd";

/// Amber text on black, the classic MFD look.
pub const DEFAULT_TEXT_COLOR: [u8; 3] = [255, 176, 0];

pub const DEFAULT_EMPTY_COLOR: [u8; 3] = [0, 0, 0];

// =============================================================================
// TOML Schema
// =============================================================================

/// Root of a display config file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Stable identifier; also the persistence key for the active page.
    pub id: String,
    pub columns: usize,
    pub rows: usize,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Ticks between snapshot rebuilds.
    pub refresh_data_rate: u32,
    /// Ticks between text renders.
    pub refresh_text_rate: u32,
    /// Ticks between composites.
    pub refresh_draw_rate: u32,
    pub empty_color: [u8; 3],
    pub text_color: [u8; 3],
    pub font: FontChoice,
    #[serde(rename = "page")]
    pub pages: Vec<PageDefinition>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_DISPLAY_ID.to_owned(),
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            pixel_width: SCREEN_WIDTH,
            pixel_height: SCREEN_HEIGHT,
            refresh_data_rate: DEFAULT_DATA_RATE,
            refresh_text_rate: DEFAULT_TEXT_RATE,
            refresh_draw_rate: DEFAULT_DRAW_RATE,
            empty_color: DEFAULT_EMPTY_COLOR,
            text_color: DEFAULT_TEXT_COLOR,
            font: FontChoice::default(),
            pages: Vec::new(),
        }
    }
}

/// A parsed config together with the directory its page files live in.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: DisplayConfig,
    pub base_dir: PathBuf,
}

impl DisplayConfig {
    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    ///
    /// Relative `text_file` paths in its pages resolve against the file's
    /// directory, returned as `base_dir`.
    pub fn load(path: impl AsRef<Path>) -> Result<LoadedConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(LoadedConfig { config, base_dir })
    }

    /// Reject values the display cannot work with.
    ///
    /// Page definitions are not checked here; the page registry validates
    /// them one by one so a bad page never blocks the others.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid("columns and rows must be > 0"));
        }
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(ConfigError::Invalid("pixel size must be > 0"));
        }
        if self.refresh_data_rate == 0 || self.refresh_text_rate == 0 || self.refresh_draw_rate == 0 {
            return Err(ConfigError::Invalid("refresh rates must be > 0"));
        }
        if !is_valid_key(&self.id) {
            return Err(ConfigError::Invalid("id must be non-empty without '$' or '|'"));
        }
        Ok(())
    }

    #[inline]
    pub const fn refresh_rates(&self) -> RefreshRates {
        RefreshRates::new(self.refresh_data_rate, self.refresh_text_rate, self.refresh_draw_rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = DisplayConfig::from_toml("").unwrap();
        assert_eq!(config, DisplayConfig::default());
        assert_eq!(config.columns, 40);
        assert_eq!(config.refresh_rates(), RefreshRates::new(10, 5, 2));
        assert!(config.pages.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = DisplayConfig::from_toml(
            r#"
            id = "mfd-left"
            columns = 32
            rows = 16
            pixel_width = 256
            pixel_height = 256
            refresh_data_rate = 4
            refresh_text_rate = 2
            refresh_draw_rate = 1
            empty_color = [0, 16, 0]
            text_color = [0, 255, 0]
            font = "ascii"

            [[page]]
            name = "orbit"
            text = "AP $&$APOAPSIS"
            button = "B1"
            default = true

            [[page]]
            text_handler = "log_viewer"
            background = "camera"
            camera_transform = "NavCam"
            fov = 40.0
            "#,
        )
        .unwrap();
        assert_eq!(config.id, "mfd-left");
        assert_eq!(config.font, FontChoice::Ascii);
        assert_eq!(config.text_color, [0, 255, 0]);
        assert_eq!(config.pages.len(), 2);
        assert!(config.pages[0].default);
        assert_eq!(config.pages[1].fov, Some(40.0));
        assert_eq!(config.pages[1].camera_transform.as_deref(), Some("NavCam"));
    }

    #[test]
    fn test_zero_values_rejected() {
        for text in ["columns = 0", "rows = 0", "pixel_width = 0", "refresh_draw_rate = 0", "id = \"a|b\""] {
            let err = DisplayConfig::from_toml(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{text} should be invalid");
        }
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(DisplayConfig::from_toml("columns = \"wide\""), Err(ConfigError::Parse(_))));
        assert!(matches!(DisplayConfig::from_toml("font = \"comic\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = DisplayConfig::load("/nonexistent/mfd.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_returns_config_dir() {
        let dir = std::env::temp_dir().join(format!("mfd-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("display.toml");
        fs::write(&path, "id = \"left\"\n[[page]]\ntext = \"HI\"\n").unwrap();

        let loaded = DisplayConfig::load(&path).unwrap();
        assert_eq!(loaded.config.id, "left");
        assert_eq!(loaded.base_dir, dir);
        fs::remove_dir_all(&dir).ok();
    }
}
