//! Configuration file support for the mask editor.
//!
//! This module provides serialization and deserialization of editor
//! settings, so brush, overlay and batch preferences survive restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{brush, clean, overlay};
use crate::keybindings::KeyBindings;
use crate::mask::MaskColor;
use crate::mask_ops::normalize_kernel_size;
use crate::render::ViewMode;
use crate::session::EditorSession;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Editing preferences
    #[serde(default)]
    pub preferences: Preferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,

    /// File naming for folder navigation
    #[serde(default)]
    pub batch: BatchNaming,
}

/// Editing preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Brush radius in mask pixels
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,

    /// Colour painted by the brush and used by fills
    #[serde(default)]
    pub brush_color: MaskColor,

    /// Strength of the mask overlay, 0.0 to 1.0
    #[serde(default = "default_overlay_alpha")]
    pub overlay_alpha: f32,

    #[serde(default)]
    pub view_mode: ViewMode,

    /// Kernel size for noise cleanup
    #[serde(default = "default_clean_kernel_size")]
    pub clean_kernel_size: u32,

    /// Save the mask automatically before switching images
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,

    /// Maximum undo snapshots per image. Unbounded when absent.
    #[serde(default)]
    pub max_history: Option<usize>,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_brush_size() -> u32 {
    brush::DEFAULT_SIZE
}

fn default_overlay_alpha() -> f32 {
    overlay::DEFAULT_ALPHA
}

fn default_clean_kernel_size() -> u32 {
    clean::DEFAULT_KERNEL
}

fn default_auto_save() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            brush_size: default_brush_size(),
            brush_color: MaskColor::default(),
            overlay_alpha: default_overlay_alpha(),
            view_mode: ViewMode::default(),
            clean_kernel_size: default_clean_kernel_size(),
            auto_save: default_auto_save(),
            max_history: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Preferences {
    /// Clamp out-of-range values loaded from a hand-edited file.
    pub fn sanitized(mut self) -> Self {
        self.brush_size = self.brush_size.clamp(brush::MIN_SIZE, brush::MAX_SIZE);
        self.overlay_alpha = if self.overlay_alpha.is_finite() {
            self.overlay_alpha.clamp(0.0, 1.0)
        } else {
            default_overlay_alpha()
        };
        self.clean_kernel_size = normalize_kernel_size(self.clean_kernel_size);
        self
    }
}

/// How masks are found and written when working through a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchNaming {
    /// Prefix of existing masks: `<prefix><stem>.<ext>`
    #[serde(default = "default_mask_prefix")]
    pub mask_prefix: String,

    /// Prefix of written masks: `<prefix><stem>.png`
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Extensions tried, in order, when looking for an existing mask
    #[serde(default = "default_mask_extensions")]
    pub mask_extensions: Vec<String>,
}

fn default_mask_prefix() -> String {
    "og_mask_".to_string()
}

fn default_output_prefix() -> String {
    "mask_".to_string()
}

fn default_mask_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

impl Default for BatchNaming {
    fn default() -> Self {
        Self {
            mask_prefix: default_mask_prefix(),
            output_prefix: default_output_prefix(),
            mask_extensions: default_mask_extensions(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            keybindings: KeyBindings::default(),
            batch: BatchNaming::default(),
        }
    }

    /// Push the preferences into a session.
    pub fn apply_to(&self, session: &mut EditorSession) {
        let prefs = &self.preferences;
        session.set_brush_size(prefs.brush_size);
        session.set_brush_color(prefs.brush_color);
        session.set_overlay_alpha(prefs.overlay_alpha);
        session.set_view_mode(prefs.view_mode);
        session.set_clean_kernel_size(prefs.clean_kernel_size);
        session.set_max_history(prefs.max_history);
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.preferences = config.preferences.sanitized();
        Ok(config)
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write the configuration, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "maskedit-config.json"
    }

    /// Get the default config file path for auto-load/save.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("maskedit").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("maskedit")
                    .join(Self::default_filename())
            })
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn default_path() -> Option<PathBuf> {
        None
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    use crate::mask::ImageBuffer;

    #[test]
    fn test_round_trip() {
        let mut config = EditorConfig::new();
        config.preferences.brush_size = 25;
        config.preferences.brush_color = MaskColor::Black;
        config.preferences.view_mode = ViewMode::MaskOnly;
        config.batch.output_prefix = "edited_".to_string();

        let json = config.to_json().unwrap();
        let back = EditorConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = EditorConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config.preferences, Preferences::default());
        assert_eq!(config.batch.mask_prefix, "og_mask_");
        assert_eq!(config.batch.output_prefix, "mask_");
        assert!(config.preferences.auto_save);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = EditorConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_preferences_are_clamped() {
        let json = r#"{
            "version": 1,
            "preferences": {"brush_size": 400, "overlay_alpha": 3.0, "clean_kernel_size": 8}
        }"#;
        let config = EditorConfig::from_json(json).unwrap();
        assert_eq!(config.preferences.brush_size, brush::MAX_SIZE);
        assert_eq!(config.preferences.overlay_alpha, 1.0);
        assert_eq!(config.preferences.clean_kernel_size, 9);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(EditorConfig::default_filename());

        let mut config = EditorConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded.preferences.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_apply_to_session() {
        let image = ImageBuffer::from_rgb(RgbImage::new(10, 10)).unwrap();
        let mut session = EditorSession::new(image, None).unwrap();

        let mut config = EditorConfig::new();
        config.preferences.brush_size = 3;
        config.preferences.brush_color = MaskColor::Black;
        config.preferences.overlay_alpha = 0.75;
        config.preferences.max_history = Some(5);
        config.apply_to(&mut session);

        let settings = session.settings();
        assert_eq!(settings.brush_size, 3);
        assert_eq!(settings.brush_color, MaskColor::Black);
        assert_eq!(settings.overlay_alpha, 0.75);
        assert_eq!(session.history().max_history(), Some(5));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
        assert_eq!(LogLevel::all().len(), 5);
    }
}
