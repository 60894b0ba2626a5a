//! Configuration module
//!
//! Handles loading and saving cursorwrap configuration. Settings come from an
//! optional TOML file and are overridden by command-line flags; when neither
//! source enables any wrap or snap axis, everything is enabled.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Raw application configuration, as found in the config file.
///
/// The wrap/snap axis switches are optional so that "never mentioned
/// anywhere" can be told apart from "explicitly disabled"; see
/// [`Config::settings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cursor wrapping across the outermost topology edges
    #[serde(default)]
    pub wrap: WrapConfig,

    /// Cursor snapping across inner hard edges
    #[serde(default)]
    pub snap: SnapConfig,
}

/// Wrap configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WrapConfig {
    /// Wrap across the left/right outer edges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<bool>,
    /// Wrap across the top/bottom outer edges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<bool>,
}

/// Snap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Snap across hard edges on the x-axis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<bool>,
    /// Snap across hard edges on the y-axis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<bool>,
    /// Pixels to shift the cursor inward when snapping
    #[serde(default = "default_snap_offset")]
    pub offset: i32,
}

fn default_snap_offset() -> i32 {
    10
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            offset: default_snap_offset(),
        }
    }
}

/// Effective settings for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub wrap_x: bool,
    pub wrap_y: bool,
    pub snap_x: bool,
    pub snap_y: bool,
    pub snap_offset: i32,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("cursorwrap/config.toml")),
            Some(PathBuf::from("./cursorwrap.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the effective settings.
    ///
    /// When no wrap or snap axis was enabled by the file or the CLI,
    /// wrapping and snapping are enabled on both axes.
    pub fn settings(&self) -> Settings {
        let any_specified = [self.wrap.x, self.wrap.y, self.snap.x, self.snap.y]
            .iter()
            .any(|v| v.unwrap_or(false));
        let fallback = !any_specified;

        Settings {
            wrap_x: self.wrap.x.unwrap_or(fallback),
            wrap_y: self.wrap.y.unwrap_or(fallback),
            snap_x: self.snap.x.unwrap_or(fallback),
            snap_y: self.snap.y.unwrap_or(fallback),
            snap_offset: self.snap.offset,
        }
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> String {
    let config = Config {
        wrap: WrapConfig {
            x: Some(true),
            y: Some(true),
        },
        snap: SnapConfig {
            x: Some(true),
            y: Some(true),
            offset: default_snap_offset(),
        },
    };

    toml::to_string_pretty(&config).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_enables_everything() {
        let settings = Config::default().settings();
        assert!(settings.wrap_x && settings.wrap_y);
        assert!(settings.snap_x && settings.snap_y);
        assert_eq!(settings.snap_offset, 10);
    }

    #[test]
    fn test_partial_config_disables_the_rest() {
        let config: Config = toml::from_str("[wrap]\nx = true\n").unwrap();
        let settings = config.settings();
        assert!(settings.wrap_x);
        assert!(!settings.wrap_y);
        assert!(!settings.snap_x);
        assert!(!settings.snap_y);
    }

    #[test]
    fn test_explicit_false_is_not_a_request() {
        // Switching an axis explicitly off still leaves the others on their
        // all-enabled default.
        let config: Config = toml::from_str("[wrap]\nx = false\n").unwrap();
        let settings = config.settings();
        assert!(!settings.wrap_x);
        assert!(settings.wrap_y);
        assert!(settings.snap_x && settings.snap_y);
    }

    #[test]
    fn test_save_and_load() {
        let config: Config = toml::from_str("[snap]\noffset = 25\n").unwrap();
        let file = NamedTempFile::new().unwrap();

        config.save(file.path()).unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.snap.offset, 25);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = Config::load(Path::new("/nonexistent/cursorwrap.toml"));
        assert!(matches!(err, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = generate_sample_config();
        let parsed: Config = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.wrap.x, Some(true));
        assert_eq!(parsed.snap.offset, 10);
    }
}
