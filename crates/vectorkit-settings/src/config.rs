//! Configuration for VectorKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats; the default file lives in the
//! platform configuration directory.
//!
//! Configuration is organized into one section per format:
//! - Layer settings (fake hatch detection, CLI output encoding)
//! - Laser command settings
//! - G-code settings (arc grouping, job name comment)
//! - Container settings (section encoding)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Name of the configuration directory and file
const APP_DIR: &str = "vectorkit";
const CONFIG_FILE: &str = "config.toml";

/// Encoding of written CLI files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CliOutputEncoding {
    /// Text geometry
    Ascii,
    /// Binary with 32-bit values
    #[default]
    BinaryLong,
    /// Binary with 16-bit values
    BinaryShort,
}

impl std::fmt::Display for CliOutputEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascii => write!(f, "ascii"),
            Self::BinaryLong => write!(f, "binary_long"),
            Self::BinaryShort => write!(f, "binary_short"),
        }
    }
}

/// CLI reading and writing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    /// Re-express chained hatch segments as polylines
    pub detect_fake_hatches: bool,
    /// Chaining tolerance in mm
    pub fake_hatch_epsilon: f32,
    /// Encoding of written files
    pub output_encoding: CliOutputEncoding,
    /// `$$UNITS` of written files, mm per file unit
    pub output_units: f64,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            detect_fake_hatches: true,
            fake_hatch_epsilon: 1e-4,
            output_encoding: CliOutputEncoding::BinaryLong,
            output_units: 1.0,
        }
    }
}

/// Laser command writing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserSettings {
    /// Start the output with a `#` comment holding the job name
    pub write_job_name: bool,
}

impl Default for LaserSettings {
    fn default() -> Self {
        Self {
            write_job_name: true,
        }
    }
}

/// G-code reading and writing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcodeSettings {
    /// Arcs whose sweeps differ by less than this (radians) share a block
    pub arc_angle_tolerance: f64,
    /// Start the output with a `;` comment holding the job name
    pub write_job_name: bool,
}

impl Default for GcodeSettings {
    fn default() -> Self {
        Self {
            arc_angle_tolerance: 1e-5,
            write_job_name: true,
        }
    }
}

/// Section container writing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Encoding of section geometry files
    pub output_encoding: CliOutputEncoding,
}

/// Complete configuration
///
/// Aggregates all settings sections and provides file I/O operations.
/// Missing sections and keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// CLI settings
    pub layer: LayerSettings,
    /// Laser command settings
    pub laser: LaserSettings,
    /// G-code settings
    pub gcode: GcodeSettings,
    /// Container settings
    pub container: ContainerSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, `<config dir>/vectorkit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SettingsError::ConfigDirectory("no config or home directory".into()))?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load `path`, or the default file if it exists, or the defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.is_file() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let epsilon = self.layer.fake_hatch_epsilon;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(SettingsError::invalid(
                "layer.fake_hatch_epsilon",
                "must be > 0",
            ));
        }

        let units = self.layer.output_units;
        if !units.is_finite() || units <= 0.0 {
            return Err(SettingsError::invalid("layer.output_units", "must be > 0"));
        }

        let tolerance = self.gcode.arc_angle_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(SettingsError::invalid(
                "gcode.arc_angle_tolerance",
                "must be > 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert!(config.layer.detect_fake_hatches);
        assert_eq!(config.container.output_encoding, CliOutputEncoding::BinaryLong);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.layer.output_encoding = CliOutputEncoding::Ascii;
        config.layer.output_units = 0.005;
        config.gcode.write_job_name = false;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::new();
        config.laser.write_job_name = false;
        config.save_to_file(&path).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[layer]\ndetect_fake_hatches = false\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert!(!config.layer.detect_fake_hatches);
        assert_eq!(config.layer.fake_hatch_epsilon, 1e-4);
        assert_eq!(config.gcode, GcodeSettings::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::new();
        config.layer.output_units = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "layer.output_units"
        ));

        let mut config = Config::new();
        config.gcode.arc_angle_tolerance = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(matches!(
            Config::new().save_to_file(&path),
            Err(SettingsError::UnsupportedFormat(_))
        ));
    }
}
