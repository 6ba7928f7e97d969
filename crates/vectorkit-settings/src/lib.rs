//! VectorKit Settings Crate
//!
//! Handles the configuration file of the converter: per-format decoding and
//! writing options, persisted as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{
    CliOutputEncoding, Config, ContainerSettings, GcodeSettings, LaserSettings, LayerSettings,
};
pub use error::{SettingsError, SettingsResult};
