//! Configuration schema definitions and loading.
//!
//! Defines the configuration structure for playctl: general settings and
//! the playback controller tuning knobs. All configurations are
//! serializable to/from TOML format.

mod general;
mod loading;
mod paths;
mod playback;

pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
pub use playback::PlaybackConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for playctl.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Playback controller settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[cfg(test)]
mod tests;
