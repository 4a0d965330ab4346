use std::{fs, path::Path};

use tracing::{debug, instrument};

use super::{Config, ConfigPaths};
use crate::{PlayctlError, Result};

impl Config {
    /// Loads the configuration from a TOML file.
    ///
    /// A missing file is not an error: defaults are returned so that a
    /// fresh installation works without any setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or if its
    /// content is not a valid configuration.
    #[instrument]
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| PlayctlError::io(e, path))?;
        Self::from_toml_str(&content, Some(path))
    }

    /// Loads the configuration from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or the
    /// file is invalid.
    pub fn load_default() -> Result<Config> {
        let path = ConfigPaths::main_config()?;
        Self::load(&path)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `PlayctlError::TomlParseError` if the text is not valid TOML
    /// or does not match the schema, and `InvalidConfigField` for values
    /// that parse but make no sense.
    pub fn from_toml_str(content: &str, path: Option<&Path>) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| PlayctlError::toml_parse(e, path))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.playback.seek_delta_ms <= 0 {
            return Err(PlayctlError::InvalidConfigField {
                field: "playback.seek_delta_ms".to_string(),
                reason: format!("must be positive, got {}", self.playback.seek_delta_ms),
            });
        }

        Ok(())
    }
}
