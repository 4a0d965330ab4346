use std::{
    env, fs,
    io::{Error, ErrorKind},
    path::PathBuf,
};

const APP_DIR: &str = "playctl";

/// Locations of the files playctl reads and writes
///
/// Follows the XDG Base Directory layout, falling back to the usual
/// directories under `$HOME`.
pub struct ConfigPaths;

impl ConfigPaths {
    /// Directory holding `config.toml` and the runtime state
    ///
    /// `$XDG_CONFIG_HOME/playctl`, or `$HOME/.config/playctl`.
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is set
    pub fn config_dir() -> Result<PathBuf, Error> {
        xdg_dir("XDG_CONFIG_HOME", ".config")
    }

    /// Directory for daily log files, created on demand
    ///
    /// `$XDG_STATE_HOME/playctl/logs`, or `$HOME/.local/state/playctl/logs`.
    ///
    /// # Errors
    /// Returns an error if no base directory is known or it cannot be created
    pub fn log_dir() -> Result<PathBuf, Error> {
        let log_dir = xdg_dir("XDG_STATE_HOME", ".local/state")?.join("logs");
        fs::create_dir_all(&log_dir)?;
        Ok(log_dir)
    }

    /// Path of the main configuration file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined
    pub fn main_config() -> Result<PathBuf, Error> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path of the persisted runtime state
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined
    pub fn runtime_state() -> Result<PathBuf, Error> {
        Ok(Self::config_dir()?.join("runtime-state.json"))
    }
}

fn xdg_dir(var: &str, home_fallback: &str) -> Result<PathBuf, Error> {
    let base = match env::var_os(var).filter(|v| !v.is_empty()) {
        Some(base) => PathBuf::from(base),
        None => env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(home_fallback))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NotFound,
                    format!("Neither {var} nor HOME environment variable found"),
                )
            })?,
    };

    Ok(base.join(APP_DIR))
}
