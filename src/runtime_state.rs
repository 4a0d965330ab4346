use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    PlayctlError, Result,
    config::ConfigPaths,
    services::playback::{LastPlayed, LastPlayedStore},
};

/// Runtime state that persists between runs of the playback backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    /// Session the backend played last
    #[serde(default)]
    pub last_played: Option<LastPlayed>,

    /// Last time this state was updated
    pub last_updated: SystemTime,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            last_played: None,
            last_updated: SystemTime::now(),
        }
    }
}

impl RuntimeState {
    /// Load runtime state from `path`, or the default if it does not exist
    ///
    /// An unreadable or corrupt file is logged and treated as empty.
    #[instrument]
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No runtime state file found, using defaults");
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Failed to read runtime state, using defaults");
                return Self::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(error = %e, "Invalid runtime state file, using defaults");
            Self::default()
        })
    }

    /// Save runtime state to `path`
    ///
    /// # Errors
    /// Returns error if file cannot be written or directory cannot be created
    #[instrument(skip(self))]
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PlayctlError::io(e, parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| PlayctlError::io(e, path))?;
        info!("Runtime state saved");

        Ok(())
    }

    /// Replace the last played session and bump the update time
    pub fn set_last_played(&mut self, session: Option<LastPlayed>) {
        self.last_played = session;
        self.last_updated = SystemTime::now();
    }
}

/// [`LastPlayedStore`] backed by the runtime state file
#[derive(Debug, Clone)]
pub struct RuntimeStateStore {
    path: PathBuf,
}

impl RuntimeStateStore {
    /// Store reading the state file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store reading the state file in the default config directory
    ///
    /// # Errors
    /// Returns error if the config directory cannot be determined
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(ConfigPaths::runtime_state()?))
    }

    /// Location of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current content of the state file
    pub fn load(&self) -> RuntimeState {
        RuntimeState::load(&self.path)
    }

    /// Persist `session` as the last played one
    ///
    /// # Errors
    /// Returns error if the state file cannot be written
    pub fn remember(&self, session: Option<LastPlayed>) -> Result<()> {
        let mut state = self.load();
        state.set_last_played(session);
        state.save(&self.path)
    }
}

impl LastPlayedStore for RuntimeStateStore {
    fn last_played(&self) -> Option<LastPlayed> {
        self.load().last_played
    }
}
