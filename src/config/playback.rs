use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::services::playback::{DEFAULT_SEEK_DELTA_MS, POSITION_POLL_INTERVAL};

/// Playback controller configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Distance in milliseconds covered by the rewind and fast-forward buttons.
    pub seek_delta_ms: i64,

    /// Interval in milliseconds between position updates while playing.
    pub poll_interval_ms: u64,

    /// Whether to start the backend with the last played media when it is
    /// not already running.
    pub restore_last_played: bool,
}

impl PlaybackConfig {
    /// Position polling interval as a `Duration`.
    ///
    /// A zero interval is clamped to one millisecond so the poller never spins.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            seek_delta_ms: DEFAULT_SEEK_DELTA_MS,
            poll_interval_ms: POSITION_POLL_INTERVAL.as_millis() as u64,
            restore_last_played: true,
        }
    }
}
