use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Returned by position and duration accessors when no backend is bound.
pub const INVALID_TIME: i64 = -1;

/// Default distance covered by the rewind and fast-forward buttons.
pub const DEFAULT_SEEK_DELTA_MS: i64 = 30_000;

/// Cadence of position updates while playing.
pub const POSITION_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Lifecycle state reported by the playback backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerStatus {
    /// Backend hit an error it cannot recover from on its own
    Error,
    /// Playback paused
    Paused,
    /// Playback running
    Playing,
    /// Media is being prepared
    Preparing,
    /// Nothing loaded
    #[default]
    Stopped,
    /// Media prepared, waiting for a play command
    Prepared,
    /// Seek in progress
    Seeking,
    /// Video media waiting for a surface to render into
    AwaitingVideoSurface,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerStatus::Error => "error",
            PlayerStatus::Paused => "paused",
            PlayerStatus::Playing => "playing",
            PlayerStatus::Preparing => "preparing",
            PlayerStatus::Stopped => "stopped",
            PlayerStatus::Prepared => "prepared",
            PlayerStatus::Seeking => "seeking",
            PlayerStatus::AwaitingVideoSurface => "awaiting-video-surface",
        };
        f.write_str(name)
    }
}

/// Media item currently associated with the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Media identifier
    pub media_id: i64,
    /// Feed the media belongs to
    pub feed_id: i64,
    /// Display title, when the backend knows it
    pub title: Option<String>,
}

/// Chapter marker within the current media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Chapter title
    pub title: String,
    /// Start of the chapter in milliseconds
    pub start_ms: i64,
}

/// Opaque identifier of a video surface owned by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Icon state of the play/pause affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayButton {
    /// Pressing starts playback
    Play,
    /// Pressing pauses playback
    Pause,
}

/// Status line shown by the UI for a given backend state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    /// Backend reported an error
    Error,
    /// Playback paused
    Paused,
    /// Media is being prepared
    Preparing,
    /// Nothing loaded
    Stopped,
    /// Prepared and ready to play
    Ready,
    /// Seek in progress
    Seeking,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusMessage::Error => "error",
            StatusMessage::Paused => "paused",
            StatusMessage::Preparing => "preparing",
            StatusMessage::Stopped => "stopped",
            StatusMessage::Ready => "ready",
            StatusMessage::Seeking => "seeking",
        };
        f.write_str(text)
    }
}

/// Read-through view of the backend sleep timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepTimerState {
    /// Whether a sleep timer is armed
    pub active: bool,
    /// Milliseconds until the timer fires
    pub remaining_ms: i64,
}

/// Last session persisted by the backend, used to restore it on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPlayed {
    /// Media identifier
    pub media_id: i64,
    /// Feed the media belongs to
    pub feed_id: i64,
    /// Whether the media was streamed rather than played from a download
    #[serde(default = "default_is_stream")]
    pub is_stream: bool,
}

fn default_is_stream() -> bool {
    true
}

/// Preview of a seek-bar drag position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekPreview {
    /// Normalized position in `[0, 1]`
    pub fraction: f32,
    /// Position the drag would seek to, in milliseconds
    pub position_ms: i64,
}

impl SeekPreview {
    /// Position formatted as `H:MM:SS`.
    pub fn position_text(&self) -> String {
        format_duration_long(self.position_ms)
    }
}

/// Formats milliseconds as `H:MM:SS`.
pub fn format_duration_long(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}
