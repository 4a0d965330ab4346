use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use super::{
    Chapter, LastPlayed, MediaRef, PlaybackError, PlayerStatus, SurfaceId,
    events::{BackendSignal, ControllerMessage},
};

/// Live connection to the out-of-process playback engine.
///
/// Implementations are shared with the position poller, which runs on a
/// worker task, hence the `Send + Sync` bound.
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Current lifecycle state of the player.
    async fn status(&self) -> PlayerStatus;

    /// Media currently loaded in the player.
    async fn media(&self) -> Option<MediaRef>;

    /// Start or resume playback.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the command.
    async fn play(&self) -> Result<(), PlaybackError>;

    /// Pause playback, optionally giving up audio focus.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the command.
    async fn pause(&self, abandon_focus: bool) -> Result<(), PlaybackError>;

    /// Seek to an absolute position in milliseconds.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the command.
    async fn seek(&self, position_ms: i64) -> Result<(), PlaybackError>;

    /// Seek relative to the current position.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the command.
    async fn seek_delta(&self, delta_ms: i64) -> Result<(), PlaybackError>;

    /// Seek to the start of a chapter.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the command.
    async fn seek_to_chapter(&self, chapter: &Chapter) -> Result<(), PlaybackError>;

    /// Whether a sleep timer is armed.
    async fn sleep_timer_active(&self) -> bool;

    /// Arm the sleep timer.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the command.
    async fn set_sleep_timer(&self, duration_ms: i64) -> Result<(), PlaybackError>;

    /// Disarm the sleep timer.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the command.
    async fn disable_sleep_timer(&self) -> Result<(), PlaybackError>;

    /// Milliseconds until the sleep timer fires.
    async fn sleep_timer_time_left(&self) -> i64;

    /// Whether playback starts on its own once preparation finishes.
    async fn is_start_when_prepared(&self) -> bool;

    /// Change whether playback starts on its own once preparation finishes.
    async fn set_start_when_prepared(&self, start: bool);

    /// Raw playback position in milliseconds.
    ///
    /// # Errors
    /// Returns `PlaybackError::StaleHandle` if the player was released.
    async fn position(&self) -> Result<i64, PlaybackError>;

    /// Raw media duration in milliseconds.
    ///
    /// # Errors
    /// Returns `PlaybackError::StaleHandle` if the player was released.
    async fn duration(&self) -> Result<i64, PlaybackError>;

    /// Whether the player is actively producing output.
    ///
    /// # Errors
    /// Returns `PlaybackError::StaleHandle` if the player was released.
    async fn is_playing(&self) -> Result<bool, PlaybackError>;

    /// Whether the loaded media is a video.
    async fn is_playing_video(&self) -> bool;

    /// Hand a video surface to the player.
    ///
    /// # Errors
    /// Returns `PlaybackError::ControlFailed` if the backend rejects the surface.
    async fn set_video_surface(&self, surface: SurfaceId) -> Result<(), PlaybackError>;

    /// Tell the player its video surface is gone.
    async fn notify_video_surface_abandoned(&self);

    /// Subscribe to status and notification signals.
    fn subscribe(&self) -> broadcast::Receiver<BackendSignal>;
}

/// Arguments used to start the backend with a restored session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartRequest {
    /// Media to load
    pub media_id: i64,
    /// Feed the media belongs to
    pub feed_id: i64,
    /// Whether playback should begin as soon as the media is prepared
    pub start_when_prepared: bool,
    /// Whether to stream instead of playing a local download
    pub should_stream: bool,
}

impl StartRequest {
    /// Request that restores `session` without starting playback.
    pub fn restore(session: LastPlayed) -> Self {
        Self {
            media_id: session.media_id,
            feed_id: session.feed_id,
            start_when_prepared: false,
            should_stream: session.is_stream,
        }
    }
}

/// How the launcher should bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Create the backend if needed; used right after an explicit start.
    AutoCreate,
    /// Only attach to a backend that is already running.
    ExistingOnly,
}

/// Starts, binds and unbinds the playback backend process.
#[async_trait]
pub trait BackendLauncher: Send + Sync {
    /// Process-wide flag telling whether the backend is already running.
    fn is_running(&self) -> bool;

    /// Start the backend with the given session.
    ///
    /// # Errors
    /// Returns `PlaybackError::StartFailed` if the backend cannot be started.
    async fn start(&self, request: StartRequest) -> Result<(), PlaybackError>;

    /// Request a binding.
    ///
    /// Completion is reported later through `link`, in no particular order
    /// relative to other controller calls. Returns whether the request was
    /// accepted.
    ///
    /// # Errors
    /// Returns `PlaybackError::BindFailed` if the request cannot be issued.
    async fn bind(&self, mode: BindMode, link: ConnectionLink) -> Result<bool, PlaybackError>;

    /// Drop the binding.
    ///
    /// # Errors
    /// Returns `PlaybackError::NotRegistered` if there is no binding to drop.
    async fn unbind(&self) -> Result<(), PlaybackError>;
}

/// Read access to the persisted last played session.
pub trait LastPlayedStore: Send + Sync {
    /// The last played session, if one was persisted.
    fn last_played(&self) -> Option<LastPlayed>;
}

/// Callback side of a bind request.
///
/// Handed to the launcher, which reports connection changes through it.
/// Reports are queued on the controller inbox and handled on the
/// controller's own task.
#[derive(Clone, Debug)]
pub struct ConnectionLink {
    inbox: mpsc::UnboundedSender<ControllerMessage>,
}

impl ConnectionLink {
    pub(crate) fn new(inbox: mpsc::UnboundedSender<ControllerMessage>) -> Self {
        Self { inbox }
    }

    /// Report that the backend is bound and reachable through `backend`.
    pub fn connected(&self, backend: Arc<dyn PlaybackBackend>) {
        if self
            .inbox
            .send(ControllerMessage::Connected(backend))
            .is_err()
        {
            debug!("Controller gone, dropping connect callback");
        }
    }

    /// Report that the backend went away.
    pub fn disconnected(&self) {
        if self.inbox.send(ControllerMessage::Disconnected).is_err() {
            debug!("Controller gone, dropping disconnect callback");
        }
    }
}
