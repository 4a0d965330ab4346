/// Errors that can occur while talking to the playback backend
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Unbind or unsubscribe attempted without a live registration
    #[error("not registered with the playback backend")]
    NotRegistered,

    /// The backend handle no longer refers to a live player
    #[error("playback handle is stale")]
    StaleHandle,

    /// Failed to start the backend process
    #[error("Failed to start playback backend: {0}")]
    StartFailed(String),

    /// Failed to bind to the backend
    #[error("Failed to bind to playback backend: {0}")]
    BindFailed(String),

    /// Failed to control the player
    #[error("Failed to control player: {0}")]
    ControlFailed(String),
}
