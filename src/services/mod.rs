/// Shared reactive building blocks
pub mod common;
/// Playback backend connection and state synchronization
pub mod playback;

pub use playback::{PlaybackController, PlayerStatus, UiSink};
