//! Playback backend connection and UI state synchronization.
//!
//! The [`PlaybackController`] keeps a link to an out-of-process playback
//! engine, reconciles the engine's status into [`UiSink`] effects and turns
//! UI gestures into backend commands.

/// Backend, launcher and persistence contracts
pub mod backend;
mod commands;
mod connection;
mod controller;
/// Playback error types
pub mod error;
/// Backend signals and notification decoding
pub mod events;
mod poller;
mod reconciler;
/// UI contract
pub mod sink;
/// Playback domain types
pub mod types;

pub use backend::{
    BackendLauncher, BindMode, ConnectionLink, LastPlayedStore, PlaybackBackend, StartRequest,
};
pub use connection::ConnectOutcome;
pub use controller::PlaybackController;
pub use error::PlaybackError;
pub use events::{BackendSignal, Notification, NotificationError, RawNotification};
pub use sink::UiSink;
pub use types::*;

#[cfg(test)]
mod tests;
