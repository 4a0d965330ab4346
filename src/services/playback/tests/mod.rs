//! Unit tests for the playback controller
//!
//! Runs the controller against in-memory fakes of the backend, launcher,
//! session store and UI. Poller timing tests use paused tokio time.

#![allow(clippy::panic, clippy::unwrap_used)]

mod support;
