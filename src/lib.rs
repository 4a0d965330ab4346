//! playctl - playback controller for out-of-process media engines.
//!
//! playctl sits between a user interface and a background playback
//! engine. It keeps a connection to the engine, mirrors the engine's
//! lifecycle into UI affordances and forwards UI gestures as commands.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use playctl::services::playback::{BackendLauncher, UiSink};
//! # async fn demo(launcher: Arc<dyn BackendLauncher>, ui: Arc<dyn UiSink>) -> playctl::Result<()> {
//! use playctl::{config::Config, runtime_state::RuntimeStateStore, PlaybackController};
//!
//! let config = Config::load_default()?;
//! let store = Arc::new(RuntimeStateStore::at_default_location()?);
//! let mut controller = PlaybackController::new(launcher, store, ui, config.playback);
//!
//! controller.init().await;
//! controller.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Persisted runtime state (last played session).
pub mod runtime_state;

/// Reactive services for playback integration.
pub mod services;

/// Tracing subscriber setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{PlayctlError, Result};
pub use services::playback::PlaybackController;
