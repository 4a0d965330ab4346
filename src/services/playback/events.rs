use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::backend::PlaybackBackend;

/// Notification kind: playback error, code is backend specific
pub const NOTIFICATION_TYPE_ERROR: i32 = 0;
/// Notification kind: informational message, not handled by the controller
pub const NOTIFICATION_TYPE_INFO: i32 = 1;
/// Notification kind: buffering progress, code is a percentage
pub const NOTIFICATION_TYPE_BUFFER_UPDATE: i32 = 2;
/// Notification kind: displayed media must be reloaded
pub const NOTIFICATION_TYPE_RELOAD: i32 = 3;
/// Notification kind: sleep timer ticked
pub const NOTIFICATION_TYPE_SLEEPTIMER_UPDATE: i32 = 4;
/// Notification kind: buffering started
pub const NOTIFICATION_TYPE_BUFFER_START: i32 = 5;
/// Notification kind: buffering finished
pub const NOTIFICATION_TYPE_BUFFER_END: i32 = 6;

/// Value the backend uses for a missing kind or code.
pub const NOTIFICATION_FIELD_ABSENT: i32 = -1;

/// Signal published by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSignal {
    /// Status changed; the new status must be read back from the backend
    StatusChanged,
    /// Typed notification in wire form
    Notification(RawNotification),
}

/// Notification as published by the backend, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawNotification {
    /// Notification kind, one of the `NOTIFICATION_TYPE_*` constants
    pub kind: Option<i32>,
    /// Kind-specific code
    pub code: Option<i32>,
}

impl RawNotification {
    /// Notification with both fields present.
    pub fn new(kind: i32, code: i32) -> Self {
        Self {
            kind: Some(kind),
            code: Some(code),
        }
    }
}

/// Validated backend notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    /// Playback error with its backend code
    Error(i32),
    /// Buffering progress in `[0, 1]`
    BufferUpdate(f32),
    /// Media must be reloaded; carries the backend reason code
    Reload(i32),
    /// Sleep timer ticked
    SleepTimerUpdate,
    /// Buffering started
    BufferStart,
    /// Buffering finished
    BufferEnd,
}

/// Reasons a raw notification is dropped
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationError {
    /// Kind or code missing
    #[error("notification is missing its {0}")]
    MissingField(&'static str),

    /// Kind the controller does not handle
    #[error("unsupported notification kind {0}")]
    UnsupportedKind(i32),
}

impl Notification {
    /// Validate a raw notification.
    ///
    /// # Errors
    /// Returns `NotificationError::MissingField` if kind or code is absent
    /// (including the `-1` sentinel) and `UnsupportedKind` for kinds the
    /// controller does not react to.
    pub fn decode(raw: RawNotification) -> Result<Self, NotificationError> {
        let kind = present(raw.kind).ok_or(NotificationError::MissingField("kind"))?;
        let code = present(raw.code).ok_or(NotificationError::MissingField("code"))?;

        match kind {
            NOTIFICATION_TYPE_ERROR => Ok(Self::Error(code)),
            NOTIFICATION_TYPE_BUFFER_UPDATE => Ok(Self::BufferUpdate(code as f32 / 100.0)),
            NOTIFICATION_TYPE_RELOAD => Ok(Self::Reload(code)),
            NOTIFICATION_TYPE_SLEEPTIMER_UPDATE => Ok(Self::SleepTimerUpdate),
            NOTIFICATION_TYPE_BUFFER_START => Ok(Self::BufferStart),
            NOTIFICATION_TYPE_BUFFER_END => Ok(Self::BufferEnd),
            other => Err(NotificationError::UnsupportedKind(other)),
        }
    }
}

fn present(field: Option<i32>) -> Option<i32> {
    field.filter(|value| *value != NOTIFICATION_FIELD_ABSENT)
}

/// Message handled on the controller's own task.
///
/// Everything that mutates controller state arrives through this queue,
/// whatever task produced it.
pub enum ControllerMessage {
    /// Bind completed
    Connected(Arc<dyn PlaybackBackend>),
    /// Backend went away
    Disconnected,
    /// Signal forwarded from the backend subscription
    Backend(BackendSignal),
    /// Position poller tick
    PositionTick {
        /// Generation of the poller that produced the tick
        generation: u64,
    },
}

impl fmt::Debug for ControllerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected(_) => f.write_str("Connected"),
            Self::Disconnected => f.write_str("Disconnected"),
            Self::Backend(signal) => f.debug_tuple("Backend").field(signal).finish(),
            Self::PositionTick { generation } => f
                .debug_struct("PositionTick")
                .field("generation", generation)
                .finish(),
        }
    }
}

/// Forwards backend signals into the controller inbox.
///
/// Signals lost to a lagging receiver are replaced by a single
/// `StatusChanged`, so the controller re-reads the backend status. The
/// forwarding task is aborted when the subscription is dropped.
pub(crate) struct EventSubscription {
    handle: JoinHandle<()>,
}

impl EventSubscription {
    /// Start forwarding `signals` into `inbox`.
    #[instrument(skip_all)]
    pub fn start(
        signals: broadcast::Receiver<BackendSignal>,
        inbox: mpsc::UnboundedSender<ControllerMessage>,
    ) -> Self {
        debug!("Subscribing to backend signals");

        let handle = tokio::spawn(async move {
            Self::forward(signals, inbox).await;
        });

        Self { handle }
    }

    async fn forward(
        mut signals: broadcast::Receiver<BackendSignal>,
        inbox: mpsc::UnboundedSender<ControllerMessage>,
    ) {
        loop {
            match signals.recv().await {
                Ok(signal) => {
                    if inbox.send(ControllerMessage::Backend(signal)).is_err() {
                        debug!("Controller inbox closed, ending subscription");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Backend signal subscription lagged, forcing status re-read");
                    let resync = ControllerMessage::Backend(BackendSignal::StatusChanged);
                    if inbox.send(resync).is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => {
                    debug!("Backend closed its signal channel");
                    break;
                }
            }
        }
    }

    /// Stop forwarding.
    pub fn unsubscribe(self) {
        debug!("Unsubscribing from backend signals");
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
