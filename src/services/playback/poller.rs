use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use super::{PlaybackError, backend::PlaybackBackend, events::ControllerMessage};

/// Periodic position reporter for a playing backend.
///
/// Runs on a worker task and only ever talks to the controller through
/// `PositionTick` messages. Each poller carries a generation so ticks that
/// were in flight when it got cancelled can be recognised and ignored.
pub(crate) struct PositionPoller {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PositionPoller {
    /// Spawn a poller for `backend`.
    #[instrument(skip(backend, inbox))]
    pub fn spawn(
        generation: u64,
        backend: Arc<dyn PlaybackBackend>,
        interval: Duration,
        inbox: mpsc::UnboundedSender<ControllerMessage>,
    ) -> Self {
        debug!("Starting position poller");

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            Self::poll(generation, backend, interval, inbox, token).await;
        });

        Self {
            generation,
            cancel,
            handle,
        }
    }

    async fn poll(
        generation: u64,
        backend: Arc<dyn PlaybackBackend>,
        interval: Duration,
        inbox: mpsc::UnboundedSender<ControllerMessage>,
        cancel: CancellationToken,
    ) {
        loop {
            match backend.is_playing().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(PlaybackError::StaleHandle) => {
                    debug!(generation, "Player handle went stale, stopping poller");
                    break;
                }
                Err(e) => {
                    debug!(generation, error = %e, "Player query failed, stopping poller");
                    break;
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            if cancel.is_cancelled() {
                break;
            }

            trace!(generation, "Position tick");
            if inbox
                .send(ControllerMessage::PositionTick { generation })
                .is_err()
            {
                break;
            }
        }

        debug!(generation, "Position poller finished");
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Request cancellation. Safe to call any number of times, also after
    /// the task ended on its own.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the task is still running and has not been asked to stop.
    pub fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }
}

impl Drop for PositionPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
