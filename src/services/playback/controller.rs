use std::future::Future;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::{
    MediaRef, PlayerStatus, UiSink,
    backend::{BackendLauncher, ConnectionLink, LastPlayedStore, PlaybackBackend},
    connection::{ConnectOutcome, ConnectionManager},
    events::{BackendSignal, ControllerMessage, Notification, RawNotification},
    reconciler::StateReconciler,
};
use crate::config::PlaybackConfig;

/// Mediates between a UI and the playback backend.
///
/// Keeps a best-effort connection to the backend, mirrors its status into
/// [`UiSink`] effects and forwards UI gestures as backend commands. All
/// state lives in this struct and is only touched through `&mut self`, so
/// the task owning the controller serializes every change. Backend
/// callbacks, signals and poller ticks are queued on the controller inbox
/// and applied by [`dispatch_next`], [`dispatch_pending`] or
/// [`run_until`].
///
/// [`dispatch_next`]: PlaybackController::dispatch_next
/// [`dispatch_pending`]: PlaybackController::dispatch_pending
/// [`run_until`]: PlaybackController::run_until
pub struct PlaybackController {
    pub(super) config: PlaybackConfig,
    pub(super) ui: Arc<dyn UiSink>,
    pub(super) connection: ConnectionManager,
    pub(super) reconciler: StateReconciler,
    inbox_tx: mpsc::UnboundedSender<ControllerMessage>,
    inbox_rx: mpsc::UnboundedReceiver<ControllerMessage>,
}

impl PlaybackController {
    /// Create a controller. Nothing happens until [`init`](Self::init).
    pub fn new(
        launcher: Arc<dyn BackendLauncher>,
        last_played: Arc<dyn LastPlayedStore>,
        ui: Arc<dyn UiSink>,
        config: PlaybackConfig,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let reconciler =
            StateReconciler::new(Arc::clone(&ui), config.poll_interval(), inbox_tx.clone());

        Self {
            config,
            ui,
            connection: ConnectionManager::new(launcher, last_played),
            reconciler,
            inbox_tx,
            inbox_rx,
        }
    }

    /// Connect to the backend.
    ///
    /// If the backend is not running, the last played session is restored
    /// without starting playback. Without a session the controller settles
    /// on `Stopped` and reconciles right away.
    #[instrument(skip(self))]
    pub async fn init(&mut self) {
        let link = ConnectionLink::new(self.inbox_tx.clone());

        match self
            .connection
            .connect(self.config.restore_last_played, link)
            .await
        {
            Ok(ConnectOutcome::Binding { bound }) => {
                debug!(bound, "Waiting for backend binding");
            }
            Ok(ConnectOutcome::AlreadyConnected) => {
                self.query_backend().await;
            }
            Ok(ConnectOutcome::NoSession) => self.settle_stopped().await,
            Err(e) => {
                warn!(error = %e, "Could not connect to playback backend");
                self.settle_stopped().await;
            }
        }
    }

    async fn settle_stopped(&mut self) {
        self.reconciler.set_status(PlayerStatus::Stopped);
        self.ui.setup();
        self.reconcile().await;
    }

    /// Tear down the connection and stop polling.
    ///
    /// Media info is reloaded after the next `init`, since the backend may
    /// hold other media by then.
    ///
    /// Idempotent; never fails.
    #[instrument(skip(self))]
    pub async fn release(&mut self) {
        info!("Releasing playback controller");
        self.connection.disconnect().await;
        self.reconciler.on_disconnected();
    }

    /// UI went to the background.
    ///
    /// Media info is reloaded on the next transition, and video playback is
    /// paused since its surface is about to disappear.
    pub async fn pause(&mut self) {
        self.reconciler.invalidate_media_info();
        if let Some(backend) = self.connection.backend() {
            if backend.is_playing_video().await {
                if let Err(e) = backend.pause(true).await {
                    warn!(error = %e, "Failed to pause video playback");
                }
            }
        }
    }

    /// Whether a backend is bound.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Last reconciled status.
    pub fn status(&self) -> PlayerStatus {
        self.reconciler.status()
    }

    /// Media reported by the last backend query.
    pub fn media(&self) -> Option<MediaRef> {
        self.reconciler.media()
    }

    /// Stream of status changes, starting with the current status.
    pub fn watch_status(&self) -> impl Stream<Item = PlayerStatus> + Send + use<> {
        self.reconciler.status_property().watch()
    }

    /// Stream of media changes, starting with the current media.
    pub fn watch_media(&self) -> impl Stream<Item = Option<MediaRef>> + Send + use<> {
        self.reconciler.media_property().watch()
    }

    /// Apply every message already queued, without waiting.
    ///
    /// Returns the number of messages handled.
    pub async fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.inbox_rx.try_recv() {
            self.handle_message(message).await;
            handled += 1;
        }
        handled
    }

    /// Wait for the next message and apply it.
    pub async fn dispatch_next(&mut self) {
        if let Some(message) = self.inbox_rx.recv().await {
            self.handle_message(message).await;
        }
    }

    /// Apply messages until `shutdown` completes, then release.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                () = self.dispatch_next() => {}
            }
        }
        self.release().await;
    }

    pub(super) async fn handle_message(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::Connected(backend) => {
                if self
                    .connection
                    .on_connected(backend, self.inbox_tx.clone())
                    .await
                {
                    self.query_backend().await;
                }
            }
            ControllerMessage::Disconnected => {
                self.connection.on_disconnected();
                self.reconciler.on_disconnected();
            }
            ControllerMessage::Backend(BackendSignal::StatusChanged) => {
                self.on_status_changed().await;
            }
            ControllerMessage::Backend(BackendSignal::Notification(raw)) => {
                self.on_notification(raw).await;
            }
            ControllerMessage::PositionTick { generation } => {
                if self.reconciler.accept_tick(generation) {
                    self.ui.on_position_update();
                }
            }
        }
    }

    async fn on_status_changed(&mut self) {
        debug!("Received status update");
        let Some(backend) = self.connection.backend() else {
            warn!("Couldn't receive status update: no backend connected");
            return;
        };

        let status = backend.status().await;
        self.reconciler.set_status(status);
        self.reconciler.reconcile(Some(&backend)).await;
    }

    async fn on_notification(&mut self, raw: RawNotification) {
        let notification = match Notification::decode(raw) {
            Ok(notification) => notification,
            Err(e) => {
                debug!(?raw, error = %e, "Dropping backend notification");
                return;
            }
        };

        match notification {
            Notification::Error(code) => self.ui.on_error(code),
            Notification::BufferUpdate(progress) => self.ui.on_buffer_update(progress),
            Notification::Reload(code) => {
                self.reconciler.cancel_poller();
                self.reconciler.invalidate_media_info();
                self.ui.on_reload(code);
                self.query_backend().await;
            }
            Notification::SleepTimerUpdate => self.ui.on_sleep_timer_update(),
            Notification::BufferStart => self.ui.on_buffer_start(),
            Notification::BufferEnd => self.ui.on_buffer_end(),
        }
    }

    /// Re-read status and media from the backend, then reconcile.
    async fn query_backend(&mut self) {
        debug!("Querying backend");
        let Some(backend) = self.connection.backend() else {
            error!("Backend query requested without a connection");
            return;
        };

        let status = backend.status().await;
        let media = backend.media().await;
        self.reconciler.apply_query(status, media);

        self.ui.on_backend_queried();
        self.ui.setup();
        self.reconciler.reconcile(Some(&backend)).await;
    }

    pub(super) async fn reconcile(&mut self) {
        let backend = self.connection.backend();
        self.reconciler.reconcile(backend.as_ref()).await;
    }

    pub(super) fn backend(&self) -> Option<Arc<dyn PlaybackBackend>> {
        self.connection.backend()
    }

    /// Whether the media info loaded flag is set.
    pub fn media_info_loaded(&self) -> bool {
        self.reconciler.media_info_loaded()
    }

    /// Whether a position poller is currently running.
    pub fn is_polling(&self) -> bool {
        self.reconciler.poller_alive()
    }
}
