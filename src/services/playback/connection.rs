use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::{
    PlaybackError,
    backend::{BackendLauncher, BindMode, ConnectionLink, LastPlayedStore, PlaybackBackend, StartRequest},
    events::{ControllerMessage, EventSubscription},
};

/// Result of a connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A bind was requested; completion arrives through the connection link
    Binding {
        /// Whether the launcher accepted the bind request
        bound: bool,
    },
    /// Backend not running and no session to restore
    NoSession,
    /// A backend is already bound
    AlreadyConnected,
}

/// Owns the link to the playback backend.
pub(crate) struct ConnectionManager {
    launcher: Arc<dyn BackendLauncher>,
    last_played: Arc<dyn LastPlayedStore>,
    backend: Option<Arc<dyn PlaybackBackend>>,
    subscription: Option<EventSubscription>,
    released: bool,
}

impl ConnectionManager {
    pub fn new(launcher: Arc<dyn BackendLauncher>, last_played: Arc<dyn LastPlayedStore>) -> Self {
        Self {
            launcher,
            last_played,
            backend: None,
            subscription: None,
            released: false,
        }
    }

    pub fn backend(&self) -> Option<Arc<dyn PlaybackBackend>> {
        self.backend.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// Bind to the backend, starting it with the last played session when
    /// it is not running yet and `restore` is set.
    #[instrument(skip(self, link))]
    pub async fn connect(
        &mut self,
        restore: bool,
        link: ConnectionLink,
    ) -> Result<ConnectOutcome, PlaybackError> {
        self.released = false;

        if self.backend.is_some() {
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        if self.launcher.is_running() {
            let bound = self.launcher.bind(BindMode::ExistingOnly, link).await?;
            debug!(bound, "Bind to running backend requested");
            return Ok(ConnectOutcome::Binding { bound });
        }

        if !restore {
            info!("Backend not running and session restore disabled");
            return Ok(ConnectOutcome::NoSession);
        }

        debug!("Trying to restore last played media");
        let Some(session) = self.last_played.last_played() else {
            info!("No last played media found");
            return Ok(ConnectOutcome::NoSession);
        };

        self.launcher.start(StartRequest::restore(session)).await?;
        let bound = self.launcher.bind(BindMode::AutoCreate, link).await?;
        debug!(bound, media_id = session.media_id, "Bind after restore requested");

        Ok(ConnectOutcome::Binding { bound })
    }

    /// Accept a completed bind.
    ///
    /// Returns `false` if the controller was released in the meantime; the
    /// late binding is dropped again.
    pub async fn on_connected(
        &mut self,
        backend: Arc<dyn PlaybackBackend>,
        inbox: mpsc::UnboundedSender<ControllerMessage>,
    ) -> bool {
        if self.released {
            debug!("Bind completed after release, dropping it");
            self.unbind().await;
            return false;
        }

        self.subscription = Some(EventSubscription::start(backend.subscribe(), inbox));
        self.backend = Some(backend);
        info!("Connection to playback backend established");
        true
    }

    /// Backend-initiated disconnect.
    pub fn on_disconnected(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.backend = None;
        info!("Disconnected from playback backend");
    }

    /// Unsubscribe and unbind. Safe to call at any time, any number of times.
    #[instrument(skip(self))]
    pub async fn disconnect(&mut self) {
        self.released = true;

        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.backend = None;
        self.unbind().await;
    }

    async fn unbind(&self) {
        match self.launcher.unbind().await {
            Ok(()) => debug!("Unbound from playback backend"),
            Err(PlaybackError::NotRegistered) => debug!("Unbind skipped, nothing registered"),
            Err(e) => warn!(error = %e, "Failed to unbind from playback backend"),
        }
    }
}
