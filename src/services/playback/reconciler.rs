use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, instrument, trace};

use super::{
    MediaRef, PlayButton, PlayerStatus, StatusMessage, UiSink,
    backend::PlaybackBackend,
    events::ControllerMessage,
    poller::PositionPoller,
};
use crate::services::common::Property;

/// Derives UI effects from the cached backend status.
///
/// Owns the single authoritative status copy, the media-info loaded flag and
/// the position poller. Every status event re-runs [`reconcile`], which is
/// safe to call repeatedly for the same status.
///
/// [`reconcile`]: StateReconciler::reconcile
pub(crate) struct StateReconciler {
    ui: Arc<dyn UiSink>,
    status: Property<PlayerStatus>,
    media: Property<Option<MediaRef>>,
    media_info_loaded: bool,
    poller: Option<PositionPoller>,
    next_generation: u64,
    poll_interval: Duration,
    inbox: mpsc::UnboundedSender<ControllerMessage>,
}

impl StateReconciler {
    pub fn new(
        ui: Arc<dyn UiSink>,
        poll_interval: Duration,
        inbox: mpsc::UnboundedSender<ControllerMessage>,
    ) -> Self {
        Self {
            ui,
            status: Property::new(PlayerStatus::Stopped),
            media: Property::new(None),
            media_info_loaded: false,
            poller: None,
            next_generation: 0,
            poll_interval,
            inbox,
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status.get()
    }

    pub fn status_property(&self) -> &Property<PlayerStatus> {
        &self.status
    }

    pub fn media(&self) -> Option<MediaRef> {
        self.media.get()
    }

    pub fn media_property(&self) -> &Property<Option<MediaRef>> {
        &self.media
    }

    pub fn media_info_loaded(&self) -> bool {
        self.media_info_loaded
    }

    pub fn poller_alive(&self) -> bool {
        self.poller.as_ref().is_some_and(PositionPoller::is_alive)
    }

    #[cfg(test)]
    pub fn poller_generation(&self) -> Option<u64> {
        self.poller.as_ref().map(PositionPoller::generation)
    }

    pub fn set_status(&self, status: PlayerStatus) {
        self.status.set(status);
    }

    /// Overwrite status and media with a fresh backend query.
    pub fn apply_query(&self, status: PlayerStatus, media: Option<MediaRef>) {
        self.status.set(status);
        self.media.set(media);
    }

    /// Force the next status transition to reload media info.
    pub fn invalidate_media_info(&mut self) {
        self.media_info_loaded = false;
    }

    /// Backend went away: the media may change before the next connection.
    pub fn on_disconnected(&mut self) {
        self.cancel_poller();
        self.media_info_loaded = false;
    }

    /// Apply the effects of the cached status.
    #[instrument(skip_all, fields(status = %self.status.get()))]
    pub async fn reconcile(&mut self, backend: Option<&Arc<dyn PlaybackBackend>>) {
        let status = self.status.get();
        debug!("Reconciling player status");

        if status != PlayerStatus::Playing {
            self.cancel_poller();
        }

        match status {
            PlayerStatus::Error => {
                self.ui.post_status(StatusMessage::Error);
            }
            PlayerStatus::Paused => {
                self.ui.post_status(StatusMessage::Paused);
                self.ensure_media_info_loaded();
                self.ui.set_play_button(PlayButton::Play);
            }
            PlayerStatus::Playing => {
                self.ui.clear_status();
                self.ensure_media_info_loaded();
                self.ensure_poller(backend);
                self.ui.set_play_button(PlayButton::Pause);
            }
            PlayerStatus::Preparing => {
                self.ui.post_status(StatusMessage::Preparing);
                self.ensure_media_info_loaded();
                if let Some(backend) = backend {
                    let button = if backend.is_start_when_prepared().await {
                        PlayButton::Pause
                    } else {
                        PlayButton::Play
                    };
                    self.ui.set_play_button(button);
                }
            }
            PlayerStatus::Stopped => {
                self.ui.post_status(StatusMessage::Stopped);
            }
            PlayerStatus::Prepared => {
                self.ensure_media_info_loaded();
                self.ui.post_status(StatusMessage::Ready);
                self.ui.set_play_button(PlayButton::Play);
            }
            PlayerStatus::Seeking => {
                self.ui.post_status(StatusMessage::Seeking);
            }
            PlayerStatus::AwaitingVideoSurface => {
                self.ui.on_awaiting_video_surface();
            }
        }
    }

    fn ensure_media_info_loaded(&mut self) {
        if !self.media_info_loaded {
            let media = self.media.get();
            self.ui.load_media_info(media.as_ref());
        }
        self.media_info_loaded = true;
    }

    /// Start a poller unless one is already running.
    pub fn ensure_poller(&mut self, backend: Option<&Arc<dyn PlaybackBackend>>) {
        if self.poller_alive() {
            return;
        }

        // A finished poller is replaced; make sure it can no longer tick.
        self.cancel_poller();

        let Some(backend) = backend else {
            debug!("No backend bound, not starting position poller");
            return;
        };

        self.next_generation += 1;
        self.poller = Some(PositionPoller::spawn(
            self.next_generation,
            Arc::clone(backend),
            self.poll_interval,
            self.inbox.clone(),
        ));
    }

    pub fn cancel_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            debug!(generation = poller.generation(), "Cancelling position poller");
            poller.cancel();
        }
    }

    /// Whether a tick from poller `generation` should reach the UI.
    pub fn accept_tick(&self, generation: u64) -> bool {
        let accepted = self
            .poller
            .as_ref()
            .is_some_and(|p| p.generation() == generation && !p.is_cancelled());
        if !accepted {
            trace!(generation, "Ignoring tick from retired poller");
        }
        accepted
    }
}
