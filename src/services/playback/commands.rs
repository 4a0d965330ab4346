use tracing::{debug, warn};

use super::{
    Chapter, INVALID_TIME, PlaybackController, PlaybackError, PlayerStatus, SeekPreview,
    SleepTimerState, SurfaceId,
};

fn log_command_error(command: &str, result: Result<(), PlaybackError>) {
    if let Err(e) = result {
        warn!(command, error = %e, "Playback command failed");
    }
}

/// Clamped `fraction * duration_ms`, rounded down.
fn position_at(fraction: f32, duration_ms: i64) -> i64 {
    (f64::from(fraction.clamp(0.0, 1.0)) * duration_ms as f64) as i64
}

impl PlaybackController {
    /// Play/pause button pressed.
    ///
    /// While preparing, this flips whether playback starts on its own once
    /// ready instead of issuing a command.
    pub async fn toggle_play_pause(&mut self) {
        let Some(backend) = self.backend() else {
            warn!("Play/pause pressed without a playback backend");
            return;
        };

        match self.status() {
            PlayerStatus::Playing => log_command_error("pause", backend.pause(true).await),
            PlayerStatus::Paused | PlayerStatus::Prepared => {
                log_command_error("play", backend.play().await);
            }
            PlayerStatus::Preparing => {
                let start = !backend.is_start_when_prepared().await;
                backend.set_start_when_prepared(start).await;
            }
            status => debug!(%status, "Play/pause has no effect in this state"),
        }
    }

    /// Jump back by the configured seek delta. Only while playing.
    pub async fn rewind(&mut self) {
        self.seek_relative(-self.config.seek_delta_ms).await;
    }

    /// Jump forward by the configured seek delta. Only while playing.
    pub async fn fast_forward(&mut self) {
        self.seek_relative(self.config.seek_delta_ms).await;
    }

    async fn seek_relative(&mut self, delta_ms: i64) {
        if self.status() != PlayerStatus::Playing {
            return;
        }
        if let Some(backend) = self.backend() {
            log_command_error("seek_delta", backend.seek_delta(delta_ms).await);
        }
    }

    /// Seek bar moved.
    ///
    /// Returns the position the drag points at when the change came from
    /// the user and a backend is bound.
    pub async fn seek_bar_progress_changed(
        &self,
        fraction: f32,
        from_user: bool,
    ) -> Option<SeekPreview> {
        if !from_user {
            return None;
        }
        let backend = self.backend()?;
        let duration = backend.duration().await.ok()?;
        let fraction = fraction.clamp(0.0, 1.0);

        Some(SeekPreview {
            fraction,
            position_ms: position_at(fraction, duration),
        })
    }

    /// Seek bar drag started: stop position updates until it ends.
    pub fn start_seek_drag(&mut self) {
        self.reconciler.cancel_poller();
    }

    /// Seek bar released at `fraction` of the media duration.
    pub async fn stop_seek_drag(&mut self, fraction: f32) {
        let Some(backend) = self.backend() else {
            return;
        };

        match backend.duration().await {
            Ok(duration) => {
                let target = position_at(fraction, duration);
                log_command_error("seek", backend.seek(target).await);
            }
            Err(e) => warn!(error = %e, "Cannot seek, duration unavailable"),
        }

        if self.status() == PlayerStatus::Playing {
            self.reconciler.ensure_poller(Some(&backend));
        }
    }

    /// Seek to the start of `chapter`.
    pub async fn seek_to_chapter(&mut self, chapter: &Chapter) {
        if let Some(backend) = self.backend() {
            log_command_error("seek_to_chapter", backend.seek_to_chapter(chapter).await);
        }
    }

    /// Current sleep timer state, read from the backend.
    pub async fn sleep_timer(&self) -> Option<SleepTimerState> {
        let backend = self.backend()?;
        Some(SleepTimerState {
            active: backend.sleep_timer_active().await,
            remaining_ms: backend.sleep_timer_time_left().await,
        })
    }

    /// Whether a sleep timer is armed. `false` when disconnected.
    pub async fn sleep_timer_active(&self) -> bool {
        match self.backend() {
            Some(backend) => backend.sleep_timer_active().await,
            None => false,
        }
    }

    /// Milliseconds until the sleep timer fires, or [`INVALID_TIME`].
    pub async fn sleep_timer_time_left(&self) -> i64 {
        match self.backend() {
            Some(backend) => backend.sleep_timer_time_left().await,
            None => INVALID_TIME,
        }
    }

    /// Arm the sleep timer.
    pub async fn set_sleep_timer(&mut self, duration_ms: i64) {
        if let Some(backend) = self.backend() {
            log_command_error("set_sleep_timer", backend.set_sleep_timer(duration_ms).await);
        }
    }

    /// Disarm the sleep timer.
    pub async fn disable_sleep_timer(&mut self) {
        if let Some(backend) = self.backend() {
            log_command_error("disable_sleep_timer", backend.disable_sleep_timer().await);
        }
    }

    /// Playback position in milliseconds, or [`INVALID_TIME`].
    pub async fn position(&self) -> i64 {
        let Some(backend) = self.backend() else {
            return INVALID_TIME;
        };
        backend.position().await.unwrap_or_else(|e| {
            debug!(error = %e, "Position unavailable");
            INVALID_TIME
        })
    }

    /// Media duration in milliseconds, or [`INVALID_TIME`].
    pub async fn duration(&self) -> i64 {
        let Some(backend) = self.backend() else {
            return INVALID_TIME;
        };
        backend.duration().await.unwrap_or_else(|e| {
            debug!(error = %e, "Duration unavailable");
            INVALID_TIME
        })
    }

    /// Hand a video surface to the backend.
    pub async fn set_video_surface(&mut self, surface: SurfaceId) {
        if let Some(backend) = self.backend() {
            log_command_error("set_video_surface", backend.set_video_surface(surface).await);
        }
    }

    /// Tell the backend the video surface is gone.
    pub async fn notify_video_surface_abandoned(&mut self) {
        if let Some(backend) = self.backend() {
            backend.notify_video_surface_abandoned().await;
        }
    }

    /// Whether the backend is playing a video.
    pub async fn is_playing_video(&self) -> bool {
        match self.backend() {
            Some(backend) => backend.is_playing_video().await,
            None => false,
        }
    }
}
