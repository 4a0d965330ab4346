use super::{MediaRef, PlayButton, StatusMessage};

/// Display side of the playback controller.
///
/// The controller calls these hooks from its own task only. Notification
/// hooks default to doing nothing so a UI implements just what it shows.
pub trait UiSink: Send + Sync {
    /// Switch the play/pause affordance icon.
    fn set_play_button(&self, button: PlayButton);

    /// Show a status line.
    fn post_status(&self, message: StatusMessage);

    /// Remove the status line.
    fn clear_status(&self);

    /// Load title, artwork and other details of `media`.
    fn load_media_info(&self, media: Option<&MediaRef>);

    /// Playback position changed; read it back through the controller.
    fn on_position_update(&self);

    /// (Re)build the widgets after a query or a failed restore.
    fn setup(&self) {}

    /// Status and media were just read from the backend.
    fn on_backend_queried(&self) {}

    /// Backend reported a playback error.
    fn on_error(&self, _code: i32) {}

    /// Buffering progressed to `progress` in `[0, 1]`.
    fn on_buffer_update(&self, _progress: f32) {}

    /// Buffering started.
    fn on_buffer_start(&self) {}

    /// Buffering finished.
    fn on_buffer_end(&self) {}

    /// Displayed media must be refreshed.
    fn on_reload(&self, _code: i32) {}

    /// Sleep timer ticked.
    fn on_sleep_timer_update(&self) {}

    /// Backend waits for a video surface.
    fn on_awaiting_video_surface(&self) {}
}
