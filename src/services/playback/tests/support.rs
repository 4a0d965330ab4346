//! Fake backend, launcher, session store and UI recorder.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::config::PlaybackConfig;
use crate::services::playback::{
    BackendLauncher, BackendSignal, BindMode, Chapter, ConnectionLink, LastPlayed,
    LastPlayedStore, MediaRef, PlayButton, PlaybackBackend, PlaybackController, PlaybackError,
    PlayerStatus, RawNotification, StartRequest, StatusMessage, SurfaceId, UiSink,
};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Status,
    Media,
    Play,
    Pause(bool),
    Seek(i64),
    SeekDelta(i64),
    SeekToChapter(String),
    SetSleepTimer(i64),
    DisableSleepTimer,
    SetStartWhenPrepared(bool),
    SetVideoSurface(SurfaceId),
    VideoSurfaceAbandoned,
}

struct BackendState {
    status: PlayerStatus,
    media: Option<MediaRef>,
    start_when_prepared: bool,
    position_ms: i64,
    duration_ms: i64,
    stale: bool,
    playing_video: bool,
    sleep_timer_ms: Option<i64>,
}

pub struct FakeBackend {
    state: Mutex<BackendState>,
    calls: Mutex<Vec<BackendCall>>,
    signals: broadcast::Sender<BackendSignal>,
}

impl FakeBackend {
    pub fn new(status: PlayerStatus) -> Arc<Self> {
        let (signals, _) = broadcast::channel(64);
        Arc::new(Self {
            state: Mutex::new(BackendState {
                status,
                media: Some(MediaRef {
                    media_id: 5,
                    feed_id: 2,
                    title: Some("Episode 5".to_string()),
                }),
                start_when_prepared: false,
                position_ms: 42_000,
                duration_ms: 200_000,
                stale: false,
                playing_video: false,
                sleep_timer_ms: None,
            }),
            calls: Mutex::new(Vec::new()),
            signals,
        })
    }

    pub fn set_status(&self, status: PlayerStatus) {
        self.state.lock().unwrap().status = status;
    }

    pub fn set_media(&self, media: Option<MediaRef>) {
        self.state.lock().unwrap().media = media;
    }

    pub fn set_start_when_prepared(&self, start: bool) {
        self.state.lock().unwrap().start_when_prepared = start;
    }

    pub fn set_stale(&self, stale: bool) {
        self.state.lock().unwrap().stale = stale;
    }

    pub fn set_playing_video(&self, video: bool) {
        self.state.lock().unwrap().playing_video = video;
    }

    pub fn start_when_prepared(&self) -> bool {
        self.state.lock().unwrap().start_when_prepared
    }

    /// Change status and announce it, like the real backend does.
    pub fn transition(&self, status: PlayerStatus) {
        self.set_status(status);
        self.emit(BackendSignal::StatusChanged);
    }

    pub fn notify(&self, kind: i32, code: i32) {
        self.emit(BackendSignal::Notification(RawNotification::new(kind, code)));
    }

    pub fn emit(&self, signal: BackendSignal) {
        let _ = self.signals.send(signal);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<BackendCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, BackendCall::Status | BackendCall::Media))
            .collect()
    }

    pub fn count(&self, call: &BackendCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn checked<T>(&self, read: impl FnOnce(&BackendState) -> T) -> Result<T, PlaybackError> {
        let state = self.state.lock().unwrap();
        if state.stale {
            return Err(PlaybackError::StaleHandle);
        }
        Ok(read(&state))
    }
}

#[async_trait]
impl PlaybackBackend for FakeBackend {
    async fn status(&self) -> PlayerStatus {
        self.record(BackendCall::Status);
        self.state.lock().unwrap().status
    }

    async fn media(&self) -> Option<MediaRef> {
        self.record(BackendCall::Media);
        self.state.lock().unwrap().media.clone()
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        self.record(BackendCall::Play);
        Ok(())
    }

    async fn pause(&self, abandon_focus: bool) -> Result<(), PlaybackError> {
        self.record(BackendCall::Pause(abandon_focus));
        Ok(())
    }

    async fn seek(&self, position_ms: i64) -> Result<(), PlaybackError> {
        self.record(BackendCall::Seek(position_ms));
        Ok(())
    }

    async fn seek_delta(&self, delta_ms: i64) -> Result<(), PlaybackError> {
        self.record(BackendCall::SeekDelta(delta_ms));
        Ok(())
    }

    async fn seek_to_chapter(&self, chapter: &Chapter) -> Result<(), PlaybackError> {
        self.record(BackendCall::SeekToChapter(chapter.title.clone()));
        Ok(())
    }

    async fn sleep_timer_active(&self) -> bool {
        self.state.lock().unwrap().sleep_timer_ms.is_some()
    }

    async fn set_sleep_timer(&self, duration_ms: i64) -> Result<(), PlaybackError> {
        self.record(BackendCall::SetSleepTimer(duration_ms));
        self.state.lock().unwrap().sleep_timer_ms = Some(duration_ms);
        Ok(())
    }

    async fn disable_sleep_timer(&self) -> Result<(), PlaybackError> {
        self.record(BackendCall::DisableSleepTimer);
        self.state.lock().unwrap().sleep_timer_ms = None;
        Ok(())
    }

    async fn sleep_timer_time_left(&self) -> i64 {
        self.state.lock().unwrap().sleep_timer_ms.unwrap_or(0)
    }

    async fn is_start_when_prepared(&self) -> bool {
        self.state.lock().unwrap().start_when_prepared
    }

    async fn set_start_when_prepared(&self, start: bool) {
        self.record(BackendCall::SetStartWhenPrepared(start));
        self.state.lock().unwrap().start_when_prepared = start;
    }

    async fn position(&self) -> Result<i64, PlaybackError> {
        self.checked(|s| s.position_ms)
    }

    async fn duration(&self) -> Result<i64, PlaybackError> {
        self.checked(|s| s.duration_ms)
    }

    async fn is_playing(&self) -> Result<bool, PlaybackError> {
        self.checked(|s| s.status == PlayerStatus::Playing)
    }

    async fn is_playing_video(&self) -> bool {
        self.state.lock().unwrap().playing_video
    }

    async fn set_video_surface(&self, surface: SurfaceId) -> Result<(), PlaybackError> {
        self.record(BackendCall::SetVideoSurface(surface));
        Ok(())
    }

    async fn notify_video_surface_abandoned(&self) {
        self.record(BackendCall::VideoSurfaceAbandoned);
    }

    fn subscribe(&self) -> broadcast::Receiver<BackendSignal> {
        self.signals.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LauncherCall {
    Start(StartRequest),
    Bind(BindMode),
    Unbind,
}

pub struct FakeLauncher {
    backend: Arc<FakeBackend>,
    running: AtomicBool,
    auto_connect: bool,
    registered: AtomicBool,
    link: Mutex<Option<ConnectionLink>>,
    calls: Mutex<Vec<LauncherCall>>,
}

impl FakeLauncher {
    pub fn new(backend: Arc<FakeBackend>, running: bool) -> Arc<Self> {
        Self::build(backend, running, true)
    }

    /// Launcher whose bind only completes on [`complete_bind`](Self::complete_bind).
    pub fn deferred(backend: Arc<FakeBackend>, running: bool) -> Arc<Self> {
        Self::build(backend, running, false)
    }

    fn build(backend: Arc<FakeBackend>, running: bool, auto_connect: bool) -> Arc<Self> {
        Arc::new(Self {
            backend,
            running: AtomicBool::new(running),
            auto_connect,
            registered: AtomicBool::new(false),
            link: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn complete_bind(&self) {
        if let Some(link) = self.link.lock().unwrap().as_ref() {
            link.connected(self.backend.clone());
        }
    }

    pub fn drop_connection(&self) {
        if let Some(link) = self.link.lock().unwrap().as_ref() {
            link.disconnected();
        }
    }

    pub fn calls(&self) -> Vec<LauncherCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: LauncherCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BackendLauncher for FakeLauncher {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn start(&self, request: StartRequest) -> Result<(), PlaybackError> {
        self.record(LauncherCall::Start(request));
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn bind(&self, mode: BindMode, link: ConnectionLink) -> Result<bool, PlaybackError> {
        self.record(LauncherCall::Bind(mode));
        self.registered.store(true, Ordering::SeqCst);
        if self.auto_connect {
            link.connected(self.backend.clone());
        }
        *self.link.lock().unwrap() = Some(link);
        Ok(true)
    }

    async fn unbind(&self) -> Result<(), PlaybackError> {
        self.record(LauncherCall::Unbind);
        if self.registered.swap(false, Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PlaybackError::NotRegistered)
        }
    }
}

pub struct FakeStore(pub Option<LastPlayed>);

impl LastPlayedStore for FakeStore {
    fn last_played(&self) -> Option<LastPlayed> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    PlayButton(PlayButton),
    Status(StatusMessage),
    ClearStatus,
    LoadMediaInfo(Option<i64>),
    PositionUpdate,
    Setup,
    Queried,
    Error(i32),
    BufferUpdate(f32),
    BufferStart,
    BufferEnd,
    Reload(i32),
    SleepTimerUpdate,
    AwaitingVideoSurface,
}

#[derive(Default)]
pub struct RecordingUi {
    effects: Mutex<Vec<UiEffect>>,
}

impl RecordingUi {
    pub fn effects(&self) -> Vec<UiEffect> {
        self.effects.lock().unwrap().clone()
    }

    /// Return recorded effects and start over.
    pub fn take(&self) -> Vec<UiEffect> {
        std::mem::take(&mut *self.effects.lock().unwrap())
    }

    pub fn count(&self, effect: &UiEffect) -> usize {
        self.effects().iter().filter(|e| *e == effect).count()
    }

    pub fn media_loads(&self) -> usize {
        self.effects()
            .iter()
            .filter(|e| matches!(e, UiEffect::LoadMediaInfo(_)))
            .count()
    }

    pub fn last_play_button(&self) -> Option<PlayButton> {
        self.effects().iter().rev().find_map(|e| match e {
            UiEffect::PlayButton(button) => Some(*button),
            _ => None,
        })
    }

    fn push(&self, effect: UiEffect) {
        self.effects.lock().unwrap().push(effect);
    }
}

impl UiSink for RecordingUi {
    fn set_play_button(&self, button: PlayButton) {
        self.push(UiEffect::PlayButton(button));
    }

    fn post_status(&self, message: StatusMessage) {
        self.push(UiEffect::Status(message));
    }

    fn clear_status(&self) {
        self.push(UiEffect::ClearStatus);
    }

    fn load_media_info(&self, media: Option<&MediaRef>) {
        self.push(UiEffect::LoadMediaInfo(media.map(|m| m.media_id)));
    }

    fn on_position_update(&self) {
        self.push(UiEffect::PositionUpdate);
    }

    fn setup(&self) {
        self.push(UiEffect::Setup);
    }

    fn on_backend_queried(&self) {
        self.push(UiEffect::Queried);
    }

    fn on_error(&self, code: i32) {
        self.push(UiEffect::Error(code));
    }

    fn on_buffer_update(&self, progress: f32) {
        self.push(UiEffect::BufferUpdate(progress));
    }

    fn on_buffer_start(&self) {
        self.push(UiEffect::BufferStart);
    }

    fn on_buffer_end(&self) {
        self.push(UiEffect::BufferEnd);
    }

    fn on_reload(&self, code: i32) {
        self.push(UiEffect::Reload(code));
    }

    fn on_sleep_timer_update(&self) {
        self.push(UiEffect::SleepTimerUpdate);
    }

    fn on_awaiting_video_surface(&self) {
        self.push(UiEffect::AwaitingVideoSurface);
    }
}

pub struct Harness {
    pub controller: PlaybackController,
    pub backend: Arc<FakeBackend>,
    pub launcher: Arc<FakeLauncher>,
    pub ui: Arc<RecordingUi>,
}

impl Harness {
    /// Backend already running with the given status.
    pub fn running(status: PlayerStatus) -> Self {
        let backend = FakeBackend::new(status);
        let launcher = FakeLauncher::new(backend.clone(), true);
        Self::with(backend, launcher, None, PlaybackConfig::default())
    }

    pub fn with(
        backend: Arc<FakeBackend>,
        launcher: Arc<FakeLauncher>,
        session: Option<LastPlayed>,
        config: PlaybackConfig,
    ) -> Self {
        let ui = Arc::new(RecordingUi::default());
        let controller = PlaybackController::new(
            launcher.clone(),
            Arc::new(FakeStore(session)),
            ui.clone(),
            config,
        );
        Self {
            controller,
            backend,
            launcher,
            ui,
        }
    }

    /// Backend running with `status`, controller connected and settled.
    pub async fn connected(status: PlayerStatus) -> Self {
        let mut harness = Self::running(status);
        harness.controller.init().await;
        harness.settle().await;
        harness
    }

    /// Let forwarding tasks run, then apply everything they queued.
    pub async fn settle(&mut self) {
        for _ in 0..8 {
            tokio::task::yield_now().await;
            self.controller.dispatch_pending().await;
        }
    }

    pub async fn transition(&mut self, status: PlayerStatus) {
        self.backend.transition(status);
        self.settle().await;
    }
}
