use crate::ops::docking::DockingStateMachine;
use crate::ops::visibility::VisibilityMonitor;
use crate::playback::resolver::{SourceResolver, resolver_from_config};
use crate::playback::session::{PlayOrigin, PlaybackSession, SessionEvent, SessionNotice};
use crate::playback::transport::Transport;
use crate::renderer::frame_store::FrameStore;
use crate::renderer::scrub_renderer::ScrubRenderer;
use crate::types::docking::{DockingMode, VisibilityObservation};
use crate::types::experience::ExperienceConfig;
use crate::types::playback_state::{PlaybackState, SessionState};
use crate::types::playlist::PlaylistCursor;
use crate::types::track::Track;
use anyhow::anyhow;
use eframe::egui::Rect;
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// User input from the control surface and the carousel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    TogglePlay,
    Play,
    Pause,
    Next,
    Previous,
    Seek(f64),
    SetVolume(f64),
    /// Carousel selection; always starts playback of the chosen track.
    Select(usize),
}

/// Wires scroll, visibility and user input to the renderer, the docking
/// state machine, the playlist cursor and the playback session.
pub struct PresentationController<T: Transport> {
    cursor: PlaylistCursor,
    session: PlaybackSession<T>,
    session_events: Receiver<SessionNotice>,
    resolver: Box<dyn SourceResolver>,
    renderer: ScrubRenderer,
    visibility: VisibilityMonitor,
    docking: DockingStateMachine,
    auto_start: bool,
    layout_generation: u64,
    timeline: PlaybackState,
    track_error: Option<String>,
    blocked: bool,
}

impl<T: Transport> PresentationController<T> {
    pub fn new(config: &ExperienceConfig, transport: T) -> anyhow::Result<Self> {
        let cursor = PlaylistCursor::new(config.playlist.clone())
            .ok_or_else(|| anyhow!("playlist must contain at least one track"))?;
        let mut session = PlaybackSession::new(transport, &config.playback);
        let session_events = session.subscribe();
        Ok(Self {
            cursor,
            session,
            session_events,
            resolver: resolver_from_config(&config.playback.resolver, &config.base_dir),
            renderer: ScrubRenderer::default(),
            visibility: VisibilityMonitor::new(&config.visibility),
            docking: DockingStateMachine::new(&config.docking),
            auto_start: config.playback.auto_start,
            layout_generation: 0,
            timeline: PlaybackState::new(),
            track_error: None,
            blocked: false,
        })
    }

    /// Load the first track; auto-start is subject to the autoplay policy.
    pub fn start(&mut self) {
        let origin = self.auto_start.then_some(PlayOrigin::Automatic);
        self.load_current(origin);
    }

    /// The entry gate: the first gesture of the visit.
    pub fn enter(&mut self) {
        if self.controls_enabled() {
            self.session.play(PlayOrigin::Gesture);
        }
    }

    pub fn attach_frames(&mut self, store: FrameStore) {
        self.renderer.attach_store(store);
    }

    /// Returns true if a display tick should be requested.
    pub fn on_scroll(&mut self, progress: f32) -> bool {
        self.renderer.on_progress(progress)
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        if self.renderer.surface() != (width, height) {
            self.renderer.on_resize(width, height);
        }
    }

    /// Measure the anchor against the viewport. Returns true if the docking
    /// mode changed and the control surface must be laid out again.
    pub fn on_viewport(&mut self, anchor: Rect, viewport: Rect) -> bool {
        let observation = match self.visibility.observe(anchor, viewport) {
            Some(observation) => observation,
            None if self.docking.is_settling() => self.visibility.measure(anchor, viewport),
            None => return false,
        };
        self.on_visibility(&observation)
    }

    pub fn on_visibility(&mut self, observation: &VisibilityObservation) -> bool {
        let changed = self.docking.observe(observation);
        if changed {
            self.layout_generation += 1;
            log::debug!(
                "player now {:?} ({:?})",
                self.docking.mode(),
                observation.signal()
            );
        }
        changed
    }

    pub fn handle(&mut self, action: ControlAction) {
        match action {
            ControlAction::TogglePlay => {
                if self.session.is_playing() {
                    self.session.pause();
                } else if self.controls_enabled() {
                    self.session.play(PlayOrigin::Gesture);
                }
            }
            ControlAction::Play => {
                if self.controls_enabled() {
                    self.session.play(PlayOrigin::Gesture);
                }
            }
            ControlAction::Pause => self.session.pause(),
            ControlAction::Next => {
                if self.controls_enabled() && self.session.supports_native_skip() {
                    match self.session.native_skip() {
                        Ok(()) => return,
                        Err(e) => log::warn!("native skip failed, using playlist: {}", e),
                    }
                }
                let resume = self.session.is_playing();
                self.cursor.next();
                self.load_current(resume.then_some(PlayOrigin::Gesture));
            }
            ControlAction::Previous => {
                let resume = self.session.is_playing();
                self.cursor.previous();
                self.load_current(resume.then_some(PlayOrigin::Gesture));
            }
            ControlAction::Seek(fraction) => {
                if self.controls_enabled() {
                    self.session.seek(fraction);
                }
            }
            ControlAction::SetVolume(volume) => self.session.set_volume(volume),
            ControlAction::Select(index) => {
                let before = self.cursor.current();
                let after = self.cursor.select_externally(index);
                if after != before {
                    self.load_current(Some(PlayOrigin::Gesture));
                } else if index == after && self.controls_enabled() {
                    self.session.play(PlayOrigin::Gesture);
                }
            }
        }
    }

    /// Once per display tick.
    pub fn tick(&mut self, now: Instant) {
        self.session.tick(now);
        let notices: Vec<SessionNotice> = self.session_events.try_iter().collect();
        for notice in notices {
            // Handling an earlier notice may already have switched tracks.
            if notice.source != self.session.source() {
                log::trace!("dropping {:?} from superseded source", notice.event);
                continue;
            }
            match notice.event {
                SessionEvent::TimeUpdate { elapsed, duration } => {
                    self.timeline.elapsed = elapsed;
                    self.timeline.duration = duration;
                }
                SessionEvent::Ended => {
                    self.cursor.next();
                    log::info!("track ended, advancing to {}", self.cursor.current());
                    self.load_current(Some(PlayOrigin::Continuation));
                }
                SessionEvent::Blocked => self.blocked = true,
                SessionEvent::StateChanged(SessionState::Playing) => self.blocked = false,
                SessionEvent::StateChanged(_) => {}
                SessionEvent::Error(message) => self.track_error = Some(message),
            }
        }
    }

    fn load_current(&mut self, play: Option<PlayOrigin>) {
        self.track_error = None;
        self.timeline = PlaybackState::default();
        let track = self.cursor.current_track().clone();
        match self.resolver.resolve(&track) {
            Ok(url) => match self.session.set_track(&url) {
                Ok(_) => {
                    if let Some(origin) = play {
                        self.session.play(origin);
                    }
                }
                Err(e) => self.track_error = Some(e.to_string()),
            },
            Err(e) => {
                log::warn!("{}", e);
                let message = e.to_string();
                self.session.clear(&message);
                self.track_error = Some(message);
            }
        }
    }

    pub fn renderer(&self) -> &ScrubRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut ScrubRenderer {
        &mut self.renderer
    }

    pub fn docking_mode(&self) -> DockingMode {
        self.docking.mode()
    }

    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    pub fn progress_fraction(&self) -> f64 {
        self.timeline.progress_fraction()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.session.snapshot(self.cursor.current())
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// False while the current track could not be resolved or loaded.
    pub fn controls_enabled(&self) -> bool {
        self.track_error.is_none()
    }

    pub fn track_error(&self) -> Option<&str> {
        self.track_error.as_deref()
    }

    pub fn blocked(&self) -> bool {
        self.blocked
    }

    pub fn tracks(&self) -> &[Track] {
        self.cursor.tracks()
    }

    pub fn current_index(&self) -> usize {
        self.cursor.current()
    }

    pub fn current_track(&self) -> &Track {
        self.cursor.current_track()
    }
}
