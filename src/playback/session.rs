use crate::playback::transport::{Capabilities, PlaybackError, SourceId, Transport, TransportEvent};
use crate::types::experience::{AutoplayPolicy, PlaybackConfig};
use crate::types::playback_state::{PlaybackState, SessionState};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Why playback is being requested. Only gestures unlock autoplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOrigin {
    /// Direct user input (button, carousel swipe, enter gate).
    Gesture,
    /// Playback carrying on from something already playing.
    Continuation,
    /// Requested without user involvement, e.g. auto-start.
    Automatic,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    TimeUpdate { elapsed: f64, duration: Option<f64> },
    Ended,
    Blocked,
    Error(String),
}

/// A session event tagged with the source that was current when it fired.
/// `None` when no source was attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionNotice {
    pub source: Option<SourceId>,
    pub event: SessionEvent,
}

/// Sole owner of the audio transport.
pub struct PlaybackSession<T: Transport> {
    transport: T,
    capabilities: Capabilities,
    state: SessionState,
    source: Option<SourceId>,
    next_source: u64,
    elapsed: f64,
    duration: Option<f64>,
    volume: f64,
    play_pending: bool,
    ended_emitted: bool,
    autoplay: AutoplayPolicy,
    gesture_seen: bool,
    time_update_interval: Duration,
    last_time_update: Option<Instant>,
    subscribers: Vec<Sender<SessionNotice>>,
}

impl<T: Transport> PlaybackSession<T> {
    pub fn new(mut transport: T, config: &PlaybackConfig) -> Self {
        let capabilities = transport.capabilities();
        let volume = clamp_volume(config.volume).unwrap_or(1.0);
        transport.set_volume(volume);
        log::debug!("playback backend capabilities: {:?}", capabilities);
        Self {
            transport,
            capabilities,
            state: SessionState::Idle,
            source: None,
            next_source: 0,
            elapsed: 0.0,
            duration: None,
            volume,
            play_pending: false,
            ended_emitted: false,
            autoplay: config.autoplay,
            gesture_seen: false,
            time_update_interval: Duration::from_millis(config.time_update_ms.max(1)),
            last_time_update: None,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<SessionNotice> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// Playing, or about to be once the pending source is ready.
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing || (self.state == SessionState::Loading && self.play_pending)
    }

    pub fn supports_native_skip(&self) -> bool {
        self.capabilities.native_skip
    }

    pub fn snapshot(&self, current_track_index: usize) -> PlaybackState {
        PlaybackState {
            is_playing: self.is_playing(),
            volume: self.volume,
            elapsed: self.elapsed,
            duration: self.duration,
            current_track_index,
        }
    }

    /// Replace the current source. The previous one is torn down first, so
    /// nothing it emits can reach subscribers afterwards.
    pub fn set_track(&mut self, url: &str) -> Result<SourceId, PlaybackError> {
        self.transport.teardown();
        self.next_source += 1;
        let source = SourceId(self.next_source);
        self.source = Some(source);
        self.elapsed = 0.0;
        self.duration = None;
        self.play_pending = false;
        self.ended_emitted = false;
        self.last_time_update = None;
        self.notify(SessionEvent::TimeUpdate {
            elapsed: 0.0,
            duration: None,
        });

        match self.transport.load(source, url) {
            Ok(()) => {
                log::info!("loading source {} from {}", source, url);
                self.set_state(SessionState::Loading);
                Ok(source)
            }
            Err(e) => {
                log::warn!("source {} failed to load: {}", source, e);
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop the current source and disable transport until the next track.
    pub fn clear(&mut self, reason: &str) {
        self.transport.teardown();
        self.source = None;
        self.elapsed = 0.0;
        self.duration = None;
        self.play_pending = false;
        self.notify(SessionEvent::TimeUpdate {
            elapsed: 0.0,
            duration: None,
        });
        self.fail(reason.to_string());
    }

    /// Request playback. A refusal leaves the session PAUSED and emits
    /// `Blocked` once; it is never an error for the caller.
    pub fn play(&mut self, origin: PlayOrigin) -> bool {
        if origin == PlayOrigin::Gesture {
            self.gesture_seen = true;
        }
        match self.state {
            SessionState::Idle | SessionState::Failed => {
                log::debug!("play ignored in state {}", self.state);
                return false;
            }
            SessionState::Playing => return true,
            SessionState::Loading if self.play_pending => return true,
            _ => {}
        }

        if self.autoplay == AutoplayPolicy::RequireGesture
            && origin == PlayOrigin::Automatic
            && !self.gesture_seen
        {
            self.block("autoplay needs a user gesture first");
            return false;
        }

        if self.state == SessionState::Ended {
            if let Err(e) = self.transport.seek(0.0) {
                log::warn!("could not rewind ended source: {}", e);
            }
            self.elapsed = 0.0;
            self.ended_emitted = false;
        }

        if let Err(e) = self.transport.play() {
            self.block(&e.to_string());
            return false;
        }
        if origin != PlayOrigin::Automatic {
            self.gesture_seen = true;
        }
        self.last_time_update = None;
        if self.state == SessionState::Loading {
            self.play_pending = true;
        } else {
            self.set_state(SessionState::Playing);
        }
        true
    }

    pub fn pause(&mut self) {
        match self.state {
            SessionState::Playing | SessionState::Ready => {
                if let Err(e) = self.transport.pause() {
                    log::warn!("pause failed: {}", e);
                }
                self.set_state(SessionState::Paused);
            }
            SessionState::Loading => {
                if self.play_pending {
                    if let Err(e) = self.transport.pause() {
                        log::warn!("pause failed: {}", e);
                    }
                }
                self.play_pending = false;
            }
            _ => {}
        }
    }

    /// Seek to `fraction` of the duration. No-op until the duration is known.
    pub fn seek(&mut self, fraction: f64) {
        let duration = match self.duration {
            Some(d) if self.state.is_loaded() && d > 0.0 => d,
            _ => {
                log::debug!("seek ignored: duration unknown");
                return;
            }
        };
        if fraction.is_nan() {
            return;
        }
        let target = fraction.clamp(0.0, 1.0) * duration;
        if let Err(e) = self.transport.seek(target) {
            log::warn!("seek to {:.1}s failed: {}", target, e);
            return;
        }
        self.elapsed = target;
        if self.state == SessionState::Ended {
            self.ended_emitted = false;
            self.set_state(SessionState::Paused);
        }
        self.notify(SessionEvent::TimeUpdate {
            elapsed: self.elapsed,
            duration: self.duration,
        });
    }

    pub fn set_volume(&mut self, volume: f64) {
        if let Some(volume) = clamp_volume(volume) {
            self.volume = volume;
            self.transport.set_volume(volume);
        }
    }

    pub fn native_skip(&mut self) -> Result<(), PlaybackError> {
        if !self.capabilities.native_skip {
            return Err(PlaybackError::Unsupported("native skip"));
        }
        self.transport.native_skip()
    }

    /// Process backend notifications and emit periodic time updates.
    pub fn tick(&mut self, now: Instant) {
        for event in self.transport.poll_events() {
            if Some(event.source()) != self.source {
                log::trace!("dropping stale event from {}", event.source());
                continue;
            }
            self.handle_event(event);
        }

        if self.state != SessionState::Playing {
            return;
        }
        let due = match self.last_time_update {
            Some(last) => now.saturating_duration_since(last) >= self.time_update_interval,
            None => true,
        };
        if !due {
            return;
        }
        self.last_time_update = Some(now);
        if let Some(position) = self.transport.position() {
            self.elapsed = position.max(0.0);
        }
        if self.duration.is_none() {
            self.duration = self.transport.duration().filter(|d| valid_duration(*d));
        }
        self.notify(SessionEvent::TimeUpdate {
            elapsed: self.elapsed,
            duration: self.duration,
        });
    }

    fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Loaded { duration, .. } => {
                self.duration = duration.filter(|d| valid_duration(*d));
                if self.state == SessionState::Loading {
                    let next = if self.play_pending {
                        SessionState::Playing
                    } else {
                        SessionState::Ready
                    };
                    self.play_pending = false;
                    self.set_state(next);
                }
                self.notify(SessionEvent::TimeUpdate {
                    elapsed: self.elapsed,
                    duration: self.duration,
                });
            }
            TransportEvent::DurationChanged { duration, .. } => {
                if valid_duration(duration) {
                    self.duration = Some(duration);
                    self.notify(SessionEvent::TimeUpdate {
                        elapsed: self.elapsed,
                        duration: self.duration,
                    });
                }
            }
            TransportEvent::Ended { .. } => {
                if self.ended_emitted {
                    return;
                }
                self.ended_emitted = true;
                if let Some(duration) = self.duration {
                    self.elapsed = duration;
                }
                self.play_pending = false;
                self.set_state(SessionState::Ended);
                self.notify(SessionEvent::Ended);
            }
            TransportEvent::Failed { source, message } => {
                log::warn!("source {} failed: {}", source, message);
                self.fail(message);
            }
        }
    }

    fn block(&mut self, reason: &str) {
        log::warn!("playback blocked: {}", reason);
        self.play_pending = false;
        if self.state != SessionState::Loading {
            if let Err(e) = self.transport.pause() {
                log::debug!("pause after block failed: {}", e);
            }
        }
        self.set_state(SessionState::Paused);
        self.notify(SessionEvent::Blocked);
    }

    fn fail(&mut self, message: String) {
        self.play_pending = false;
        self.set_state(SessionState::Failed);
        self.notify(SessionEvent::Error(message));
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        log::debug!("session {} -> {}", self.state, state);
        self.state = state;
        self.notify(SessionEvent::StateChanged(state));
    }

    fn notify(&mut self, event: SessionEvent) {
        let notice = SessionNotice {
            source: self.source,
            event,
        };
        self.subscribers.retain(|tx| tx.send(notice.clone()).is_ok());
    }
}

impl<T: Transport> Drop for PlaybackSession<T> {
    fn drop(&mut self) {
        self.transport.teardown();
    }
}

fn clamp_volume(volume: f64) -> Option<f64> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

fn valid_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::ScriptedTransport;

    fn config(autoplay: AutoplayPolicy) -> PlaybackConfig {
        PlaybackConfig {
            autoplay,
            ..PlaybackConfig::default()
        }
    }

    fn session(autoplay: AutoplayPolicy) -> (PlaybackSession<ScriptedTransport>, ScriptedTransport) {
        let transport = ScriptedTransport::default();
        let session = PlaybackSession::new(transport.clone(), &config(autoplay));
        (session, transport)
    }

    fn drain(rx: &Receiver<SessionNotice>) -> Vec<SessionEvent> {
        rx.try_iter().map(|notice| notice.event).collect()
    }

    fn loaded(
        session: &mut PlaybackSession<ScriptedTransport>,
        transport: &ScriptedTransport,
        duration: f64,
    ) -> SourceId {
        let source = session.set_track("file:///a.mp3").unwrap();
        transport.push(TransportEvent::Loaded {
            source,
            duration: Some(duration),
        });
        session.tick(Instant::now());
        source
    }

    #[test]
    fn test_load_then_ready() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        let source = s.set_track("file:///a.mp3").unwrap();
        assert_eq!(s.state(), SessionState::Loading);
        assert_eq!(t.script().loaded, vec![(source, "file:///a.mp3".to_string())]);
        t.push(TransportEvent::Loaded {
            source,
            duration: Some(180.0),
        });
        s.tick(Instant::now());
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.duration(), Some(180.0));
    }

    #[test]
    fn test_play_while_loading_starts_when_ready() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        let source = s.set_track("file:///a.mp3").unwrap();
        assert!(s.play(PlayOrigin::Gesture));
        assert_eq!(s.state(), SessionState::Loading);
        assert!(s.is_playing());
        t.push(TransportEvent::Loaded {
            source,
            duration: Some(10.0),
        });
        s.tick(Instant::now());
        assert_eq!(s.state(), SessionState::Playing);
    }

    #[test]
    fn test_rejected_play_pauses_and_blocks_once() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        loaded(&mut s, &t, 60.0);
        let rx = s.subscribe();
        t.script_mut().reject_play = true;
        assert!(!s.play(PlayOrigin::Gesture));
        assert_eq!(s.state(), SessionState::Paused);
        let blocked = drain(&rx)
            .into_iter()
            .filter(|e| *e == SessionEvent::Blocked)
            .count();
        assert_eq!(blocked, 1);
    }

    #[test]
    fn test_automatic_play_needs_gesture() {
        let (mut s, t) = session(AutoplayPolicy::RequireGesture);
        loaded(&mut s, &t, 60.0);
        let rx = s.subscribe();
        assert!(!s.play(PlayOrigin::Automatic));
        assert_eq!(s.state(), SessionState::Paused);
        assert!(drain(&rx).contains(&SessionEvent::Blocked));
        assert!(!t.script().playing);

        assert!(s.play(PlayOrigin::Gesture));
        s.pause();
        assert!(s.play(PlayOrigin::Automatic));
        assert_eq!(s.state(), SessionState::Playing);
    }

    #[test]
    fn test_seek_before_duration_is_noop() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        s.set_track("file:///a.mp3").unwrap();
        s.seek(0.5);
        assert!(t.script().seeks.is_empty());
        assert_eq!(s.elapsed(), 0.0);
    }

    #[test]
    fn test_seek_fraction_of_duration() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        loaded(&mut s, &t, 200.0);
        let rx = s.subscribe();
        s.seek(0.25);
        assert_eq!(t.script().seeks, vec![50.0]);
        assert_eq!(
            drain(&rx),
            vec![SessionEvent::TimeUpdate {
                elapsed: 50.0,
                duration: Some(200.0)
            }]
        );
        s.seek(3.0);
        assert_eq!(s.elapsed(), 200.0);
    }

    #[test]
    fn test_track_switch_resets_and_drops_stale_events() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        let first = loaded(&mut s, &t, 90.0);
        s.play(PlayOrigin::Gesture);
        t.script_mut().position = Some(42.0);
        s.tick(Instant::now());
        assert_eq!(s.elapsed(), 42.0);

        let second = s.set_track("file:///b.mp3").unwrap();
        assert_ne!(first, second);
        assert_eq!(s.elapsed(), 0.0);
        assert_eq!(s.duration(), None);
        assert_eq!(t.script().teardowns, 2);

        let rx = s.subscribe();
        t.push(TransportEvent::Ended { source: first });
        t.push(TransportEvent::DurationChanged {
            source: first,
            duration: 90.0,
        });
        s.tick(Instant::now());
        assert!(drain(&rx).is_empty());
        assert_eq!(s.state(), SessionState::Loading);
    }

    #[test]
    fn test_ended_emitted_exactly_once() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        let source = loaded(&mut s, &t, 30.0);
        s.play(PlayOrigin::Gesture);
        let rx = s.subscribe();
        t.push(TransportEvent::Ended { source });
        t.push(TransportEvent::Ended { source });
        s.tick(Instant::now());
        s.tick(Instant::now());
        let ended = drain(&rx)
            .into_iter()
            .filter(|e| *e == SessionEvent::Ended)
            .count();
        assert_eq!(ended, 1);
        assert_eq!(s.state(), SessionState::Ended);
        assert_eq!(s.elapsed(), 30.0);
    }

    #[test]
    fn test_time_updates_are_rate_limited() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        loaded(&mut s, &t, 30.0);
        s.play(PlayOrigin::Gesture);
        let rx = s.subscribe();
        let start = Instant::now();
        s.tick(start);
        s.tick(start + Duration::from_millis(100));
        s.tick(start + Duration::from_millis(300));
        let updates = drain(&rx)
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::TimeUpdate { .. }))
            .count();
        assert_eq!(updates, 2);
    }

    #[test]
    fn test_failed_load_disables_play() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        t.script_mut().fail_load = true;
        assert!(s.set_track("file:///broken.mp3").is_err());
        assert_eq!(s.state(), SessionState::Failed);
        assert!(!s.play(PlayOrigin::Gesture));
    }

    #[test]
    fn test_backend_failure_event() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        let source = s.set_track("file:///a.mp3").unwrap();
        let rx = s.subscribe();
        t.push(TransportEvent::Failed {
            source,
            message: "404".to_string(),
        });
        s.tick(Instant::now());
        assert_eq!(s.state(), SessionState::Failed);
        assert!(drain(&rx).contains(&SessionEvent::Error("404".to_string())));
    }

    #[test]
    fn test_volume_is_clamped() {
        let (mut s, t) = session(AutoplayPolicy::Allow);
        s.set_volume(1.4);
        assert_eq!(s.volume(), 1.0);
        assert_eq!(t.script().volume, 1.0);
        s.set_volume(f64::NAN);
        assert_eq!(s.volume(), 1.0);
    }

    #[test]
    fn test_native_skip_only_when_advertised() {
        let (mut s, _t) = session(AutoplayPolicy::Allow);
        assert!(matches!(s.native_skip(), Err(PlaybackError::Unsupported(_))));

        let t = ScriptedTransport::default();
        t.script_mut().native_skip = true;
        let mut s = PlaybackSession::new(t.clone(), &config(AutoplayPolicy::Allow));
        assert!(s.supports_native_skip());
        s.native_skip().unwrap();
        assert_eq!(t.script().skips, 1);
    }

    #[test]
    fn test_notices_carry_their_source() {
        let (mut s, _t) = session(AutoplayPolicy::Allow);
        let rx = s.subscribe();
        let first = s.set_track("file:///a.mp3").unwrap();
        s.clear("unplayable");
        let second = s.set_track("file:///b.mp3").unwrap();
        let sources: Vec<Option<SourceId>> = rx.try_iter().map(|n| n.source).collect();
        assert_eq!(sources.first(), Some(&Some(first)));
        assert!(sources.contains(&None));
        assert_eq!(sources.last(), Some(&Some(second)));
        assert_eq!(s.source(), Some(second));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (mut s, _t) = session(AutoplayPolicy::Allow);
        let rx = s.subscribe();
        drop(rx);
        let live = s.subscribe();
        s.set_track("file:///a.mp3").unwrap();
        assert_eq!(s.subscribers.len(), 1);
        assert!(!drain(&live).is_empty());
    }
}
