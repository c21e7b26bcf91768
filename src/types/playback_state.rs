use std::fmt;

/// Lifecycle of the single audio source owned by the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Failed,
}

impl SessionState {
    /// States in which the duration may be known and seeking is meaningful.
    pub fn is_loaded(self) -> bool {
        matches!(
            self,
            SessionState::Ready | SessionState::Playing | SessionState::Paused | SessionState::Ended
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Ended => "ended",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Snapshot of what the player surface displays.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub volume: f64,
    pub elapsed: f64,
    pub duration: Option<f64>,
    pub current_track_index: usize,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            is_playing: false,
            volume: 0.8,
            elapsed: 0.0,
            duration: None,
            current_track_index: 0,
        }
    }

    /// `elapsed / duration`, or 0 while the duration is unknown or zero.
    pub fn progress_fraction(&self) -> f64 {
        match self.duration {
            Some(duration) if duration.is_finite() && duration > 0.0 => {
                (self.elapsed / duration).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    pub fn elapsed_label(&self) -> String {
        format_time(Some(self.elapsed))
    }

    pub fn duration_label(&self) -> String {
        format_time(self.duration)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// `m:ss`; unknown or non-finite values render as `0:00`.
pub fn format_time(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => return "0:00".to_string(),
    };
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
