use std::fmt;

/// Identifies one loaded source. Events from any other id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Notifications a backend reports about the source it currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Metadata arrived; duration is `None` for unbounded streams.
    Loaded { source: SourceId, duration: Option<f64> },
    DurationChanged { source: SourceId, duration: f64 },
    Ended { source: SourceId },
    Failed { source: SourceId, message: String },
}

impl TransportEvent {
    pub fn source(&self) -> SourceId {
        match self {
            TransportEvent::Loaded { source, .. }
            | TransportEvent::DurationChanged { source, .. }
            | TransportEvent::Ended { source }
            | TransportEvent::Failed { source, .. } => *source,
        }
    }
}

/// Optional features negotiated once when a backend is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The backend manages its own queue and can skip ahead natively.
    pub native_skip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The platform refused to start playback.
    Rejected(String),
    /// The source could not be opened.
    Load(String),
    /// The backend does not offer the requested capability.
    Unsupported(&'static str),
    Backend(String),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Rejected(reason) => write!(f, "playback rejected: {reason}"),
            PlaybackError::Load(reason) => write!(f, "could not load source: {reason}"),
            PlaybackError::Unsupported(what) => write!(f, "{what} is not supported by this backend"),
            PlaybackError::Backend(reason) => write!(f, "backend error: {reason}"),
        }
    }
}

impl std::error::Error for PlaybackError {}

/// Audio backend driven exclusively by `PlaybackSession`.
///
/// Implementations hold at most one source. `load` and `teardown` must drop
/// everything attached to the previous source before returning.
pub trait Transport {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
    fn load(&mut self, source: SourceId, url: &str) -> Result<(), PlaybackError>;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError>;
    fn set_volume(&mut self, volume: f64);
    fn position(&self) -> Option<f64>;
    fn duration(&self) -> Option<f64>;
    /// Drain pending notifications without blocking.
    fn poll_events(&mut self) -> Vec<TransportEvent>;
    fn teardown(&mut self);
    fn native_skip(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unsupported("native skip"))
    }
}
