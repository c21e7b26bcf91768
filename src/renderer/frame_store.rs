use crate::types::experience::FRAME_INDEX_PLACEHOLDER;
use std::fmt;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// A decoded frame in RGBA8.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Immutable, contiguously numbered image sequence.
#[derive(Debug, Default)]
pub struct FrameStore {
    frames: Vec<Frame>,
}

/// Expand the frame pattern for one index (3-digit, zero-padded).
pub fn frame_path(pattern: &str, index: u32) -> String {
    pattern.replace(FRAME_INDEX_PLACEHOLDER, &format!("{index:03}"))
}

impl FrameStore {
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        FrameStore { frames }
    }

    /// Decode `start..=end` one after another. Frames that fail to decode are
    /// dropped and the rest are renumbered without holes.
    pub fn load(pattern: &str, start: u32, end: u32) -> Self {
        let mut frames = Vec::new();
        for index in start..=end {
            let path = frame_path(pattern, index);
            match decode_frame(Path::new(&path)) {
                Ok(frame) => frames.push(frame),
                Err(e) => log::debug!("skipping frame {}: {}", path, e),
            }
        }
        log::info!(
            "loaded {} of {} frames from {}",
            frames.len(),
            requested_count(start, end),
            pattern
        );
        FrameStore { frames }
    }

    /// Load on a background thread; the finished store arrives on the receiver.
    pub fn spawn_load(pattern: String, start: u32, end: u32) -> Receiver<FrameStore> {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("frame-loader".to_string())
            .spawn(move || {
                let store = FrameStore::load(&pattern, start, end);
                // The receiver is gone if the view was torn down; nothing to do then.
                let _ = tx.send(store);
            });
        if let Err(e) = spawned {
            log::warn!("could not start frame loader: {}", e);
        }
        rx
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `floor(progress * (count - 1))`, clamped. `None` when nothing loaded.
    pub fn index_at(&self, progress: f32) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }
        let last = self.frames.len() - 1;
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let index = (progress * last as f32).floor() as usize;
        Some(index.min(last))
    }

    /// The frame for `progress`, with its index.
    pub fn frame_at(&self, progress: f32) -> Option<(usize, &Frame)> {
        let index = self.index_at(progress)?;
        self.frames.get(index).map(|frame| (index, frame))
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}

/// Size of the inclusive range `start..=end`; zero when it is empty.
fn requested_count(start: u32, end: u32) -> u64 {
    (u64::from(end) + 1).saturating_sub(u64::from(start))
}

#[derive(Debug)]
pub enum FrameStoreError {
    Decode(image::ImageError),
    EmptyImage,
}

impl fmt::Display for FrameStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStoreError::Decode(e) => write!(f, "decode failed: {e}"),
            FrameStoreError::EmptyImage => write!(f, "image has no pixels"),
        }
    }
}

impl std::error::Error for FrameStoreError {}

impl From<image::ImageError> for FrameStoreError {
    fn from(e: image::ImageError) -> Self {
        FrameStoreError::Decode(e)
    }
}

fn decode_frame(path: &Path) -> Result<Frame, FrameStoreError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(FrameStoreError::EmptyImage);
    }
    Ok(Frame {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
