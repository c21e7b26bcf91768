use crate::ops::cover_fit::{CoverFit, cover_fit};
use crate::renderer::frame_store::FrameStore;

/// What to blit for the current display tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub frame_index: usize,
    pub placement: CoverFit,
}

/// Maps scroll progress onto the frame sequence. Progress updates are
/// coalesced: however many arrive between two display ticks, only the latest
/// one is drawn.
pub struct ScrubRenderer {
    store: FrameStore,
    surface: (f32, f32),
    last_progress: f32,
    pending: bool,
    last_draw: Option<DrawCommand>,
}

impl ScrubRenderer {
    pub fn new() -> Self {
        Self {
            store: FrameStore::default(),
            surface: (0.0, 0.0),
            last_progress: 0.0,
            pending: false,
            last_draw: None,
        }
    }

    /// Swap in a freshly loaded store and schedule a redraw.
    pub fn attach_store(&mut self, store: FrameStore) {
        self.store = store;
        self.pending = true;
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn last_progress(&self) -> f32 {
        self.last_progress
    }

    /// Record progress; returns true if this is the first update since the
    /// last draw, i.e. the caller should request a display tick.
    pub fn on_progress(&mut self, progress: f32) -> bool {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.last_progress = progress;
        let first = !self.pending;
        self.pending = true;
        first
    }

    /// New surface size. Redraws immediately with the last known progress.
    pub fn on_resize(&mut self, width: f32, height: f32) -> Option<DrawCommand> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        self.surface = (width, height);
        self.pending = true;
        self.take_draw()
    }

    pub fn surface(&self) -> (f32, f32) {
        self.surface
    }

    /// Consume the pending request, if any. At most one draw per call.
    pub fn take_draw(&mut self) -> Option<DrawCommand> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        self.last_draw = self.compose();
        self.last_draw
    }

    /// Last composed draw; repainted on every display tick.
    pub fn current(&self) -> Option<DrawCommand> {
        self.last_draw
    }

    fn compose(&self) -> Option<DrawCommand> {
        let (frame_index, frame) = self.store.frame_at(self.last_progress)?;
        let placement = cover_fit(self.surface, (frame.width, frame.height))?;
        Some(DrawCommand {
            frame_index,
            placement,
        })
    }
}

impl Default for ScrubRenderer {
    fn default() -> Self {
        Self::new()
    }
}
