/// Where the player surface is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockingMode {
    /// Fixed to the bottom of the viewport.
    Floating,
    /// Inline at its natural document position.
    Docked,
}

/// Ternary position of the anchor region, valid for the current tick only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilitySignal {
    Visible,
    AboveViewport,
    BelowViewport,
}

/// One emission of the visibility monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityObservation {
    pub intersecting: bool,
    /// Anchor top relative to the (margin-adjusted) viewport top.
    /// Positive: the anchor is still below it.
    pub edge_offset: f32,
    /// Signed distance in pixels from the intersection threshold line.
    /// Positive on the intersecting side.
    pub boundary_distance: f32,
}

impl VisibilityObservation {
    pub fn signal(&self) -> VisibilitySignal {
        if self.intersecting {
            VisibilitySignal::Visible
        } else if self.edge_offset > 0.0 {
            VisibilitySignal::BelowViewport
        } else {
            VisibilitySignal::AboveViewport
        }
    }
}
