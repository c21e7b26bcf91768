use crate::types::docking::VisibilityObservation;
use crate::types::experience::VisibilityConfig;
use eframe::egui::Rect;

/// Intersection observer for one anchor region against the scroll viewport.
pub struct VisibilityMonitor {
    threshold: f32,
    root_margin_top: f32,
    last_intersecting: Option<bool>,
}

impl VisibilityMonitor {
    pub fn new(config: &VisibilityConfig) -> Self {
        Self {
            threshold: config.threshold.clamp(0.0, 1.0),
            root_margin_top: config.root_margin_top,
            last_intersecting: None,
        }
    }

    /// Measure without emitting.
    pub fn measure(&self, anchor: Rect, viewport: Rect) -> VisibilityObservation {
        let root_top = (viewport.top() + self.root_margin_top).min(viewport.bottom());
        // Negative when the anchor and the root are apart.
        let reach = (viewport.bottom() - anchor.top())
            .min(anchor.bottom() - root_top)
            .min(viewport.bottom() - root_top)
            .min(anchor.height());
        let overlap = reach.max(0.0);
        let ratio = if anchor.height() > 0.0 {
            overlap / anchor.height()
        } else {
            0.0
        };
        VisibilityObservation {
            intersecting: ratio > 0.0 && ratio >= self.threshold,
            edge_offset: anchor.top() - root_top,
            boundary_distance: reach - self.threshold * anchor.height(),
        }
    }

    /// Emits only when the intersecting state changes (and on the first call).
    pub fn observe(&mut self, anchor: Rect, viewport: Rect) -> Option<VisibilityObservation> {
        let observation = self.measure(anchor, viewport);
        if self.last_intersecting == Some(observation.intersecting) {
            return None;
        }
        self.last_intersecting = Some(observation.intersecting);
        Some(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn viewport() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0))
    }

    fn anchor_at(top: f32) -> Rect {
        Rect::from_min_max(pos2(0.0, top), pos2(800.0, top + 500.0))
    }

    fn monitor(threshold: f32, margin: f32) -> VisibilityMonitor {
        VisibilityMonitor::new(&VisibilityConfig {
            threshold,
            root_margin_top: margin,
        })
    }

    #[test]
    fn test_anchor_below_viewport() {
        let m = monitor(0.1, 100.0);
        let obs = m.measure(anchor_at(900.0), viewport());
        assert!(!obs.intersecting);
        assert!(obs.edge_offset > 0.0);
    }

    #[test]
    fn test_threshold_needs_ten_percent() {
        let m = monitor(0.1, 0.0);
        // 40px of 500 visible: 8%.
        assert!(!m.measure(anchor_at(560.0), viewport()).intersecting);
        // 60px visible: 12%.
        assert!(m.measure(anchor_at(540.0), viewport()).intersecting);
    }

    #[test]
    fn test_boundary_distance_is_signed_around_threshold() {
        let m = monitor(0.1, 100.0);
        // 500px anchor: the line sits 50px above the viewport bottom.
        assert!((m.measure(anchor_at(545.0), viewport()).boundary_distance - 5.0).abs() < 1e-3);
        assert!((m.measure(anchor_at(555.0), viewport()).boundary_distance + 5.0).abs() < 1e-3);
        assert!(m.measure(anchor_at(2000.0), viewport()).boundary_distance < -1000.0);
        // Leaving through the top: 40px left below the margin-adjusted top.
        let top = m.measure(anchor_at(-360.0), viewport());
        assert!(!top.intersecting);
        assert!((top.boundary_distance + 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_root_margin_shrinks_viewport_top() {
        let m = monitor(0.0, 100.0);
        // Anchor spans -450..50: visible in the raw viewport, hidden under the margin.
        let obs = m.measure(anchor_at(-450.0), viewport());
        assert!(!obs.intersecting);
        assert!(obs.edge_offset < 0.0);
    }

    #[test]
    fn test_emits_only_on_change() {
        let mut m = monitor(0.1, 0.0);
        assert!(m.observe(anchor_at(900.0), viewport()).is_some());
        assert!(m.observe(anchor_at(800.0), viewport()).is_none());
        let entered = m.observe(anchor_at(200.0), viewport()).unwrap();
        assert!(entered.intersecting);
        assert!(m.observe(anchor_at(100.0), viewport()).is_none());
        let left = m.observe(anchor_at(-700.0), viewport()).unwrap();
        assert!(!left.intersecting);
        assert!(left.edge_offset < 0.0);
    }
}
