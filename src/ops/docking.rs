use crate::types::docking::{DockingMode, VisibilityObservation};
use crate::types::experience::{DockingConfig, DockingRule};

/// Decides FLOATING vs DOCKED from visibility emissions.
///
/// With the default settings (`settle_ticks = 1`, `dead_zone_px = 0`) the
/// mode is a pure function of the latest observation. Larger values add a
/// dead zone, measured from the intersection threshold line, against rapid
/// flipping.
pub struct DockingStateMachine {
    mode: DockingMode,
    rule: DockingRule,
    settle_ticks: u32,
    dead_zone_px: f32,
    candidate: Option<(DockingMode, u32)>,
}

impl DockingStateMachine {
    pub fn new(config: &DockingConfig) -> Self {
        Self {
            mode: DockingMode::Floating,
            rule: config.rule,
            settle_ticks: config.settle_ticks.max(1),
            dead_zone_px: config.dead_zone_px.max(0.0),
            candidate: None,
        }
    }

    pub fn mode(&self) -> DockingMode {
        self.mode
    }

    /// A mode change is waiting for more confirming observations.
    pub fn is_settling(&self) -> bool {
        self.candidate.is_some()
    }

    /// Target mode for an observation, ignoring hysteresis.
    pub fn target(rule: DockingRule, observation: &VisibilityObservation) -> DockingMode {
        match rule {
            DockingRule::Toggle if observation.intersecting => DockingMode::Docked,
            DockingRule::Toggle => DockingMode::Floating,
            DockingRule::Directional => {
                if observation.intersecting {
                    DockingMode::Docked
                } else if observation.edge_offset > 0.0 {
                    DockingMode::Floating
                } else {
                    DockingMode::Docked
                }
            }
        }
    }

    /// Feed one emission. Returns true if the mode changed.
    pub fn observe(&mut self, observation: &VisibilityObservation) -> bool {
        let target = Self::target(self.rule, observation);
        if target == self.mode {
            self.candidate = None;
            return false;
        }
        if observation.boundary_distance.abs() < self.dead_zone_px {
            // Hold, but keep watching until the signal leaves the dead zone.
            if self.candidate.is_none() {
                self.candidate = Some((target, 0));
            }
            return false;
        }

        let seen = match self.candidate {
            Some((mode, count)) if mode == target => count + 1,
            _ => 1,
        };
        if seen < self.settle_ticks {
            self.candidate = Some((target, seen));
            return false;
        }

        log::debug!("docking {:?} -> {:?}", self.mode, target);
        self.mode = target;
        self.candidate = None;
        true
    }
}
