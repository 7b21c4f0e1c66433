//! Divider position for the before/after comparison, in percent of container width.

pub const NEUTRAL_POSITION: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealState {
    position: f64,
    dragging: bool,
    enabled: bool,
}

impl Default for RevealState {
    fn default() -> Self {
        Self {
            position: NEUTRAL_POSITION,
            dragging: false,
            enabled: false,
        }
    }
}

impl RevealState {
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling cancels any drag and parks the divider at the neutral position.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.dragging = false;
            self.position = NEUTRAL_POSITION;
        }
    }

    /// Returns whether a drag actually started.
    pub fn begin_drag(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.dragging = true;
        true
    }

    /// Pointer x and container geometry are in the same (client) coordinate space.
    /// Ignored unless a drag is active.
    pub fn update_drag(&mut self, pointer_x: f64, container_left: f64, container_width: f64) -> bool {
        if !self.dragging || !(container_width > 0.0) || pointer_x.is_nan() {
            return false;
        }
        self.position = ((pointer_x - container_left) / container_width * 100.0).clamp(0.0, 100.0);
        true
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// CSS `clip-path` for the "after" layer: only the part left of the divider shows.
    pub fn after_clip_path(&self) -> String {
        format!("inset(0 {}% 0 0)", 100.0 - self.position)
    }
}
