//! Input flag store for surface locomotion.
//!
//! Key events flip held flags; mouse motion accumulates a yaw delta that the
//! simulation consumes once per tick.

/// Directional and look input for the current tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Horizontal mouse motion accumulated since the last tick (raw device units).
    yaw_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a keyboard event. Unmapped keys are ignored.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        match key {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.backward = pressed,
            KeyCode::KeyD => self.right = pressed,
            KeyCode::KeyA => self.left = pressed,
            KeyCode::Space => self.jump = pressed,
            _ => {}
        }
    }

    /// Process raw mouse motion. Only the horizontal axis drives yaw.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.yaw_delta += delta.0 as f32;
    }

    /// Add to the yaw delta directly (scripted input, tests).
    pub fn add_yaw(&mut self, delta: f32) {
        self.yaw_delta += delta;
    }

    /// Yaw accumulated since the last tick.
    pub fn yaw_delta(&self) -> f32 {
        self.yaw_delta
    }

    /// Consume the accumulated yaw. Call once at the end of each tick.
    pub fn end_tick(&mut self) -> f32 {
        std::mem::take(&mut self.yaw_delta)
    }

    /// True when any movement key is held.
    pub fn has_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Release every key and drop pending yaw (focus loss).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;
