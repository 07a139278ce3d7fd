//! Locomotion controller: turns held keys and mouse yaw into surface-tangent motion.

use engine_core::transform::{WORLD_FORWARD, WORLD_RIGHT};
use engine_core::{Quat, Vec3};
use input::InputState;
use physics::{surface_orientation, SphericalGravity, SurfaceBody};

/// Drives a [`SurfaceBody`] from player input.
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionController {
    pub move_speed: f32,
    pub jump_speed: f32,
    /// Radians of yaw per unit of accumulated input.
    pub yaw_sensitivity: f32,
    /// Heading about local up, in radians.
    yaw: f32,
}

impl LocomotionController {
    pub fn new(move_speed: f32, jump_speed: f32, yaw_sensitivity: f32) -> Self {
        Self {
            move_speed,
            jump_speed,
            yaw_sensitivity,
            yaw: 0.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Align the body's up axis with the radial direction at its position, keeping the heading.
    pub fn orient(&self, body: &mut SurfaceBody, gravity: &SphericalGravity) {
        body.orientation = surface_orientation(gravity.up_at(body.position), self.yaw);
    }

    /// Sum of the tangent directions for each held key, scaled by move speed.
    /// Diagonals are not normalized.
    pub fn movement_intent(&self, input: &InputState, orientation: Quat) -> Vec3 {
        let forward = orientation * WORLD_FORWARD;
        let right = orientation * WORLD_RIGHT;

        let mut intent = Vec3::ZERO;
        if input.forward {
            intent += forward;
        }
        if input.backward {
            intent -= forward;
        }
        if input.right {
            intent += right;
        }
        if input.left {
            intent -= right;
        }
        intent * self.move_speed
    }

    /// Apply this tick's input before physics runs.
    ///
    /// The tangent velocity is replaced by the movement intent; the radial
    /// component is kept so gravity and falling carry across ticks. A held jump
    /// sets the radial speed when the body was grounded on the previous tick.
    pub fn apply_input(
        &mut self,
        body: &mut SurfaceBody,
        input: &InputState,
        gravity: &SphericalGravity,
    ) {
        self.yaw += input.yaw_delta() * self.yaw_sensitivity;
        self.orient(body, gravity);

        let up = gravity.up_at(body.position);
        let mut radial_speed = body.velocity.dot(up);
        if input.jump && body.on_surface() {
            radial_speed = self.jump_speed;
            log::debug!("Jump from {:?}", body.position);
        }

        body.velocity = up * radial_speed + self.movement_intent(input, body.orientation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> LocomotionController {
        LocomotionController::new(3.0, 5.0, 0.01)
    }

    #[test]
    fn diagonal_intent_is_vector_sum() {
        let controller = controller();
        let orientation = surface_orientation(Vec3::new(0.2, 0.9, -0.3).normalize(), 0.4);

        let mut forward = InputState::new();
        forward.forward = true;
        let mut right = InputState::new();
        right.right = true;
        let mut both = InputState::new();
        both.forward = true;
        both.right = true;

        let sum = controller.movement_intent(&forward, orientation)
            + controller.movement_intent(&right, orientation);
        let diagonal = controller.movement_intent(&both, orientation);
        assert!(diagonal.distance(sum) < 1e-5);
        assert!((diagonal.length() - 3.0 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn opposing_keys_cancel() {
        let controller = controller();
        let mut input = InputState::new();
        input.forward = true;
        input.backward = true;
        input.left = true;
        input.right = true;
        assert!(controller.movement_intent(&input, Quat::IDENTITY).length() < 1e-6);
    }

    #[test]
    fn intent_is_tangent_to_sphere() {
        let controller = controller();
        let gravity = SphericalGravity::default();
        let mut body = SurfaceBody::new(Vec3::new(3.0, -4.0, 1.0), 0.25);
        controller.orient(&mut body, &gravity);

        let mut input = InputState::new();
        input.forward = true;
        input.left = true;
        let intent = controller.movement_intent(&input, body.orientation);
        let up = gravity.up_at(body.position);
        assert!(intent.dot(up).abs() < 1e-4);
    }

    #[test]
    fn apply_input_keeps_radial_velocity() {
        let mut controller = controller();
        let gravity = SphericalGravity::default();
        let mut body = SurfaceBody::new(Vec3::new(0.0, 6.0, 0.0), 0.25);
        body.velocity = Vec3::new(7.0, -2.0, 0.0);

        let mut input = InputState::new();
        input.forward = true;
        controller.apply_input(&mut body, &input, &gravity);

        assert!((body.velocity.y + 2.0).abs() < 1e-5);
        // World-up orientation with no yaw: forward is -Z.
        assert!((body.velocity.z + 3.0).abs() < 1e-5);
        assert!(body.velocity.x.abs() < 1e-5);
    }

    #[test]
    fn yaw_accumulates_with_sensitivity() {
        let mut controller = controller();
        let gravity = SphericalGravity::default();
        let mut body = SurfaceBody::new(Vec3::new(0.0, 6.0, 0.0), 0.25);
        let mut input = InputState::new();
        input.add_yaw(50.0);
        controller.apply_input(&mut body, &input, &gravity);
        controller.apply_input(&mut body, &input, &gravity);
        assert!((controller.yaw() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn jump_requires_ground_contact() {
        let mut controller = controller();
        let gravity = SphericalGravity::default();
        let mut body = SurfaceBody::new(Vec3::new(0.0, 6.0, 0.0), 0.25);
        let mut input = InputState::new();
        input.jump = true;

        controller.apply_input(&mut body, &input, &gravity);
        assert_eq!(body.velocity, Vec3::ZERO);
    }
}
