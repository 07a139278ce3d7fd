//! Radial gravity toward a planet center.

use engine_core::transform::WORLD_UP;
use engine_core::{Quat, Vec3};

/// Standard gravity magnitude used when nothing else is configured.
pub const DEFAULT_GRAVITY: f32 = 9.8;

/// Below this distance from the center, "up" is undefined and falls back to world up.
const MIN_RADIAL_DISTANCE: f32 = 1.0e-4;

/// Constant-magnitude gravity pulling everything toward `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalGravity {
    pub center: Vec3,
    /// Acceleration in m/s², independent of distance from the center.
    pub strength: f32,
}

impl Default for SphericalGravity {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            strength: DEFAULT_GRAVITY,
        }
    }
}

impl SphericalGravity {
    pub fn new(center: Vec3, strength: f32) -> Self {
        Self { center, strength }
    }

    /// Local up: the direction from the center through `position`.
    pub fn up_at(&self, position: Vec3) -> Vec3 {
        let to_position = position - self.center;
        if to_position.length_squared() > MIN_RADIAL_DISTANCE * MIN_RADIAL_DISTANCE {
            to_position.normalize()
        } else {
            WORLD_UP
        }
    }

    pub fn down_at(&self, position: Vec3) -> Vec3 {
        -self.up_at(position)
    }

    pub fn acceleration_at(&self, position: Vec3) -> Vec3 {
        self.down_at(position) * self.strength
    }

    /// Distance of `position` above a sphere of `radius` around the center.
    pub fn height_above(&self, position: Vec3, radius: f32) -> f32 {
        (position - self.center).length() - radius
    }
}

/// Orientation whose up axis is `up` and whose heading is `yaw` radians about it.
///
/// The shortest-arc rotation from world up is taken first, then the yaw is applied
/// about the local up. The result is discontinuous only at the antipode of world up.
pub fn surface_orientation(up: Vec3, yaw: f32) -> Quat {
    let align = Quat::from_rotation_arc(WORLD_UP, up);
    (Quat::from_axis_angle(up, yaw) * align).normalize()
}
