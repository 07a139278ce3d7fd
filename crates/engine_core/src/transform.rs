//! Body transform exposed to the renderer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Canonical "world up" axis that surface orientation rotates onto the radial direction.
pub const WORLD_UP: Vec3 = Vec3::Y;
/// Canonical forward axis (negative Z in right-handed coordinates).
pub const WORLD_FORWARD: Vec3 = Vec3::NEG_Z;
/// Canonical right axis.
pub const WORLD_RIGHT: Vec3 = Vec3::X;

/// Position and orientation of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Local forward direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation * WORLD_FORWARD
    }

    /// Local right direction.
    pub fn right(&self) -> Vec3 {
        self.rotation * WORLD_RIGHT
    }

    /// Local up direction.
    pub fn up(&self) -> Vec3 {
        self.rotation * WORLD_UP
    }
}

/// Raw transform data for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform> for TransformRaw {
    fn from(transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

impl From<Transform> for TransformRaw {
    fn from(transform: Transform) -> Self {
        Self::from(&transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_axes_are_canonical() {
        let t = Transform::default();
        assert_eq!(t.up(), WORLD_UP);
        assert_eq!(t.forward(), WORLD_FORWARD);
        assert_eq!(t.right(), WORLD_RIGHT);
    }

    #[test]
    fn raw_matrix_carries_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let raw = TransformRaw::from(t);
        assert_eq!(raw.model[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
