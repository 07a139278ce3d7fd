//! Spawn placement above the terrain.

use engine_core::Vec3;
use physics::CollisionSurface;
use rand::Rng;
use std::f32::consts::TAU;

/// Drop `point` onto the terrain along the line to the planet center and lift it
/// `margin` out along the radial direction of the hit.
///
/// A point inside the planet lands on the far hemisphere. Falls back to `point`
/// unchanged when the ray misses or `point` is the center.
pub fn spawn_point(surface: &CollisionSurface, point: Vec3, margin: f32) -> Vec3 {
    let Some(outward) = (point - surface.center()).try_normalize() else {
        log::warn!("Spawn point {:?} is the planet center, not moving it", point);
        return point;
    };

    match surface.raycast(point, -outward) {
        Some(hit) => {
            let up = (hit.point - surface.center())
                .try_normalize()
                .unwrap_or(outward);
            hit.point + up * margin
        }
        None => {
            log::warn!("Spawn ray from {:?} missed the terrain, using it as is", point);
            point
        }
    }
}

/// Uniformly distributed unit vector.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let ring = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(ring * theta.cos(), ring * theta.sin(), z)
}
