//! Ray queries against the terrain surface, used for spawn placement.

use crate::CollisionSurface;
use engine_core::Vec3;
use rapier3d::parry::query::RayCast;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Distance along the (normalized) ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl CollisionSurface {
    /// Cast a ray and return the first terrain hit, at any distance.
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<RaycastHit> {
        self.raycast_within(origin, direction, Real::MAX)
    }

    /// Cast a ray and return the first terrain hit within `max_distance`.
    ///
    /// Returns `None` for a zero-length direction.
    pub fn raycast_within(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.mesh
            .cast_local_ray_and_get_normal(&ray, max_distance, true)
            .map(|intersection| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }
}
