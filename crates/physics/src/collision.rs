//! Static collision surface built from the generated terrain.
//!
//! The surface wraps a parry triangle mesh, whose internal BVH answers the
//! nearest-point queries used for per-tick contact and the ray casts used for
//! spawn placement. It is immutable once built: regenerating terrain means
//! building a new surface and swapping it in.

use engine_core::Vec3;
use rapier3d::math::{Point, Real};
use rapier3d::parry::query::PointQuery;
use rapier3d::parry::shape::TriMesh;

use crate::error::SurfaceError;

/// Below this distance the sphere center is treated as lying on the surface.
const CONTACT_EPSILON: f32 = 1.0e-6;

/// Overlap between a body's collision sphere and the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Closest point on the terrain to the sphere center.
    pub point: Vec3,
    /// Unit direction to push the sphere out along.
    pub normal: Vec3,
    /// Distance the sphere must move along `normal` to stop overlapping.
    pub penetration_depth: f32,
}

/// Immutable spatial index over one generation of terrain triangles.
pub struct CollisionSurface {
    pub(crate) mesh: TriMesh,
    center: Vec3,
    triangle_count: usize,
}

impl std::fmt::Debug for CollisionSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionSurface")
            .field("center", &self.center)
            .field("triangle_count", &self.triangle_count)
            .finish()
    }
}

impl CollisionSurface {
    /// Index the triangles of `indices` over `positions`.
    ///
    /// `center` is the planet origin; it orients contact normals outward when a
    /// sphere center has already sunk beneath the surface.
    pub fn build(positions: &[Vec3], indices: &[u32], center: Vec3) -> Result<Self, SurfaceError> {
        if indices.is_empty() {
            return Err(SurfaceError::EmptyMesh);
        }
        if indices.len() % 3 != 0 {
            return Err(SurfaceError::RaggedIndices(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(SurfaceError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        let vertices: Vec<Point<Real>> = positions.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();
        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        let triangle_count = triangles.len();

        // Indices are validated above; parry asserts on out-of-range triangles.
        let mesh = TriMesh::new(vertices, triangles);

        log::debug!(
            "Built collision surface: {} vertices, {} triangles",
            positions.len(),
            triangle_count
        );
        Ok(Self {
            mesh,
            center,
            triangle_count,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Closest point on the terrain to `point`.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let projection = self
            .mesh
            .project_local_point(&Point::new(point.x, point.y, point.z), false);
        Vec3::new(projection.point.x, projection.point.y, projection.point.z)
    }

    /// Contact for a sphere at `sphere_center`, if the nearest terrain point lies
    /// closer than `sphere_radius`.
    pub fn query(&self, sphere_center: Vec3, sphere_radius: f32) -> Option<Contact> {
        let closest = self.closest_point(sphere_center);
        let delta = sphere_center - closest;
        let distance = delta.length();
        if distance >= sphere_radius {
            return None;
        }

        let outward = (closest - self.center).try_normalize().unwrap_or(Vec3::Y);
        let (normal, penetration_depth) = if distance <= CONTACT_EPSILON {
            (outward, sphere_radius - distance)
        } else if delta.dot(outward) < 0.0 {
            // Center is beneath the terrain: push through to the outside.
            (-delta / distance, sphere_radius + distance)
        } else {
            (delta / distance, sphere_radius - distance)
        };

        Some(Contact {
            point: closest,
            normal,
            penetration_depth,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Square of two triangles spanning [-half, half] in X and Z at height `y`, wound upward.
    pub(crate) fn plane(half: f32, y: f32) -> (Vec<Vec3>, Vec<u32>) {
        let positions = vec![
            Vec3::new(-half, y, -half),
            Vec3::new(half, y, -half),
            Vec3::new(half, y, half),
            Vec3::new(-half, y, half),
        ];
        (positions, vec![0, 2, 1, 0, 3, 2])
    }

    pub(crate) fn plane_surface() -> CollisionSurface {
        let (positions, indices) = plane(50.0, 0.0);
        CollisionSurface::build(&positions, &indices, Vec3::new(0.0, -1000.0, 0.0)).unwrap()
    }

    #[test]
    fn build_rejects_bad_buffers() {
        let (positions, indices) = plane(1.0, 0.0);
        assert_eq!(
            CollisionSurface::build(&positions, &[], Vec3::ZERO).unwrap_err(),
            SurfaceError::EmptyMesh
        );
        assert_eq!(
            CollisionSurface::build(&positions, &indices[..4], Vec3::ZERO).unwrap_err(),
            SurfaceError::RaggedIndices(4)
        );
        assert_eq!(
            CollisionSurface::build(&positions, &[0, 1, 9], Vec3::ZERO).unwrap_err(),
            SurfaceError::IndexOutOfRange {
                index: 9,
                vertex_count: 4
            }
        );
    }

    #[test]
    fn build_indexes_valid_mesh() {
        let (positions, indices) = plane(2.0, 1.0);
        let surface = CollisionSurface::build(&positions, &indices, Vec3::ZERO).unwrap();
        assert_eq!(surface.triangle_count(), 2);
        assert_eq!(surface.center(), Vec3::ZERO);
        assert!(surface.closest_point(Vec3::new(0.5, 4.0, -0.5)).distance(Vec3::new(0.5, 1.0, -0.5)) < 1e-5);
    }

    #[test]
    fn query_reports_penetration_above_plane() {
        let surface = plane_surface();
        let contact = surface.query(Vec3::new(1.0, 0.3, 2.0), 0.5).unwrap();
        assert!(contact.point.distance(Vec3::new(1.0, 0.0, 2.0)) < 1e-5);
        assert!(contact.normal.distance(Vec3::Y) < 1e-5);
        assert!((contact.penetration_depth - 0.2).abs() < 1e-5);
    }

    #[test]
    fn query_misses_when_out_of_reach() {
        let surface = plane_surface();
        assert!(surface.query(Vec3::new(0.0, 0.5, 0.0), 0.5).is_none());
        assert!(surface.query(Vec3::new(0.0, 3.0, 0.0), 0.5).is_none());
    }

    #[test]
    fn query_pushes_sunken_center_outward() {
        let surface = plane_surface();
        let contact = surface.query(Vec3::new(0.0, -0.1, 0.0), 0.5).unwrap();
        assert!(contact.normal.distance(Vec3::Y) < 1e-5);
        assert!((contact.penetration_depth - 0.6).abs() < 1e-5);
        let resolved = Vec3::new(0.0, -0.1, 0.0) + contact.normal * contact.penetration_depth;
        assert!((resolved.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn center_on_surface_uses_outward_direction() {
        let surface = plane_surface();
        let contact = surface.query(Vec3::new(3.0, 0.0, 3.0), 0.25).unwrap();
        let expected = (Vec3::new(3.0, 0.0, 3.0) - surface.center()).normalize();
        assert!(contact.normal.distance(expected) < 1e-5);
        assert!((contact.penetration_depth - 0.25).abs() < 1e-5);
    }
}
