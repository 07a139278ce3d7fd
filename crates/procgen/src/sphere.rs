//! Latitude/longitude base sphere tessellation.
//!
//! Seam and pole vertices are duplicated so each one carries its own UV. Each vertex
//! also records the first vertex at the same location (`canonical`) so normal
//! accumulation can weld the duplicates and avoid a shading seam.

use glam::{DVec3, Vec2, Vec3};

use crate::error::TerrainError;

/// Unit-sphere tessellation shared by every generation of a planet.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    width_segments: u32,
    height_segments: u32,
    /// Unit direction from the planet origin, one per vertex.
    pub(crate) directions: Vec<Vec3>,
    pub(crate) uvs: Vec<Vec2>,
    pub(crate) indices: Vec<u32>,
    pub(crate) canonical: Vec<u32>,
}

impl SphereMesh {
    /// Build a sphere with `width_segments` columns and `height_segments` rows.
    pub fn uv_sphere(width_segments: u32, height_segments: u32) -> Result<Self, TerrainError> {
        if width_segments < 3 || height_segments < 2 {
            return Err(TerrainError::InvalidSegments {
                width: width_segments,
                height: height_segments,
            });
        }

        let columns = width_segments as usize + 1;
        let rows = height_segments as usize + 1;
        let vertex_count = columns * rows;
        let mut directions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut canonical = Vec::with_capacity(vertex_count);

        for iy in 0..rows {
            let v = iy as f64 / height_segments as f64;
            let is_pole = iy == 0 || iy == rows - 1;
            // Pole UVs sit at the middle of their column.
            let u_offset = if iy == 0 {
                0.5 / width_segments as f64
            } else if iy == rows - 1 {
                -0.5 / width_segments as f64
            } else {
                0.0
            };
            let row_start = (iy * columns) as u32;

            for ix in 0..columns {
                let u = ix as f64 / width_segments as f64;
                let theta = v * std::f64::consts::PI;
                let phi = u * std::f64::consts::TAU;
                let dir = DVec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin())
                    .normalize();

                directions.push(dir.as_vec3());
                uvs.push(Vec2::new((u + u_offset) as f32, (1.0 - v) as f32));
                canonical.push(if is_pole || ix == columns - 1 {
                    row_start
                } else {
                    row_start + ix as u32
                });
            }
        }

        let mut indices = Vec::with_capacity(width_segments as usize * height_segments as usize * 6);
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = (iy * columns + ix + 1) as u32;
                let b = (iy * columns + ix) as u32;
                let c = ((iy + 1) * columns + ix) as u32;
                let d = ((iy + 1) * columns + ix + 1) as u32;

                // The half of a pole quad that would collapse to a point is skipped.
                if iy != 0 {
                    indices.extend([a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    indices.extend([b, c, d]);
                }
            }
        }

        Ok(Self {
            width_segments,
            height_segments,
            directions,
            uvs,
            indices,
            canonical,
        })
    }

    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    pub fn height_segments(&self) -> u32 {
        self.height_segments
    }

    pub fn vertex_count(&self) -> usize {
        self.directions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// First vertex sharing this vertex's location.
    pub fn canonical(&self) -> &[u32] {
        &self.canonical
    }
}
