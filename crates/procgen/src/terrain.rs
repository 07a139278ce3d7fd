//! Terrain generation: displaces a base sphere with weighted noise octaves.
//!
//! **Seed-based determinism:** all noise is derived from `TerrainParams::seed`, so
//! the same parameters always produce bit-identical vertex buffers.
//!
//! Displacement is always evaluated from the undisplaced base sphere, never from the
//! previous result, so repeated regeneration with different parameters cannot
//! accumulate error. Radius-only changes rescale the existing geometry instead of
//! resampling noise.

use glam::{DVec3, Vec3, Vec4};

use crate::error::TerrainError;
use crate::noise_field::{octave_weight, Octave};
use crate::palette::TerrainPalette;
use crate::planet::{DirtyBuffers, Planet, TerrainParams};
use crate::sphere::SphereMesh;

/// What [`TerrainGenerator::apply`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationChange {
    Unchanged,
    /// Only the radius changed; geometry was scaled in place.
    Rescaled,
    /// Noise parameters changed; geometry was displaced again.
    Regenerated,
}

impl GenerationChange {
    /// True when dependent structures (collision surface) must be rebuilt.
    pub fn geometry_changed(self) -> bool {
        self != GenerationChange::Unchanged
    }
}

/// Sole writer of [`Planet`] geometry.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    planet: Planet,
}

impl TerrainGenerator {
    /// Tessellate a sphere and displace it with `params`.
    pub fn new(
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        params: TerrainParams,
    ) -> Result<Self, TerrainError> {
        validate_radius(radius)?;
        let params = validate_params(params)?;
        let sphere = SphereMesh::uv_sphere(width_segments, height_segments)?;
        let vertex_count = sphere.vertex_count();

        let planet = Planet {
            radius,
            params,
            octaves: Vec::new(),
            octave_seed: params.seed,
            positions: sphere.directions.iter().map(|&d| d * radius).collect(),
            displacements: vec![0.0; vertex_count],
            normals: sphere.directions.clone(),
            tangents: vec![Vec4::ZERO; vertex_count],
            colors: vec![[1.0; 4]; vertex_count],
            palette: TerrainPalette::default(),
            dirty: DirtyBuffers::ALL,
            sphere,
        };

        let mut generator = Self { planet };
        generator.regenerate_octaves(params.octave_count, params.seed);
        generator.displace();
        log::info!(
            "Generated planet: radius {}, {} vertices, {} triangles, {} octaves",
            radius,
            vertex_count,
            generator.planet.sphere.triangle_count(),
            params.octave_count
        );
        Ok(generator)
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    /// Truncate or extend the octave list to `count` entries.
    ///
    /// Existing entries are kept in order; appended ones are derived from
    /// `base_seed` and their index. A different seed re-derives every entry.
    /// Weights are recomputed for the new count. Does not displace.
    pub fn regenerate_octaves(&mut self, count: u32, base_seed: u64) {
        let planet = &mut self.planet;
        if planet.octave_seed != base_seed {
            planet.octaves.clear();
            planet.octave_seed = base_seed;
        }

        let count = count as usize;
        planet.octaves.truncate(count);
        let existing = planet.octaves.len();
        planet
            .octaves
            .extend((existing..count).map(|index| Octave::derive(base_seed, index)));

        planet.params.seed = base_seed;
        planet.params.octave_count = count as u32;
        self.reweight_octaves();
    }

    fn reweight_octaves(&mut self) {
        let count = self.planet.octaves.len();
        let falloff = self.planet.params.falloff;
        for (index, octave) in self.planet.octaves.iter_mut().enumerate() {
            octave.weight = octave_weight(index, count, falloff);
        }
    }

    /// Signed radial offset for a unit direction at the current radius and parameters.
    pub fn sample_displacement(&self, direction: Vec3) -> f32 {
        let planet = &self.planet;
        let base = direction.normalize_or_zero().as_dvec3() * planet.radius as f64;
        displacement_at(
            &planet.octaves,
            base * planet.params.noise_scale as f64,
            planet.params.height_scale,
            planet.radius,
        )
    }

    /// Re-displace every vertex from the base sphere and rebuild derived buffers.
    pub fn displace(&mut self) {
        let planet = &mut self.planet;
        let radius = planet.radius;
        let noise_scale = planet.params.noise_scale as f64;
        let height_scale = planet.params.height_scale;

        for (i, &dir) in planet.sphere.directions.iter().enumerate() {
            let base: DVec3 = dir.as_dvec3() * radius as f64;
            let displacement =
                displacement_at(&planet.octaves, base * noise_scale, height_scale, radius);
            planet.displacements[i] = displacement;
            planet.positions[i] = dir * (radius + displacement);
        }

        self.recompute_normals();
        self.recompute_tangents();
        self.recolor();
        self.planet.dirty = DirtyBuffers::ALL;

        let (lo, hi) = self.planet.displacement_range();
        log::debug!(
            "Displaced {} vertices (seed {}, {} octaves): offset range [{:.4}, {:.4}]",
            self.planet.positions.len(),
            self.planet.params.seed,
            self.planet.octaves.len(),
            lo,
            hi
        );
    }

    /// Scale every vertex's distance from the center by `new_radius / radius`
    /// without resampling noise.
    pub fn rescale(&mut self, new_radius: f32) -> Result<(), TerrainError> {
        if let Err(err) = validate_radius(new_radius) {
            log::warn!("Rejected rescale: {}", err);
            return Err(err);
        }
        let planet = &mut self.planet;
        let factor = new_radius / planet.radius;
        for (position, displacement) in planet.positions.iter_mut().zip(planet.displacements.iter_mut()) {
            *position *= factor;
            *displacement *= factor;
        }
        planet.radius = new_radius;
        // Uniform scale leaves normals, tangents and normalised heights unchanged.
        planet.dirty.positions = true;
        log::debug!("Rescaled planet by {:.4} to radius {}", factor, new_radius);
        Ok(())
    }

    pub fn set_seed(&mut self, seed: u64) {
        let count = self.planet.params.octave_count;
        self.regenerate_octaves(count, seed);
        self.displace();
    }

    pub fn set_octave_count(&mut self, count: u32) {
        let seed = self.planet.params.seed;
        self.regenerate_octaves(count, seed);
        self.displace();
    }

    pub fn set_falloff(&mut self, falloff: f32) -> Result<(), TerrainError> {
        validate_falloff(falloff)?;
        self.planet.params.falloff = falloff;
        self.reweight_octaves();
        self.displace();
        Ok(())
    }

    /// Out-of-range values are clamped to [0, 1]; non-finite ones are rejected.
    pub fn set_height_scale(&mut self, height_scale: f32) -> Result<(), TerrainError> {
        self.planet.params.height_scale = clamp_height_scale(height_scale)?;
        self.displace();
        Ok(())
    }

    pub fn set_noise_scale(&mut self, noise_scale: f32) -> Result<(), TerrainError> {
        validate_noise_scale(noise_scale)?;
        self.planet.params.noise_scale = noise_scale;
        self.displace();
        Ok(())
    }

    /// Route a parameter change to a full regeneration or a cheap rescale.
    ///
    /// All inputs are validated before anything is touched.
    pub fn apply(&mut self, params: TerrainParams, radius: f32) -> Result<GenerationChange, TerrainError> {
        validate_radius(radius)?;
        let params = validate_params(params)?;
        let current = self.planet.params;
        let radius_changed = radius != self.planet.radius;

        if params != current {
            self.planet.params = params;
            self.planet.radius = radius;
            self.regenerate_octaves(params.octave_count, params.seed);
            self.displace();
            Ok(GenerationChange::Regenerated)
        } else if radius_changed {
            self.rescale(radius)?;
            Ok(GenerationChange::Rescaled)
        } else {
            Ok(GenerationChange::Unchanged)
        }
    }

    /// Assign per-vertex colors from `palette` by height above the base sphere and
    /// steepness. Purely cosmetic.
    pub fn color_by_height_and_slope(&mut self, palette: TerrainPalette) {
        self.planet.palette = palette;
        self.recolor();
        self.planet.dirty.colors = true;
    }

    /// Report and clear the dirty buffer flags.
    pub fn take_dirty(&mut self) -> DirtyBuffers {
        std::mem::take(&mut self.planet.dirty)
    }

    /// Area-weighted vertex normals. Seam and pole duplicates share one accumulator.
    fn recompute_normals(&mut self) {
        let planet = &mut self.planet;
        let canonical = &planet.sphere.canonical;
        let positions = &planet.positions;
        let mut accum = vec![Vec3::ZERO; positions.len()];

        for tri in planet.sphere.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);
            let mut face = (p1 - p0).cross(p2 - p0);
            // Radial displacement keeps the surface star-shaped about the center.
            if face.dot(p0 + p1 + p2) < 0.0 {
                face = -face;
            }
            for i in [i0, i1, i2] {
                accum[canonical[i] as usize] += face;
            }
        }

        for (i, normal) in planet.normals.iter_mut().enumerate() {
            let fallback = planet.sphere.directions[i];
            *normal = accum[canonical[i] as usize].try_normalize().unwrap_or(fallback);
        }
    }

    /// Per-vertex tangents from UV gradients, orthogonalised against the normal.
    fn recompute_tangents(&mut self) {
        let planet = &mut self.planet;
        let positions = &planet.positions;
        let uvs = &planet.sphere.uvs;
        let mut tan_u = vec![Vec3::ZERO; positions.len()];
        let mut tan_v = vec![Vec3::ZERO; positions.len()];

        for tri in planet.sphere.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let e1 = positions[i1] - positions[i0];
            let e2 = positions[i2] - positions[i0];
            let d1 = uvs[i1] - uvs[i0];
            let d2 = uvs[i2] - uvs[i0];
            let det = d1.x * d2.y - d2.x * d1.y;
            if det.abs() < 1e-12 {
                continue;
            }
            let r = 1.0 / det;
            let sdir = (e1 * d2.y - e2 * d1.y) * r;
            let tdir = (e2 * d1.x - e1 * d2.x) * r;
            for i in [i0, i1, i2] {
                tan_u[i] += sdir;
                tan_v[i] += tdir;
            }
        }

        for (i, tangent) in planet.tangents.iter_mut().enumerate() {
            let n = planet.normals[i];
            let t = (tan_u[i] - n * n.dot(tan_u[i]))
                .try_normalize()
                .unwrap_or_else(|| n.any_orthonormal_vector());
            let w = if n.cross(t).dot(tan_v[i]) < 0.0 { -1.0 } else { 1.0 };
            *tangent = t.extend(w);
        }
    }

    fn recolor(&mut self) {
        let planet = &mut self.planet;
        let (lo, hi) = planet.displacement_range();
        let span = hi - lo;
        for i in 0..planet.colors.len() {
            let height_t = if span > f32::EPSILON {
                (planet.displacements[i] - lo) / span
            } else {
                0.0
            };
            let steepness = 1.0 - planet.normals[i].dot(planet.sphere.directions[i]);
            planet.colors[i] = planet.palette.color(height_t, steepness);
        }
    }
}

/// `Σ weight * noise(position)` scaled to a signed radial offset.
fn displacement_at(octaves: &[Octave], sample_position: DVec3, height_scale: f32, radius: f32) -> f32 {
    let sample: f64 = octaves
        .iter()
        .map(|octave| octave.weight as f64 * octave.sample(sample_position))
        .sum();
    (sample * height_scale as f64 * radius as f64) as f32
}

fn validate_radius(radius: f32) -> Result<(), TerrainError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidRadius(radius))
    }
}

fn validate_falloff(falloff: f32) -> Result<(), TerrainError> {
    if falloff.is_finite() && falloff >= 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidParameter {
            name: "falloff",
            value: falloff,
        })
    }
}

fn validate_noise_scale(noise_scale: f32) -> Result<(), TerrainError> {
    if noise_scale.is_finite() && noise_scale >= 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidParameter {
            name: "noise_scale",
            value: noise_scale,
        })
    }
}

fn clamp_height_scale(height_scale: f32) -> Result<f32, TerrainError> {
    if height_scale.is_finite() {
        Ok(height_scale.clamp(0.0, 1.0))
    } else {
        Err(TerrainError::InvalidParameter {
            name: "height_scale",
            value: height_scale,
        })
    }
}

/// Validate and normalise parameters (height scale clamped).
fn validate_params(mut params: TerrainParams) -> Result<TerrainParams, TerrainError> {
    validate_falloff(params.falloff)?;
    validate_noise_scale(params.noise_scale)?;
    params.height_scale = clamp_height_scale(params.height_scale)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64, octave_count: u32) -> TerrainParams {
        TerrainParams {
            seed,
            octave_count,
            falloff: 1.5,
            height_scale: 0.2,
            noise_scale: 0.5,
        }
    }

    fn generator(seed: u64, octave_count: u32) -> TerrainGenerator {
        TerrainGenerator::new(5.0, 24, 12, params(seed, octave_count)).unwrap()
    }

    /// Same parameters must produce identical vertex buffers (replayability).
    #[test]
    fn displace_deterministic_same_params() {
        for &(seed, count) in &[(0_u64, 0_u32), (98765, 1), (98765, 6), (u64::MAX, 9)] {
            let a = generator(seed, count);
            let b = generator(seed, count);
            assert_eq!(a.planet().positions(), b.planet().positions(), "seed {seed}");
        }
    }

    #[test]
    fn different_seed_different_terrain() {
        let a = generator(11111, 4);
        let b = generator(22222, 4);
        assert_ne!(a.planet().positions(), b.planet().positions());
    }

    #[test]
    fn repeated_displace_does_not_compound() {
        let mut g = generator(5, 4);
        let first = g.planet().positions().to_vec();
        g.displace();
        g.displace();
        assert_eq!(g.planet().positions(), first.as_slice());
    }

    #[test]
    fn zero_octaves_is_base_sphere() {
        let g = generator(77, 0);
        for p in g.planet().positions() {
            assert!((p.length() - 5.0).abs() < 1e-4);
        }
        assert!(g.planet().displacements().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn vertices_sit_at_radius_plus_sampled_displacement() {
        let g = generator(31337, 5);
        let planet = g.planet();
        for (i, (p, dir)) in planet.positions().iter().zip(planet.sphere().directions()).enumerate() {
            let expected = planet.radius() + g.sample_displacement(*dir);
            assert!((p.length() - expected).abs() < 1e-3, "vertex {i}: {} vs {}", p.length(), expected);
            assert!(p.normalize().distance(*dir) < 1e-4);
        }
    }

    #[test]
    fn height_scale_is_clamped() {
        let g = TerrainGenerator::new(5.0, 8, 4, TerrainParams { height_scale: 7.5, ..params(1, 3) }).unwrap();
        assert_eq!(g.planet().params().height_scale, 1.0);

        let mut g = generator(1, 3);
        g.set_height_scale(-2.0).unwrap();
        assert_eq!(g.planet().params().height_scale, 0.0);
        assert!(g.planet().positions().iter().all(|p| (p.length() - 5.0).abs() < 1e-4));

        assert!(g.set_height_scale(f32::NAN).is_err());
        assert_eq!(g.planet().params().height_scale, 0.0);
    }

    #[test]
    fn rescale_composes_linearly() {
        let original = generator(2024, 6);
        let r0 = original.planet().radius();

        let mut twice = original.clone();
        twice.rescale(8.0).unwrap();
        twice.rescale(3.0).unwrap();

        let mut once = original.clone();
        once.rescale(3.0).unwrap();

        for ((a, b), p0) in twice
            .planet()
            .positions()
            .iter()
            .zip(once.planet().positions())
            .zip(original.planet().positions())
        {
            assert!(a.distance(*b) < 1e-4);
            assert!(a.distance(*p0 * (3.0 / r0)) < 1e-4);
        }
        assert_eq!(twice.planet().radius(), 3.0);
    }

    #[test]
    fn rescale_rejects_non_positive_radius() {
        let mut g = generator(3, 3);
        let before = g.planet().positions().to_vec();
        g.take_dirty();
        assert_eq!(g.rescale(0.0), Err(TerrainError::InvalidRadius(0.0)));
        assert!(g.rescale(-4.0).is_err());
        assert!(g.rescale(f32::INFINITY).is_err());
        assert_eq!(g.planet().positions(), before.as_slice());
        assert_eq!(g.planet().radius(), 5.0);
        assert!(!g.take_dirty().any());
    }

    #[test]
    fn extending_octaves_preserves_existing_entries() {
        let mut g = generator(900, 3);
        let before: Vec<_> = g.planet().octaves().iter().map(|o| (o.noise_seed, o.sample_offset)).collect();
        g.regenerate_octaves(7, 900);
        let after: Vec<_> = g.planet().octaves().iter().map(|o| (o.noise_seed, o.sample_offset)).collect();
        assert_eq!(after.len(), 7);
        assert_eq!(&after[..3], before.as_slice());

        g.regenerate_octaves(2, 900);
        assert_eq!(g.planet().octaves().len(), 2);
        assert_eq!(g.planet().octaves()[1].sample_offset, before[1].1);
    }

    #[test]
    fn octave_count_round_trip_reproduces_terrain() {
        let mut g = generator(64, 5);
        let original = g.planet().positions().to_vec();
        g.set_octave_count(2);
        g.set_octave_count(5);
        assert_eq!(g.planet().positions(), original.as_slice());
    }

    #[test]
    fn apply_routes_radius_only_changes_to_rescale() {
        let mut g = generator(10, 4);
        let p = *g.planet().params();
        assert_eq!(g.apply(p, 5.0).unwrap(), GenerationChange::Unchanged);
        assert_eq!(g.apply(p, 6.0).unwrap(), GenerationChange::Rescaled);
        assert_eq!(
            g.apply(TerrainParams { seed: 11, ..p }, 6.0).unwrap(),
            GenerationChange::Regenerated
        );
        assert_eq!(g.planet().radius(), 6.0);
        assert_eq!(g.planet().params().seed, 11);
    }

    #[test]
    fn apply_rejects_invalid_input_without_mutation() {
        let mut g = generator(10, 4);
        let before = g.planet().positions().to_vec();
        let p = *g.planet().params();
        assert!(g.apply(TerrainParams { seed: 99, ..p }, -1.0).is_err());
        assert!(g.apply(TerrainParams { falloff: -1.0, ..p }, 5.0).is_err());
        assert_eq!(g.planet().params().seed, 10);
        assert_eq!(g.planet().positions(), before.as_slice());
    }

    #[test]
    fn flat_sphere_normals_are_radial_and_tangents_orthogonal() {
        let g = TerrainGenerator::new(5.0, 32, 16, params(1, 0)).unwrap();
        let planet = g.planet();
        for i in 0..planet.positions().len() {
            let n = planet.normals()[i];
            let dir = planet.sphere().directions()[i];
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.dot(dir) > 0.99, "vertex {i}");
            let t = planet.tangents()[i];
            assert!(t.truncate().dot(n).abs() < 1e-3);
            assert!(t.w == 1.0 || t.w == -1.0);
        }
    }

    #[test]
    fn seam_duplicates_share_normals() {
        let g = generator(8, 4);
        let planet = g.planet();
        for (i, &canon) in planet.sphere().canonical().iter().enumerate() {
            assert_eq!(planet.normals()[i], planet.normals()[canon as usize]);
        }
    }

    #[test]
    fn coloring_marks_colors_dirty_and_uses_palette() {
        let mut g = generator(8, 0);
        g.take_dirty();
        let palette = TerrainPalette {
            flat_low: [1.0, 0.0, 0.0, 1.0],
            ..TerrainPalette::default()
        };
        g.color_by_height_and_slope(palette);
        let dirty = g.take_dirty();
        assert!(dirty.colors && !dirty.positions);
        // Equator of a flat sphere: low and shallow.
        let c = g.planet().colors()[6 * 25 + 5];
        assert!(c[0] > 0.9 && c[1] < 0.1);
    }

    #[test]
    fn packed_vertices_match_buffers() {
        let g = generator(8, 2);
        let vertices = g.planet().vertices();
        assert_eq!(vertices.len(), g.planet().positions().len());
        assert_eq!(vertices[10].position, g.planet().positions()[10].to_array());
        assert!(!bytemuck::cast_slice::<_, u8>(vertices.as_slice()).is_empty());
    }
}
