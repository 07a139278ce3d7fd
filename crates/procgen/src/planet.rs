//! Planet geometry and the parameters that produced it.
//!
//! A [`Planet`] is read-only outside this crate. Only [`crate::TerrainGenerator`]
//! mutates its buffers; the renderer and collision builder receive `&Planet`.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::noise_field::Octave;
use crate::palette::TerrainPalette;
use crate::sphere::SphereMesh;

/// Noise parameters for terrain generation. Radius is passed separately; changing
/// it alone rescales instead of regenerating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Base seed every octave is derived from.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of weighted noise layers.
    #[serde(default = "default_octave_count")]
    pub octave_count: u32,
    /// Exponent controlling how quickly octave weights fall off with index.
    #[serde(default = "default_falloff")]
    pub falloff: f32,
    /// Maximum displacement as a fraction of the radius. Clamped to [0, 1].
    #[serde(default = "default_height_scale")]
    pub height_scale: f32,
    /// Multiplier on base-sphere positions before sampling (lower = broader features).
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
}

fn default_seed() -> u64 {
    42
}
fn default_octave_count() -> u32 {
    6
}
fn default_falloff() -> f32 {
    1.5
}
fn default_height_scale() -> f32 {
    0.1
}
fn default_noise_scale() -> f32 {
    0.4
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            octave_count: default_octave_count(),
            falloff: default_falloff(),
            height_scale: default_height_scale(),
            noise_scale: default_noise_scale(),
        }
    }
}

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// xyz tangent, w handedness of the bitangent.
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Buffers changed since the renderer last uploaded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirtyBuffers {
    pub positions: bool,
    pub normals: bool,
    pub tangents: bool,
    pub colors: bool,
}

impl DirtyBuffers {
    pub const ALL: Self = Self {
        positions: true,
        normals: true,
        tangents: true,
        colors: true,
    };

    pub fn any(&self) -> bool {
        self.positions || self.normals || self.tangents || self.colors
    }
}

/// A displaced sphere.
#[derive(Debug, Clone)]
pub struct Planet {
    pub(crate) radius: f32,
    pub(crate) params: TerrainParams,
    pub(crate) octaves: Vec<Octave>,
    /// Seed the current octave list was derived from.
    pub(crate) octave_seed: u64,
    pub(crate) sphere: SphereMesh,
    pub(crate) positions: Vec<Vec3>,
    /// Signed radial offset of each vertex from the base sphere.
    pub(crate) displacements: Vec<f32>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) tangents: Vec<Vec4>,
    pub(crate) colors: Vec<[f32; 4]>,
    pub(crate) palette: TerrainPalette,
    pub(crate) dirty: DirtyBuffers,
}

impl Planet {
    /// Local origin of the planet. Geometry is always generated around it.
    pub const CENTER: Vec3 = Vec3::ZERO;

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Current parameters (height scale already clamped).
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    pub fn sphere(&self) -> &SphereMesh {
        &self.sphere
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn displacements(&self) -> &[f32] {
        &self.displacements
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn tangents(&self) -> &[Vec4] {
        &self.tangents
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.sphere.uvs
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    pub fn indices(&self) -> &[u32] {
        &self.sphere.indices
    }

    pub fn palette(&self) -> &TerrainPalette {
        &self.palette
    }

    pub fn dirty(&self) -> DirtyBuffers {
        self.dirty
    }

    /// Lowest and highest displacement on the mesh.
    pub fn displacement_range(&self) -> (f32, f32) {
        self.displacements
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &d| (lo.min(d), hi.max(d)))
    }

    /// Interleaved vertices for upload.
    pub fn vertices(&self) -> Vec<TerrainVertex> {
        (0..self.positions.len())
            .map(|i| TerrainVertex {
                position: self.positions[i].to_array(),
                normal: self.normals[i].to_array(),
                tangent: self.tangents[i].to_array(),
                uv: self.sphere.uvs[i].to_array(),
                color: self.colors[i],
            })
            .collect()
    }
}
