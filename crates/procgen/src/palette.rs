//! Cosmetic per-vertex coloring by height and slope.

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Four-color ramp: flat ground blends low→high, steep ground blends low→high,
/// and steepness blends flat→steep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainPalette {
    pub flat_low: [f32; 4],
    pub flat_high: [f32; 4],
    pub steep_low: [f32; 4],
    pub steep_high: [f32; 4],
    /// Steepness (`1 - dot(normal, up)`) where the steep colors start to show.
    pub steep_start: f32,
    /// Steepness at which the steep colors fully replace the flat ones.
    pub steep_end: f32,
}

impl Default for TerrainPalette {
    fn default() -> Self {
        Self {
            flat_low: [0.259, 0.643, 0.149, 1.0],
            flat_high: [0.55, 0.76, 0.36, 1.0],
            steep_low: [0.416, 0.322, 0.714, 1.0],
            steep_high: [0.86, 0.86, 0.92, 1.0],
            steep_start: 0.02,
            steep_end: 0.12,
        }
    }
}

impl TerrainPalette {
    /// Color for a vertex with normalised height `height_t` in `[0, 1]` and
    /// steepness `1 - dot(normal, dir)`.
    pub fn color(&self, height_t: f32, steepness: f32) -> [f32; 4] {
        let h = height_t.clamp(0.0, 1.0);
        let flat = Vec4::from(self.flat_low).lerp(Vec4::from(self.flat_high), h);
        let steep = Vec4::from(self.steep_low).lerp(Vec4::from(self.steep_high), h);
        let s = smoothstep(self.steep_start, self.steep_end, steepness);
        flat.lerp(steep, s).to_array()
    }
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
