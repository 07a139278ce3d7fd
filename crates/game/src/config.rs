//! Simulation configuration (planet, terrain, locomotion). Loaded from planetwalk.ron at startup.

use procgen::{TerrainPalette, TerrainParams};
use serde::{Deserialize, Serialize};

/// Persistent simulation settings. Loaded from `planetwalk.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Base sphere radius before displacement.
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_segments")]
    pub width_segments: u32,
    #[serde(default = "default_segments")]
    pub height_segments: u32,
    #[serde(default)]
    pub terrain: TerrainParams,
    /// Height and slope coloring of the terrain.
    #[serde(default)]
    pub palette: TerrainPalette,
    /// Centerward acceleration in m/s² (constant with distance).
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_physics_substeps")]
    pub physics_substeps: u32,
    /// Longest frame delta fed to the integrator, in seconds.
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f32,
    /// Radius of the walking body's collision sphere.
    #[serde(default = "default_body_radius")]
    pub body_radius: f32,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_jump_speed")]
    pub jump_speed: f32,
    /// Radians of yaw per unit of mouse motion.
    #[serde(default = "default_yaw_sensitivity")]
    pub yaw_sensitivity: f32,
    /// Distance above the terrain hit that a spawned body is placed.
    #[serde(default = "default_spawn_margin")]
    pub spawn_margin: f32,
    /// Random spawns start this many radii from the center before the downward cast.
    #[serde(default = "default_spawn_distance_factor")]
    pub spawn_distance_factor: f32,
    #[serde(default)]
    pub restitution: f32,
    /// Per-second velocity damping while in contact.
    #[serde(default = "default_drag")]
    pub drag: f32,
    /// How long the headless binary runs, in seconds.
    #[serde(default = "default_run_seconds")]
    pub run_seconds: f32,
}

fn default_radius() -> f32 {
    5.0
}
fn default_segments() -> u32 {
    256
}
fn default_gravity() -> f32 {
    physics::DEFAULT_GRAVITY
}
fn default_physics_substeps() -> u32 {
    physics::DEFAULT_SUBSTEPS
}
fn default_max_frame_delta() -> f32 {
    engine_core::DEFAULT_MAX_FRAME_DELTA
}
fn default_body_radius() -> f32 {
    0.25
}
fn default_move_speed() -> f32 {
    2.0
}
fn default_jump_speed() -> f32 {
    4.0
}
fn default_yaw_sensitivity() -> f32 {
    0.002
}
fn default_spawn_margin() -> f32 {
    0.5
}
fn default_spawn_distance_factor() -> f32 {
    2.0
}
fn default_drag() -> f32 {
    1.0
}
fn default_run_seconds() -> f32 {
    5.0
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            width_segments: default_segments(),
            height_segments: default_segments(),
            terrain: TerrainParams::default(),
            palette: TerrainPalette::default(),
            gravity: default_gravity(),
            physics_substeps: default_physics_substeps(),
            max_frame_delta: default_max_frame_delta(),
            body_radius: default_body_radius(),
            move_speed: default_move_speed(),
            jump_speed: default_jump_speed(),
            yaw_sensitivity: default_yaw_sensitivity(),
            spawn_margin: default_spawn_margin(),
            spawn_distance_factor: default_spawn_distance_factor(),
            restitution: 0.0,
            drag: default_drag(),
            run_seconds: default_run_seconds(),
        }
    }
}

impl SimConfig {
    /// Load config from `planetwalk.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::from_ron(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `planetwalk.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }
}

/// Where `load` and `save` look for the config file.
pub fn config_path() -> std::path::PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("planetwalk.ron")
}
