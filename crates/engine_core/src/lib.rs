//! Core types shared by the planet walker crates.
//!
//! - Transform exposed to the renderer each tick
//! - Frame clock with frame-delta clamping

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{DVec3, Mat4, Quat, Vec2, Vec3, Vec4};
