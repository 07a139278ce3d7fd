//! Errors raised by terrain generation. Every rejected call leaves the planet untouched.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("planet radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("sphere needs at least 3 width and 2 height segments, got {width}x{height}")]
    InvalidSegments { width: u32, height: u32 },

    #[error("invalid terrain parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}
