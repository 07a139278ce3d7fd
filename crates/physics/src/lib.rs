//! Collision and motion for a sphere walking on a radially-displaced planet.

pub mod body;
pub mod collision;
pub mod error;
pub mod gravity;
pub mod raycast;

pub use body::*;
pub use collision::*;
pub use error::*;
pub use gravity::*;
pub use raycast::*;
