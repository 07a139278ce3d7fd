//! Procedural planet terrain: seeded noise octaves displacing a tessellated sphere.

pub mod error;
pub mod noise_field;
pub mod palette;
pub mod planet;
pub mod sphere;
pub mod terrain;

pub use error::*;
pub use noise_field::*;
pub use palette::*;
pub use planet::*;
pub use sphere::*;
pub use terrain::*;
