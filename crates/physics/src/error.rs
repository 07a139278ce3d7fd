use thiserror::Error;

/// Reasons a collision surface could not be built. The previous surface stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("terrain mesh has no triangles")]
    EmptyMesh,

    #[error("index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
