/// Structurally invalid input, rejected before any triangulation work starts.
///
/// Bad geometry (self-intersections, duplicate points, holes outside the outer ring, ...) is
/// never an error; it only degrades the output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("vertex dimension must be at least 2, got {dim}")]
    InvalidDimension { dim: usize },

    #[error("hole index {index} is out of bounds for {len} vertices")]
    HoleIndexOutOfBounds { index: usize, len: usize },

    #[error(
        "hole index {index} at position {position} precedes the previous ring start {previous}"
    )]
    UnorderedHoleIndices {
        position: usize,
        index: usize,
        previous: usize,
    },

    #[error("{len} vertices exceed the largest representable vertex index {max}")]
    TooManyVertices { len: usize, max: usize },
}
