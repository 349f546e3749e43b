//! Errors raised while building or importing geometry.
//!
//! The camera, projection and picking code never fails: degenerate input is
//! skipped or replaced by a default. Only the construction boundary reports
//! errors.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("vertex index {index} out of range (model has {len} vertices)")]
    VertexOutOfRange { index: usize, len: usize },
    #[error("face needs at least 3 vertices, got {0}")]
    FaceTooSmall(usize),
}

#[derive(Debug, Error)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooShort(usize),
    #[error("unexpected end of file in facet {0}")]
    UnexpectedEof(usize),
    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
