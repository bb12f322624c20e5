//! Assembly artifact formats
//!
//! Every artifact is a pair of a small human-readable header and a tightly
//! packed little-endian data buffer. The header declares everything needed to
//! slice the buffer: element counts, attribute sizes and index widths.
//! There is no padding anywhere in the data buffer.
//!
//! All headers implement the [`HeaderText`] trait for consistent
//! rendering/parsing.

mod buffer;
mod header;
mod index_width;
pub mod mesh;
pub mod morph;
pub mod skin;

pub use buffer::ArtifactBuffer;
pub use header::{AttributeDecl, FormatError, HeaderText, FLOAT_TYPE};
pub use index_width::IndexWidth;
pub use mesh::{GroupDecl, MeshHeader};
pub use morph::MorphHeader;
pub use skin::SkinHeader;

/// Size of one attribute component in bytes (f32)
pub const FLOAT_SIZE: usize = 4;

/// Number of floats in a 4×4 matrix
pub const MATRIX_FLOATS: usize = 16;
