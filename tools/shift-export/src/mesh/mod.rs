//! Mesh assembly core
//!
//! - [`vertex_set`] - vertex key welding into a dense index space
//! - [`triangulate`] - polygon fan triangulation
//! - [`attributes`] - attribute sources and dense columns
//! - [`assembler`] - the per-mesh assembly session

pub mod assembler;
pub mod attributes;
pub mod triangulate;
pub mod vertex_set;

pub use assembler::{AssembledMesh, MeshAssembler, TriangleGroup};
pub use attributes::{Attribute, AttributeSource, NORMAL, POSITION, TEXTURE};
pub use triangulate::triangulate;
pub use vertex_set::{VertexIndexSet, VertexKey};
