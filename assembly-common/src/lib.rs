//! Shared artifact formats for the assembly mesh pipeline
//!
//! This crate provides the runtime-format pieces shared between:
//! - `shift-export` (asset pipeline, writes artifacts)
//! - runtime loaders (read the header, then slice the data buffer)
//!
//! # Modules
//!
//! - [`formats`] - Index width policy, exact-size data buffer and the
//!   textual headers of the mesh, skin and morph artifacts
//! - [`artifact`] - Artifact kinds and file naming

pub mod artifact;
pub mod formats;

pub use artifact::{ARTIFACT_FORMAT, ArtifactFormat, ArtifactKind};

pub use formats::{
    // Headers
    AttributeDecl,
    FormatError,
    GroupDecl,
    HeaderText,
    MeshHeader,
    MorphHeader,
    SkinHeader,
    // Data layout
    ArtifactBuffer,
    IndexWidth,
    FLOAT_SIZE,
    MATRIX_FLOATS,
};
