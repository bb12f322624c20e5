//! shift-export library
//!
//! Converts COLLADA and OBJ scenes into mesh, skin and morph artifacts:
//! a textual header plus a packed little-endian data buffer each.

pub mod collada;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod manifest;
pub mod mesh;
pub mod morph;
pub mod obj;
pub mod report;
pub mod sink;
pub mod skin;

// Re-export artifact naming and header types from assembly-common
pub use assembly_common::{ARTIFACT_FORMAT, ArtifactKind, IndexWidth};

// Re-export key types for conversion
pub use collada::{DaeOptions, convert_collada, convert_collada_to_memory, parse_collada};
pub use formats::{Artifact, encode_mesh, encode_morph, encode_skin};
pub use obj::{ObjOptions, convert_obj, convert_obj_to_memory, parse_obj};

// Re-export assembly types
pub use error::{AssemblyError, AssemblyResult};
pub use mesh::{AssembledMesh, MeshAssembler};
pub use morph::{MorphTarget, morph};
pub use skin::Skin;

pub use report::{CollectingReporter, Reporter, TracingReporter};
pub use sink::{DirectorySink, MemorySink, Sink};
