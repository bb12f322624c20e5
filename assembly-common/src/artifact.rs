//! Artifact kinds and file naming
//!
//! [`ArtifactFormat`] is the single source of truth for the extensions used
//! when artifacts are written to disk.
//!
//! # Example
//!
//! ```
//! use assembly_common::{ArtifactKind, ARTIFACT_FORMAT};
//!
//! assert_eq!(ArtifactKind::Mesh.qualify("cube"), "cube.mesh");
//! assert_eq!(ARTIFACT_FORMAT.header_file("cube.mesh"), "cube.mesh.xml");
//! assert_eq!(ARTIFACT_FORMAT.data_file("cube.mesh"), "cube.mesh.dat");
//! ```

use std::fmt;
use std::path::{Component, Path};

use crate::formats::FormatError;

/// Artifact file naming
#[derive(Debug, Clone, Copy)]
pub struct ArtifactFormat {
    /// Header file extension without dot
    pub header_ext: &'static str,

    /// Data file extension without dot
    pub data_ext: &'static str,

    /// Kind suffix of mesh artifacts
    pub mesh_ext: &'static str,

    /// Kind suffix of skin artifacts
    pub skin_ext: &'static str,

    /// Kind suffix of morph artifacts
    pub morph_ext: &'static str,
}

impl ArtifactFormat {
    pub const fn new(
        header_ext: &'static str,
        data_ext: &'static str,
        mesh_ext: &'static str,
        skin_ext: &'static str,
        morph_ext: &'static str,
    ) -> Self {
        Self {
            header_ext,
            data_ext,
            mesh_ext,
            skin_ext,
            morph_ext,
        }
    }

    /// File name of the header for a qualified artifact name (`N.kind`)
    pub fn header_file(&self, qualified: &str) -> String {
        format!("{}.{}", qualified, self.header_ext)
    }

    /// File name of the data buffer for a qualified artifact name (`N.kind`)
    pub fn data_file(&self, qualified: &str) -> String {
        format!("{}.{}", qualified, self.data_ext)
    }

    /// Check that a qualified name stays a plain file name once extended
    ///
    /// Names come from document ids and OBJ `o` statements; separators,
    /// `.`/`..` and root or prefix components are rejected.
    pub fn check_name(&self, qualified: &str) -> Result<(), FormatError> {
        let invalid = |reason| {
            Err(FormatError::InvalidName {
                name: qualified.to_string(),
                reason,
            })
        };
        if qualified.is_empty() {
            return invalid("is empty");
        }
        if qualified.contains(['/', '\\', '\0']) {
            return invalid("contains a path separator");
        }
        let mut components = Path::new(qualified).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => invalid("is not a plain file name"),
        }
    }
}

/// Artifact naming used by every sink
pub const ARTIFACT_FORMAT: ArtifactFormat = ArtifactFormat::new("xml", "dat", "mesh", "skin", "morph");

/// Kind of converted artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Mesh,
    Skin,
    Morph,
}

impl ArtifactKind {
    /// Kind suffix (`mesh`, `skin`, `morph`)
    pub const fn ext(self) -> &'static str {
        match self {
            ArtifactKind::Mesh => ARTIFACT_FORMAT.mesh_ext,
            ArtifactKind::Skin => ARTIFACT_FORMAT.skin_ext,
            ArtifactKind::Morph => ARTIFACT_FORMAT.morph_ext,
        }
    }

    /// Qualified artifact name handed to a sink: `N.kind`
    pub fn qualify(self, name: &str) -> String {
        format!("{}.{}", name, self.ext())
    }

    /// Kind of a qualified name or header file name, if it carries one
    pub fn detect(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_suffix(ARTIFACT_FORMAT.header_ext)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(file_name);
        let (_, ext) = stem.rsplit_once('.')?;
        [ArtifactKind::Mesh, ArtifactKind::Skin, ArtifactKind::Morph]
            .into_iter()
            .find(|kind| kind.ext() == ext)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_extensions() {
        assert_eq!(ARTIFACT_FORMAT.header_ext, "xml");
        assert_eq!(ARTIFACT_FORMAT.data_ext, "dat");
        assert_eq!(ArtifactKind::Mesh.ext(), "mesh");
        assert_eq!(ArtifactKind::Skin.ext(), "skin");
        assert_eq!(ArtifactKind::Morph.ext(), "morph");
    }

    #[test]
    fn test_qualify() {
        assert_eq!(ArtifactKind::Skin.qualify("rig"), "rig.skin");
        assert_eq!(ArtifactKind::Morph.qualify("face.smile"), "face.smile.morph");
    }

    #[test]
    fn test_check_name() {
        assert!(ARTIFACT_FORMAT.check_name("cube.mesh").is_ok());
        assert!(ARTIFACT_FORMAT.check_name("face.smile.morph").is_ok());
        for bad in ["", "../x.mesh", "/tmp/x.mesh", "a/b.mesh", "a\\b.mesh", "..", "."] {
            assert!(
                matches!(
                    ARTIFACT_FORMAT.check_name(bad),
                    Err(FormatError::InvalidName { .. })
                ),
                "{:?} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(ArtifactKind::detect("cube.mesh.xml"), Some(ArtifactKind::Mesh));
        assert_eq!(ArtifactKind::detect("rig.skin"), Some(ArtifactKind::Skin));
        assert_eq!(ArtifactKind::detect("face.smile.morph.xml"), Some(ArtifactKind::Morph));
        assert_eq!(ArtifactKind::detect("notes.txt"), None);
        assert_eq!(ArtifactKind::detect("xml"), None);
    }
}
