//! Artifact inspection
//!
//! Parses an emitted header, checks its data file when one sits next to it,
//! and summarizes counts, types and sizes.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use assembly_common::{
    ARTIFACT_FORMAT, ArtifactKind, HeaderText, MeshHeader, MorphHeader, SkinHeader,
};

use crate::formats::{decode_mesh, decode_morph, decode_skin};

fn kind_of(path: &Path, header: &str) -> Result<ArtifactKind> {
    if let Some(kind) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(ArtifactKind::detect)
    {
        return Ok(kind);
    }
    let doc = roxmltree::Document::parse(header).context("Failed to parse header")?;
    let root = doc.root_element().tag_name().name();
    if root == MeshHeader::ROOT {
        Ok(ArtifactKind::Mesh)
    } else if root == SkinHeader::ROOT {
        Ok(ArtifactKind::Skin)
    } else if root == MorphHeader::ROOT {
        Ok(ArtifactKind::Morph)
    } else {
        bail!("unknown artifact root <{}>", root)
    }
}

/// Summarize one header text; `data` is checked against it when given
pub fn summarize(kind: ArtifactKind, header: &str, data: Option<&[u8]>) -> Result<String> {
    let mut out = String::new();
    match kind {
        ArtifactKind::Mesh => {
            let parsed = MeshHeader::parse(header)?;
            let _ = writeln!(
                out,
                "mesh: {} vertices, {} triangles in {} group(s), {} indices",
                parsed.vertex_count,
                parsed.triangle_count(),
                parsed.groups.len(),
                parsed.index_width
            );
            for a in &parsed.attributes {
                let _ = writeln!(out, "  attribute {} x{} {}", a.name, a.size, a.type_name());
            }
            for g in &parsed.groups {
                let _ = writeln!(out, "  group {}: {} triangles", g.name, g.count);
            }
            let _ = writeln!(out, "  data: {} bytes", parsed.data_size());
            if let Some(data) = data {
                decode_mesh(header, data)?;
            }
        }
        ArtifactKind::Skin => {
            let parsed = SkinHeader::parse(header)?;
            let _ = writeln!(
                out,
                "skin: {} joints (binding {}), {} vertices, {} influences",
                parsed.joints.len(),
                parsed.binding,
                parsed.vertex_count,
                parsed.influence_count
            );
            let _ = writeln!(
                out,
                "  counts {}, joints {}",
                parsed.count_width, parsed.joint_width
            );
            let _ = writeln!(out, "  data: {} bytes", parsed.data_size());
            if let Some(data) = data {
                decode_skin(header, data)?;
            }
        }
        ArtifactKind::Morph => {
            let parsed = MorphHeader::parse(header)?;
            let _ = writeln!(
                out,
                "morph: {} -> {} weight {} ({}), {} vertices",
                parsed.source,
                parsed.target,
                parsed.weight,
                if parsed.delta { "delta" } else { "absolute" },
                parsed.vertex_count
            );
            for a in &parsed.attributes {
                let _ = writeln!(out, "  attribute {} x{}", a.name, a.size);
            }
            let _ = writeln!(out, "  data: {} bytes", parsed.data_size());
            if let Some(data) = data {
                decode_morph(header, data)?;
            }
        }
    }
    Ok(out)
}

/// Inspect a header file and its `.dat` sibling
pub fn inspect(header_path: &Path) -> Result<String> {
    let header = std::fs::read_to_string(header_path)
        .with_context(|| format!("Failed to read header: {:?}", header_path))?;
    let kind = kind_of(header_path, &header)?;

    let data_path = header_path.with_extension(ARTIFACT_FORMAT.data_ext);
    let data = if data_path != header_path && data_path.exists() {
        Some(
            std::fs::read(&data_path)
                .with_context(|| format!("Failed to read data: {:?}", data_path))?,
        )
    } else {
        tracing::debug!("No data file at {:?}", data_path);
        None
    };

    summarize(kind, &header, data.as_deref())
        .with_context(|| format!("Invalid artifact: {:?}", header_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::encode_mesh;
    use crate::mesh::{MeshAssembler, POSITION};
    use crate::sink::{DirectorySink, Sink};
    use tempfile::tempdir;

    fn triangle() -> crate::formats::Artifact {
        let mut asm = MeshAssembler::new("tri");
        asm.add_attribute(POSITION, vec![0.0; 9], 3, 3, 0).unwrap();
        asm.add_triangles("m", &[0, 1, 2], 1, 1).unwrap();
        encode_mesh(&asm.finish().unwrap())
    }

    #[test]
    fn test_inspect_written_mesh() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut sink = DirectorySink::create(dir.path()).unwrap();
        triangle().emit(&mut sink).unwrap();

        let summary = inspect(&dir.path().join("tri.mesh.xml")).unwrap();
        assert!(summary.starts_with("mesh: 3 vertices, 1 triangles in 1 group(s), UNSIGNED_BYTE indices"));
        assert!(summary.contains("attribute POSITION x3 FLOAT"));
        assert!(summary.contains("data: 39 bytes"));
    }

    #[test]
    fn test_inspect_detects_truncated_data() {
        let dir = tempdir().expect("Failed to create temp dir");
        let artifact = triangle();
        let mut sink = DirectorySink::create(dir.path()).unwrap();
        sink.emit("tri.mesh", &artifact.header, &artifact.data[..20]).unwrap();
        assert!(inspect(&dir.path().join("tri.mesh.xml")).is_err());
    }

    #[test]
    fn test_kind_from_root_element() {
        let artifact = triangle();
        let kind = kind_of(Path::new("renamed.xml"), &artifact.header).unwrap();
        assert_eq!(kind, ArtifactKind::Mesh);
        assert!(kind_of(Path::new("x.xml"), "<Scene/>").is_err());
    }
}
