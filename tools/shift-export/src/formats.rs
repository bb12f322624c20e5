//! Artifact encoding and decoding
//!
//! Encoders turn an assembled mesh, a remapped skin or a morph target into a
//! header text plus an exact-size data buffer. The buffer is sized from the
//! header before any byte is written.
//!
//! Decoders read an artifact back from its two halves; `inspect` and the
//! round-trip tests use them.

use anyhow::{Context, Result, ensure};
use assembly_common::formats::skin::JOINT;
use assembly_common::{
    ArtifactBuffer, ArtifactKind, AttributeDecl, GroupDecl, HeaderText, IndexWidth, MATRIX_FLOATS,
    MeshHeader, MorphHeader, SkinHeader,
};

use crate::error::AssemblyResult;
use crate::mesh::{AssembledMesh, Attribute};
use crate::morph::MorphTarget;
use crate::sink::Sink;
use crate::skin::{Matrix, Skin};

/// An encoded artifact, ready for a sink
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Unqualified name (`cube`, `rig`, `face.smile`)
    pub name: String,
    pub header: String,
    pub data: Vec<u8>,
}

impl Artifact {
    /// Name handed to the sink: `N.kind`
    pub fn qualified_name(&self) -> String {
        self.kind.qualify(&self.name)
    }

    pub fn emit(&self, sink: &mut dyn Sink) -> Result<()> {
        sink.emit(&self.qualified_name(), &self.header, &self.data)
    }
}

fn float_decls(attributes: &[Attribute]) -> Vec<AttributeDecl> {
    attributes
        .iter()
        .map(|a| AttributeDecl::float(a.name.clone(), a.dimension))
        .collect()
}

/// Encode a mesh: attribute blocks, then each group's indices
pub fn encode_mesh(mesh: &AssembledMesh) -> Artifact {
    let header = MeshHeader::new(
        mesh.vertex_count(),
        float_decls(mesh.attributes()),
        mesh.groups()
            .iter()
            .map(|g| GroupDecl::new(g.material.clone(), g.triangle_count()))
            .collect(),
    );

    let mut buffer = ArtifactBuffer::with_size(header.data_size());
    for attribute in mesh.attributes() {
        buffer.put_f32s(&attribute.values);
    }
    for group in mesh.groups() {
        buffer.put_indices(header.index_width, &group.indices);
    }

    tracing::debug!(
        mesh = mesh.name(),
        vertices = header.vertex_count,
        triangles = header.triangle_count(),
        index_type = %header.index_width,
        bytes = header.data_size(),
        "encoded mesh"
    );

    Artifact {
        kind: ArtifactKind::Mesh,
        name: mesh.name().to_string(),
        header: header.to_text(),
        data: buffer.finish(),
    }
}

/// Encode a skin whose influences are already keyed by dense vertex
pub fn encode_skin(skin: &Skin) -> AssemblyResult<Artifact> {
    skin.validate()?;

    let header = SkinHeader {
        bind_shape: skin.bind_shape,
        joints: skin.joints.clone(),
        binding: skin.inverse_binds.is_some(),
        vertex_count: skin.counts.len(),
        count_width: IndexWidth::for_indices(&skin.counts),
        influence_count: skin.influence_count(),
        joint_width: IndexWidth::for_indices(&skin.joint_indices),
    };

    let mut buffer = ArtifactBuffer::with_size(header.data_size());
    if let Some(binds) = &skin.inverse_binds {
        for matrix in binds {
            buffer.put_f32s(matrix);
        }
    }
    buffer.put_indices(header.count_width, &skin.counts);
    buffer.put_f32s(&skin.resolved_weights());
    buffer.put_indices(header.joint_width, &skin.joint_indices);

    tracing::debug!(
        skin = %skin.name,
        joints = header.joints.len(),
        vertices = header.vertex_count,
        influences = header.influence_count,
        "encoded skin"
    );

    Ok(Artifact {
        kind: ArtifactKind::Skin,
        name: skin.name.clone(),
        header: header.to_text(),
        data: buffer.finish(),
    })
}

/// Encode a morph target's columns
pub fn encode_morph(morph: &MorphTarget) -> Artifact {
    let header = MorphHeader {
        source: morph.source.clone(),
        target: morph.target.clone(),
        weight: morph.weight,
        delta: morph.delta,
        vertex_count: morph.vertex_count,
        attributes: float_decls(&morph.attributes),
    };

    let mut buffer = ArtifactBuffer::with_size(header.data_size());
    for attribute in &morph.attributes {
        buffer.put_f32s(&attribute.values);
    }

    Artifact {
        kind: ArtifactKind::Morph,
        name: morph.name.clone(),
        header: header.to_text(),
        data: buffer.finish(),
    }
}

/// Little-endian reader over a data buffer
struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn take(&mut self, bytes: usize) -> Result<&'a [u8]> {
        let slice = self
            .position
            .checked_add(bytes)
            .and_then(|end| self.data.get(self.position..end))
            .with_context(|| {
                format!(
                    "data ends at {} bytes, needed {} at offset {}",
                    self.data.len(),
                    bytes,
                    self.position
                )
            })?;
        self.position += bytes;
        Ok(slice)
    }

    fn f32s(&mut self, count: usize) -> Result<Vec<f32>> {
        let bytes = count
            .checked_mul(4)
            .with_context(|| format!("{} floats overflow the data size", count))?;
        Ok(self
            .take(bytes)?
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn indices(&mut self, width: IndexWidth, count: usize) -> Result<Vec<u32>> {
        let bytes = count
            .checked_mul(width.bytes())
            .with_context(|| format!("{} indices overflow the data size", count))?;
        width
            .read(self.take(bytes)?, count)
            .context("index block shorter than declared")
    }
}

/// Element count of a `count x size` block
fn elements(count: usize, size: usize) -> Result<usize> {
    count
        .checked_mul(size)
        .with_context(|| format!("{} x {} elements overflow the data size", count, size))
}

/// Mesh artifact read back from header and data
#[derive(Debug, Clone)]
pub struct DecodedMesh {
    pub header: MeshHeader,
    pub attributes: Vec<Attribute>,
    /// `(material, indices)` per group
    pub groups: Vec<(String, Vec<u32>)>,
}

pub fn decode_mesh(header: &str, data: &[u8]) -> Result<DecodedMesh> {
    let header = MeshHeader::parse(header).context("Failed to parse mesh header")?;
    ensure!(
        data.len() == header.data_size(),
        "mesh data is {} bytes, header declares {}",
        data.len(),
        header.data_size()
    );

    let mut reader = Reader::new(data);
    let mut attributes = Vec::with_capacity(header.attributes.len());
    for decl in &header.attributes {
        ensure!(decl.index.is_none(), "mesh attribute {} is not FLOAT", decl.name);
        attributes.push(Attribute {
            name: decl.name.clone(),
            dimension: decl.size,
            values: reader.f32s(elements(header.vertex_count, decl.size)?)?,
        });
    }
    let mut groups = Vec::with_capacity(header.groups.len());
    for group in &header.groups {
        let indices = reader.indices(header.index_width, elements(group.count, 3)?)?;
        groups.push((group.name.clone(), indices));
    }

    Ok(DecodedMesh {
        header,
        attributes,
        groups,
    })
}

/// Skin artifact read back from header and data
#[derive(Debug, Clone)]
pub struct DecodedSkin {
    pub header: SkinHeader,
    pub inverse_binds: Vec<Matrix>,
    pub counts: Vec<u32>,
    pub weights: Vec<f32>,
    pub joints: Vec<u32>,
}

pub fn decode_skin(header: &str, data: &[u8]) -> Result<DecodedSkin> {
    let header = SkinHeader::parse(header).context("Failed to parse skin header")?;
    ensure!(
        data.len() == header.data_size(),
        "skin data is {} bytes, header declares {}",
        data.len(),
        header.data_size()
    );

    let mut reader = Reader::new(data);
    let mut inverse_binds = Vec::new();
    if header.binding {
        for _ in 0..header.joints.len() {
            let values = reader.f32s(MATRIX_FLOATS)?;
            let mut matrix = [0.0; MATRIX_FLOATS];
            matrix.copy_from_slice(&values);
            inverse_binds.push(matrix);
        }
    }
    let counts = reader.indices(header.count_width, header.vertex_count)?;
    let weights = reader.f32s(header.influence_count)?;
    let joints = reader
        .indices(header.joint_width, header.influence_count)
        .with_context(|| format!("Failed to read {} block", JOINT))?;

    Ok(DecodedSkin {
        header,
        inverse_binds,
        counts,
        weights,
        joints,
    })
}

/// Morph artifact read back from header and data
#[derive(Debug, Clone)]
pub struct DecodedMorph {
    pub header: MorphHeader,
    pub attributes: Vec<Attribute>,
}

pub fn decode_morph(header: &str, data: &[u8]) -> Result<DecodedMorph> {
    let header = MorphHeader::parse(header).context("Failed to parse morph header")?;
    ensure!(
        data.len() == header.data_size(),
        "morph data is {} bytes, header declares {}",
        data.len(),
        header.data_size()
    );

    let mut reader = Reader::new(data);
    let attributes = header
        .attributes
        .iter()
        .map(|decl| {
            Ok(Attribute {
                name: decl.name.clone(),
                dimension: decl.size,
                values: reader.f32s(elements(header.vertex_count, decl.size)?)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DecodedMorph { header, attributes })
}
