//! Mesh assembly
//!
//! [`MeshAssembler`] ingests raw attribute sources and per-material primitive
//! streams, welds vertex keys into a dense index space and groups triangles
//! by material. [`MeshAssembler::finish`] freezes the result into an
//! [`AssembledMesh`], which the encoders and the skin/morph builders read.
//!
//! Primitive streams are corner-major: each corner contributes one raw index
//! per input, so a stream of `c` corners over `k` inputs holds `c * k` values.

use crate::error::{AssemblyError, AssemblyResult};

use super::attributes::{Attribute, AttributeSource, POSITION};
use super::triangulate::triangulate;
use super::vertex_set::{VertexIndexSet, VertexKey};

/// Triangles sharing one material, as dense vertex indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleGroup {
    pub material: String,
    /// Flat index array, length divisible by 3
    pub indices: Vec<u32>,
}

impl TriangleGroup {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// In-progress assembly of one mesh
#[derive(Debug)]
pub struct MeshAssembler {
    name: String,
    inputs: Option<usize>,
    vertices: VertexIndexSet,
    sources: Vec<AttributeSource>,
    groups: Vec<TriangleGroup>,
}

impl MeshAssembler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: None,
            vertices: VertexIndexSet::new(),
            sources: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a source array read through key column `slot`
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        values: Vec<f32>,
        count: usize,
        dimension: usize,
        slot: usize,
    ) -> AssemblyResult<()> {
        let source = AttributeSource::new(name, values, count, dimension, slot)?;
        tracing::trace!(
            mesh = %self.name,
            attribute = source.name(),
            count,
            dimension,
            slot,
            "attribute source"
        );
        self.sources.push(source);
        Ok(())
    }

    /// Open (or reopen) the group for `material`
    ///
    /// Groups are created in first-seen order. A group that never receives a
    /// triangle is dropped by [`finish`](Self::finish).
    pub fn begin_group(&mut self, material: &str) -> usize {
        match self.groups.iter().position(|g| g.material == material) {
            Some(index) => index,
            None => {
                self.groups.push(TriangleGroup {
                    material: material.to_string(),
                    indices: Vec::new(),
                });
                self.groups.len() - 1
            }
        }
    }

    /// Key width check; the first stream fixes the width
    fn check_inputs(&self, inputs: usize) -> AssemblyResult<()> {
        match self.inputs {
            _ if inputs == 0 => Err(AssemblyError::KeyLength {
                expected: self.inputs.unwrap_or(1),
                found: 0,
            }),
            Some(expected) if expected != inputs => Err(AssemblyError::KeyLength {
                expected,
                found: inputs,
            }),
            _ => Ok(()),
        }
    }

    fn check_stream(raw: &[i32], expected: usize) -> AssemblyResult<()> {
        if raw.len() != expected {
            return Err(AssemblyError::StreamLength {
                expected,
                found: raw.len(),
            });
        }
        Ok(())
    }

    /// Ingest `primitive_count` triangles of `inputs` raw indices per corner
    ///
    /// The stream is validated before any key is interned, so a rejected
    /// stream leaves the assembler unchanged.
    pub fn add_triangles(
        &mut self,
        material: &str,
        raw: &[i32],
        primitive_count: usize,
        inputs: usize,
    ) -> AssemblyResult<()> {
        self.check_inputs(inputs)?;
        let expected = primitive_count
            .checked_mul(3)
            .and_then(|corners| corners.checked_mul(inputs))
            .ok_or(AssemblyError::StreamOverflow {
                count: primitive_count,
                corners: 3,
                inputs,
            })?;
        Self::check_stream(raw, expected)?;
        self.inputs = Some(inputs);

        let group = self.begin_group(material);
        let mut indices = Vec::with_capacity(raw.len() / inputs);
        for corner in raw.chunks_exact(inputs) {
            indices.push(self.vertices.intern(VertexKey::new(corner)));
        }
        self.groups[group].indices.extend(indices);
        Ok(())
    }

    /// Ingest polygons with `vcounts[i]` corners each, fan-triangulated
    ///
    /// Like [`add_triangles`](Self::add_triangles), nothing is interned
    /// unless every polygon and the stream length check out.
    pub fn add_polylist(
        &mut self,
        material: &str,
        raw: &[i32],
        vcounts: &[u32],
        inputs: usize,
    ) -> AssemblyResult<()> {
        self.check_inputs(inputs)?;
        if let Some(&short) = vcounts.iter().find(|&&c| c < 3) {
            return Err(AssemblyError::DegeneratePolygon(short as usize));
        }
        let expected = vcounts
            .iter()
            .try_fold(0usize, |total, &c| total.checked_add(c as usize))
            .and_then(|corners| corners.checked_mul(inputs))
            .ok_or(AssemblyError::StreamOverflow {
                count: vcounts.len(),
                corners: vcounts.iter().copied().max().unwrap_or(0) as usize,
                inputs,
            })?;
        Self::check_stream(raw, expected)?;
        self.inputs = Some(inputs);

        let group = self.begin_group(material);
        let mut indices = Vec::new();
        let mut polygon = Vec::new();
        let mut spans = raw.chunks_exact(inputs);
        for &vcount in vcounts {
            polygon.clear();
            for corner in spans.by_ref().take(vcount as usize) {
                polygon.push(self.vertices.intern(VertexKey::new(corner)));
            }
            for triangle in triangulate(&polygon)? {
                indices.extend(triangle.iter().map(|&local| polygon[local as usize]));
            }
        }
        self.groups[group].indices.extend(indices);
        Ok(())
    }

    /// Welded vertices so far
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Original position index of every dense vertex
    pub fn position_column_map(&self) -> AssemblyResult<Vec<u32>> {
        position_column_map(&self.vertices, &self.sources)
    }

    /// Freeze the mesh: gather dense attribute columns and drop empty groups
    pub fn finish(self) -> AssemblyResult<AssembledMesh> {
        let attributes = self
            .sources
            .iter()
            .map(|source| source.gather(self.vertices.keys()))
            .collect::<AssemblyResult<Vec<_>>>()?;

        let mut groups = self.groups;
        groups.retain(|g| !g.indices.is_empty());

        tracing::debug!(
            mesh = %self.name,
            vertices = self.vertices.len(),
            groups = groups.len(),
            "mesh assembled"
        );

        Ok(AssembledMesh {
            name: self.name,
            vertices: self.vertices,
            sources: self.sources,
            attributes,
            groups,
        })
    }
}

fn position_column_map(
    vertices: &VertexIndexSet,
    sources: &[AttributeSource],
) -> AssemblyResult<Vec<u32>> {
    let position = sources
        .iter()
        .find(|s| s.name() == POSITION)
        .ok_or(AssemblyError::MissingPosition)?;
    vertices
        .keys()
        .iter()
        .map(|key| {
            key.element(position.slot())
                .filter(|&index| index < position.count())
                .map(|index| index as u32)
                .ok_or_else(|| AssemblyError::ElementOutOfRange {
                    name: POSITION.to_string(),
                    index: key.slot(position.slot()).unwrap_or(-1),
                    count: position.count(),
                })
        })
        .collect()
}

/// A welded mesh ready for encoding
#[derive(Debug, Clone)]
pub struct AssembledMesh {
    name: String,
    vertices: VertexIndexSet,
    sources: Vec<AttributeSource>,
    attributes: Vec<Attribute>,
    groups: Vec<TriangleGroup>,
}

impl AssembledMesh {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Dense attribute columns in registration order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Non-empty triangle groups in first-seen material order
    pub fn groups(&self) -> &[TriangleGroup] {
        &self.groups
    }

    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(TriangleGroup::triangle_count).sum()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Raw source behind attribute `name`
    pub fn source(&self, name: &str) -> Option<&AttributeSource> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Dense index of a vertex key
    pub fn index_of(&self, key: &VertexKey) -> Option<u32> {
        self.vertices.get(key)
    }

    /// Vertex key of dense vertex `index`
    pub fn key(&self, index: u32) -> Option<&VertexKey> {
        self.vertices.key(index)
    }

    /// Raw source element of attribute `name` selected by `key`
    ///
    /// Absent slots and unknown attributes give `None`.
    pub fn source_value(&self, name: &str, key: &VertexKey) -> Option<&[f32]> {
        self.source(name)?.lookup(key).ok().flatten()
    }

    /// Original position index of every dense vertex
    pub fn position_column_map(&self) -> AssemblyResult<Vec<u32>> {
        position_column_map(&self.vertices, &self.sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::attributes::TEXTURE;

    fn welded_pair() -> MeshAssembler {
        let mut asm = MeshAssembler::new("pair");
        asm.add_attribute(POSITION, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0], 3, 3, 0)
            .unwrap();
        asm.add_attribute(TEXTURE, vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0], 3, 2, 1)
            .unwrap();
        // (position, uv) corners: (0,0) (1,0) (1,1) | (0,0) (1,1) (2,0)
        asm.add_triangles("stone", &[0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 2, 0], 2, 2)
            .unwrap();
        asm
    }

    #[test]
    fn test_shared_corners_weld() {
        let mesh = welded_pair().finish().unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.groups()[0].indices, vec![0, 1, 2, 0, 2, 3]);

        let uv = mesh.attribute(TEXTURE).unwrap();
        assert_eq!(uv.vertex(3), Some(&[0.0, 0.0][..]));
        let pos = mesh.attribute(POSITION).unwrap();
        assert_eq!(pos.vertex(3), Some(&[1.0, 1.0, 0.0][..]));
    }

    #[test]
    fn test_groups_accumulate_in_first_seen_order() {
        let mut asm = MeshAssembler::new("multi");
        asm.add_attribute(POSITION, vec![0.0; 12], 4, 3, 0).unwrap();
        asm.add_triangles("b", &[0, 1, 2], 1, 1).unwrap();
        asm.add_triangles("a", &[1, 2, 3], 1, 1).unwrap();
        asm.add_triangles("b", &[0, 2, 3], 1, 1).unwrap();
        asm.begin_group("unused");
        let mesh = asm.finish().unwrap();

        let names: Vec<&str> = mesh.groups().iter().map(|g| g.material.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(mesh.groups()[0].indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_polylist_fans_dense_indices() {
        let mut asm = MeshAssembler::new("poly");
        asm.add_attribute(POSITION, vec![0.0; 15], 5, 3, 0).unwrap();
        asm.add_polylist("m", &[0, 1, 2, 3, 2, 3, 4], &[4, 3], 1).unwrap();
        let mesh = asm.finish().unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(
            mesh.groups()[0].indices,
            vec![0, 1, 2, 0, 2, 3, 2, 3, 4]
        );
    }

    #[test]
    fn test_polylist_rejects_degenerate_polygon() {
        let mut asm = MeshAssembler::new("bad");
        let err = asm.add_polylist("m", &[0, 1], &[2], 1).unwrap_err();
        assert_eq!(err, AssemblyError::DegeneratePolygon(2));
    }

    #[test]
    fn test_stream_and_key_length_checks() {
        let mut asm = MeshAssembler::new("bad");
        assert_eq!(
            asm.add_triangles("m", &[0, 1, 2, 3], 1, 2).unwrap_err(),
            AssemblyError::StreamLength {
                expected: 6,
                found: 4
            }
        );
        asm.add_triangles("m", &[0, 0, 1, 1, 2, 2], 1, 2).unwrap();
        assert_eq!(
            asm.add_triangles("m", &[0, 1, 2], 1, 1).unwrap_err(),
            AssemblyError::KeyLength {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_huge_primitive_count_is_rejected() {
        let mut asm = MeshAssembler::new("huge");
        assert_eq!(
            asm.add_triangles("m", &[0, 0, 1, 1, 2, 2], 1 << 62, 2).unwrap_err(),
            AssemblyError::StreamOverflow {
                count: 1 << 62,
                corners: 3,
                inputs: 2
            }
        );
        assert!(matches!(
            asm.add_polylist("m", &[0, 1, 2], &[u32::MAX, 3], usize::MAX),
            Err(AssemblyError::StreamOverflow { .. })
        ));
        assert_eq!(asm.vertex_count(), 0);
    }

    #[test]
    fn test_rejected_polylist_interns_nothing() {
        let mut asm = MeshAssembler::new("partial");
        asm.add_attribute(POSITION, vec![0.0; 15], 5, 3, 0).unwrap();
        // First polygon is valid, second has two corners
        let err = asm.add_polylist("m", &[0, 1, 2, 3, 4], &[3, 2], 1).unwrap_err();
        assert_eq!(err, AssemblyError::DegeneratePolygon(2));
        assert_eq!(
            asm.add_polylist("m", &[0, 1, 2, 3], &[3], 1).unwrap_err(),
            AssemblyError::StreamLength {
                expected: 3,
                found: 4
            }
        );
        assert_eq!(asm.vertex_count(), 0);

        // Key width is still open after the rejected streams
        asm.add_triangles("m", &[0, 0, 1, 1, 2, 2], 1, 2).unwrap();
        assert_eq!(asm.vertex_count(), 3);
    }

    #[test]
    fn test_finish_rejects_out_of_range_elements() {
        let mut asm = MeshAssembler::new("bad");
        asm.add_attribute(POSITION, vec![0.0; 6], 2, 3, 0).unwrap();
        asm.add_triangles("m", &[0, 1, 2], 1, 1).unwrap();
        assert!(matches!(
            asm.finish(),
            Err(AssemblyError::ElementOutOfRange { index: 2, count: 2, .. })
        ));
    }

    #[test]
    fn test_position_column_map() {
        let asm = welded_pair();
        assert_eq!(asm.position_column_map().unwrap(), vec![0, 1, 1, 2]);

        let mut bare = MeshAssembler::new("bare");
        bare.add_triangles("m", &[0, 1, 2], 1, 1).unwrap();
        assert_eq!(
            bare.position_column_map().unwrap_err(),
            AssemblyError::MissingPosition
        );
    }

    #[test]
    fn test_key_lookups() {
        let mesh = welded_pair().finish().unwrap();
        let key = VertexKey::new(&[1, 1]);
        assert_eq!(mesh.index_of(&key), Some(2));
        assert_eq!(mesh.key(2), Some(&key));
        assert_eq!(
            mesh.source_value(TEXTURE, &VertexKey::new(&[0, 2])),
            Some(&[1.0, 1.0][..])
        );
        assert_eq!(mesh.source_value("NORMAL", &key), None);
    }
}
