//! Morph target deltas
//!
//! A morph target is a second mesh with the same attribute semantics as its
//! base. For every semantic both meshes carry with matching source count and
//! dimension, one column is produced over the base's dense vertices:
//!
//! ```text
//! result[v] = weight * target[v] - (delta ? base[v] : 0)
//! ```
//!
//! The target value of base vertex `v` is found by looking up `v`'s vertex
//! key in the target. Targets usually weld identically to their base; when a
//! key is missing, the target's raw source element for that key is used.

use crate::mesh::{AssembledMesh, Attribute};

/// One morphed attribute column, sized to the base mesh's dense vertices
pub type MorphAttribute = Attribute;

/// A morph artifact: the target's columns against a named base
#[derive(Debug, Clone, PartialEq)]
pub struct MorphTarget {
    /// Artifact name, `<controller>.<target>`
    pub name: String,
    pub source: String,
    pub target: String,
    pub weight: f32,
    pub delta: bool,
    pub vertex_count: usize,
    pub attributes: Vec<MorphAttribute>,
}

impl MorphTarget {
    pub fn build(
        name: impl Into<String>,
        base: &AssembledMesh,
        target: &AssembledMesh,
        weight: f32,
        delta: bool,
    ) -> Self {
        Self {
            name: name.into(),
            source: base.name().to_string(),
            target: target.name().to_string(),
            weight,
            delta,
            vertex_count: base.vertex_count(),
            attributes: morph(base, target, weight, delta),
        }
    }
}

/// Build the morphed columns of `target` against `base`
///
/// Semantics missing from the target, or whose source count or dimension
/// differ, are skipped.
pub fn morph(
    base: &AssembledMesh,
    target: &AssembledMesh,
    weight: f32,
    delta: bool,
) -> Vec<MorphAttribute> {
    let mut result = Vec::new();

    for base_attr in base.attributes() {
        let name = base_attr.name.as_str();
        let (Some(base_src), Some(target_src), Some(target_attr)) = (
            base.source(name),
            target.source(name),
            target.attribute(name),
        ) else {
            tracing::debug!(base = base.name(), target = target.name(), attribute = name, "not in target");
            continue;
        };
        if base_src.count() != target_src.count() || base_src.dimension() != target_src.dimension() {
            tracing::debug!(
                base = base.name(),
                target = target.name(),
                attribute = name,
                "count or dimension differs"
            );
            continue;
        }

        let dimension = base_attr.dimension;
        let zero = [0.0f32; 4];
        let mut values = Vec::with_capacity(base.vertex_count() * dimension);
        for v in 0..base.vertex_count() {
            let base_value = base_attr.vertex(v).unwrap_or(&zero[..dimension]);
            let target_value = base
                .key(v as u32)
                .and_then(|key| match target.index_of(key) {
                    Some(t) => target_attr.vertex(t as usize),
                    None => target.source_value(name, key),
                })
                .unwrap_or(&zero[..dimension]);

            for (b, t) in base_value.iter().zip(target_value) {
                let offset = if delta { *b } else { 0.0 };
                values.push(weight * t - offset);
            }
        }

        result.push(Attribute {
            name: name.to_string(),
            dimension,
            values,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshAssembler, NORMAL, POSITION};

    fn line_mesh(name: &str, values: Vec<f32>) -> AssembledMesh {
        let mut asm = MeshAssembler::new(name);
        asm.add_attribute("BLEND", values, 3, 1, 0).unwrap();
        asm.add_triangles("m", &[0, 1, 2], 1, 1).unwrap();
        asm.finish().unwrap()
    }

    #[test]
    fn test_delta_and_absolute() {
        let base = line_mesh("base", vec![1.0, 1.0, 1.0]);
        let target = line_mesh("target", vec![2.0, 2.0, 2.0]);

        let delta = morph(&base, &target, 0.5, true);
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].values, vec![0.0, 0.0, 0.0]);

        let absolute = morph(&base, &target, 0.5, false);
        assert_eq!(absolute[0].values, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_morph_target_names() {
        let base = line_mesh("face", vec![0.0; 3]);
        let target = line_mesh("smile", vec![1.0; 3]);
        let built = MorphTarget::build("expressions.smile", &base, &target, 0.25, false);
        assert_eq!(built.source, "face");
        assert_eq!(built.target, "smile");
        assert_eq!(built.vertex_count, 3);
        assert_eq!(built.attributes[0].values, vec![0.25; 3]);
    }

    #[test]
    fn test_mismatched_and_missing_semantics_are_skipped() {
        let mut asm = MeshAssembler::new("base");
        asm.add_attribute(POSITION, vec![0.0; 9], 3, 3, 0).unwrap();
        asm.add_attribute(NORMAL, vec![0.0; 9], 3, 3, 0).unwrap();
        asm.add_attribute("TEXTURE", vec![0.0; 6], 3, 2, 0).unwrap();
        asm.add_triangles("m", &[0, 1, 2], 1, 1).unwrap();
        let base = asm.finish().unwrap();

        let mut asm = MeshAssembler::new("target");
        asm.add_attribute(POSITION, vec![1.0; 9], 3, 3, 0).unwrap();
        asm.add_attribute(NORMAL, vec![1.0; 12], 4, 3, 0).unwrap();
        asm.add_triangles("m", &[0, 1, 2], 1, 1).unwrap();
        let target = asm.finish().unwrap();

        let result = morph(&base, &target, 1.0, true);
        let names: Vec<&str> = result.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec![POSITION]);
        assert_eq!(result[0].values, vec![1.0; 9]);
    }

    #[test]
    fn test_target_lookup_by_key() {
        // Same sources, but the target welds its corners in a different order
        let base = line_mesh("base", vec![1.0, 2.0, 3.0]);

        let mut asm = MeshAssembler::new("target");
        asm.add_attribute("BLEND", vec![10.0, 20.0, 30.0], 3, 1, 0).unwrap();
        asm.add_triangles("m", &[2, 0, 1], 1, 1).unwrap();
        let target = asm.finish().unwrap();

        let result = morph(&base, &target, 1.0, true);
        assert_eq!(result[0].values, vec![9.0, 18.0, 27.0]);
    }

    #[test]
    fn test_missing_key_falls_back_to_source() {
        let base = line_mesh("base", vec![1.0, 2.0, 3.0]);

        let mut asm = MeshAssembler::new("target");
        asm.add_attribute("BLEND", vec![10.0, 20.0, 30.0], 3, 1, 0).unwrap();
        asm.add_triangles("m", &[0, 0, 1], 1, 1).unwrap();
        let target = asm.finish().unwrap();
        assert_eq!(target.vertex_count(), 2);

        let result = morph(&base, &target, 1.0, false);
        assert_eq!(result[0].values, vec![10.0, 20.0, 30.0]);
    }
}
