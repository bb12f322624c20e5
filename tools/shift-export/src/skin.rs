//! Skin influences and their remapping onto welded vertices
//!
//! Influences are authored per original position. After welding, one
//! original position may back several dense vertices (split by normal or
//! UV), so every dense vertex receives a copy of its position's block.

use assembly_common::MATRIX_FLOATS;
use assembly_common::formats::skin::IDENTITY;

use crate::error::{AssemblyError, AssemblyResult};

/// A 4×4 matrix, row-major as authored
pub type Matrix = [f32; MATRIX_FLOATS];

/// Joint influences for one skinned mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub name: String,
    pub bind_shape: Matrix,
    pub joints: Vec<String>,
    /// One inverse bind matrix per joint, when the source provides them
    pub inverse_binds: Option<Vec<Matrix>>,
    /// Influences per vertex
    pub counts: Vec<u32>,
    /// Joint of every influence, `sum(counts)` long
    pub joint_indices: Vec<u32>,
    /// Index into `weights` of every influence, `sum(counts)` long
    pub weight_indices: Vec<u32>,
    pub weights: Vec<f32>,
}

impl Skin {
    /// Skin with an identity bind shape and no inverse bind matrices
    pub fn new(name: impl Into<String>, joints: Vec<String>) -> Self {
        Self {
            name: name.into(),
            bind_shape: IDENTITY,
            joints,
            inverse_binds: None,
            counts: Vec::new(),
            joint_indices: Vec::new(),
            weight_indices: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Total influences across all vertices
    pub fn influence_count(&self) -> usize {
        self.joint_indices.len()
    }

    /// Check the influence tables against each other
    pub fn validate(&self) -> AssemblyResult<()> {
        let influences: usize = self.counts.iter().map(|&c| c as usize).sum();
        if self.joint_indices.len() != influences || self.weight_indices.len() != influences {
            return Err(AssemblyError::InfluenceMismatch {
                influences,
                joints: self.joint_indices.len(),
                weights: self.weight_indices.len(),
            });
        }
        if let Some(&index) = self
            .weight_indices
            .iter()
            .find(|&&i| i as usize >= self.weights.len())
        {
            return Err(AssemblyError::WeightOutOfRange {
                index,
                count: self.weights.len(),
            });
        }
        if let Some(&index) = self
            .joint_indices
            .iter()
            .find(|&&i| i as usize >= self.joints.len())
        {
            return Err(AssemblyError::JointOutOfRange {
                index,
                count: self.joints.len(),
            });
        }
        if let Some(binds) = &self.inverse_binds
            && binds.len() != self.joints.len()
        {
            return Err(AssemblyError::BindingMismatch {
                joints: self.joints.len(),
                matrices: binds.len(),
            });
        }
        Ok(())
    }

    /// Weight value of every influence, resolved through `weight_indices`
    pub fn resolved_weights(&self) -> Vec<f32> {
        self.weight_indices
            .iter()
            .map(|&i| self.weights.get(i as usize).copied().unwrap_or(0.0))
            .collect()
    }

    /// Re-key influences onto dense vertices
    ///
    /// `column_map[i]` is the original vertex behind dense vertex `i`. Dense
    /// vertex `i` receives an exact copy of that vertex's influence block.
    /// The weight table is kept as is.
    pub fn remap(&self, column_map: &[u32]) -> AssemblyResult<Skin> {
        self.validate()?;

        let mut offsets = Vec::with_capacity(self.counts.len() + 1);
        let mut total = 0usize;
        offsets.push(0);
        for &count in &self.counts {
            total += count as usize;
            offsets.push(total);
        }

        let mut counts = Vec::with_capacity(column_map.len());
        let mut joint_indices = Vec::new();
        let mut weight_indices = Vec::new();
        for &original in column_map {
            let vertex = original as usize;
            if vertex >= self.counts.len() {
                return Err(AssemblyError::VertexOutOfRange {
                    index: original,
                    count: self.counts.len(),
                });
            }
            let block = offsets[vertex]..offsets[vertex + 1];
            counts.push(self.counts[vertex]);
            joint_indices.extend_from_slice(&self.joint_indices[block.clone()]);
            weight_indices.extend_from_slice(&self.weight_indices[block]);
        }

        Ok(Skin {
            name: self.name.clone(),
            bind_shape: self.bind_shape,
            joints: self.joints.clone(),
            inverse_binds: self.inverse_binds.clone(),
            counts,
            joint_indices,
            weight_indices,
            weights: self.weights.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authored() -> Skin {
        let mut skin = Skin::new("rig", vec!["hip".into(), "knee".into(), "foot".into()]);
        // vertex 0: hip 1.0 | vertex 1: hip .25, knee .75 | vertex 2: foot 1.0
        skin.counts = vec![1, 2, 1];
        skin.joint_indices = vec![0, 0, 1, 2];
        skin.weight_indices = vec![0, 1, 2, 0];
        skin.weights = vec![1.0, 0.25, 0.75];
        skin
    }

    #[test]
    fn test_remap_copies_blocks() {
        let remapped = authored().remap(&[0, 1, 1, 2]).unwrap();
        assert_eq!(remapped.counts, vec![1, 2, 2, 1]);
        assert_eq!(remapped.joint_indices, vec![0, 0, 1, 0, 1, 2]);
        assert_eq!(remapped.weight_indices, vec![0, 1, 2, 1, 2, 0]);
        assert_eq!(remapped.weights, authored().weights);
        remapped.validate().unwrap();
    }

    #[test]
    fn test_remap_preserves_mass_for_bijection() {
        let skin = authored();
        let remapped = skin.remap(&[2, 0, 1]).unwrap();
        assert_eq!(remapped.influence_count(), skin.influence_count());
        let before: f32 = skin.resolved_weights().iter().sum();
        let after: f32 = remapped.resolved_weights().iter().sum();
        assert_eq!(before, after);
    }

    #[test]
    fn test_remap_rejects_unknown_vertex() {
        assert_eq!(
            authored().remap(&[0, 3]).unwrap_err(),
            AssemblyError::VertexOutOfRange { index: 3, count: 3 }
        );
    }

    #[test]
    fn test_validate_mismatched_lengths() {
        let mut skin = authored();
        skin.weight_indices.pop();
        assert_eq!(
            skin.validate().unwrap_err(),
            AssemblyError::InfluenceMismatch {
                influences: 4,
                joints: 4,
                weights: 3
            }
        );
    }

    #[test]
    fn test_validate_out_of_range_tables() {
        let mut skin = authored();
        skin.weight_indices[3] = 9;
        assert!(matches!(
            skin.validate(),
            Err(AssemblyError::WeightOutOfRange { index: 9, count: 3 })
        ));

        let mut skin = authored();
        skin.joint_indices[0] = 3;
        assert!(matches!(
            skin.validate(),
            Err(AssemblyError::JointOutOfRange { index: 3, count: 3 })
        ));

        let mut skin = authored();
        skin.inverse_binds = Some(vec![IDENTITY]);
        assert!(matches!(
            skin.validate(),
            Err(AssemblyError::BindingMismatch { joints: 3, matrices: 1 })
        ));
    }
}
