//! Attribute sources and dense attribute columns

use crate::error::{AssemblyError, AssemblyResult};

use super::vertex_set::VertexKey;

pub const POSITION: &str = "POSITION";
pub const NORMAL: &str = "NORMAL";
pub const TEXTURE: &str = "TEXTURE";

/// Raw per-semantic float array as authored, read through one key slot
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSource {
    name: String,
    values: Vec<f32>,
    count: usize,
    dimension: usize,
    slot: usize,
}

impl AttributeSource {
    /// `values` must hold exactly `count * dimension` floats
    pub fn new(
        name: impl Into<String>,
        values: Vec<f32>,
        count: usize,
        dimension: usize,
        slot: usize,
    ) -> AssemblyResult<Self> {
        let name = name.into();
        if !(1..=4).contains(&dimension) {
            return Err(AssemblyError::InvalidDimension { name, dimension });
        }
        if values.len() != count * dimension {
            return Err(AssemblyError::AttributeLength {
                name,
                count,
                dimension,
                found: values.len(),
            });
        }
        Ok(Self {
            name,
            values,
            count,
            dimension,
            slot,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of source elements
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Vertex key column this source is read through
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Source element `index`
    pub fn element(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dimension)?;
        self.values.get(start..start + self.dimension)
    }

    /// Element selected by `key`; `Ok(None)` when the slot is absent
    pub fn lookup(&self, key: &VertexKey) -> AssemblyResult<Option<&[f32]>> {
        let Some(index) = key.element(self.slot) else {
            return Ok(None);
        };
        self.element(index)
            .map(Some)
            .ok_or_else(|| AssemblyError::ElementOutOfRange {
                name: self.name.clone(),
                index: key.slot(self.slot).unwrap_or(-1),
                count: self.count,
            })
    }

    /// Gather one element per key into a dense column, zeros for absent slots
    pub(crate) fn gather(&self, keys: &[VertexKey]) -> AssemblyResult<Attribute> {
        let zero = [0.0f32; 4];
        let mut values = Vec::with_capacity(keys.len() * self.dimension);
        for key in keys {
            let element = self.lookup(key)?.unwrap_or(&zero[..self.dimension]);
            values.extend_from_slice(element);
        }
        Ok(Attribute {
            name: self.name.clone(),
            dimension: self.dimension,
            values,
        })
    }
}

/// Attribute column in dense vertex order
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub dimension: usize,
    /// `vertex_count * dimension` floats
    pub values: Vec<f32>,
}

impl Attribute {
    /// Value of dense vertex `index`
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dimension)?;
        self.values.get(start..start + self.dimension)
    }

    pub fn vertex_count(&self) -> usize {
        self.values.len() / self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_validation() {
        assert!(AttributeSource::new(POSITION, vec![0.0; 6], 2, 3, 0).is_ok());
        assert!(matches!(
            AttributeSource::new(POSITION, vec![0.0; 5], 2, 3, 0),
            Err(AssemblyError::AttributeLength { found: 5, .. })
        ));
        assert!(matches!(
            AttributeSource::new("COLOR", vec![0.0; 10], 2, 5, 0),
            Err(AssemblyError::InvalidDimension { dimension: 5, .. })
        ));
        assert!(matches!(
            AttributeSource::new("COLOR", vec![], 0, 0, 0),
            Err(AssemblyError::InvalidDimension { dimension: 0, .. })
        ));
    }

    #[test]
    fn test_gather_zero_fills_absent_slots() {
        let source = AttributeSource::new(NORMAL, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0], 2, 3, 1).unwrap();
        let keys = [
            VertexKey::new(&[0, 1]),
            VertexKey::new(&[0, -1]),
            VertexKey::new(&[0, 0]),
            VertexKey::new(&[0]),
        ];
        let column = source.gather(&keys).unwrap();
        assert_eq!(column.vertex_count(), 4);
        assert_eq!(column.vertex(0), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(column.vertex(1), Some(&[0.0, 0.0, 0.0][..]));
        assert_eq!(column.vertex(2), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(column.vertex(3), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_gather_rejects_out_of_range_elements() {
        let source = AttributeSource::new(TEXTURE, vec![0.5, 0.5], 1, 2, 0).unwrap();
        let err = source.gather(&[VertexKey::new(&[1])]).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::ElementOutOfRange {
                name: TEXTURE.into(),
                index: 1,
                count: 1
            }
        );
    }
}
