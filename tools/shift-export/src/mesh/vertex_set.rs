//! Vertex welding
//!
//! A vertex in a source document is a tuple of per-input indices
//! (position, normal, texcoord, ...). Equal tuples collapse into one dense
//! output vertex, assigned in first-seen order.

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Composite vertex key: one source index per input slot
///
/// Negative slots are absent (the attribute is emitted as zeros).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexKey(SmallVec<[i32; 4]>);

impl VertexKey {
    pub fn new(slots: &[i32]) -> Self {
        Self(SmallVec::from_slice(slots))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw slot value, `None` past the end of the key
    pub fn slot(&self, slot: usize) -> Option<i32> {
        self.0.get(slot).copied()
    }

    /// Source element selected by `slot`, `None` when absent
    pub fn element(&self, slot: usize) -> Option<usize> {
        self.slot(slot)
            .and_then(|value| usize::try_from(value).ok())
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

impl From<&[i32]> for VertexKey {
    fn from(slots: &[i32]) -> Self {
        Self::new(slots)
    }
}

/// Dense index space over distinct vertex keys
#[derive(Debug, Default, Clone)]
pub struct VertexIndexSet {
    indices: HashMap<VertexKey, u32>,
    keys: Vec<VertexKey>,
}

impl VertexIndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dense index of `key`, assigning the next one if it is new
    pub fn intern(&mut self, key: VertexKey) -> u32 {
        if let Some(&index) = self.indices.get(&key) {
            return index;
        }
        let index = self.keys.len() as u32;
        self.keys.push(key.clone());
        self.indices.insert(key, index);
        index
    }

    /// Dense index of `key` if it has been interned
    pub fn get(&self, key: &VertexKey) -> Option<u32> {
        self.indices.get(key).copied()
    }

    /// Key of dense vertex `index`
    pub fn key(&self, index: u32) -> Option<&VertexKey> {
        self.keys.get(index as usize)
    }

    /// Keys in dense order
    pub fn keys(&self) -> &[VertexKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
