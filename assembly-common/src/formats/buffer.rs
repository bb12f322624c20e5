//! Exact-size artifact data buffer
//!
//! The buffer is allocated once from the byte count declared by a header and
//! never grows. Writing past that size, or finishing before it is filled, is a
//! programming error and panics.

use super::IndexWidth;

/// Little-endian byte buffer with a fixed, precomputed size
#[derive(Debug)]
pub struct ArtifactBuffer {
    data: Vec<u8>,
    size: usize,
}

impl ArtifactBuffer {
    /// Allocate a buffer for exactly `size` bytes
    pub fn with_size(size: usize) -> Self {
        Self {
            data: Vec::with_capacity(size),
            size,
        }
    }

    /// Declared size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.data.len()
    }

    /// Bytes still to be written
    pub fn remaining(&self) -> usize {
        self.size - self.data.len()
    }

    fn claim(&mut self, bytes: usize) {
        assert!(
            bytes <= self.remaining(),
            "artifact buffer overflow: writing {} bytes at {} of {}",
            bytes,
            self.data.len(),
            self.size
        );
    }

    /// Write f32 values (little-endian)
    pub fn put_f32s(&mut self, values: &[f32]) {
        self.claim(values.len() * 4);
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Write indices at the given width (little-endian)
    ///
    /// Every index must fit the width; callers choose the width from the data.
    pub fn put_indices(&mut self, width: IndexWidth, indices: &[u32]) {
        self.claim(indices.len() * width.bytes());
        match width {
            IndexWidth::Byte => {
                for &i in indices {
                    debug_assert!(i <= u8::MAX as u32, "index {} exceeds u8", i);
                    self.data.push(i as u8);
                }
            }
            IndexWidth::Short => {
                for &i in indices {
                    debug_assert!(i <= u16::MAX as u32, "index {} exceeds u16", i);
                    self.data.extend_from_slice(&(i as u16).to_le_bytes());
                }
            }
            IndexWidth::Int => {
                for &i in indices {
                    self.data.extend_from_slice(&i.to_le_bytes());
                }
            }
        }
    }

    /// Hand back the filled buffer
    pub fn finish(self) -> Vec<u8> {
        assert_eq!(
            self.data.len(),
            self.size,
            "artifact buffer underfilled: {} of {} bytes written",
            self.data.len(),
            self.size
        );
        self.data
    }
}
