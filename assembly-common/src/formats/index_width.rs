//! Index width policy
//!
//! Index arrays are stored at the smallest unsigned integer width that can
//! represent the largest value they hold. Vertex-referencing arrays use
//! `vertex_count - 1`; auxiliary arrays (joint indices, influence counts) use
//! the maximum value actually present, since their domain is not their length.

use std::fmt;
use std::str::FromStr;

use super::FormatError;

/// Unsigned integer width of an index array
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexWidth {
    /// 1 byte per index (max value 255)
    Byte,
    /// 2 bytes per index (max value 65535)
    Short,
    /// 4 bytes per index
    Int,
}

impl IndexWidth {
    /// Smallest width that can hold `max_value`
    #[inline]
    pub const fn for_max_value(max_value: u32) -> Self {
        if max_value < (1 << 8) {
            IndexWidth::Byte
        } else if max_value < (1 << 16) {
            IndexWidth::Short
        } else {
            IndexWidth::Int
        }
    }

    /// Width for an index array addressing `count` elements (max value `count - 1`)
    pub fn for_count(count: usize) -> Self {
        match u32::try_from(count.saturating_sub(1)) {
            Ok(max) => Self::for_max_value(max),
            Err(_) => IndexWidth::Int,
        }
    }

    /// Width for the values actually present in `indices` (Byte when empty)
    pub fn for_indices(indices: &[u32]) -> Self {
        indices
            .iter()
            .copied()
            .max()
            .map_or(IndexWidth::Byte, Self::for_max_value)
    }

    /// Size of one index in bytes
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            IndexWidth::Byte => 1,
            IndexWidth::Short => 2,
            IndexWidth::Int => 4,
        }
    }

    /// Type name used in artifact headers
    pub const fn as_str(self) -> &'static str {
        match self {
            IndexWidth::Byte => "UNSIGNED_BYTE",
            IndexWidth::Short => "UNSIGNED_SHORT",
            IndexWidth::Int => "UNSIGNED_INT",
        }
    }

    /// Decode `count` little-endian indices of this width from `bytes`
    ///
    /// Returns `None` if `bytes` is too short.
    pub fn read(self, bytes: &[u8], count: usize) -> Option<Vec<u32>> {
        let len = count.checked_mul(self.bytes())?;
        let bytes = bytes.get(..len)?;
        let indices = match self {
            IndexWidth::Byte => bytes.iter().map(|&b| b as u32).collect(),
            IndexWidth::Short => bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
                .collect(),
            IndexWidth::Int => bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        };
        Some(indices)
    }
}

impl fmt::Display for IndexWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexWidth {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNSIGNED_BYTE" => Ok(IndexWidth::Byte),
            "UNSIGNED_SHORT" => Ok(IndexWidth::Short),
            "UNSIGNED_INT" => Ok(IndexWidth::Int),
            other => Err(FormatError::UnknownType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_boundaries() {
        assert_eq!(IndexWidth::for_max_value(0), IndexWidth::Byte);
        assert_eq!(IndexWidth::for_max_value(255), IndexWidth::Byte);
        assert_eq!(IndexWidth::for_max_value(256), IndexWidth::Short);
        assert_eq!(IndexWidth::for_max_value(65535), IndexWidth::Short);
        assert_eq!(IndexWidth::for_max_value(65536), IndexWidth::Int);
        assert_eq!(IndexWidth::for_max_value(u32::MAX), IndexWidth::Int);
    }

    #[test]
    fn test_width_is_monotonic() {
        let samples = [0, 1, 200, 255, 256, 511, 512, 4096, 65535, 65536, 1 << 20];
        for pair in samples.windows(2) {
            assert!(IndexWidth::for_max_value(pair[0]) <= IndexWidth::for_max_value(pair[1]));
        }
    }

    #[test]
    fn test_width_for_count() {
        assert_eq!(IndexWidth::for_count(0), IndexWidth::Byte);
        assert_eq!(IndexWidth::for_count(4), IndexWidth::Byte);
        assert_eq!(IndexWidth::for_count(256), IndexWidth::Byte);
        assert_eq!(IndexWidth::for_count(257), IndexWidth::Short);
        // 300..=511 vertices must not fall back to Int
        assert_eq!(IndexWidth::for_count(400), IndexWidth::Short);
        assert_eq!(IndexWidth::for_count(65536), IndexWidth::Short);
        assert_eq!(IndexWidth::for_count(65537), IndexWidth::Int);
    }

    #[test]
    fn test_width_for_indices_uses_data() {
        assert_eq!(IndexWidth::for_indices(&[]), IndexWidth::Byte);
        assert_eq!(IndexWidth::for_indices(&[3, 1, 2]), IndexWidth::Byte);
        assert_eq!(IndexWidth::for_indices(&[0, 300, 2]), IndexWidth::Short);
        assert_eq!(IndexWidth::for_indices(&[70000]), IndexWidth::Int);
    }

    #[test]
    fn test_width_names_roundtrip() {
        for width in [IndexWidth::Byte, IndexWidth::Short, IndexWidth::Int] {
            assert_eq!(width.as_str().parse::<IndexWidth>().unwrap(), width);
        }
        assert!("FLOAT".parse::<IndexWidth>().is_err());
    }

    #[test]
    fn test_read_little_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(IndexWidth::Byte.read(&bytes, 2), Some(vec![1, 2]));
        assert_eq!(IndexWidth::Short.read(&bytes, 2), Some(vec![0x0201, 0x0403]));
        assert_eq!(IndexWidth::Int.read(&bytes, 1), Some(vec![0x0403_0201]));
        assert_eq!(IndexWidth::Int.read(&bytes, 2), None);
    }
}
