//! Mesh assembly contract violations
//!
//! These abort the artifact being assembled. Adapters report them and move on
//! to the next geometry or controller.

/// Structural error raised by the assembly core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("polygon has {0} points, at least 3 are required")]
    DegeneratePolygon(usize),

    #[error("attribute {name} has dimension {dimension}, expected 1 to 4")]
    InvalidDimension { name: String, dimension: usize },

    #[error("attribute {name} has {found} values, expected {count} x {dimension}")]
    AttributeLength {
        name: String,
        count: usize,
        dimension: usize,
        found: usize,
    },

    #[error("attribute {name} element {index} is outside its {count} elements")]
    ElementOutOfRange {
        name: String,
        index: i32,
        count: usize,
    },

    #[error("primitive stream has {found} indices, expected {expected}")]
    StreamLength { expected: usize, found: usize },

    #[error("{count} primitives of {corners} corners over {inputs} inputs overflow the index stream")]
    StreamOverflow {
        count: usize,
        corners: usize,
        inputs: usize,
    },

    #[error("vertex key has {found} inputs, mesh declares {expected}")]
    KeyLength { expected: usize, found: usize },

    #[error("mesh has no POSITION attribute")]
    MissingPosition,

    #[error("skin declares {influences} influences but has {joints} joint and {weights} weight indices")]
    InfluenceMismatch {
        influences: usize,
        joints: usize,
        weights: usize,
    },

    #[error("skin references vertex {index} but has {count} influence blocks")]
    VertexOutOfRange { index: u32, count: usize },

    #[error("skin references weight {index} but has {count} weights")]
    WeightOutOfRange { index: u32, count: usize },

    #[error("skin references joint {index} but has {count} joints")]
    JointOutOfRange { index: u32, count: usize },

    #[error("skin has {joints} joints but {matrices} inverse bind matrices")]
    BindingMismatch { joints: usize, matrices: usize },
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;
