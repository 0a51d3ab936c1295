//! Errors raised by the host layer before a pad kernel is launched.
//!
//! The kernel itself has no recovery path: everything below is checked while the
//! [`TileDescriptor`](crate::TileDescriptor) is built or validated, and the core only
//! `debug_assert!`s the same conditions.

use thiserror::Error;

use crate::key::{ModeKind, Strategy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PadError {
    #[error("rank {0} is not supported (expected 1..={max})", max = crate::MAX_DIMS)]
    UnsupportedRank(usize),

    #[error("axis {axis}: crop ({left}, {right}) removes more than the input extent {input}")]
    CropExceedsInput {
        axis: usize,
        left: isize,
        right: isize,
        input: usize,
    },

    #[error("{strategy:?} walks input tiles and cannot crop (axis {axis})")]
    CropOnInputWalk { strategy: Strategy, axis: usize },

    #[error("axis {axis}: padded extent overflows the index range")]
    ShapeOverflow { axis: usize },

    #[error("axis {axis}: {mode:?} pad of {pad} exceeds input extent {input}")]
    WrapExceedsPeriod {
        axis: usize,
        mode: ModeKind,
        pad: usize,
        input: usize,
    },

    #[error("axis {axis}: {mode:?} padding needs a non-empty input axis")]
    EmptyAxis { axis: usize, mode: ModeKind },

    #[error(
        "{strategy:?} walks input tiles and needs every input axis to be non-empty (axis {axis})"
    )]
    EmptyInputWalk { strategy: Strategy, axis: usize },

    #[error("split axis {axis} is invalid for {strategy:?} with rank {rank}")]
    InvalidSplitAxis {
        strategy: Strategy,
        axis: usize,
        rank: usize,
    },

    #[error("split factor must be at least 1")]
    ZeroSplitFactor,

    #[error("strides of axis {axis} are not row-major contiguous")]
    NonContiguousStride { axis: usize },

    #[error("{strategy:?} needs {needed} staging bytes but the tile holds {available}")]
    StagingOverflow {
        strategy: Strategy,
        needed: usize,
        available: usize,
    },

    #[error(
        "tile count {total} / tiles per unit {per_unit} do not match the descriptor layout \
         (expected {expected})"
    )]
    TileCountMismatch {
        total: usize,
        per_unit: usize,
        expected: usize,
    },

    #[error("{what} buffer holds {got} elements, descriptor expects {expected}")]
    BufferLength {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("lane index {0} does not fit the 32-bit index vector")]
    IndexOverflow(usize),

    #[error("unit count must be at least 1")]
    NoUnits,
}
