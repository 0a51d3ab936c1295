//! Tiled N-dimensional pad for `ndarray`.
//!
//! The host layer ([`PadExt`]) validates a request, lays it out as a [`TileDescriptor`]
//! and launches [`kernel::pad`], which partitions the tiles over compute units and runs
//! each unit's share through a double-buffered pipeline with one of the copy strategies
//! in [`key::Strategy`].

pub mod coord;
pub mod descriptor;
mod error;
pub mod kernel;
pub mod key;
pub mod memory;
mod padding;
pub mod partition;
pub mod pipeline;
pub mod region;
pub mod strategy;
pub mod vector;

pub use descriptor::{DescriptorBuilder, TileDescriptor, MAX_DIMS};
pub use error::PadError;
pub use key::{ModeKind, Strategy, TilingKey};
pub use padding::{
    reference, reference_signed, ExplicitPadding, PadExt, PadOptions, SignedPadding,
};

/// Element types the kernel can move.
pub trait Element: Copy + Send + Sync + PartialEq + std::fmt::Debug + 'static {}

impl<T> Element for T where T: Copy + Send + Sync + PartialEq + std::fmt::Debug + 'static {}

// padding mode applied on every axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaddingMode<T: num::traits::NumAssign + Copy> {
    Zeros,
    Const(T),
    /// Repeat the boundary sample.
    Replicate,
    /// Mirror without repeating the boundary sample: `[3, 2, | 1, 2, 3]`.
    Reflect,
    /// Mirror repeating the boundary sample: `[2, 1, | 1, 2, 3]`.
    Symmetric,
    Circular,
}

impl<T: num::traits::NumAssign + Copy> PaddingMode<T> {
    #[inline]
    pub fn kind(&self) -> ModeKind {
        match self {
            PaddingMode::Zeros | PaddingMode::Const(_) => ModeKind::Constant,
            PaddingMode::Replicate => ModeKind::Edge,
            PaddingMode::Reflect => ModeKind::Reflect,
            PaddingMode::Symmetric => ModeKind::Symmetric,
            PaddingMode::Circular => ModeKind::Circular,
        }
    }

    /// Constant written to pad positions; zero for every non-constant mode.
    #[inline]
    pub fn fill(&self) -> T {
        match self {
            PaddingMode::Const(value) => *value,
            _ => T::zero(),
        }
    }
}
