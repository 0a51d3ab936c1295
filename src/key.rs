//! Closed dispatch keys: which copy strategy runs, and under which pad mode.

/// Execution strategy of the pad kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One wide row streamed in chunks of `split_factor` elements along the last axis.
    RowStream,
    /// Several split-axis rows batched into one output-shaped staging tile.
    BatchedTile,
    /// Output-aligned tiles filled through a precomputed per-lane source index vector.
    IndexGather,
    /// Output-aligned tiles written through precomputed (source, destination) lane pairs.
    IndexScatter,
    /// Flat per-element classification, for shapes the other strategies do not fit.
    ElementFallback,
}

/// Which index space a strategy unranks its tiles from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Input-aligned tiles; padding is produced by writing each tile to several places.
    Input,
    /// Output-aligned tiles; each output row looks up its source row.
    Output,
    /// The output tensor flattened to one axis.
    Flat,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::RowStream,
        Strategy::BatchedTile,
        Strategy::IndexGather,
        Strategy::IndexScatter,
        Strategy::ElementFallback,
    ];

    #[inline]
    pub fn walk(self) -> Walk {
        match self {
            Strategy::RowStream | Strategy::BatchedTile => Walk::Input,
            Strategy::IndexGather | Strategy::IndexScatter => Walk::Output,
            Strategy::ElementFallback => Walk::Flat,
        }
    }
}

/// Pad mode without its fill value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Constant,
    Edge,
    /// Mirror without repeating the boundary sample.
    Reflect,
    /// Mirror repeating the boundary sample.
    Symmetric,
    Circular,
}

impl ModeKind {
    pub const ALL: [ModeKind; 5] = [
        ModeKind::Constant,
        ModeKind::Edge,
        ModeKind::Reflect,
        ModeKind::Symmetric,
        ModeKind::Circular,
    ];

    /// Largest pad one side may have for an axis of `input` elements, `None` if unbounded.
    #[inline]
    pub fn max_pad(self, input: usize) -> Option<usize> {
        match self {
            ModeKind::Constant | ModeKind::Edge => None,
            ModeKind::Reflect => Some(input.saturating_sub(1)),
            ModeKind::Symmetric | ModeKind::Circular => Some(input),
        }
    }

    /// Whether the mode reads input to produce pad values.
    #[inline]
    pub fn reads_input(self) -> bool {
        !matches!(self, ModeKind::Constant)
    }
}

/// Replacement for the numeric tiling key: picked by the planning step, consumed by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilingKey {
    pub strategy: Strategy,
    pub mode: ModeKind,
}

impl TilingKey {
    #[inline]
    pub fn new(strategy: Strategy, mode: ModeKind) -> Self {
        Self { strategy, mode }
    }
}
