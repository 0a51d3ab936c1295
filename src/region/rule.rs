//! One boundary rule per pad mode.
//!
//! A rule answers two questions about a single axis: which input row an output
//! coordinate reads (output-driven walks), and which input rows feed each pad side
//! and how (input-driven walks). Both answers describe the same mapping.

use std::{fmt::Debug, ops::Range};

use super::{AxisExtent, Region};
use crate::key::ModeKind;

/// Side of the body a pad region sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// How input rows feed one pad side of an axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// The side is empty.
    None,
    /// No input is read; `owner` is the input row that emits the fill.
    Fill { owner: usize },
    /// Every pad row repeats input row `owner`.
    Broadcast { owner: usize },
    /// `rows` land in the pad in order.
    Shift { rows: Range<usize> },
    /// `rows` land in the pad in reverse order.
    Reverse { rows: Range<usize> },
}

pub trait PadRule: Debug + Send + Sync {
    fn kind(&self) -> ModeKind;

    /// Input row read by an output coordinate in `region`, `None` for a constant fill.
    fn source_index(&self, axis: &AxisExtent, region: Region) -> Option<usize>;

    /// Input rows that produce the pad on `side`.
    fn feed(&self, axis: &AxisExtent, side: Side) -> Feed;
}

#[derive(Debug, Clone, Copy)]
pub struct Constant;

#[derive(Debug, Clone, Copy)]
pub struct Edge;

#[derive(Debug, Clone, Copy)]
pub struct Circular;

/// Mirror around the boundary; `offset` is 1 when the boundary sample is not repeated
/// (reflect) and 0 when it is (symmetric).
#[derive(Debug, Clone, Copy)]
pub struct Mirror {
    offset: usize,
}

pub static CONSTANT: Constant = Constant;
pub static EDGE: Edge = Edge;
pub static CIRCULAR: Circular = Circular;
pub static REFLECT: Mirror = Mirror { offset: 1 };
pub static SYMMETRIC: Mirror = Mirror { offset: 0 };

impl ModeKind {
    /// The boundary rule implementing this mode.
    #[inline]
    pub fn rule(self) -> &'static dyn PadRule {
        match self {
            ModeKind::Constant => &CONSTANT,
            ModeKind::Edge => &EDGE,
            ModeKind::Reflect => &REFLECT,
            ModeKind::Symmetric => &SYMMETRIC,
            ModeKind::Circular => &CIRCULAR,
        }
    }
}

/// Owner-style feed shared by constant and edge padding.
#[inline]
fn owner_of(axis: &AxisExtent, side: Side) -> Option<usize> {
    match side {
        Side::Left if axis.left > 0 => Some(0),
        Side::Right if axis.right > 0 => Some(axis.input - 1),
        _ => None,
    }
}

impl PadRule for Constant {
    fn kind(&self) -> ModeKind {
        ModeKind::Constant
    }

    fn source_index(&self, _axis: &AxisExtent, region: Region) -> Option<usize> {
        match region {
            Region::Body(index) => Some(index),
            _ => None,
        }
    }

    fn feed(&self, axis: &AxisExtent, side: Side) -> Feed {
        match owner_of(axis, side) {
            Some(owner) => Feed::Fill { owner },
            None => Feed::None,
        }
    }
}

impl PadRule for Edge {
    fn kind(&self) -> ModeKind {
        ModeKind::Edge
    }

    fn source_index(&self, axis: &AxisExtent, region: Region) -> Option<usize> {
        Some(match region {
            Region::LeftPad(_) => 0,
            Region::Body(index) => index,
            Region::RightPad(_) => axis.input - 1,
        })
    }

    fn feed(&self, axis: &AxisExtent, side: Side) -> Feed {
        match owner_of(axis, side) {
            Some(owner) => Feed::Broadcast { owner },
            None => Feed::None,
        }
    }
}

impl PadRule for Circular {
    fn kind(&self) -> ModeKind {
        ModeKind::Circular
    }

    fn source_index(&self, axis: &AxisExtent, region: Region) -> Option<usize> {
        let n = axis.input;
        Some(match region {
            Region::LeftPad(distance) => (n - distance % n) % n,
            Region::Body(index) => index,
            Region::RightPad(distance) => distance % n,
        })
    }

    fn feed(&self, axis: &AxisExtent, side: Side) -> Feed {
        let n = axis.input;
        match side {
            Side::Left if axis.left > 0 => Feed::Shift {
                rows: n - axis.left..n,
            },
            Side::Right if axis.right > 0 => Feed::Shift {
                rows: 0..axis.right,
            },
            _ => Feed::None,
        }
    }
}

impl PadRule for Mirror {
    fn kind(&self) -> ModeKind {
        if self.offset == 1 {
            ModeKind::Reflect
        } else {
            ModeKind::Symmetric
        }
    }

    fn source_index(&self, axis: &AxisExtent, region: Region) -> Option<usize> {
        Some(match region {
            Region::LeftPad(distance) => distance - 1 + self.offset,
            Region::Body(index) => index,
            Region::RightPad(distance) => axis.input - 1 - self.offset - distance,
        })
    }

    fn feed(&self, axis: &AxisExtent, side: Side) -> Feed {
        let n = axis.input;
        let o = self.offset;
        match side {
            Side::Left if axis.left > 0 => Feed::Reverse {
                rows: o..o + axis.left,
            },
            Side::Right if axis.right > 0 => Feed::Reverse {
                rows: n - o - axis.right..n - o,
            },
            _ => Feed::None,
        }
    }
}
