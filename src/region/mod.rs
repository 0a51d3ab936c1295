//! Per-axis classification of coordinates into left pad, body and right pad.
//!
//! Input-driven walks ask which output rows a window of input rows must be written to
//! ([`RegionClassifier::segments`]); output-driven walks ask which input row an output
//! coordinate reads ([`RegionClassifier::source_index`]). The mode-specific part lives
//! in [`rule`].

use std::ops::Range;

use crate::{descriptor::MAX_DIMS, key::ModeKind, TileDescriptor};

pub mod rule;

use rule::{Feed, PadRule, Side};

#[cfg(test)]
mod tests;

/// Left pad, input extent and right pad of one axis.
///
/// A negative pad is kept as `skip` (rows cropped off the front of the padded axis) or
/// `trim` (rows cropped off its back). A side either grows or is cropped, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisExtent {
    pub left: usize,
    pub input: usize,
    pub right: usize,
    pub skip: usize,
    pub trim: usize,
}

impl AxisExtent {
    #[inline]
    pub fn new(left: usize, input: usize, right: usize) -> Self {
        Self::signed(left as isize, input, right as isize)
    }

    #[inline]
    pub fn signed(left: isize, input: usize, right: isize) -> Self {
        Self {
            left: left.max(0) as usize,
            input,
            right: right.max(0) as usize,
            skip: left.min(0).unsigned_abs(),
            trim: right.min(0).unsigned_abs(),
        }
    }

    #[inline]
    pub fn of(desc: &TileDescriptor, axis: usize) -> Self {
        Self::signed(desc.left_pad[axis], desc.in_shape[axis], desc.right_pad(axis))
    }

    #[inline]
    pub fn is_cropped(&self) -> bool {
        self.skip + self.trim > 0
    }

    #[inline]
    pub fn out(&self) -> usize {
        self.left + self.input + self.right - self.skip - self.trim
    }

    /// Output rows copied straight from the input.
    #[inline]
    pub fn body(&self) -> Range<usize> {
        self.left..self.left + self.input - self.skip - self.trim
    }

    /// Input row behind output row `out` of the body, or the nearest body row outside it.
    #[inline]
    pub fn clamp_source(&self, out: usize) -> usize {
        let body = self.body();
        if body.is_empty() {
            0
        } else {
            out.clamp(body.start, body.end - 1) - body.start + self.skip
        }
    }
}

/// Position of one output coordinate relative to the body of its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// `distance` rows before the first body row (1 for the row just left of it).
    LeftPad(usize),
    /// Body row, carrying its input index.
    Body(usize),
    /// `distance` rows past the last body row (0 for the row just right of it).
    RightPad(usize),
}

/// Classifies output row `out`; cropped rows are skipped before it is placed.
#[inline]
pub fn classify(axis: &AxisExtent, out: usize) -> Region {
    debug_assert!(out < axis.out());
    let at = out + axis.skip;
    if at < axis.left {
        Region::LeftPad(axis.left - at)
    } else if at < axis.left + axis.input {
        Region::Body(at - axis.left)
    } else {
        Region::RightPad(at - axis.left - axis.input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    LeftPad,
    Body,
    RightPad,
}

/// How the rows of a segment land in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Row `src + k` goes to output `dst + k`.
    Copy,
    /// Row `src + k` goes to output `dst + len - 1 - k`.
    Mirror,
    /// Row `src` is repeated over `count` output rows.
    Broadcast(usize),
    /// `count` output rows take the constant fill.
    Fill(usize),
}

/// One contribution of an input window to the output of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: RegionKind,
    /// First source row, relative to the window start.
    pub src: usize,
    /// Source rows read.
    pub len: usize,
    /// Lowest output coordinate written.
    pub dst: usize,
    pub placement: Placement,
}

impl Segment {
    /// Output rows written by the segment.
    #[inline]
    pub fn span(&self) -> usize {
        match self.placement {
            Placement::Copy | Placement::Mirror => self.len,
            Placement::Broadcast(count) | Placement::Fill(count) => count,
        }
    }

    #[inline]
    pub fn outputs(&self) -> Range<usize> {
        self.dst..self.dst + self.span()
    }

    /// Window-relative source row of output coordinate `out`, `None` for a fill.
    #[inline]
    pub fn source_of(&self, out: usize) -> Option<usize> {
        debug_assert!(self.outputs().contains(&out));
        match self.placement {
            Placement::Copy => Some(self.src + (out - self.dst)),
            Placement::Mirror => Some(self.src + self.len - 1 - (out - self.dst)),
            Placement::Broadcast(_) => Some(self.src),
            Placement::Fill(_) => None,
        }
    }
}

/// Up to three segments (left pad, body, right pad) in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSet {
    segments: [Segment; 3],
    len: usize,
}

impl RegionSet {
    const EMPTY_SEGMENT: Segment = Segment {
        kind: RegionKind::Body,
        src: 0,
        len: 0,
        dst: 0,
        placement: Placement::Copy,
    };

    #[inline]
    fn new() -> Self {
        Self {
            segments: [Self::EMPTY_SEGMENT; 3],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, segment: Segment) {
        debug_assert!(self.len < 3);
        self.segments[self.len] = segment;
        self.len += 1;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total output rows written by the window.
    #[inline]
    pub fn span(&self) -> usize {
        self.iter().map(Segment::span).sum()
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Per-axis classifier bound to one descriptor and one pad mode.
#[derive(Debug, Clone, Copy)]
pub struct RegionClassifier {
    axes: [AxisExtent; MAX_DIMS],
    rule: &'static dyn PadRule,
}

impl RegionClassifier {
    pub fn new(desc: &TileDescriptor, mode: ModeKind) -> Self {
        Self {
            axes: std::array::from_fn(|i| {
                if i < desc.dim_count {
                    AxisExtent::of(desc, i)
                } else {
                    AxisExtent::new(0, 1, 0)
                }
            }),
            rule: mode.rule(),
        }
    }

    #[inline]
    pub fn axis(&self, axis: usize) -> &AxisExtent {
        &self.axes[axis]
    }

    #[inline]
    pub fn mode(&self) -> ModeKind {
        self.rule.kind()
    }

    /// Input row read by output coordinate `out` of `axis`, `None` for a constant fill.
    #[inline]
    pub fn source_index(&self, axis: usize, out: usize) -> Option<usize> {
        let extent = &self.axes[axis];
        self.rule.source_index(extent, classify(extent, out))
    }

    /// Output segments of the input window `[start, start + len)` on `axis`.
    pub fn segments(&self, axis: usize, start: usize, len: usize) -> RegionSet {
        let extent = &self.axes[axis];
        let window = start..start + len;
        debug_assert!(window.end <= extent.input);
        debug_assert!(!extent.is_cropped());

        let mut set = RegionSet::new();
        if let Some(segment) = self.pad_segment(extent, Side::Left, &window) {
            set.push(segment);
        }
        if len > 0 {
            set.push(Segment {
                kind: RegionKind::Body,
                src: 0,
                len,
                dst: extent.left + start,
                placement: Placement::Copy,
            });
        }
        if let Some(segment) = self.pad_segment(extent, Side::Right, &window) {
            set.push(segment);
        }
        set
    }

    fn pad_segment(
        &self,
        extent: &AxisExtent,
        side: Side,
        window: &Range<usize>,
    ) -> Option<Segment> {
        let (kind, base, count) = match side {
            Side::Left => (RegionKind::LeftPad, 0, extent.left),
            Side::Right => (RegionKind::RightPad, extent.left + extent.input, extent.right),
        };

        match self.rule.feed(extent, side) {
            Feed::None => None,
            Feed::Fill { owner } => window.contains(&owner).then(|| Segment {
                kind,
                src: owner - window.start,
                len: 1,
                dst: base,
                placement: Placement::Fill(count),
            }),
            Feed::Broadcast { owner } => window.contains(&owner).then(|| Segment {
                kind,
                src: owner - window.start,
                len: 1,
                dst: base,
                placement: Placement::Broadcast(count),
            }),
            Feed::Shift { rows } => {
                let (lo, hi) = intersect(window, &rows)?;
                Some(Segment {
                    kind,
                    src: lo - window.start,
                    len: hi - lo,
                    dst: base + (lo - rows.start),
                    placement: Placement::Copy,
                })
            }
            Feed::Reverse { rows } => {
                let (lo, hi) = intersect(window, &rows)?;
                Some(Segment {
                    kind,
                    src: lo - window.start,
                    len: hi - lo,
                    dst: base + (rows.end - hi),
                    placement: Placement::Mirror,
                })
            }
        }
    }
}

#[inline]
fn intersect(a: &Range<usize>, b: &Range<usize>) -> Option<(usize, usize)> {
    let lo = a.start.max(b.start);
    let hi = a.end.min(b.end);
    (lo < hi).then_some((lo, hi))
}
