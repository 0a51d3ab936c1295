//! Copy strategies. Each one is a [`TileStages`] implementation driven by the unit's
//! [`Pipeline`]; they differ in how tiles are cut and how pad values reach the output.

use crate::{
    coord::TileCoordinate,
    descriptor::MAX_DIMS,
    key::{Strategy, TilingKey},
    memory::GlobalOut,
    pipeline::{Pipeline, TileStages},
    region::{Placement, RegionClassifier, RegionSet},
    vector::VectorBatchOp,
    Element, TileDescriptor,
};

mod batched_tile;
mod element_fallback;
mod index_gather;
mod row_stream;

pub use batched_tile::BatchedTile;
pub use element_fallback::ElementFallback;
pub use index_gather::{IndexGather, IndexScatter, LaneTables};
pub use row_stream::RowStream;


/// Everything a unit needs to run its share of one launch.
#[derive(Debug)]
pub struct Launch<'a, T, V> {
    pub desc: &'a TileDescriptor,
    pub key: TilingKey,
    pub classifier: RegionClassifier,
    pub input: &'a [T],
    pub fill: T,
    pub out: &'a GlobalOut<'a, T>,
    pub vector: V,
    pub lanes: &'a LaneTables,
}

impl<T: Element, V: VectorBatchOp> Launch<'_, T, V> {
    /// Runs `tiles` on `pipeline` with the strategy named by the key.
    pub fn run_unit(&self, pipeline: &mut Pipeline<T>, tiles: std::ops::Range<usize>) -> usize {
        match self.key.strategy {
            Strategy::RowStream => pipeline.run(&RowStream::new(self), tiles),
            Strategy::BatchedTile => pipeline.run(&BatchedTile::new(self), tiles),
            Strategy::IndexGather => pipeline.run(&IndexGather::new(self), tiles),
            Strategy::IndexScatter => pipeline.run(&IndexScatter::new(self), tiles),
            Strategy::ElementFallback => pipeline.run(&ElementFallback::new(self), tiles),
        }
    }

    #[inline]
    pub(crate) fn emit(&self, offset: usize, data: &[T]) {
        // SAFETY: the partition and the region sets give every output element to exactly
        // one (unit, tile, segment); copy-out of a unit runs on a single thread.
        unsafe { self.out.write(offset, data) }
    }

    #[inline]
    pub(crate) fn emit_aligned(&self, offset: usize, data: &[T], block: usize) {
        // SAFETY: see `emit`.
        unsafe { self.out.write_aligned(offset, data, block) }
    }

    /// Writes `count` elements at `offset` by repeating `run`.
    pub(crate) fn emit_repeated(&self, offset: usize, count: usize, run: &[T]) {
        debug_assert!(count == 0 || !run.is_empty());
        let mut done = 0;
        while done < count {
            let n = run.len().min(count - done);
            self.emit(offset + done, &run[..n]);
            done += n;
        }
    }
}

/// Region sets of the outer axes (`0..split_axis`) of an input-aligned tile.
pub(crate) fn outer_sets(
    classifier: &RegionClassifier,
    desc: &TileDescriptor,
    coord: &TileCoordinate,
) -> [RegionSet; MAX_DIMS] {
    std::array::from_fn(|axis| {
        if axis < desc.split_axis {
            classifier.segments(axis, coord.in_index[axis], 1)
        } else {
            classifier.segments(axis, 0, 0)
        }
    })
}

/// Calls `visit(offset, filled)` for every output position the outer axes of an
/// input-aligned tile map to. `offset` covers axes `0..split_axis`; `filled` is set when
/// one of those axes lands in a constant pad.
pub(crate) fn for_each_outer_target(
    desc: &TileDescriptor,
    sets: &[RegionSet; MAX_DIMS],
    visit: &mut dyn FnMut(usize, bool),
) {
    fn walk(
        axis: usize,
        desc: &TileDescriptor,
        sets: &[RegionSet; MAX_DIMS],
        base: usize,
        filled: bool,
        visit: &mut dyn FnMut(usize, bool),
    ) {
        if axis == desc.split_axis {
            visit(base, filled);
            return;
        }
        for segment in &sets[axis] {
            let filled = filled || matches!(segment.placement, Placement::Fill(_));
            for out in segment.outputs() {
                walk(axis + 1, desc, sets, base + out * desc.out_stride[axis], filled, visit);
            }
        }
    }

    walk(0, desc, sets, 0, false, visit);
}

/// Copies one input block shaped `in_shape[from..]` into an output-shaped block, at the
/// body position of every axis. Both blocks use the descriptor's row-major strides.
pub(crate) fn embed_block<T: Copy, V: VectorBatchOp>(
    vector: &V,
    desc: &TileDescriptor,
    from: usize,
    src: &[T],
    dst: &mut [T],
) {
    let dims = desc.dim_count;
    if from >= dims {
        dst[0] = src[0];
        return;
    }

    let last = dims - 1;
    let line = desc.in_shape[last];
    let lines: usize = desc.in_shape[from..last].iter().product();
    for q in 0..lines {
        let mut rest = q;
        let mut at = desc.left(last);
        for axis in (from..last).rev() {
            let c = rest % desc.in_shape[axis];
            rest /= desc.in_shape[axis];
            at += (c + desc.left(axis)) * desc.out_stride[axis];
        }
        vector.copy(&mut dst[at..at + line], &src[q * line..(q + 1) * line]);
    }
}

/// Copies `len` elements from `from` to `to` inside one buffer; the ranges do not overlap.
#[inline]
pub(crate) fn move_block<T: Copy, V: VectorBatchOp>(
    vector: &V,
    buf: &mut [T],
    from: usize,
    to: usize,
    len: usize,
) {
    debug_assert!(from + len <= to || to + len <= from);
    if from < to {
        let (head, tail) = buf.split_at_mut(to);
        vector.copy(&mut tail[..len], &head[from..from + len]);
    } else {
        let (head, tail) = buf.split_at_mut(from);
        vector.copy(&mut head[to..to + len], &tail[..len]);
    }
}
