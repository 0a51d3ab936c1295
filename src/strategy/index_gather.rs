//! Output-aligned tiles moved through precomputed lane tables.
//!
//! A tile holds `split_factor` output rows of the split axis. Copy-in stages the source
//! input row of every output row (plus one fill lane); compute turns each staged input row
//! into its output row with one gather or one scatter; copy-out writes the rows back in a
//! single contiguous run.

use super::Launch;
use crate::{
    coord::{CoordinateDecomposer, TileCoordinate},
    pipeline::TileStages,
    region::RegionClassifier,
    vector::VectorBatchOp,
    Element, TileDescriptor,
};

/// Per-launch lane tables of one split-axis row, shared by every tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneTables {
    /// Input lane read by every output lane; the fill lane is `row_in`.
    pub gather: Vec<u32>,
    /// `(input lane, output lane)` for every output lane with a source, by input lane.
    pub scatter: Vec<(u32, u32)>,
    /// Output lanes without a source.
    pub pad: Vec<u32>,
}

impl LaneTables {
    pub fn build(desc: &TileDescriptor, classifier: &RegionClassifier) -> Self {
        let s = desc.split_axis;
        let dims = desc.dim_count;
        let row_in = desc.in_inner(s);
        let row_out = desc.out_inner(s);

        let mut tables = Self {
            gather: Vec::with_capacity(row_out),
            scatter: Vec::with_capacity(row_out),
            pad: Vec::new(),
        };
        for lane in 0..row_out {
            let mut rest = lane;
            let mut source = Some(0);
            for axis in (s + 1..dims).rev() {
                let c = rest % desc.out_shape[axis];
                rest /= desc.out_shape[axis];
                source = source
                    .zip(classifier.source_index(axis, c))
                    .map(|(acc, k)| acc + k * desc.in_stride[axis]);
            }
            match source {
                Some(from) => {
                    tables.gather.push(from as u32);
                    tables.scatter.push((from as u32, lane as u32));
                }
                None => {
                    tables.gather.push(row_in as u32);
                    tables.pad.push(lane as u32);
                }
            }
        }
        tables.scatter.sort_unstable();
        tables
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OutputTile {
    coord: TileCoordinate,
    /// Input offset of the outer axes, `None` when one of them is a constant pad.
    base: Option<usize>,
}

/// Copy-in and copy-out shared by the gather and scatter variants.
#[derive(Debug)]
struct OutputRows<'a, T, V> {
    launch: &'a Launch<'a, T, V>,
    row_in: usize,
    row_out: usize,
    /// Elements of the staged input rows; output rows follow.
    in_area: usize,
}

impl<'a, T: Element, V: VectorBatchOp> OutputRows<'a, T, V> {
    fn new(launch: &'a Launch<'a, T, V>) -> Self {
        let desc = launch.desc;
        let s = desc.split_axis;
        let row_in = desc.in_inner(s);
        Self {
            launch,
            row_in,
            row_out: desc.out_inner(s),
            in_area: desc.split_factor * (row_in + 1),
        }
    }

    fn locate(&self, index: usize) -> OutputTile {
        let desc = self.launch.desc;
        let coord = CoordinateDecomposer::new(desc).output_tile(index);
        let base = (0..desc.split_axis).try_fold(0, |acc, axis| {
            self.launch
                .classifier
                .source_index(axis, coord.out_index[axis])
                .map(|k| acc + k * desc.in_stride[axis])
        });
        OutputTile { coord, base }
    }

    /// Input offset of the row feeding output row `t` of the tile.
    #[inline]
    fn row_source(&self, tile: &OutputTile, t: usize) -> Option<usize> {
        let desc = self.launch.desc;
        let s = desc.split_axis;
        let base = tile.base?;
        let k = self
            .launch
            .classifier
            .source_index(s, tile.coord.out_index[s] + t)?;
        Some(base + k * desc.in_stride[s])
    }

    fn copy_in(&self, tile: &OutputTile, slot: &mut [T]) {
        let stride = self.row_in + 1;
        for t in 0..tile.coord.out_copy_len {
            if let Some(from) = self.row_source(tile, t) {
                let row = &mut slot[t * stride..(t + 1) * stride];
                let (lanes, fill_lane) = row.split_at_mut(self.row_in);
                self.launch
                    .vector
                    .copy(lanes, &self.launch.input[from..from + self.row_in]);
                fill_lane[0] = self.launch.fill;
            }
        }
    }

    /// Runs `body` on every (input row, output row) pair with a source and fills the rest.
    fn for_each_row(&self, tile: &OutputTile, slot: &mut [T], body: impl Fn(&mut [T], &[T])) {
        let stride = self.row_in + 1;
        let (ins, outs) = slot.split_at_mut(self.in_area);
        for t in 0..tile.coord.out_copy_len {
            let out_row = &mut outs[t * self.row_out..(t + 1) * self.row_out];
            if self.row_source(tile, t).is_some() {
                body(out_row, &ins[t * stride..(t + 1) * stride]);
            } else {
                self.launch.vector.fill(out_row, self.launch.fill);
            }
        }
    }

    fn copy_out(&self, tile: &OutputTile, slot: &[T]) {
        let len = tile.coord.out_copy_len * self.row_out;
        let outs = &slot[self.in_area..self.in_area + len];
        self.launch.emit(tile.coord.out_offset(self.launch.desc), outs);
    }
}

/// Value selection: every output lane gathers from its input lane or the fill lane.
#[derive(Debug)]
pub struct IndexGather<'a, T, V> {
    rows: OutputRows<'a, T, V>,
}

impl<'a, T: Element, V: VectorBatchOp> IndexGather<'a, T, V> {
    pub fn new(launch: &'a Launch<'a, T, V>) -> Self {
        Self {
            rows: OutputRows::new(launch),
        }
    }
}

impl<T: Element, V: VectorBatchOp> TileStages<T> for IndexGather<'_, T, V> {
    type Tile = OutputTile;

    fn locate(&self, index: usize) -> OutputTile {
        self.rows.locate(index)
    }

    fn copy_in(&self, tile: &OutputTile, slot: &mut [T]) {
        self.rows.copy_in(tile, slot);
    }

    fn compute(&self, tile: &OutputTile, slot: &mut [T]) {
        let launch = self.rows.launch;
        self.rows.for_each_row(tile, slot, |out, input| {
            launch.vector.gather(out, input, &launch.lanes.gather)
        });
    }

    fn copy_out(&self, tile: &OutputTile, slot: &[T]) {
        self.rows.copy_out(tile, slot);
    }
}

/// Every input lane is written to each output lane it feeds; pad lanes keep the fill
/// value written when the slot was prepared.
#[derive(Debug)]
pub struct IndexScatter<'a, T, V> {
    rows: OutputRows<'a, T, V>,
}

impl<'a, T: Element, V: VectorBatchOp> IndexScatter<'a, T, V> {
    pub fn new(launch: &'a Launch<'a, T, V>) -> Self {
        Self {
            rows: OutputRows::new(launch),
        }
    }
}

impl<T: Element, V: VectorBatchOp> TileStages<T> for IndexScatter<'_, T, V> {
    type Tile = OutputTile;

    fn prepare(&self, slot: &mut [T]) {
        let rows = &self.rows;
        let fill = rows.launch.fill;
        let outs = &mut slot[rows.in_area..];
        if rows.row_out == 0 {
            return;
        }
        for row in outs.chunks_exact_mut(rows.row_out) {
            for &lane in &rows.launch.lanes.pad {
                row[lane as usize] = fill;
            }
        }
    }

    fn locate(&self, index: usize) -> OutputTile {
        self.rows.locate(index)
    }

    fn copy_in(&self, tile: &OutputTile, slot: &mut [T]) {
        self.rows.copy_in(tile, slot);
    }

    fn compute(&self, tile: &OutputTile, slot: &mut [T]) {
        let launch = self.rows.launch;
        self.rows.for_each_row(tile, slot, |out, input| {
            launch.vector.scatter(out, input, &launch.lanes.scatter)
        });
    }

    fn copy_out(&self, tile: &OutputTile, slot: &[T]) {
        self.rows.copy_out(tile, slot);
    }
}
