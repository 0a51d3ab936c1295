//! Several split-axis rows per tile, each staged output-shaped over the inner axes.
//!
//! Copy-in embeds every input row at its body position. Pad compute fills the inner-axis
//! pads row by row, one axis at a time from outer to inner; the last axis reuses one lane
//! pattern for every line. Copy-out expands the split axis and the outer axes through
//! their region sets.

use super::{embed_block, for_each_outer_target, move_block, outer_sets, Launch};
use crate::{
    coord::{CoordinateDecomposer, TileCoordinate},
    descriptor::MAX_DIMS,
    key::ModeKind,
    pipeline::TileStages,
    region::{Placement, RegionSet},
    vector::VectorBatchOp,
    Element,
};

#[derive(Debug, Clone, Copy)]
pub struct BatchTile {
    coord: TileCoordinate,
    outer: [RegionSet; MAX_DIMS],
    split: RegionSet,
}

#[derive(Debug)]
pub struct BatchedTile<'a, T, V> {
    launch: &'a Launch<'a, T, V>,
    row_in: usize,
    row_out: usize,
    /// Last-axis sources of the left and right pad lanes, relative to the line body.
    left_lanes: Vec<u32>,
    right_lanes: Vec<u32>,
    /// One output row of fill values; constant mode only.
    fill_row: Vec<T>,
}

impl<'a, T: Element, V: VectorBatchOp> BatchedTile<'a, T, V> {
    pub fn new(launch: &'a Launch<'a, T, V>) -> Self {
        let desc = launch.desc;
        let s = desc.split_axis;
        let last = desc.dim_count - 1;
        let classifier = &launch.classifier;
        let constant = launch.key.mode == ModeKind::Constant;

        let (left_lanes, right_lanes) = if last > s && !constant {
            let axis = classifier.axis(last);
            let lane = |out: usize| classifier.source_index(last, out).unwrap_or(0) as u32;
            (
                (0..axis.left).map(lane).collect(),
                (axis.body().end..axis.out()).map(lane).collect(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let row_out = desc.out_inner(s);
        Self {
            launch,
            row_in: desc.in_inner(s),
            row_out,
            left_lanes,
            right_lanes,
            fill_row: if constant {
                vec![launch.fill; row_out]
            } else {
                Vec::new()
            },
        }
    }

    fn pad_row(&self, row: &mut [T]) {
        let desc = self.launch.desc;
        let classifier = &self.launch.classifier;
        let vector = &self.launch.vector;
        let fill = self.launch.fill;
        let s = desc.split_axis;
        let dims = desc.dim_count;
        if s + 1 >= dims {
            return;
        }
        let last = dims - 1;

        for axis in s + 1..last {
            let extent = *classifier.axis(axis);
            if extent.left + extent.right == 0 {
                continue;
            }
            let inner = desc.out_stride[axis];
            let plane = extent.out() * inner;
            let planes: usize = desc.out_shape[s + 1..axis].iter().product();
            for o in 0..planes {
                let base = o * plane;
                for p in (0..extent.left).chain(extent.body().end..extent.out()) {
                    let to = base + p * inner;
                    match classifier.source_index(axis, p) {
                        Some(k) => {
                            let from = base + (extent.left + k) * inner;
                            move_block(vector, row, from, to, inner)
                        }
                        None => vector.fill(&mut row[to..to + inner], fill),
                    }
                }
            }
        }

        let extent = *classifier.axis(last);
        if extent.left + extent.right == 0 {
            return;
        }
        for line in row.chunks_exact_mut(extent.out()) {
            let (left, rest) = line.split_at_mut(extent.left);
            let (body, right) = rest.split_at_mut(extent.input);
            if self.fill_row.is_empty() {
                vector.gather(left, body, &self.left_lanes);
                vector.gather(right, body, &self.right_lanes);
            } else {
                vector.fill(left, fill);
                vector.fill(right, fill);
            }
        }
    }
}

impl<T: Element, V: VectorBatchOp> TileStages<T> for BatchedTile<'_, T, V> {
    type Tile = BatchTile;

    fn locate(&self, index: usize) -> BatchTile {
        let desc = self.launch.desc;
        let classifier = &self.launch.classifier;
        let coord = CoordinateDecomposer::new(desc).input_tile(index);
        let s = desc.split_axis;
        BatchTile {
            coord,
            outer: outer_sets(classifier, desc, &coord),
            split: classifier.segments(s, coord.in_index[s], coord.in_copy_len),
        }
    }

    fn copy_in(&self, tile: &BatchTile, slot: &mut [T]) {
        let desc = self.launch.desc;
        let s = desc.split_axis;
        let base = tile.coord.in_offset(desc);
        for r in 0..tile.coord.in_copy_len {
            let from = base + r * desc.in_stride[s];
            embed_block(
                &self.launch.vector,
                desc,
                s + 1,
                &self.launch.input[from..from + self.row_in],
                &mut slot[r * self.row_out..(r + 1) * self.row_out],
            );
        }
    }

    fn compute(&self, tile: &BatchTile, slot: &mut [T]) {
        slot[..tile.coord.in_copy_len * self.row_out]
            .chunks_exact_mut(self.row_out)
            .for_each(|row| self.pad_row(row));
    }

    fn copy_out(&self, tile: &BatchTile, slot: &[T]) {
        let row = self.row_out;
        let launch = self.launch;
        for_each_outer_target(launch.desc, &tile.outer, &mut |base, filled| {
            for segment in &tile.split {
                let at = base + segment.dst * row;
                if filled || matches!(segment.placement, Placement::Fill(_)) {
                    launch.emit_repeated(at, segment.span() * row, &self.fill_row);
                    continue;
                }
                match segment.placement {
                    Placement::Copy => {
                        let rows = segment.src * row..(segment.src + segment.len) * row;
                        launch.emit(at, &slot[rows]);
                    }
                    _ => {
                        for out in segment.outputs() {
                            if let Some(r) = segment.source_of(out) {
                                launch.emit(base + out * row, &slot[r * row..(r + 1) * row]);
                            }
                        }
                    }
                }
            }
        });
    }
}
