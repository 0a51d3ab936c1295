//! Streams the last axis in chunks of `split_factor` elements.
//!
//! Staging slot layout: `[chunk area | left run | right run]`. The chunk area is one block
//! wider than a chunk so the chunk can sit at the same block offset it has in the output
//! row. Pad runs are built in the run areas (mirror, broadcast) or prefilled once (constant);
//! circular pads are copied straight from the chunk.

use super::{for_each_outer_target, outer_sets, Launch};
use crate::{
    coord::{CoordinateDecomposer, TileCoordinate},
    descriptor::{block_elems, MAX_DIMS},
    key::ModeKind,
    pipeline::TileStages,
    region::{Placement, RegionKind, RegionSet},
    vector::VectorBatchOp,
    Element,
};

#[derive(Debug, Clone, Copy)]
pub struct RowTile {
    coord: TileCoordinate,
    outer: [RegionSet; MAX_DIMS],
    split: RegionSet,
    /// Position of the chunk inside the chunk area.
    lead: usize,
}

#[derive(Debug)]
pub struct RowStream<'a, T, V> {
    launch: &'a Launch<'a, T, V>,
    chunk: usize,
    block: usize,
}

impl<'a, T: Element, V: VectorBatchOp> RowStream<'a, T, V> {
    pub fn new(launch: &'a Launch<'a, T, V>) -> Self {
        Self {
            launch,
            chunk: launch.desc.split_factor,
            block: block_elems(std::mem::size_of::<T>()),
        }
    }

    /// Splits a slot into chunk area, left run and right run.
    #[inline]
    fn areas<'s>(&self, slot: &'s mut [T]) -> (&'s mut [T], &'s mut [T], &'s mut [T]) {
        let (chunk, runs) = slot.split_at_mut(self.chunk + self.block);
        let (left, right) = runs.split_at_mut(self.chunk);
        (chunk, left, &mut right[..self.chunk])
    }
}

impl<T: Element, V: VectorBatchOp> TileStages<T> for RowStream<'_, T, V> {
    type Tile = RowTile;

    fn prepare(&self, slot: &mut [T]) {
        if self.launch.key.mode == ModeKind::Constant {
            let fill = self.launch.fill;
            let (_, left, right) = self.areas(slot);
            self.launch.vector.fill(left, fill);
            self.launch.vector.fill(right, fill);
        }
    }

    fn locate(&self, index: usize) -> RowTile {
        let desc = self.launch.desc;
        let classifier = &self.launch.classifier;
        let coord = CoordinateDecomposer::new(desc).input_tile(index);
        let s = desc.split_axis;
        RowTile {
            coord,
            outer: outer_sets(classifier, desc, &coord),
            split: classifier.segments(s, coord.in_index[s], coord.in_copy_len),
            lead: coord.out_index[s] % self.block,
        }
    }

    fn copy_in(&self, tile: &RowTile, slot: &mut [T]) {
        let from = tile.coord.in_offset(self.launch.desc);
        let len = tile.coord.in_copy_len;
        self.launch.vector.copy(
            &mut slot[tile.lead..tile.lead + len],
            &self.launch.input[from..from + len],
        );
    }

    fn compute(&self, tile: &RowTile, slot: &mut [T]) {
        let vector = &self.launch.vector;
        let (chunk, left, right) = self.areas(slot);
        let chunk = &chunk[tile.lead..];
        for segment in &tile.split {
            let run = match segment.kind {
                RegionKind::LeftPad => &mut *left,
                RegionKind::RightPad => &mut *right,
                RegionKind::Body => continue,
            };
            match segment.placement {
                Placement::Mirror => vector.reverse(
                    &mut run[..segment.len],
                    &chunk[segment.src..segment.src + segment.len],
                ),
                Placement::Broadcast(_) => vector.fill(run, chunk[segment.src]),
                Placement::Copy | Placement::Fill(_) => {}
            }
        }
    }

    fn copy_out(&self, tile: &RowTile, slot: &[T]) {
        let launch = self.launch;
        let (chunk_area, runs) = slot.split_at(self.chunk + self.block);
        let (left, right) = runs.split_at(self.chunk);
        let right = &right[..self.chunk];
        let chunk = &chunk_area[tile.lead..];

        for_each_outer_target(launch.desc, &tile.outer, &mut |base, filled| {
            for segment in &tile.split {
                let at = base + segment.dst;
                let run = match segment.kind {
                    RegionKind::LeftPad => left,
                    RegionKind::RightPad => right,
                    RegionKind::Body => chunk,
                };
                if filled {
                    // constant mode: both runs hold the fill value
                    launch.emit_repeated(at, segment.span(), left);
                    continue;
                }
                match segment.placement {
                    Placement::Copy => launch.emit_aligned(
                        at,
                        &chunk[segment.src..segment.src + segment.len],
                        self.block,
                    ),
                    Placement::Mirror => launch.emit_aligned(at, &run[..segment.len], self.block),
                    Placement::Broadcast(count) | Placement::Fill(count) => {
                        launch.emit_repeated(at, count, run)
                    }
                }
            }
        });
    }
}
