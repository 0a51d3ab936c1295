//! Per-element classification over the flattened output.

use std::ops::Range;

use super::Launch;
use crate::{
    coord::FlatDecomposer, descriptor::MAX_DIMS, pipeline::TileStages, vector::VectorBatchOp,
    Element,
};

#[derive(Debug)]
pub struct ElementFallback<'a, T, V> {
    launch: &'a Launch<'a, T, V>,
    flat: FlatDecomposer,
    out_len: usize,
}

impl<'a, T: Element, V: VectorBatchOp> ElementFallback<'a, T, V> {
    pub fn new(launch: &'a Launch<'a, T, V>) -> Self {
        Self {
            launch,
            flat: FlatDecomposer::new(launch.desc),
            out_len: launch.desc.out_len(),
        }
    }

    /// Input offset of output element `flat`, `None` when it takes the fill.
    #[inline]
    fn source(&self, flat: usize, coord: &mut [usize; MAX_DIMS]) -> Option<usize> {
        let desc = self.launch.desc;
        self.flat.decompose(flat, coord);
        (0..desc.dim_count).try_fold(0, |acc, axis| {
            self.launch
                .classifier
                .source_index(axis, coord[axis])
                .map(|k| acc + k * desc.in_stride[axis])
        })
    }
}

impl<T: Element, V: VectorBatchOp> TileStages<T> for ElementFallback<'_, T, V> {
    type Tile = Range<usize>;

    fn locate(&self, index: usize) -> Range<usize> {
        let f = self.launch.desc.split_factor;
        index * f..((index + 1) * f).min(self.out_len)
    }

    fn copy_in(&self, tile: &Range<usize>, slot: &mut [T]) {
        let mut coord = [0; MAX_DIMS];
        for (lane, flat) in slot.iter_mut().zip(tile.clone()) {
            *lane = match self.source(flat, &mut coord) {
                Some(from) => self.launch.input[from],
                None => self.launch.fill,
            };
        }
    }

    fn copy_out(&self, tile: &Range<usize>, slot: &[T]) {
        self.launch.emit(tile.start, &slot[..tile.len()]);
    }
}
