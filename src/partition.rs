//! Static SPMD partition of the tile index space over compute units.

use std::ops::Range;

use crate::TileDescriptor;

/// Maps a compute unit to its contiguous, half-open range of linear tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPartitioner {
    total_tiles: usize,
    tiles_per_unit: usize,
}

impl WorkPartitioner {
    #[inline]
    pub fn new(total_tiles: usize, tiles_per_unit: usize) -> Self {
        Self {
            total_tiles,
            tiles_per_unit,
        }
    }

    #[inline]
    pub fn from_descriptor(desc: &TileDescriptor) -> Self {
        Self::new(desc.total_tiles, desc.tiles_per_unit)
    }

    /// Tiles owned by `unit`, or `None` when the unit has nothing to do.
    ///
    /// Running out of tiles is the normal outcome for the trailing units when the tile
    /// count does not divide evenly; it is not an error.
    #[inline]
    pub fn range(&self, unit: usize) -> Option<Range<usize>> {
        let start = unit.checked_mul(self.tiles_per_unit)?;
        if start >= self.total_tiles {
            return None;
        }
        let end = (start + self.tiles_per_unit).min(self.total_tiles);
        Some(start..end)
    }

    /// Units that receive at least one tile.
    #[inline]
    pub fn busy_units(&self) -> usize {
        if self.tiles_per_unit == 0 {
            0
        } else {
            self.total_tiles.div_ceil(self.tiles_per_unit)
        }
    }
}
