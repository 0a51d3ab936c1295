//! The fixed-layout tiling descriptor shared between the host layer and the kernel.

use crate::{
    error::PadError,
    key::{Strategy, TilingKey, Walk},
};

/// Highest tensor rank the descriptor can carry.
pub const MAX_DIMS: usize = 8;

/// Bytes of one hardware-aligned transfer block.
pub const BLOCK_BYTES: usize = 32;

/// Default staging budget per slot when the caller does not pick a split.
pub const DEFAULT_STAGING_BYTES: usize = 64 * 1024;

/// Elements per aligned transfer block for an element of `elem_size` bytes.
#[inline]
pub fn block_elems(elem_size: usize) -> usize {
    (BLOCK_BYTES / elem_size.max(1)).max(1)
}

/// Dense, rank-8 tiling layout handed to the kernel by value.
///
/// Axes at or above `dim_count` are inert (extent 1, zero stride, zero pad). The right pad
/// of an axis is not stored; it is always `out_shape - in_shape - left_pad`. A negative pad
/// crops that many rows off the side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct TileDescriptor {
    pub dim_count: usize,
    pub split_axis: usize,
    pub split_factor: usize,
    pub in_shape: [usize; MAX_DIMS],
    pub out_shape: [usize; MAX_DIMS],
    pub in_stride: [usize; MAX_DIMS],
    pub out_stride: [usize; MAX_DIMS],
    pub left_pad: [isize; MAX_DIMS],
    pub tile_bytes: usize,
    pub total_tiles: usize,
    pub tiles_per_unit: usize,
    pub unit_count: usize,
}

impl TileDescriptor {
    #[inline]
    pub fn right_pad(&self, axis: usize) -> isize {
        self.out_shape[axis] as isize - self.in_shape[axis] as isize - self.left_pad[axis]
    }

    /// Left pad of a validated descriptor that does not crop.
    #[inline]
    pub(crate) fn left(&self, axis: usize) -> usize {
        debug_assert!(self.left_pad[axis] >= 0);
        self.left_pad[axis] as usize
    }

    #[inline]
    pub fn in_len(&self) -> usize {
        self.in_shape[..self.dim_count].iter().product()
    }

    #[inline]
    pub fn out_len(&self) -> usize {
        self.out_shape[..self.dim_count].iter().product()
    }

    /// Input elements held by one split-axis row, i.e. the product of the axes below `axis`.
    #[inline]
    pub fn in_inner(&self, axis: usize) -> usize {
        self.in_shape[axis + 1..self.dim_count].iter().product()
    }

    #[inline]
    pub fn out_inner(&self, axis: usize) -> usize {
        self.out_shape[axis + 1..self.dim_count].iter().product()
    }

    /// Number of tiles the given strategy visits for this layout.
    pub fn tiles_for(&self, strategy: Strategy) -> usize {
        if self.out_len() == 0 {
            return 0;
        }
        let s = self.split_axis;
        let f = self.split_factor.max(1);
        match strategy.walk() {
            Walk::Input => {
                self.in_shape[..s].iter().product::<usize>() * self.in_shape[s].div_ceil(f)
            }
            Walk::Output => {
                self.out_shape[..s].iter().product::<usize>() * self.out_shape[s].div_ceil(f)
            }
            Walk::Flat => self.out_len().div_ceil(f),
        }
    }

    /// Extent the split factor counts rows of: the split axis of the walked tensor, or the
    /// whole output for the flat walk.
    #[inline]
    pub fn split_extent(&self, strategy: Strategy) -> usize {
        match strategy.walk() {
            Walk::Input => self.in_shape[self.split_axis],
            Walk::Output => self.out_shape[self.split_axis],
            Walk::Flat => self.out_len(),
        }
    }

    /// Staging elements one pipeline slot needs for `strategy`, `None` on overflow.
    pub fn staging_elems(&self, strategy: Strategy, elem_size: usize) -> Option<usize> {
        let s = self.split_axis;
        let f = self.split_factor;
        match strategy {
            // chunk, left-pad run, right-pad run, plus slack for the unaligned head
            Strategy::RowStream => f.checked_mul(3)?.checked_add(block_elems(elem_size)),
            Strategy::BatchedTile => f.checked_mul(self.out_inner(s)),
            Strategy::IndexGather | Strategy::IndexScatter => {
                let rows = self.in_inner(s).checked_add(1)?.checked_add(self.out_inner(s))?;
                f.checked_mul(rows)
            }
            Strategy::ElementFallback => Some(f),
        }
    }

    /// Staging bytes of one slot, `None` on overflow.
    #[inline]
    pub fn staging_bytes(&self, strategy: Strategy, elem_size: usize) -> Option<usize> {
        self.staging_elems(strategy, elem_size)?.checked_mul(elem_size)
    }

    /// Host-side legality checks; the kernel assumes all of them hold.
    pub fn validate(&self, key: TilingKey, elem_size: usize) -> Result<(), PadError> {
        let dims = self.dim_count;
        if dims == 0 || dims > MAX_DIMS {
            return Err(PadError::UnsupportedRank(dims));
        }
        if self.unit_count == 0 {
            return Err(PadError::NoUnits);
        }

        let out_len = self.out_len();
        let mut in_stride = 1;
        let mut out_stride = 1;
        for axis in (0..dims).rev() {
            if self.in_stride[axis] != in_stride || self.out_stride[axis] != out_stride {
                return Err(PadError::NonContiguousStride { axis });
            }
            in_stride *= self.in_shape[axis];
            out_stride *= self.out_shape[axis];

            let input = self.in_shape[axis];
            let left = self.left_pad[axis];
            let right = self.right_pad(axis);
            let signed = input as isize;
            if signed + left < 0 || signed + right < 0 || signed + left + right < 0 {
                return Err(PadError::CropExceedsInput {
                    axis,
                    left,
                    right,
                    input,
                });
            }
            if (left < 0 || right < 0) && key.strategy.walk() == Walk::Input {
                return Err(PadError::CropOnInputWalk {
                    strategy: key.strategy,
                    axis,
                });
            }

            if key.mode.reads_input() && out_len > 0 && input == 0 {
                return Err(PadError::EmptyAxis {
                    axis,
                    mode: key.mode,
                });
            }
            if let Some(max) = key.mode.max_pad(input) {
                let pad = left.max(right).max(0) as usize;
                if pad > max {
                    return Err(PadError::WrapExceedsPeriod {
                        axis,
                        mode: key.mode,
                        pad,
                        input,
                    });
                }
            }
        }

        self.validate_split(key.strategy, out_len)?;

        let expected = self.tiles_for(key.strategy);
        let covered = self.tiles_per_unit.saturating_mul(self.unit_count);
        if self.total_tiles != expected
            || covered < expected
            || (expected > 0 && self.tiles_per_unit == 0)
        {
            return Err(PadError::TileCountMismatch {
                total: self.total_tiles,
                per_unit: self.tiles_per_unit,
                expected,
            });
        }

        let needed = self
            .staging_bytes(key.strategy, elem_size)
            .unwrap_or(usize::MAX);
        if needed > self.tile_bytes {
            return Err(PadError::StagingOverflow {
                strategy: key.strategy,
                needed,
                available: self.tile_bytes,
            });
        }

        let lanes = match key.strategy {
            Strategy::IndexGather | Strategy::IndexScatter => {
                (self.in_inner(self.split_axis) + 1).max(self.out_inner(self.split_axis))
            }
            Strategy::BatchedTile => self.in_shape[dims - 1],
            _ => 0,
        };
        if u32::try_from(lanes).is_err() {
            return Err(PadError::IndexOverflow(lanes));
        }

        Ok(())
    }

    fn validate_split(&self, strategy: Strategy, out_len: usize) -> Result<(), PadError> {
        if self.split_factor == 0 {
            return Err(PadError::ZeroSplitFactor);
        }
        let dims = self.dim_count;
        let axis = self.split_axis;
        let bad_axis = match strategy {
            Strategy::RowStream => axis != dims - 1,
            Strategy::ElementFallback => false,
            _ => axis >= dims,
        };
        if bad_axis {
            return Err(PadError::InvalidSplitAxis {
                strategy,
                axis,
                rank: dims,
            });
        }
        if strategy.walk() == Walk::Input && out_len > 0 {
            if let Some(axis) = (0..dims).find(|&i| self.in_shape[i] == 0) {
                return Err(PadError::EmptyInputWalk { strategy, axis });
            }
        }
        Ok(())
    }
}

/// Assembles a [`TileDescriptor`] from an input shape and explicit per-axis pads.
///
/// When no split is given, the builder fits the largest block of split rows into the
/// staging budget. An explicit split factor is clamped to the extent it splits. The
/// builder does not choose the strategy; that stays with the caller.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    in_shape: Vec<usize>,
    pads: Vec<[isize; 2]>,
    split: Option<(usize, usize)>,
    units: usize,
    staging_bytes: usize,
}

impl DescriptorBuilder {
    pub fn new(in_shape: &[usize], pads: &[[usize; 2]]) -> Self {
        let pads: Vec<_> = pads
            .iter()
            .map(|side| side.map(|p| isize::try_from(p).unwrap_or(isize::MAX)))
            .collect();
        Self::signed(in_shape, &pads)
    }

    /// Pads may be negative; a negative pad crops rows off that side.
    pub fn signed(in_shape: &[usize], pads: &[[isize; 2]]) -> Self {
        Self {
            in_shape: in_shape.to_vec(),
            pads: pads.to_vec(),
            split: None,
            units: 1,
            staging_bytes: DEFAULT_STAGING_BYTES,
        }
    }

    pub fn split(mut self, axis: usize, factor: usize) -> Self {
        self.split = Some((axis, factor));
        self
    }

    pub fn units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    pub fn staging_bytes(mut self, bytes: usize) -> Self {
        self.staging_bytes = bytes;
        self
    }

    pub fn build(self, key: TilingKey, elem_size: usize) -> Result<TileDescriptor, PadError> {
        let dims = self.in_shape.len();
        if dims == 0 || dims > MAX_DIMS {
            return Err(PadError::UnsupportedRank(dims));
        }
        if self.pads.len() != dims {
            return Err(PadError::UnsupportedRank(self.pads.len()));
        }
        if self.units == 0 {
            return Err(PadError::NoUnits);
        }

        let mut desc = TileDescriptor {
            dim_count: dims,
            split_axis: 0,
            split_factor: 1,
            in_shape: [1; MAX_DIMS],
            out_shape: [1; MAX_DIMS],
            in_stride: [0; MAX_DIMS],
            out_stride: [0; MAX_DIMS],
            left_pad: [0; MAX_DIMS],
            tile_bytes: 0,
            total_tiles: 0,
            tiles_per_unit: 0,
            unit_count: self.units,
        };

        let mut in_stride: usize = 1;
        let mut out_stride: usize = 1;
        for axis in (0..dims).rev() {
            let [left, right] = self.pads[axis];
            let input = self.in_shape[axis];
            let overflow = PadError::ShapeOverflow { axis };
            let out = isize::try_from(input)
                .ok()
                .and_then(|n| n.checked_add(left)?.checked_add(right))
                .ok_or(overflow.clone())?;
            let signed = input as isize;
            if out < 0 || signed + left < 0 || signed + right < 0 {
                return Err(PadError::CropExceedsInput {
                    axis,
                    left,
                    right,
                    input,
                });
            }

            desc.in_shape[axis] = input;
            desc.out_shape[axis] = out as usize;
            desc.left_pad[axis] = left;
            desc.in_stride[axis] = in_stride;
            desc.out_stride[axis] = out_stride;
            in_stride = in_stride.checked_mul(input).ok_or(overflow.clone())?;
            out_stride = out_stride.checked_mul(out as usize).ok_or(overflow)?;
        }

        let (axis, factor) = match self.split {
            Some(split) => split,
            None => fit_split(&desc, key.strategy, elem_size, self.staging_bytes),
        };
        if axis >= dims {
            return Err(PadError::InvalidSplitAxis {
                strategy: key.strategy,
                axis,
                rank: dims,
            });
        }
        desc.split_axis = axis;
        desc.split_factor = factor.min(desc.split_extent(key.strategy).max(1));

        let needed = desc
            .staging_bytes(key.strategy, elem_size)
            .ok_or(PadError::StagingOverflow {
                strategy: key.strategy,
                needed: usize::MAX,
                available: self.staging_bytes,
            })?;
        desc.tile_bytes = if self.split.is_some() {
            self.staging_bytes.max(needed)
        } else {
            needed
        };
        desc.total_tiles = desc.tiles_for(key.strategy);
        desc.tiles_per_unit = desc.total_tiles.div_ceil(self.units);

        desc.validate(key, elem_size)?;
        Ok(desc)
    }
}

/// Picks the outermost split axis whose single row fits `budget`, then as many rows as fit.
fn fit_split(
    desc: &TileDescriptor,
    strategy: Strategy,
    elem_size: usize,
    budget: usize,
) -> (usize, usize) {
    let dims = desc.dim_count;
    let budget_elems = (budget / elem_size.max(1)).max(1);

    match strategy {
        Strategy::RowStream => {
            let axis = dims - 1;
            let room = budget_elems.saturating_sub(block_elems(elem_size)) / 3;
            (axis, room.clamp(1, desc.in_shape[axis].max(1)))
        }
        Strategy::ElementFallback => (0, budget_elems.min(desc.out_len().max(1))),
        _ => {
            let walk = strategy.walk();
            let row_elems = |axis: usize| match walk {
                Walk::Input => desc.out_inner(axis),
                _ => desc.in_inner(axis) + 1 + desc.out_inner(axis),
            };
            let axis = (0..dims)
                .find(|&axis| row_elems(axis) <= budget_elems)
                .unwrap_or(dims - 1);
            let extent = match walk {
                Walk::Input => desc.in_shape[axis],
                _ => desc.out_shape[axis],
            };
            let rows = budget_elems / row_elems(axis).max(1);
            (axis, rows.clamp(1, extent.max(1)))
        }
    }
}
