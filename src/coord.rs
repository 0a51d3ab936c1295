//! Mixed-radix unranking of linear tile indices into per-axis coordinates.

use crate::{descriptor::MAX_DIMS, region::AxisExtent, TileDescriptor};

/// Per-axis position of one tile, rebuilt every loop iteration.
///
/// Axes below the split axis are held whole by the tile and stay at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoordinate {
    pub in_index: [usize; MAX_DIMS],
    pub out_index: [usize; MAX_DIMS],
    /// Input rows of the split axis inside the tile; 0 when the tile is entirely pad.
    pub in_copy_len: usize,
    /// Output rows of the split axis the tile spans (output-driven walks only).
    pub out_copy_len: usize,
}

impl TileCoordinate {
    const ORIGIN: TileCoordinate = TileCoordinate {
        in_index: [0; MAX_DIMS],
        out_index: [0; MAX_DIMS],
        in_copy_len: 0,
        out_copy_len: 0,
    };

    /// Linear offset of the tile's first input element.
    #[inline]
    pub fn in_offset(&self, desc: &TileDescriptor) -> usize {
        (0..desc.dim_count)
            .map(|i| self.in_index[i] * desc.in_stride[i])
            .sum()
    }

    #[inline]
    pub fn out_offset(&self, desc: &TileDescriptor) -> usize {
        (0..desc.dim_count)
            .map(|i| self.out_index[i] * desc.out_stride[i])
            .sum()
    }
}

/// Converts linear tile indices to [`TileCoordinate`]s, from either side of the pad.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateDecomposer<'a> {
    desc: &'a TileDescriptor,
}

impl<'a> CoordinateDecomposer<'a> {
    #[inline]
    pub fn new(desc: &'a TileDescriptor) -> Self {
        Self { desc }
    }

    /// Unranks over the input shape: the tile holds `split_factor` input rows and its
    /// output position is the input position shifted by the left pad.
    pub fn input_tile(&self, index: usize) -> TileCoordinate {
        let d = self.desc;
        let s = d.split_axis;
        let f = d.split_factor;
        let mut tile = TileCoordinate::ORIGIN;
        let mut rest = index;

        for i in (0..=s).rev() {
            let radix = if i == s {
                d.in_shape[i].div_ceil(f)
            } else {
                d.in_shape[i]
            };
            let digit = rest % radix;
            rest /= radix;
            tile.in_index[i] = if i == s { digit * f } else { digit };
            tile.out_index[i] = tile.in_index[i] + d.left(i);
        }

        tile.in_copy_len = f.min(d.in_shape[s] - tile.in_index[s]);
        tile.out_copy_len = tile.in_copy_len;
        tile
    }

    /// Unranks over the output shape: the tile holds `split_factor` output rows, and the
    /// input position is the body row the tile starts from (clamped into the input).
    pub fn output_tile(&self, index: usize) -> TileCoordinate {
        let d = self.desc;
        let s = d.split_axis;
        let f = d.split_factor;
        let mut tile = TileCoordinate::ORIGIN;
        let mut rest = index;

        for i in (0..=s).rev() {
            let radix = if i == s {
                d.out_shape[i].div_ceil(f)
            } else {
                d.out_shape[i]
            };
            let digit = rest % radix;
            rest /= radix;
            tile.out_index[i] = if i == s { digit * f } else { digit };
            tile.in_index[i] = AxisExtent::of(d, i).clamp_source(tile.out_index[i]);
        }

        let start = tile.out_index[s];
        tile.out_copy_len = f.min(d.out_shape[s] - start);

        // body rows of the split axis that fall inside [start, start + out_copy_len)
        let extent = AxisExtent::of(d, s);
        let body = extent.body();
        let lo = start.max(body.start);
        let hi = (start + tile.out_copy_len).min(body.end);
        tile.in_copy_len = hi.saturating_sub(lo);
        if tile.in_copy_len > 0 {
            tile.in_index[s] = lo - body.start + extent.skip;
        }
        tile
    }

    /// Inverse of [`Self::output_tile`] for the tile containing `out_index`.
    pub fn rank_output(&self, out_index: &[usize]) -> usize {
        let d = self.desc;
        let s = d.split_axis;
        (0..=s).fold(0, |acc, i| {
            if i == s {
                acc * d.out_shape[i].div_ceil(d.split_factor) + out_index[i] / d.split_factor
            } else {
                acc * d.out_shape[i] + out_index[i]
            }
        })
    }

    /// Inverse of [`Self::input_tile`] for the tile containing `in_index`.
    pub fn rank_input(&self, in_index: &[usize]) -> usize {
        let d = self.desc;
        let s = d.split_axis;
        (0..=s).fold(0, |acc, i| {
            if i == s {
                acc * d.in_shape[i].div_ceil(d.split_factor) + in_index[i] / d.split_factor
            } else {
                acc * d.in_shape[i] + in_index[i]
            }
        })
    }
}

/// Unsigned division by a runtime-invariant divisor through a multiply-high and a shift.
///
/// Valid for divisors in `1..=2^63` and every 64-bit dividend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastDivisor {
    divisor: u64,
    magic: u64,
    shift: u32,
}

impl FastDivisor {
    pub fn new(divisor: u64) -> Self {
        debug_assert!(divisor >= 1 && divisor <= 1 << 63);
        let divisor = divisor.max(1);
        let shift = 64 - (divisor - 1).leading_zeros();
        let d = divisor as u128;
        let magic = (((1u128 << 64) * ((1u128 << shift) - d)) / d + 1) as u64;
        Self {
            divisor,
            magic,
            shift,
        }
    }

    #[inline]
    pub fn div(&self, n: u64) -> u64 {
        let high = (n as u128 * self.magic as u128) >> 64;
        ((high + n as u128) >> self.shift) as u64
    }

    #[inline]
    pub fn div_rem(&self, n: u64) -> (u64, u64) {
        let q = self.div(n);
        (q, n - q * self.divisor)
    }
}

/// Flat output index to per-axis output coordinates, one magic divisor per stride.
#[derive(Debug, Clone)]
pub struct FlatDecomposer {
    dims: usize,
    strides: [FastDivisor; MAX_DIMS],
}

impl FlatDecomposer {
    pub fn new(desc: &TileDescriptor) -> Self {
        let strides = std::array::from_fn(|i| {
            if i < desc.dim_count {
                FastDivisor::new(desc.out_stride[i].max(1) as u64)
            } else {
                FastDivisor::new(1)
            }
        });
        Self {
            dims: desc.dim_count,
            strides,
        }
    }

    #[inline]
    pub fn decompose(&self, flat: usize, out: &mut [usize; MAX_DIMS]) {
        let mut rest = flat as u64;
        for i in 0..self.dims {
            let (q, r) = self.strides[i].div_rem(rest);
            out[i] = q as usize;
            rest = r;
        }
    }
}
