use ndarray::{Array, ArrayBase, Data, Dim, Dimension, IntoDimension, Ix, RemoveAxis, Slice};
use num::traits::NumAssign;
use tracing::warn;

use crate::{
    descriptor::DEFAULT_STAGING_BYTES,
    kernel::{self, Workspace},
    key::{Strategy, TilingKey},
    DescriptorBuilder, Element, PadError, PaddingMode,
};

mod dim;
mod half_dim;

#[cfg(test)]
mod tests;

pub type ExplicitPadding<const N: usize> = [[usize; 2]; N];

/// Per-axis `[left, right]` pads where a negative pad crops rows off that side.
pub type SignedPadding<const N: usize> = [[isize; 2]; N];

/// Launch options for [`PadExt::pad_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadOptions {
    /// Copy strategy; `None` picks one from the input shape.
    pub strategy: Option<Strategy>,
    /// Parallel compute units.
    pub units: usize,
    /// Explicit `(axis, factor)` split; `None` fits one into `staging_bytes`.
    pub split: Option<(usize, usize)>,
    /// Staging budget of one pipeline slot, in bytes.
    pub staging_bytes: usize,
}

impl Default for PadOptions {
    fn default() -> Self {
        Self {
            strategy: None,
            units: rayon::current_num_threads(),
            split: None,
            staging_bytes: DEFAULT_STAGING_BYTES,
        }
    }
}

impl PadOptions {
    pub const UNITS_ENV: &'static str = "NDARRAY_PAD_UNITS";
    pub const STAGING_BYTES_ENV: &'static str = "NDARRAY_PAD_STAGING_BYTES";

    /// Defaults overridden by `NDARRAY_PAD_UNITS` and `NDARRAY_PAD_STAGING_BYTES`.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(units) = env_usize(Self::UNITS_ENV) {
            options.units = units;
        }
        if let Some(bytes) = env_usize(Self::STAGING_BYTES_ENV) {
            options.staging_bytes = bytes;
        }
        options
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    pub fn with_split(mut self, axis: usize, factor: usize) -> Self {
        self.split = Some((axis, factor));
        self
    }

    pub fn with_staging_bytes(mut self, bytes: usize) -> Self {
        self.staging_bytes = bytes;
        self
    }

    /// The configured strategy, or one picked from the shape: the flat walk for inputs with
    /// an empty axis, the gather walk when an axis is cropped, the row stream when one
    /// output row of the last axis does not fit a staging slot, and the batched walk
    /// otherwise.
    pub fn resolve_strategy(
        &self,
        in_shape: &[usize],
        padding: &[[isize; 2]],
        elem_size: usize,
    ) -> Strategy {
        if let Some(strategy) = self.strategy {
            return strategy;
        }
        if in_shape.contains(&0) {
            return Strategy::ElementFallback;
        }
        if padding.iter().flatten().any(|&p| p < 0) {
            return Strategy::IndexGather;
        }
        let row_bytes = in_shape.last().zip(padding.last()).map(|(&n, &[left, right])| {
            n.saturating_add(left.unsigned_abs())
                .saturating_add(right.unsigned_abs())
                .saturating_mul(elem_size)
        });
        if row_bytes.is_some_and(|bytes| bytes > self.staging_bytes) {
            Strategy::RowStream
        } else {
            Strategy::BatchedTile
        }
    }
}

fn signed_padding<const N: usize>(
    padding: ExplicitPadding<N>,
) -> Result<SignedPadding<N>, PadError> {
    let mut signed = [[0; 2]; N];
    for (axis, (to, from)) in signed.iter_mut().zip(padding).enumerate() {
        for (to, from) in to.iter_mut().zip(from) {
            *to = isize::try_from(from).map_err(|_| PadError::ShapeOverflow { axis })?;
        }
    }
    Ok(signed)
}

fn env_usize(name: &str) -> Option<usize> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(name, value = %value, "ignoring unparsable pad option");
            None
        }
    }
}

pub trait PadExt<const N: usize, T: NumAssign + Copy, Output> {
    fn pad(&self, mode: PaddingMode<T>, padding: ExplicitPadding<N>) -> Result<Output, PadError>;

    fn pad_with(
        &self,
        mode: PaddingMode<T>,
        padding: ExplicitPadding<N>,
        options: &PadOptions,
    ) -> Result<Output, PadError>;

    /// [`PadExt::pad_with`] where a negative pad crops that many rows off its side.
    ///
    /// Pad values are taken relative to the whole input, as if every positive pad were
    /// applied first and the crops after it. Cropping needs an output-aligned strategy;
    /// [`Strategy::RowStream`] and [`Strategy::BatchedTile`] reject it.
    fn pad_signed(
        &self,
        mode: PaddingMode<T>,
        padding: SignedPadding<N>,
        options: &PadOptions,
    ) -> Result<Output, PadError>;
}

impl<const N: usize, T, S> PadExt<N, T, Array<T, Dim<[Ix; N]>>> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: NumAssign + Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn pad(
        &self,
        mode: PaddingMode<T>,
        padding: ExplicitPadding<N>,
    ) -> Result<Array<T, Dim<[Ix; N]>>, PadError> {
        self.pad_with(mode, padding, &PadOptions::default())
    }

    fn pad_with(
        &self,
        mode: PaddingMode<T>,
        padding: ExplicitPadding<N>,
        options: &PadOptions,
    ) -> Result<Array<T, Dim<[Ix; N]>>, PadError> {
        self.pad_signed(mode, signed_padding(padding)?, options)
    }

    fn pad_signed(
        &self,
        mode: PaddingMode<T>,
        padding: SignedPadding<N>,
        options: &PadOptions,
    ) -> Result<Array<T, Dim<[Ix; N]>>, PadError> {
        let elem_size = std::mem::size_of::<T>();
        let strategy = options.resolve_strategy(self.shape(), &padding, elem_size);
        let key = TilingKey::new(strategy, mode.kind());
        let mut builder = DescriptorBuilder::signed(self.shape(), &padding)
            .units(options.units)
            .staging_bytes(options.staging_bytes);
        if let Some((axis, factor)) = options.split {
            builder = builder.split(axis, factor);
        }
        let desc = builder.build(key, elem_size)?;

        let input = self.as_standard_layout();
        let input = input
            .as_slice()
            .ok_or(PadError::NonContiguousStride { axis: 0 })?;
        let paddings: Vec<i64> = padding.iter().flatten().map(|&p| p as i64).collect();

        let len = desc.out_len();
        let mut output = vec![mode.fill(); len];
        kernel::pad(
            input,
            &paddings,
            mode.fill(),
            &mut output,
            &mut Workspace::new(),
            &desc,
            key,
        )?;

        let out_dim: [usize; N] = std::array::from_fn(|i| desc.out_shape[i]);
        Array::from_shape_vec(out_dim, output).map_err(|_| PadError::BufferLength {
            what: "output",
            got: len,
            expected: out_dim.iter().product(),
        })
    }
}

/// Pads `input` one axis at a time on a whole output array.
///
/// This is the mathematical definition every strategy is checked against; it shares the
/// validation of the tiled path but none of its index arithmetic.
pub fn reference<const N: usize, T, S>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    mode: PaddingMode<T>,
    padding: ExplicitPadding<N>,
) -> Result<Array<T, Dim<[Ix; N]>>, PadError>
where
    T: NumAssign + Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: RemoveAxis,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    reference_signed(input, mode, signed_padding(padding)?)
}

/// [`reference`] with crops: pads every positive side, then slices the crops off.
pub fn reference_signed<const N: usize, T, S>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    mode: PaddingMode<T>,
    padding: SignedPadding<N>,
) -> Result<Array<T, Dim<[Ix; N]>>, PadError>
where
    T: NumAssign + Element,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: RemoveAxis,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    let kind = mode.kind();
    DescriptorBuilder::signed(input.shape(), &padding)
        .build(TilingKey::new(Strategy::ElementFallback, kind), std::mem::size_of::<T>())?;

    let grow: ExplicitPadding<N> = padding.map(|side| side.map(|p| p.max(0) as usize));
    let in_shape = input.shape();
    let grown_dim: [usize; N] = std::array::from_fn(|i| in_shape[i] + grow[i][0] + grow[i][1]);
    let mut grown = Array::from_elem(grown_dim, mode.fill());
    grown
        .slice_each_axis_mut(|ax| {
            let left = grow[ax.axis.index()][0];
            Slice::from(left..left + in_shape[ax.axis.index()])
        })
        .assign(input);

    if !grown.is_empty() {
        for (axis, &pad) in grow.iter().enumerate().filter(|(_, p)| **p != [0, 0]) {
            dim::pad_axis(kind, in_shape[axis], &mut grown, axis, pad, mode.fill());
        }
    }

    let cropped = grown.slice_each_axis(|ax| {
        let [left, right] = padding[ax.axis.index()];
        Slice::from(left.min(0).unsigned_abs()..ax.len - right.min(0).unsigned_abs())
    });
    Ok(cropped.to_owned())
}
