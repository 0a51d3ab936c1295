use ndarray::{Array, Dim, Ix, RemoveAxis};

use super::half_dim;
use crate::key::ModeKind;

/// Pads one axis of `buffer` in place. The body along `dim` is already in position and
/// every other axis spans its full output extent.
#[inline]
pub fn pad_axis<const N: usize, T>(
    mode: ModeKind,
    input_len: usize,
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
    fill: T,
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    match mode {
        ModeKind::Constant => {
            half_dim::constant_front(buffer, dim, padding, fill.clone());
            half_dim::constant_back(input_len, buffer, dim, padding, fill);
        }
        ModeKind::Edge => {
            half_dim::replicate_front(buffer, dim, padding);
            half_dim::replicate_back(input_len, buffer, dim, padding);
        }
        ModeKind::Reflect => {
            half_dim::mirror_front(buffer, dim, padding, false);
            half_dim::mirror_back(input_len, buffer, dim, padding, false);
        }
        ModeKind::Symmetric => {
            half_dim::mirror_front(buffer, dim, padding, true);
            half_dim::mirror_back(input_len, buffer, dim, padding, true);
        }
        ModeKind::Circular => {
            half_dim::circular_front(input_len, buffer, dim, padding);
            half_dim::circular_back(input_len, buffer, dim, padding);
        }
    }
}
