use ndarray::{Array, Axis, Dim, Ix, RemoveAxis};

/// Copies the lane at `from` along `dim` over the lane at `to`.
#[inline]
fn copy_lane<const N: usize, T>(
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    from: usize,
    to: usize,
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    let lane = buffer.index_axis(Axis(dim), from).to_owned();
    buffer.index_axis_mut(Axis(dim), to).assign(&lane);
}

#[inline]
pub fn constant_front<const N: usize, T>(
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
    constant: T,
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    for j in 0..padding[0] {
        buffer.index_axis_mut(Axis(dim), j).fill(constant.clone());
    }
}

#[inline]
pub fn constant_back<const N: usize, T>(
    input_len: usize,
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
    constant: T,
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    for j in input_len + padding[0]..buffer.len_of(Axis(dim)) {
        buffer.index_axis_mut(Axis(dim), j).fill(constant.clone());
    }
}

#[inline]
pub fn replicate_front<const N: usize, T>(
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    for j in 0..padding[0] {
        copy_lane(buffer, dim, padding[0], j);
    }
}

#[inline]
pub fn replicate_back<const N: usize, T>(
    input_len: usize,
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    let border = padding[0] + input_len - 1;
    for j in border + 1..buffer.len_of(Axis(dim)) {
        copy_lane(buffer, dim, border, j);
    }
}

/// Mirrors the front pad around the first body lane. `shared` repeats the boundary lane.
#[inline]
pub fn mirror_front<const N: usize, T>(
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
    shared: bool,
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    let border = padding[0];
    for j in 0..border {
        let mirrored = 2 * border - j - usize::from(shared);
        copy_lane(buffer, dim, mirrored, j);
    }
}

#[inline]
pub fn mirror_back<const N: usize, T>(
    input_len: usize,
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
    shared: bool,
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    let border = padding[0] + input_len - 1;
    for j in border + 1..buffer.len_of(Axis(dim)) {
        let mirrored = 2 * border + usize::from(shared) - j;
        copy_lane(buffer, dim, mirrored, j);
    }
}

#[inline]
pub fn circular_front<const N: usize, T>(
    input_len: usize,
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    for j in 0..padding[0] {
        copy_lane(buffer, dim, j + input_len, j);
    }
}

#[inline]
pub fn circular_back<const N: usize, T>(
    input_len: usize,
    buffer: &mut Array<T, Dim<[Ix; N]>>,
    dim: usize,
    padding: [usize; 2],
) where
    T: Clone,
    Dim<[Ix; N]>: RemoveAxis,
{
    for j in input_len + padding[0]..buffer.len_of(Axis(dim)) {
        copy_lane(buffer, dim, j - input_len, j);
    }
}
