//! Batched element operations over staging memory.
//!
//! [`HostVector`] is the portable implementation of the vector unit a staging slot is
//! processed with.

/// Element-wise copy, fill and index-driven lane movement over a batch of values.
pub trait VectorBatchOp: Send + Sync {
    /// `dst[i] = src[i]`.
    fn copy<T: Copy>(&self, dst: &mut [T], src: &[T]);

    /// `dst[i] = value`.
    fn fill<T: Copy>(&self, dst: &mut [T], value: T);

    /// `dst[i] = src[len - 1 - i]`.
    fn reverse<T: Copy>(&self, dst: &mut [T], src: &[T]);

    /// Tiles `dst` with copies of `row`; `dst.len()` is a multiple of `row.len()`.
    fn repeat<T: Copy>(&self, dst: &mut [T], row: &[T]);

    /// `dst[i] = src[index[i]]`.
    fn gather<T: Copy>(&self, dst: &mut [T], src: &[T], index: &[u32]);

    /// `dst[pairs[i].1] = src[pairs[i].0]`.
    fn scatter<T: Copy>(&self, dst: &mut [T], src: &[T], pairs: &[(u32, u32)]);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HostVector;

impl VectorBatchOp for HostVector {
    #[inline]
    fn copy<T: Copy>(&self, dst: &mut [T], src: &[T]) {
        dst.copy_from_slice(src);
    }

    #[inline]
    fn fill<T: Copy>(&self, dst: &mut [T], value: T) {
        dst.fill(value);
    }

    #[inline]
    fn reverse<T: Copy>(&self, dst: &mut [T], src: &[T]) {
        debug_assert_eq!(dst.len(), src.len());
        dst.iter_mut()
            .zip(src.iter().rev())
            .for_each(|(d, &s)| *d = s);
    }

    #[inline]
    fn repeat<T: Copy>(&self, dst: &mut [T], row: &[T]) {
        if row.is_empty() {
            debug_assert!(dst.is_empty());
            return;
        }
        debug_assert_eq!(dst.len() % row.len(), 0);
        dst.chunks_exact_mut(row.len())
            .for_each(|chunk| chunk.copy_from_slice(row));
    }

    #[inline]
    fn gather<T: Copy>(&self, dst: &mut [T], src: &[T], index: &[u32]) {
        debug_assert_eq!(dst.len(), index.len());
        dst.iter_mut()
            .zip(index)
            .for_each(|(d, &i)| *d = src[i as usize]);
    }

    #[inline]
    fn scatter<T: Copy>(&self, dst: &mut [T], src: &[T], pairs: &[(u32, u32)]) {
        for &(from, to) in pairs {
            dst[to as usize] = src[from as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_moves() {
        let v = HostVector;
        let src = [1, 2, 3, 4];

        let mut dst = [0; 4];
        v.reverse(&mut dst, &src);
        assert_eq!(dst, [4, 3, 2, 1]);

        let mut dst = [0; 3];
        v.gather(&mut dst, &src, &[3, 3, 0]);
        assert_eq!(dst, [4, 4, 1]);

        let mut dst = [9; 5];
        v.scatter(&mut dst, &src, &[(0, 4), (2, 1)]);
        assert_eq!(dst, [9, 3, 9, 9, 1]);

        let mut dst = [0; 6];
        v.repeat(&mut dst, &src[..2]);
        assert_eq!(dst, [1, 2, 1, 2, 1, 2]);
    }
}
