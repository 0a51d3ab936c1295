//! Output memory shared by all compute units.

use std::{
    marker::PhantomData,
    sync::atomic::{AtomicU32, Ordering},
};

/// Write counter per output element, used to audit exactly-once coverage of a launch.
#[derive(Debug)]
pub struct WriteLedger {
    counts: Vec<AtomicU32>,
}

impl WriteLedger {
    pub fn new(len: usize) -> Self {
        Self {
            counts: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    fn record(&self, offset: usize, len: usize) {
        for count in &self.counts[offset..offset + len] {
            count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn counts(&self) -> Vec<u32> {
        self.counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// First element not written exactly once, with its write count.
    pub fn first_violation(&self) -> Option<(usize, u32)> {
        self.counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .enumerate()
            .find(|&(_, n)| n != 1)
    }
}

/// Output tensor as seen by the units: a raw window every unit may write through.
///
/// Units write disjoint element ranges; that is what makes sharing the pointer sound.
#[derive(Debug)]
pub struct GlobalOut<'a, T> {
    ptr: *mut T,
    len: usize,
    ledger: Option<&'a WriteLedger>,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for GlobalOut<'_, T> {}
unsafe impl<T: Send> Sync for GlobalOut<'_, T> {}

impl<'a, T: Copy> GlobalOut<'a, T> {
    pub fn new(out: &'a mut [T], ledger: Option<&'a WriteLedger>) -> Self {
        if let Some(ledger) = ledger {
            debug_assert_eq!(ledger.len(), out.len());
        }
        Self {
            ptr: out.as_mut_ptr(),
            len: out.len(),
            ledger,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copies `data` to `offset`.
    ///
    /// # Safety
    ///
    /// No other thread may access `offset..offset + data.len()` for the lifetime of `self`.
    #[inline]
    pub unsafe fn write(&self, offset: usize, data: &[T]) {
        assert!(offset + data.len() <= self.len, "output write out of bounds");
        if let Some(ledger) = self.ledger {
            ledger.record(offset, data.len());
        }
        std::ptr::copy_nonoverlapping(data.as_ptr(), self.ptr.add(offset), data.len());
    }

    /// Copies `data` in a short unaligned head and a block-aligned body.
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::write`].
    #[inline]
    pub unsafe fn write_aligned(&self, offset: usize, data: &[T], block: usize) {
        let (head, _) = aligned_split(offset, data.len(), block);
        let (head_data, body_data) = data.split_at(head);
        if !head_data.is_empty() {
            self.write(offset, head_data);
        }
        if !body_data.is_empty() {
            self.write(offset + head, body_data);
        }
    }
}

/// Splits `len` elements starting at `offset` into the run up to the next multiple of
/// `block` and the remainder.
#[inline]
pub fn aligned_split(offset: usize, len: usize, block: usize) -> (usize, usize) {
    let block = block.max(1);
    let head = ((block - offset % block) % block).min(len);
    (head, len - head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_split_cases() {
        assert_eq!(aligned_split(0, 10, 8), (0, 10));
        assert_eq!(aligned_split(3, 10, 8), (5, 5));
        assert_eq!(aligned_split(3, 2, 8), (2, 0));
        assert_eq!(aligned_split(8, 0, 8), (0, 0));
    }

    #[test]
    fn ledger_flags_overlap_and_gaps() {
        let mut data = [0u8; 6];
        let ledger = WriteLedger::new(6);
        {
            let out = GlobalOut::new(&mut data, Some(&ledger));
            unsafe {
                out.write_aligned(1, &[1, 2, 3], 4);
                out.write(3, &[4]);
            }
        }
        assert_eq!(data, [0, 1, 2, 4, 0, 0]);
        assert_eq!(ledger.counts(), vec![0, 1, 1, 2, 0, 0]);
        assert_eq!(ledger.first_violation(), Some((0, 0)));
    }
}
