//! Two-slot software pipeline: copy-in, pad compute, copy-out.
//!
//! Slot ownership moves through two bounded channels. The producer acquires a free slot,
//! runs copy-in and compute on it, then releases it to the consumer; the consumer runs
//! copy-out and hands the slot back. With two slots the producer of iteration `k` always
//! gets the slot freed by the copy-out of iteration `k - 2`.

use std::{ops::Range, sync::mpsc, thread};

use tracing::trace;

use crate::Element;

/// Stage bodies of one copy strategy.
pub trait TileStages<T>: Sync {
    /// Per-tile state handed from the producer side to the consumer side.
    type Tile: Send;

    /// Initializes a staging slot once, before its first tile.
    fn prepare(&self, _slot: &mut [T]) {}

    /// Resolves a linear tile index.
    fn locate(&self, index: usize) -> Self::Tile;

    fn copy_in(&self, tile: &Self::Tile, slot: &mut [T]);

    fn compute(&self, _tile: &Self::Tile, _slot: &mut [T]) {}

    fn copy_out(&self, tile: &Self::Tile, slot: &[T]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CopyIn,
    Compute,
    CopyOut,
}

/// Double-buffered staging owned by one compute unit.
#[derive(Debug)]
pub struct Pipeline<T> {
    slots: [Vec<T>; 2],
}

impl<T: Element> Pipeline<T> {
    pub fn new(slot_len: usize, init: T) -> Self {
        Self {
            slots: [vec![init; slot_len], vec![init; slot_len]],
        }
    }

    #[inline]
    pub fn slot_len(&self) -> usize {
        self.slots[0].len()
    }

    /// Runs every tile of `tiles` through the three stages, returning the tiles completed.
    pub fn run<S>(&mut self, stages: &S, tiles: Range<usize>) -> usize
    where
        S: TileStages<T>,
    {
        let [a, b] = &mut self.slots;
        stages.prepare(a);
        stages.prepare(b);
        if tiles.is_empty() {
            return 0;
        }

        thread::scope(|scope| {
            let (full_tx, full_rx) = mpsc::sync_channel::<(usize, S::Tile, &mut [T])>(1);
            let (free_tx, free_rx) = mpsc::sync_channel::<(usize, &mut [T])>(2);
            for slot in [(0, a.as_mut_slice()), (1, b.as_mut_slice())] {
                // capacity 2, cannot block
                let _ = free_tx.send(slot);
            }

            let consumer = scope.spawn(move || {
                let mut done = 0;
                for (slot, tile, buf) in full_rx {
                    trace!(slot, stage = ?Stage::CopyOut);
                    stages.copy_out(&tile, buf);
                    done += 1;
                    if free_tx.send((slot, buf)).is_err() {
                        break;
                    }
                }
                done
            });

            for (k, index) in tiles.enumerate() {
                let Ok((slot, buf)) = free_rx.recv() else {
                    break;
                };
                debug_assert_eq!(slot, k % 2);

                let tile = stages.locate(index);
                trace!(index, slot, stage = ?Stage::CopyIn);
                stages.copy_in(&tile, buf);
                trace!(index, slot, stage = ?Stage::Compute);
                stages.compute(&tile, buf);

                if full_tx.send((slot, tile, buf)).is_err() {
                    break;
                }
            }
            drop(full_tx);

            consumer
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    }
}
