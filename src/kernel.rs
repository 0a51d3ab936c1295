//! Kernel entry: one SPMD launch over the descriptor's compute units.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{
    error::PadError,
    key::{ModeKind, Strategy, TilingKey},
    memory::{GlobalOut, WriteLedger},
    partition::WorkPartitioner,
    pipeline::Pipeline,
    region::RegionClassifier,
    strategy::{LaneTables, Launch},
    vector::HostVector,
    Element, TileDescriptor,
};

/// Reusable launch arena. Holds the lane tables of the last layout it was prepared for.
#[derive(Debug, Default)]
pub struct Workspace {
    prepared: Option<(TileDescriptor, ModeKind)>,
    lanes: LaneTables,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(
        &mut self,
        desc: &TileDescriptor,
        strategy: Strategy,
        classifier: &RegionClassifier,
    ) -> &LaneTables {
        if !matches!(strategy, Strategy::IndexGather | Strategy::IndexScatter) {
            return &self.lanes;
        }
        let layout = Some((*desc, classifier.mode()));
        if self.prepared != layout {
            self.lanes = LaneTables::build(desc, classifier);
            self.prepared = layout;
        }
        &self.lanes
    }
}

/// What a launch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchReport {
    pub units: usize,
    /// Units whose tile range was empty.
    pub idle_units: usize,
    pub tiles: usize,
}

/// Pads `input` into `output` as laid out by `desc`.
///
/// `paddings` is accepted for interface uniformity with the operator signature and not
/// read; the pad amounts come from the descriptor. `fill` is only read in constant mode.
pub fn pad<T: Element>(
    input: &[T],
    paddings: &[i64],
    fill: T,
    output: &mut [T],
    workspace: &mut Workspace,
    desc: &TileDescriptor,
    key: TilingKey,
) -> Result<LaunchReport, PadError> {
    launch(input, paddings, fill, output, workspace, desc, key, None)
}

/// [`pad`] that also counts every output write in `ledger`.
#[allow(clippy::too_many_arguments)]
pub fn pad_audited<T: Element>(
    input: &[T],
    paddings: &[i64],
    fill: T,
    output: &mut [T],
    workspace: &mut Workspace,
    desc: &TileDescriptor,
    key: TilingKey,
    ledger: &WriteLedger,
) -> Result<LaunchReport, PadError> {
    if ledger.len() != output.len() {
        return Err(PadError::BufferLength {
            what: "ledger",
            got: ledger.len(),
            expected: output.len(),
        });
    }
    launch(input, paddings, fill, output, workspace, desc, key, Some(ledger))
}

#[allow(clippy::too_many_arguments)]
fn launch<T: Element>(
    input: &[T],
    _paddings: &[i64],
    fill: T,
    output: &mut [T],
    workspace: &mut Workspace,
    desc: &TileDescriptor,
    key: TilingKey,
    ledger: Option<&WriteLedger>,
) -> Result<LaunchReport, PadError> {
    let elem_size = std::mem::size_of::<T>();
    desc.validate(key, elem_size)?;
    if input.len() != desc.in_len() {
        return Err(PadError::BufferLength {
            what: "input",
            got: input.len(),
            expected: desc.in_len(),
        });
    }
    if output.len() != desc.out_len() {
        return Err(PadError::BufferLength {
            what: "output",
            got: output.len(),
            expected: desc.out_len(),
        });
    }

    let classifier = RegionClassifier::new(desc, key.mode);
    let lanes = workspace.prepare(desc, key.strategy, &classifier);
    let partitioner = WorkPartitioner::from_descriptor(desc);
    let busy = partitioner.busy_units().min(desc.unit_count);
    let slot_len = desc
        .staging_elems(key.strategy, elem_size)
        .ok_or(PadError::StagingOverflow {
            strategy: key.strategy,
            needed: usize::MAX,
            available: desc.tile_bytes,
        })?;

    debug!(
        strategy = ?key.strategy,
        mode = ?key.mode,
        tiles = desc.total_tiles,
        units = desc.unit_count,
        split_axis = desc.split_axis,
        split_factor = desc.split_factor,
        "pad launch"
    );

    let out = GlobalOut::new(output, ledger);
    let ctx = Launch {
        desc,
        key,
        classifier,
        input,
        fill,
        out: &out,
        vector: HostVector,
        lanes,
    };

    let tiles: usize = (0..busy)
        .into_par_iter()
        .filter_map(|unit| partitioner.range(unit).map(|tiles| (unit, tiles)))
        .map(|(unit, tiles)| {
            trace!(unit, start = tiles.start, end = tiles.end, "unit start");
            let mut pipeline = Pipeline::new(slot_len, fill);
            ctx.run_unit(&mut pipeline, tiles)
        })
        .sum();

    let report = LaunchReport {
        units: desc.unit_count,
        idle_units: desc.unit_count - busy,
        tiles,
    };
    debug!(?report, "pad launch done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DescriptorBuilder;

    fn key(strategy: Strategy, mode: ModeKind) -> TilingKey {
        TilingKey::new(strategy, mode)
    }

    #[test]
    fn constant_scenario() {
        let k = key(Strategy::BatchedTile, ModeKind::Constant);
        let desc = DescriptorBuilder::new(&[5], &[[2, 1]]).build(k, 4).unwrap();
        let mut out = vec![-1; 8];
        let mut ws = Workspace::new();
        pad(&[1, 2, 3, 4, 5], &[2, 1], 0, &mut out, &mut ws, &desc, k).unwrap();
        assert_eq!(out, vec![0, 0, 1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn trailing_units_report_idle() {
        let k = key(Strategy::ElementFallback, ModeKind::Edge);
        let desc = DescriptorBuilder::new(&[4], &[[2, 2]])
            .split(0, 4)
            .units(5)
            .build(k, 4)
            .unwrap();
        let mut out = vec![0; 8];
        let report = pad(&[1, 2, 3, 4], &[], 0, &mut out, &mut Workspace::new(), &desc, k).unwrap();
        assert_eq!(
            report,
            LaunchReport {
                units: 5,
                idle_units: 3,
                tiles: 2
            }
        );
        assert_eq!(out, vec![1, 1, 1, 2, 3, 4, 4, 4]);
    }

    #[test]
    fn buffer_lengths_are_checked() {
        let k = key(Strategy::ElementFallback, ModeKind::Constant);
        let desc = DescriptorBuilder::new(&[3], &[[1, 1]]).build(k, 4).unwrap();
        let mut out = vec![0; 4];
        let err = pad(&[1, 2, 3], &[], 0, &mut out, &mut Workspace::new(), &desc, k).unwrap_err();
        assert_eq!(
            err,
            PadError::BufferLength {
                what: "output",
                got: 4,
                expected: 5
            }
        );
    }

    #[test]
    fn mismatched_key_is_rejected() {
        // descriptor laid out for the flat walk, launched as a batched walk
        let desc = DescriptorBuilder::new(&[6, 6], &[[1, 1], [1, 1]])
            .split(0, 3)
            .build(key(Strategy::ElementFallback, ModeKind::Edge), 4)
            .unwrap();
        let mut out = vec![0; 64];
        let err = pad(
            &[0; 36],
            &[],
            0,
            &mut out,
            &mut Workspace::new(),
            &desc,
            key(Strategy::BatchedTile, ModeKind::Edge),
        )
        .unwrap_err();
        assert!(matches!(err, PadError::TileCountMismatch { .. }));
    }

    #[test]
    fn workspace_rebuilds_lanes_for_new_layout() {
        let k = key(Strategy::IndexGather, ModeKind::Circular);
        let mut ws = Workspace::new();
        for shape in [[2, 3], [2, 4]] {
            let desc = DescriptorBuilder::new(&shape, &[[0, 0], [1, 1]])
                .split(0, 1)
                .build(k, 4)
                .unwrap();
            let input: Vec<i32> = (0..desc.in_len() as i32).collect();
            let mut out = vec![0; desc.out_len()];
            pad(&input, &[], 0, &mut out, &mut ws, &desc, k).unwrap();
            assert_eq!(ws.lanes.gather.len(), shape[1] + 2);
            let n = shape[1] as i32;
            let first_row: Vec<i32> = std::iter::once(n - 1).chain(0..n).chain([0]).collect();
            assert_eq!(&out[..shape[1] + 2], &first_row[..]);
        }
    }
}
