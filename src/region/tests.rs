use proptest::prelude::*;

use super::*;
use crate::{
    key::{Strategy, TilingKey},
    DescriptorBuilder,
};

fn classifier(input: usize, left: usize, right: usize, mode: ModeKind) -> RegionClassifier {
    let desc = DescriptorBuilder::new(&[input], &[[left, right]])
        .build(TilingKey::new(Strategy::ElementFallback, mode), 4)
        .unwrap();
    RegionClassifier::new(&desc, mode)
}

/// Walks every window of `width` input rows and records which row lands on each output.
fn scatter_map(c: &RegionClassifier, width: usize) -> Vec<Vec<Option<usize>>> {
    let extent = *c.axis(0);
    let mut hits = vec![Vec::new(); extent.out()];
    let mut start = 0;
    while start < extent.input {
        let len = width.min(extent.input - start);
        for segment in &c.segments(0, start, len) {
            for out in segment.outputs() {
                hits[out].push(segment.source_of(out).map(|k| start + k));
            }
        }
        start += len;
    }
    hits
}

#[test]
fn classify_boundaries() {
    let axis = AxisExtent::new(2, 3, 1);
    let regions: Vec<_> = (0..axis.out()).map(|o| classify(&axis, o)).collect();
    assert_eq!(
        regions,
        vec![
            Region::LeftPad(2),
            Region::LeftPad(1),
            Region::Body(0),
            Region::Body(1),
            Region::Body(2),
            Region::RightPad(0),
        ]
    );
}

#[test]
fn reflect_skips_boundary_sample() {
    let c = classifier(4, 3, 3, ModeKind::Reflect);
    let sources: Vec<_> = (0..10).map(|o| c.source_index(0, o).unwrap()).collect();
    assert_eq!(sources, vec![3, 2, 1, 0, 1, 2, 3, 2, 1, 0]);
}

#[test]
fn symmetric_repeats_boundary_sample() {
    let c = classifier(4, 3, 3, ModeKind::Symmetric);
    let sources: Vec<_> = (0..10).map(|o| c.source_index(0, o).unwrap()).collect();
    assert_eq!(sources, vec![2, 1, 0, 0, 1, 2, 3, 3, 2, 1]);
}

#[test]
fn circular_wraps_a_full_period() {
    let c = classifier(3, 3, 3, ModeKind::Circular);
    let sources: Vec<_> = (0..9).map(|o| c.source_index(0, o).unwrap()).collect();
    assert_eq!(sources, vec![0, 1, 2, 0, 1, 2, 0, 1, 2]);
}

#[test]
fn constant_pad_has_no_source() {
    let c = classifier(2, 1, 2, ModeKind::Constant);
    let sources: Vec<_> = (0..5).map(|o| c.source_index(0, o)).collect();
    assert_eq!(sources, vec![None, Some(0), Some(1), None, None]);
}

#[test]
fn single_window_yields_three_regions() {
    let c = classifier(5, 2, 2, ModeKind::Circular);
    let set = c.segments(0, 0, 5);
    let kinds: Vec<_> = set.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![RegionKind::LeftPad, RegionKind::Body, RegionKind::RightPad]
    );
    assert_eq!(set.span(), 9);
    assert_eq!(set.as_slice()[0].src, 3);
    assert_eq!(set.as_slice()[2].outputs(), 7..9);
}

#[test]
fn interior_window_is_body_only() {
    let c = classifier(10, 1, 1, ModeKind::Edge);
    let set = c.segments(0, 4, 2);
    assert_eq!(set.len(), 1);
    assert_eq!(set.as_slice()[0].outputs(), 5..7);
}

#[test]
fn fill_segment_is_owned_by_first_and_last_row() {
    let c = classifier(6, 2, 3, ModeKind::Constant);
    let first = c.segments(0, 0, 2);
    assert_eq!(first.as_slice()[0].placement, Placement::Fill(2));
    let last = c.segments(0, 4, 2);
    assert_eq!(last.as_slice()[1].placement, Placement::Fill(3));
    assert_eq!(last.as_slice()[1].outputs(), 8..11);
}

fn cropped(input: usize, left: isize, right: isize, mode: ModeKind) -> RegionClassifier {
    let desc = DescriptorBuilder::signed(&[input], &[[left, right]])
        .build(TilingKey::new(Strategy::ElementFallback, mode), 4)
        .unwrap();
    RegionClassifier::new(&desc, mode)
}

#[test]
fn classify_skips_cropped_rows() {
    let axis = AxisExtent::signed(-2, 4, 1);
    assert_eq!((axis.out(), axis.body()), (3, 0..2));
    let regions: Vec<_> = (0..axis.out()).map(|o| classify(&axis, o)).collect();
    assert_eq!(
        regions,
        vec![Region::Body(2), Region::Body(3), Region::RightPad(0)]
    );

    let axis = AxisExtent::signed(1, 4, -3);
    assert_eq!((axis.out(), axis.body()), (2, 1..2));
    assert_eq!(classify(&axis, 0), Region::LeftPad(1));
    assert_eq!(classify(&axis, 1), Region::Body(0));
}

#[test]
fn cropped_mirror_reflects_about_the_full_input() {
    // in: 0 1 2 3 4, reflected right by 2 then cropped by 3 on the left
    let c = cropped(5, -3, 2, ModeKind::Reflect);
    let sources: Vec<_> = (0..4).map(|o| c.source_index(0, o).unwrap()).collect();
    assert_eq!(sources, vec![3, 4, 3, 2]);

    let c = cropped(3, -3, 2, ModeKind::Circular);
    let sources: Vec<_> = (0..2).map(|o| c.source_index(0, o).unwrap()).collect();
    assert_eq!(sources, vec![0, 1]);

    let c = cropped(4, 2, -1, ModeKind::Constant);
    let sources: Vec<_> = (0..5).map(|o| c.source_index(0, o)).collect();
    assert_eq!(sources, vec![None, None, Some(0), Some(1), Some(2)]);
}

proptest! {
    #[test]
    fn every_output_is_written_once_with_its_source(
        mode_index in 0usize..5,
        input in 1usize..12,
        left in 0usize..12,
        right in 0usize..12,
        width in 1usize..6,
    ) {
        let mode = ModeKind::ALL[mode_index];
        let limit = mode.max_pad(input).unwrap_or(usize::MAX);
        prop_assume!(left <= limit && right <= limit);

        let c = classifier(input, left, right, mode);
        let hits = scatter_map(&c, width);
        prop_assert_eq!(hits.len(), input + left + right);
        for (out, writes) in hits.iter().enumerate() {
            prop_assert_eq!(writes.len(), 1, "output {} written {} times", out, writes.len());
            prop_assert_eq!(writes[0], c.source_index(0, out));
        }
    }
}
