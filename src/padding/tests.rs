use ndarray::prelude::*;

use super::*;
use crate::ModeKind;

fn every_strategy() -> impl Iterator<Item = PadOptions> {
    Strategy::ALL
        .into_iter()
        .map(|s| PadOptions::default().with_strategy(s).with_units(3))
}

#[test]
fn constant_1d() {
    let arr = array![1, 2, 3, 4, 5];
    for options in every_strategy() {
        let padded = arr.pad_with(PaddingMode::Zeros, [[2, 1]], &options).unwrap();
        assert_eq!(padded, array![0, 0, 1, 2, 3, 4, 5, 0], "{options:?}");
    }
}

#[test]
fn circular_2d_wraps_rows_and_columns() {
    let arr = array![[1, 2, 3], [4, 5, 6]];
    for options in every_strategy() {
        let padded = arr
            .pad_with(PaddingMode::Circular, [[1, 0], [0, 1]], &options)
            .unwrap();
        assert_eq!(padded.slice(s![0, ..3]), arr.row(1));
        assert_eq!(padded.slice(s![1.., ..3]), arr);
        assert_eq!(padded.row(0), aview1(&[4, 5, 6, 4]));
        assert_eq!(padded.column(3), padded.column(0));
    }
}

#[test]
fn edge_1d() {
    let arr = array![10, 20, 30, 40];
    for options in every_strategy() {
        let padded = arr.pad_with(PaddingMode::Replicate, [[2, 2]], &options).unwrap();
        assert_eq!(padded, array![10, 10, 10, 20, 30, 40, 40, 40]);
    }
}

#[test]
fn mirror_conventions() {
    let arr = array![1, 2, 3, 4];
    assert_eq!(
        arr.pad(PaddingMode::Reflect, [[3, 2]]).unwrap(),
        array![4, 3, 2, 1, 2, 3, 4, 3, 2]
    );
    assert_eq!(
        arr.pad(PaddingMode::Symmetric, [[3, 2]]).unwrap(),
        array![3, 2, 1, 1, 2, 3, 4, 4, 3]
    );

    // out[l - 1 - k] == in[k + offset]
    let arr = Array::from_shape_fn((5, 6), |(i, j)| (i * 6 + j) as i64);
    for (mode, offset) in [(PaddingMode::Reflect, 1), (PaddingMode::Symmetric, 0)] {
        let padded = arr.pad(mode, [[3, 0], [0, 0]]).unwrap();
        for k in 0..3 {
            assert_eq!(padded.row(2 - k), arr.row(k + offset), "{mode:?} k={k}");
        }
    }
}

#[test]
fn const_fill_outside_body() {
    let arr = Array::from_shape_fn((3, 2, 4), |(i, j, k)| (1 + i + j + k) as f32);
    let padding = [[1, 2], [3, 0], [1, 1]];
    let padded = arr.pad(PaddingMode::Const(-1.5), padding).unwrap();
    for ((i, j, k), &v) in padded.indexed_iter() {
        let inside = (1..4).contains(&i) && (3..5).contains(&j) && (1..5).contains(&k);
        if inside {
            assert_eq!(v, arr[[i - 1, j - 3, k - 1]]);
        } else {
            assert_eq!(v, -1.5);
        }
    }
}

#[test]
fn circular_output_is_periodic() {
    let arr = Array::from_shape_fn((4, 3), |(i, j)| (i * 10 + j) as u16);
    let padded = arr.pad(PaddingMode::Circular, [[3, 4], [2, 3]]).unwrap();
    let (rows, cols) = padded.dim();
    for i in 0..rows {
        for j in 0..cols {
            let src = [(i + 4 - 3) % 4, (j + 3 - 2) % 3];
            assert_eq!(padded[[i, j]], arr[src]);
            if i + 4 < rows {
                assert_eq!(padded[[i, j]], padded[[i + 4, j]]);
            }
        }
    }
}

#[test]
fn identity_without_padding() {
    let arr = Array::from_shape_fn((2, 3, 4), |(i, j, k)| (i * 100 + j * 10 + k) as i32);
    for mode in [
        PaddingMode::Zeros,
        PaddingMode::Replicate,
        PaddingMode::Reflect,
        PaddingMode::Symmetric,
        PaddingMode::Circular,
    ] {
        for options in every_strategy() {
            assert_eq!(arr.pad_with(mode, [[0, 0]; 3], &options).unwrap(), arr);
        }
    }
}

#[test]
fn non_standard_layout_input() {
    let arr = Array::from_shape_fn((3, 5), |(i, j)| (i * 5 + j) as i32);
    let view = arr.t();
    let padded = view.pad(PaddingMode::Replicate, [[1, 0], [0, 2]]).unwrap();
    assert_eq!(padded, reference(&view, PaddingMode::Replicate, [[1, 0], [0, 2]]).unwrap());
    assert_eq!(padded.dim(), (6, 5));
}

#[test]
fn empty_input_pads_to_fill() {
    let arr = Array::<i32, _>::zeros((0, 2));
    let padded = arr.pad(PaddingMode::Const(9), [[1, 1], [0, 1]]).unwrap();
    assert_eq!(padded, Array::from_elem((2, 3), 9));

    let err = arr.pad(PaddingMode::Replicate, [[1, 1], [0, 1]]).unwrap_err();
    assert_eq!(
        err,
        PadError::EmptyAxis {
            axis: 0,
            mode: ModeKind::Edge
        }
    );
}

#[test]
fn rejects_pads_past_one_period() {
    let arr = array![1, 2, 3];
    assert!(matches!(
        arr.pad(PaddingMode::Circular, [[4, 0]]),
        Err(PadError::WrapExceedsPeriod { pad: 4, input: 3, .. })
    ));
    assert!(matches!(
        arr.pad(PaddingMode::Reflect, [[0, 3]]),
        Err(PadError::WrapExceedsPeriod { pad: 3, .. })
    ));
    assert!(arr.pad(PaddingMode::Symmetric, [[0, 3]]).is_ok());
}

#[test]
fn row_stream_on_wide_rows() {
    let arr = Array::from_shape_fn((2, 1000), |(i, j)| (i * 1000 + j) as i32);
    let options = PadOptions::default()
        .with_strategy(Strategy::RowStream)
        .with_staging_bytes(256);
    for mode in [PaddingMode::Const(3), PaddingMode::Reflect, PaddingMode::Circular] {
        let padded = arr.pad_with(mode, [[1, 1], [37, 250]], &options).unwrap();
        assert_eq!(padded, reference(&arr, mode, [[1, 1], [37, 250]]).unwrap());
    }
}

#[test]
fn options_from_env() {
    std::env::set_var(PadOptions::UNITS_ENV, "5");
    std::env::set_var(PadOptions::STAGING_BYTES_ENV, "not a number");
    let options = PadOptions::from_env();
    std::env::remove_var(PadOptions::UNITS_ENV);
    std::env::remove_var(PadOptions::STAGING_BYTES_ENV);

    assert_eq!(options.units, 5);
    assert_eq!(options.staging_bytes, DEFAULT_STAGING_BYTES);
    assert_eq!(options.resolve_strategy(&[2, 0], &[[1, 1]; 2], 4), Strategy::ElementFallback);
    assert_eq!(options.resolve_strategy(&[2, 1], &[[1, 1]; 2], 4), Strategy::BatchedTile);
}

#[test]
fn default_strategy_follows_the_shape() {
    let options = PadOptions::default().with_staging_bytes(1024);
    assert_eq!(options.resolve_strategy(&[8, 250], &[[1, 1]; 2], 4), Strategy::BatchedTile);
    assert_eq!(options.resolve_strategy(&[8, 255], &[[1, 1]; 2], 4), Strategy::RowStream);
    assert_eq!(options.resolve_strategy(&[8, 255], &[[-1, 1], [0, 0]], 4), Strategy::IndexGather);
    assert_eq!(options.resolve_strategy(&[0, 255], &[[1, 1]; 2], 4), Strategy::ElementFallback);

    let forced = options.clone().with_strategy(Strategy::IndexScatter);
    assert_eq!(forced.resolve_strategy(&[8, 255], &[[1, 1]; 2], 4), Strategy::IndexScatter);

    let wide = Array::from_shape_fn((2, 300), |(i, j)| (i * 300 + j) as i32);
    let padded = wide
        .pad_with(PaddingMode::Reflect, [[1, 0], [5, 7]], &options)
        .unwrap();
    assert_eq!(padded, reference(&wide, PaddingMode::Reflect, [[1, 0], [5, 7]]).unwrap());
}

#[test]
fn crop_only() {
    let arr = Array::from_shape_fn((4, 5), |(i, j)| (i * 5 + j) as i32);
    let padded = arr
        .pad_signed(PaddingMode::Zeros, [[-1, -2], [0, -3]], &PadOptions::default())
        .unwrap();
    assert_eq!(padded, arr.slice(s![1..2, 0..2]));

    for options in every_strategy().skip(2) {
        let padded = arr
            .pad_signed(PaddingMode::Circular, [[-4, 0], [-2, -3]], &options)
            .unwrap();
        assert_eq!(padded.dim(), (0, 0));
    }
}

#[test]
fn mixed_crop_and_pad_match_reference() {
    let arr = Array::from_shape_fn((4, 6), |(i, j)| (i * 6 + j) as i32);
    let cases: [SignedPadding<2>; 4] = [
        [[-1, 2], [3, -2]],
        [[2, -3], [-5, 4]],
        [[-4, 3], [0, -6]],
        [[1, 1], [-1, 5]],
    ];
    for mode in [
        PaddingMode::Const(-1),
        PaddingMode::Replicate,
        PaddingMode::Reflect,
        PaddingMode::Symmetric,
        PaddingMode::Circular,
    ] {
        for padding in cases {
            let limit = mode.kind().max_pad(4).unwrap_or(usize::MAX) as isize;
            if padding[0].iter().any(|&p| p > limit) || padding[1].iter().any(|&p| p > 5) {
                continue;
            }
            let expected = reference_signed(&arr, mode, padding).unwrap();
            for options in every_strategy().skip(2) {
                let padded = arr.pad_signed(mode, padding, &options).unwrap();
                assert_eq!(padded, expected, "{mode:?} {padding:?} {options:?}");
            }
        }
    }
}

#[test]
fn reflect_crop_reads_the_uncropped_input() {
    let arr = array![1, 2, 3, 4, 5];
    let padded = arr
        .pad_signed(PaddingMode::Reflect, [[-3, 2]], &PadOptions::default())
        .unwrap();
    assert_eq!(padded, array![4, 5, 4, 3]);
    assert_eq!(reference_signed(&arr, PaddingMode::Reflect, [[-3, 2]]).unwrap(), padded);
}

#[test]
fn input_walks_cannot_crop() {
    let arr = array![[1, 2], [3, 4]];
    for strategy in [Strategy::RowStream, Strategy::BatchedTile] {
        let options = PadOptions::default().with_strategy(strategy);
        assert_eq!(
            arr.pad_signed(PaddingMode::Zeros, [[0, 0], [-1, 1]], &options),
            Err(PadError::CropOnInputWalk { strategy, axis: 1 })
        );
    }
}

#[test]
fn huge_split_factor_is_harmless() {
    let arr = array![[1, 2, 3, 4], [5, 6, 7, 8]];
    for strategy in Strategy::ALL {
        let axis = if strategy == Strategy::RowStream { 1 } else { 0 };
        let options = PadOptions::default()
            .with_strategy(strategy)
            .with_split(axis, usize::MAX);
        let padded = arr.pad_with(PaddingMode::Symmetric, [[1, 1], [2, 2]], &options).unwrap();
        assert_eq!(padded, reference(&arr, PaddingMode::Symmetric, [[1, 1], [2, 2]]).unwrap());
    }
}

#[test]
fn explicit_split() {
    let arr = Array::from_shape_fn((4, 6), |(i, j)| (i * 6 + j) as i32);
    let options = PadOptions::default()
        .with_strategy(Strategy::IndexGather)
        .with_split(1, 2);
    let padded = arr.pad_with(PaddingMode::Symmetric, [[2, 1], [3, 3]], &options).unwrap();
    assert_eq!(padded, reference(&arr, PaddingMode::Symmetric, [[2, 1], [3, 3]]).unwrap());

    let options = options.with_split(5, 1);
    assert!(matches!(
        arr.pad_with(PaddingMode::Symmetric, [[2, 1], [3, 3]], &options),
        Err(PadError::InvalidSplitAxis { axis: 5, rank: 2, .. })
    ));
}
