use approx::assert_abs_diff_eq;
use ndarray::Array2;

use drift_core::align::patch::{insert_offset, prepare_patch, working_size};
use drift_core::align::window::weights_2d;
use drift_core::config::{WindowMethod, WindowShape};
use drift_core::error::DriftError;
use drift_core::frame::InsertRect;

#[test]
fn test_working_size_is_next_power_of_two() {
    assert_eq!(working_size(&[(64, 64)]), 64);
    assert_eq!(working_size(&[(65, 10)]), 128);
    assert_eq!(working_size(&[(30, 20), (12, 40)]), 64);
    assert_eq!(working_size(&[(1, 1)]), 1);
}

#[test]
fn test_insert_offset_rounds_odd_slack_up() {
    assert_eq!(insert_offset(8, 8), 0);
    assert_eq!(insert_offset(8, 6), 1);
    assert_eq!(insert_offset(8, 5), 2);
    assert_eq!(insert_offset(8, 3), 3);
    assert_eq!(insert_offset(64, 33), 16);
}

#[test]
fn test_patch_is_centred_and_zero_padded() {
    let data = Array2::from_shape_fn((3, 5), |(r, c)| (r * 5 + c) as f32);
    let patch = prepare_patch(&data, 8, WindowMethod::None, WindowShape::Separable).unwrap();

    assert_eq!(patch.size(), 8);
    assert_eq!(
        patch.insert,
        InsertRect {
            x: 2,
            y: 3,
            width: 5,
            height: 3
        }
    );

    // Mean of 0..15 is 7.
    assert_abs_diff_eq!(patch.data[[3, 2]], -7.0, epsilon = 1e-12);
    assert_abs_diff_eq!(patch.data[[5, 6]], 7.0, epsilon = 1e-12);
    for ((r, c), &v) in patch.data.indexed_iter() {
        let inside = (3..6).contains(&r) && (2..7).contains(&c);
        if !inside {
            assert_eq!(v, 0.0, "padding at ({r}, {c})");
        }
    }
    assert_abs_diff_eq!(patch.data.sum(), 0.0, epsilon = 1e-9);
}

#[test]
fn test_full_size_patch_is_not_offset() {
    let data = Array2::from_shape_fn((16, 16), |(r, c)| ((r * 3 + c * 7) % 11) as f32);
    let patch = prepare_patch(&data, 16, WindowMethod::Hanning, WindowShape::Separable).unwrap();
    assert_eq!(patch.insert.x, 0);
    assert_eq!(patch.insert.y, 0);
    assert_eq!(patch.insert.area(), 256);
}

#[test]
fn test_flat_image_becomes_all_zero() {
    let data = Array2::<f32>::from_elem((20, 20), 5.0);
    for method in [WindowMethod::None, WindowMethod::Tukey, WindowMethod::Hanning] {
        let patch = prepare_patch(&data, 32, method, WindowShape::Separable).unwrap();
        assert_eq!(patch.energy(), 0.0, "{method}");
    }
}

#[test]
fn test_unit_length_normalization() {
    let data = Array2::from_shape_fn((10, 12), |(r, c)| ((r * c) % 5) as f32);
    let mut patch = prepare_patch(&data, 16, WindowMethod::None, WindowShape::Separable).unwrap();
    assert!(patch.normalize_to_unit_length());
    assert_abs_diff_eq!(patch.energy(), 1.0, epsilon = 1e-12);

    let flat = Array2::<f32>::from_elem((4, 4), 2.0);
    let mut patch = prepare_patch(&flat, 4, WindowMethod::None, WindowShape::Separable).unwrap();
    assert!(!patch.normalize_to_unit_length());
}

#[test]
fn test_oversized_input_is_rejected() {
    let data = Array2::<f32>::zeros((10, 40));
    let err = prepare_patch(&data, 32, WindowMethod::None, WindowShape::Separable).unwrap_err();
    assert!(matches!(
        err,
        DriftError::InvalidDimensions {
            width: 40,
            height: 10
        }
    ));
}

#[test]
fn test_source_is_not_modified() {
    let data = Array2::from_shape_fn((8, 8), |(r, c)| (r + c) as f32);
    let copy = data.clone();
    let _ = prepare_patch(&data, 8, WindowMethod::Tukey, WindowShape::Radial).unwrap();
    assert_eq!(data, copy);
}

#[test]
fn test_content_is_weighted_deviation_from_weighted_mean() {
    let data = Array2::from_shape_fn((6, 7), |(r, c)| ((r * 7 + c * 3) % 11) as f32);
    for (method, shape) in [
        (WindowMethod::Hanning, WindowShape::Radial),
        (WindowMethod::Tukey, WindowShape::Separable),
        (WindowMethod::None, WindowShape::Separable),
    ] {
        let patch = prepare_patch(&data, 8, method, shape).unwrap();
        let weights = weights_2d(method, shape, 6, 7);
        let weighted_sum: f64 = data
            .iter()
            .zip(weights.iter())
            .map(|(&v, &w)| v as f64 * w)
            .sum();
        let mean = weighted_sum / weights.sum();

        let InsertRect { x, y, .. } = patch.insert;
        for ((r, c), &v) in data.indexed_iter() {
            let expected = weights[[r, c]] * (v as f64 - mean);
            assert_abs_diff_eq!(patch.data[[y + r, x + c]], expected, epsilon = 1e-12);
        }
    }
}
