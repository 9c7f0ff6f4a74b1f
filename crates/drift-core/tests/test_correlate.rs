use approx::assert_abs_diff_eq;
use ndarray::Array2;

use drift_core::align::correlate::correlate;
use drift_core::align::peak::{find_peak, search_rect, Peak};
use drift_core::align::subpixel::refine_peak_cubic;
use drift_core::compute::cpu::{swap_quadrants, CpuBackend};
use drift_core::compute::SpectralBackend;
use drift_core::config::SearchBounds;

mod common;

fn gaussian_surface(h: usize, w: usize, cy: f64, cx: f64, sigma: f64) -> Array2<f64> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        let dy = r as f64 - cy;
        let dx = c as f64 - cx;
        (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
    })
}

// ---------------------------------------------------------------------------
// Transform primitive
// ---------------------------------------------------------------------------

#[test]
fn test_forward_inverse_roundtrip() {
    let backend = CpuBackend;
    let data = common::noise(16, 16, 11);
    let spectrum = backend.forward(&data);
    let delta_spectrum = backend.forward(&{
        let mut delta = Array2::<f64>::zeros((16, 16));
        delta[[0, 0]] = 1.0;
        delta
    });
    // Correlating with a delta at the origin reproduces the input.
    let restored = backend.inverse(&backend.conjugate_multiply(&spectrum, &delta_spectrum));
    for (a, b) in restored.iter().zip(data.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
fn test_swap_quadrants_moves_origin_to_centre() {
    let mut data = Array2::<f64>::zeros((8, 8));
    data[[0, 0]] = 1.0;
    data[[7, 7]] = 2.0;
    swap_quadrants(&mut data);
    assert_eq!(data[[4, 4]], 1.0);
    assert_eq!(data[[3, 3]], 2.0);
    assert_eq!(data.sum(), 3.0);
}

#[test]
fn test_bicubic_sample_is_exact_at_pixels() {
    let backend = CpuBackend;
    let data = common::noise(10, 10, 5);
    for &(r, c) in &[(0usize, 0usize), (3, 7), (9, 9), (5, 2)] {
        let v = backend.bicubic_sample(&data, r as f64, c as f64);
        assert_abs_diff_eq!(v, data[[r, c]], epsilon = 1e-12);
    }
}

// ---------------------------------------------------------------------------
// Correlation surface
// ---------------------------------------------------------------------------

#[test]
fn test_autocorrelation_peaks_at_centre() {
    let backend = CpuBackend;
    let data = common::noise(32, 32, 1).mapv(|v| v - 0.5);
    let spectrum = backend.forward(&data);
    let surface = correlate(&backend, &spectrum, &spectrum).unwrap();

    let peak = find_peak(&surface, &SearchBounds::symmetric(16)).unwrap();
    assert_eq!((peak.x, peak.y), (16, 16));
    let energy: f64 = data.iter().map(|v| v * v).sum();
    assert_abs_diff_eq!(peak.value, energy, epsilon = 1e-9);
}

#[test]
fn test_correlation_peak_gives_shift_onto_reference() {
    let backend = CpuBackend;
    let mut reference = Array2::<f64>::zeros((16, 16));
    let mut target = Array2::<f64>::zeros((16, 16));
    reference[[6, 9]] = 1.0;
    target[[4, 5]] = 1.0;

    let surface = correlate(
        &backend,
        &backend.forward(&reference),
        &backend.forward(&target),
    )
    .unwrap();
    let peak = find_peak(&surface, &SearchBounds::symmetric(8)).unwrap();
    // Target must move by (+4, +2) to land on the reference.
    assert_eq!((peak.x as i64 - 8, peak.y as i64 - 8), (4, 2));
}

#[test]
fn test_mismatched_spectra_are_rejected() {
    let backend = CpuBackend;
    let a = backend.forward(&Array2::<f64>::zeros((8, 8)));
    let b = backend.forward(&Array2::<f64>::zeros((16, 16)));
    assert!(correlate(&backend, &a, &b).is_err());
}

// ---------------------------------------------------------------------------
// Peak search
// ---------------------------------------------------------------------------

#[test]
fn test_peak_respects_bounds() {
    let mut surface = Array2::<f64>::zeros((16, 16));
    surface[[1, 1]] = 10.0;
    surface[[9, 10]] = 5.0;

    let peak = find_peak(&surface, &SearchBounds::symmetric(3)).unwrap();
    assert_eq!(
        peak,
        Peak {
            x: 10,
            y: 9,
            value: 5.0
        }
    );

    let peak = find_peak(&surface, &SearchBounds::symmetric(8)).unwrap();
    assert_eq!((peak.x, peak.y), (1, 1));
}

#[test]
fn test_peak_ties_resolve_in_row_major_order() {
    let mut surface = Array2::<f64>::zeros((8, 8));
    surface[[5, 2]] = 3.0;
    surface[[3, 6]] = 3.0;
    surface[[3, 4]] = 3.0;
    let peak = find_peak(&surface, &SearchBounds::symmetric(4)).unwrap();
    assert_eq!((peak.x, peak.y), (4, 3));
}

#[test]
fn test_empty_search_rect() {
    let surface = Array2::<f64>::ones((8, 8));
    let outside = SearchBounds {
        min_x: 10,
        max_x: 20,
        min_y: 0,
        max_y: 0,
    };
    assert!(search_rect(8, 8, &outside).is_none());
    assert!(find_peak(&surface, &outside).is_none());

    let inverted = SearchBounds {
        min_x: 2,
        max_x: -2,
        min_y: 0,
        max_y: 0,
    };
    assert!(find_peak(&surface, &inverted).is_none());
    assert!(find_peak(&Array2::<f64>::zeros((0, 0)), &SearchBounds::symmetric(2)).is_none());
}

#[test]
fn test_search_rect_is_clipped_to_surface() {
    assert_eq!(
        search_rect(16, 16, &SearchBounds::symmetric(100)),
        Some((0, 0, 15, 15))
    );
    assert_eq!(
        search_rect(16, 16, &SearchBounds::symmetric(2)),
        Some((6, 6, 10, 10))
    );
}

// ---------------------------------------------------------------------------
// Sub-pixel refinement
// ---------------------------------------------------------------------------

#[test]
fn test_cubic_refinement_finds_fractional_peak() {
    let backend = CpuBackend;
    let surface = gaussian_surface(21, 21, 9.8, 10.3, 2.0);
    let peak = find_peak(&surface, &SearchBounds::symmetric(10)).unwrap();
    assert_eq!((peak.x, peak.y), (10, 10));

    let refined = refine_peak_cubic(&backend, &surface, &peak);
    assert!((refined.x - 10.3).abs() < 0.02, "x={}", refined.x);
    assert!((refined.y - 9.8).abs() < 0.02, "y={}", refined.y);
    assert!(refined.value >= peak.value);
}

#[test]
fn test_cubic_refinement_stays_within_half_pixel() {
    let backend = CpuBackend;
    // True maximum sits 0.7 px from the sampled integer peak along x.
    let surface = gaussian_surface(21, 21, 10.0, 10.7, 3.0);
    let peak = Peak {
        x: 10,
        y: 10,
        value: surface[[10, 10]],
    };
    let refined = refine_peak_cubic(&backend, &surface, &peak);
    assert!((refined.x - 10.0).abs() <= 0.5 + 1e-12);
    assert!((refined.y - 10.0).abs() <= 0.5 + 1e-12);
    assert!(refined.value >= peak.value);
}

#[test]
fn test_cubic_refinement_keeps_symmetric_peak() {
    let backend = CpuBackend;
    let surface = gaussian_surface(15, 15, 7.0, 7.0, 1.5);
    let peak = find_peak(&surface, &SearchBounds::symmetric(7)).unwrap();
    let refined = refine_peak_cubic(&backend, &surface, &peak);
    assert_abs_diff_eq!(refined.x, 7.0, epsilon = 1e-3);
    assert_abs_diff_eq!(refined.y, 7.0, epsilon = 1e-3);
    assert_abs_diff_eq!(refined.value, 1.0, epsilon = 1e-9);
}
