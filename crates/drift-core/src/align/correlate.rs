use ndarray::Array2;

use crate::compute::{SpectralBackend, Spectrum};
use crate::error::{DriftError, Result};

/// Spatial cross-correlation of two transformed patches.
///
/// Cell `(size/2 + sy, size/2 + sx)` of the result holds
/// `sum_p reference(p + s) * target(p)` (circular), i.e. the score for
/// shifting the target by `(sx, sy)` onto the reference.
pub fn correlate(
    backend: &dyn SpectralBackend,
    reference: &Spectrum,
    target: &Spectrum,
) -> Result<Array2<f64>> {
    if reference.data().dim() != target.data().dim() {
        return Err(DriftError::InvalidArgument(format!(
            "spectrum size mismatch: {:?} vs {:?}",
            reference.data().dim(),
            target.data().dim()
        )));
    }

    let product = backend.conjugate_multiply(reference, target);
    let mut surface = backend.inverse(&product);
    backend.swap_quadrants(&mut surface);
    Ok(surface)
}
