use ndarray::Array2;
use num_complex::Complex;

/// Frequency-domain image of a square real-valued patch.
#[derive(Clone, Debug)]
pub struct Spectrum {
    data: Array2<Complex<f64>>,
}

impl Spectrum {
    pub fn from_array(data: Array2<Complex<f64>>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Array2<Complex<f64>> {
        &self.data
    }

    /// Side length of the (square) patch this spectrum was computed from.
    pub fn size(&self) -> usize {
        self.data.nrows()
    }
}

/// 2D transform primitive consumed by the correlation pipeline.
///
/// Implementations must be usable from several threads at once: a prepared
/// reference shares one backend across all concurrent target alignments.
pub trait SpectralBackend: Send + Sync {
    /// Human-readable backend name (for logs).
    fn name(&self) -> &str;

    /// Forward 2D transform of a real patch.
    fn forward(&self, data: &Array2<f64>) -> Spectrum;

    /// Element-wise `a * conj(b)`.
    fn conjugate_multiply(&self, a: &Spectrum, b: &Spectrum) -> Spectrum;

    /// Inverse 2D transform, returning the real part scaled by `1/(h*w)`.
    fn inverse(&self, spectrum: &Spectrum) -> Array2<f64>;

    /// Swap diagonal quadrants in place so the zero-shift cell lands at
    /// `(h/2, w/2)`.
    fn swap_quadrants(&self, data: &mut Array2<f64>);

    /// Bicubic-interpolated value at fractional `(y, x)`.
    fn bicubic_sample(&self, data: &Array2<f64>, y: f64, x: f64) -> f64;
}
