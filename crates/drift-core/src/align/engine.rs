//! Reference-state owner driving the full registration pipeline.
//!
//! An [`AlignEngine`] moves between two states: no reference, or a prepared
//! reference (padded patch statistics plus its spectrum). Once prepared, the
//! reference is immutable and shared as `Arc<PreparedReference>`, so any
//! number of targets can be aligned against it concurrently. Replacing the
//! reference takes `&mut self`, which serialises it against in-flight reads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::compute::cpu::CpuBackend;
use crate::compute::{SpectralBackend, Spectrum};
use crate::config::{AlignConfig, BatchOutputs, SearchBounds, SubPixelMethod};
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::{DriftError, Result};
use crate::frame::{AlignmentResult, Frame, InsertRect};
use crate::progress::ProgressReporter;

use super::correlate::correlate;
use super::normalize::{local_deviation, normalize_scores};
use super::patch::{prepare_patch, working_size, Patch};
use super::peak::find_peak;
use super::rolling_sum::RollingSums;
use super::subpixel::refine_peak_cubic;
use super::translate::translate_frame;

/// Reference image prepared for repeated alignment.
pub struct PreparedReference {
    config: AlignConfig,
    insert: InsertRect,
    sums: Option<RollingSums>,
    spectrum: Spectrum,
    backend: Arc<dyn SpectralBackend>,
}

/// Target image padded, normalized to unit energy and transformed.
#[derive(Clone, Debug)]
pub struct PreparedTarget {
    patch: Patch,
    spectrum: Spectrum,
}

impl PreparedTarget {
    pub fn size(&self) -> usize {
        self.patch.size()
    }

    pub fn insert(&self) -> InsertRect {
        self.patch.insert
    }

    /// The zero-mean, unit-energy padded patch.
    pub fn patch(&self) -> &Array2<f64> {
        &self.patch.data
    }
}

/// Alignment of one target plus the surfaces it was derived from.
#[derive(Clone, Debug)]
pub struct Alignment {
    pub result: AlignmentResult,
    /// The (optionally normalized) correlation surface, zero shift at `size/2`.
    pub surface: Array2<f64>,
}

/// Per-slice output of [`AlignEngine::align_stack`].
#[derive(Clone, Debug, Default)]
pub struct SliceAlignment {
    pub index: usize,
    /// `None` when the slice could not be aligned.
    pub result: Option<AlignmentResult>,
    pub aligned: Option<Frame>,
    pub correlation: Option<Array2<f32>>,
    pub normalized_target: Option<Array2<f32>>,
}

impl PreparedReference {
    /// Prepare `reference` inside a `size`x`size` working patch.
    ///
    /// Returns `Ok(None)` for an empty or featureless reference.
    pub fn new(
        reference: &Frame,
        size: usize,
        config: &AlignConfig,
        backend: Arc<dyn SpectralBackend>,
    ) -> Result<Option<Self>> {
        if reference.is_empty() {
            warn!("Reference image is empty");
            return Ok(None);
        }
        if reference.width() > size || reference.height() > size {
            return Err(DriftError::InvalidArgument(format!(
                "reference {}x{} does not fit a {}x{} working patch",
                reference.width(),
                reference.height(),
                size,
                size
            )));
        }

        let patch = prepare_patch(&reference.data, size, config.window, config.window_shape)?;
        if patch.energy() <= 0.0 {
            warn!("Reference image has no contrast after mean removal");
            return Ok(None);
        }

        let sums = config.normalized.then(|| RollingSums::new(&patch.data));
        let spectrum = backend.forward(&patch.data);

        debug!(
            size,
            window = %config.window,
            normalized = config.normalized,
            backend = backend.name(),
            "Prepared reference"
        );

        Ok(Some(Self {
            config: config.clone(),
            insert: patch.insert,
            sums,
            spectrum,
            backend,
        }))
    }

    /// Side length of the working patch.
    pub fn size(&self) -> usize {
        self.spectrum.size()
    }

    pub fn insert(&self) -> InsertRect {
        self.insert
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    pub fn has_rolling_sums(&self) -> bool {
        self.sums.is_some()
    }

    /// Pad, window and transform a target against this reference's size.
    ///
    /// Returns `Ok(None)` for empty or featureless targets and for targets
    /// larger than the working patch.
    pub fn prepare_target(&self, target: &Frame) -> Result<Option<PreparedTarget>> {
        let size = self.size();
        if target.is_empty() {
            warn!("Target image is empty");
            return Ok(None);
        }
        if target.width() > size || target.height() > size {
            warn!(
                width = target.width(),
                height = target.height(),
                size,
                "Target larger than the prepared reference patch"
            );
            return Ok(None);
        }

        let mut patch = prepare_patch(
            &target.data,
            size,
            self.config.window,
            self.config.window_shape,
        )?;
        if !patch.normalize_to_unit_length() {
            warn!("Target image has no contrast after mean removal");
            return Ok(None);
        }
        let spectrum = self.backend.forward(&patch.data);
        Ok(Some(PreparedTarget { patch, spectrum }))
    }

    /// Align a raw target.
    pub fn align(&self, target: &Frame) -> Result<Option<Alignment>> {
        match self.prepare_target(target)? {
            Some(prepared) => self.align_prepared(&prepared),
            None => Ok(None),
        }
    }

    /// Align a target prepared by [`prepare_target`](Self::prepare_target).
    ///
    /// A target prepared for a different working size is a caller error.
    /// Returns `Ok(None)` when the search bounds miss the surface entirely.
    pub fn align_prepared(&self, target: &PreparedTarget) -> Result<Option<Alignment>> {
        if target.size() != self.size() {
            return Err(DriftError::InvalidArgument(format!(
                "prepared target size {} does not match reference size {}",
                target.size(),
                self.size()
            )));
        }

        let raw = correlate(self.backend.as_ref(), &self.spectrum, &target.spectrum)?;
        let (surface, raw) = match &self.sums {
            Some(sums) => {
                let mut surface = raw.clone();
                normalize_scores(&mut surface, sums, &self.insert, &target.patch.insert);
                (surface, Some(raw))
            }
            None => (raw, None),
        };

        let bounds = self.config.bounds.unwrap_or_else(|| {
            SearchBounds::half_max(
                (self.insert.width, self.insert.height),
                (target.patch.insert.width, target.patch.insert.height),
            )
        });

        let Some(peak) = find_peak(&surface, &bounds) else {
            warn!(?bounds, "Search bounds do not intersect the correlation surface");
            return Ok(None);
        };

        let half = (self.size() / 2) as f64;
        let result = match self.config.subpixel {
            SubPixelMethod::None => AlignmentResult {
                dx: peak.x as f64 - half,
                dy: peak.y as f64 - half,
                score: peak.value,
            },
            SubPixelMethod::Cubic => {
                // Refine on the raw surface; see the normalize module.
                let samples = raw.as_ref().unwrap_or(&surface);
                let refined = refine_peak_cubic(self.backend.as_ref(), samples, &peak);
                let deviation = self.sums.as_ref().and_then(|sums| {
                    local_deviation(
                        sums,
                        &self.insert,
                        &target.patch.insert,
                        peak.x as i64 - half as i64,
                        peak.y as i64 - half as i64,
                    )
                });
                AlignmentResult {
                    dx: refined.x - half,
                    dy: refined.y - half,
                    score: deviation.map_or(refined.value, |d| refined.value / d),
                }
            }
        };

        debug!(dx = result.dx, dy = result.dy, score = result.score, "Aligned target");
        Ok(Some(Alignment { result, surface }))
    }
}

/// Owns the reference state and aligns targets against it.
pub struct AlignEngine {
    config: AlignConfig,
    backend: Arc<dyn SpectralBackend>,
    reference: Option<Arc<PreparedReference>>,
    last: Mutex<Option<AlignmentResult>>,
}

impl AlignEngine {
    pub fn new(config: AlignConfig) -> Self {
        Self::with_backend(config, Arc::new(CpuBackend))
    }

    pub fn with_backend(config: AlignConfig, backend: Arc<dyn SpectralBackend>) -> Self {
        Self {
            config,
            backend,
            reference: None,
            last: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Replace the options used by later reference initialisations.
    pub fn set_config(&mut self, config: AlignConfig) {
        self.config = config;
    }

    /// Prepare `reference` (working size from the reference alone), or reset
    /// to the uninitialised state when `None`.
    pub fn init_reference(&mut self, reference: Option<&Frame>) -> Result<()> {
        let size = reference
            .map(|r| working_size(&[(r.width(), r.height())]))
            .unwrap_or(0);
        self.init_reference_sized(reference, size)
    }

    /// Prepare `reference` with a working size that also covers targets of
    /// `target_dims` (width, height).
    pub fn init_reference_for(
        &mut self,
        reference: Option<&Frame>,
        target_dims: (usize, usize),
    ) -> Result<()> {
        let size = reference
            .map(|r| working_size(&[(r.width(), r.height()), target_dims]))
            .unwrap_or(0);
        self.init_reference_sized(reference, size)
    }

    fn init_reference_sized(&mut self, reference: Option<&Frame>, size: usize) -> Result<()> {
        self.reference = None;
        if let Ok(mut last) = self.last.lock() {
            *last = None;
        }
        let Some(reference) = reference else {
            debug!("Reference cleared");
            return Ok(());
        };
        self.reference =
            PreparedReference::new(reference, size, &self.config, self.backend.clone())?
                .map(Arc::new);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.reference.is_some()
    }

    /// Shared handle to the prepared reference, for concurrent alignment.
    pub fn reference(&self) -> Option<Arc<PreparedReference>> {
        self.reference.clone()
    }

    /// Most recent successful alignment made through this engine.
    pub fn last_result(&self) -> Option<AlignmentResult> {
        self.last.lock().ok().and_then(|last| *last)
    }

    fn record(&self, result: AlignmentResult) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(result);
        }
    }

    /// Estimate the shift that aligns `target` onto the reference.
    ///
    /// Returns `Ok(None)` when there is no reference or the target cannot be
    /// aligned (empty, featureless or larger than the working patch).
    pub fn align(&self, target: &Frame) -> Result<Option<AlignmentResult>> {
        let Some(reference) = &self.reference else {
            warn!("Alignment requested before a reference was prepared");
            return Ok(None);
        };
        let result = reference.align(target)?.map(|a| a.result);
        if let Some(result) = result {
            self.record(result);
        }
        Ok(result)
    }

    /// Align `target` and return it translated onto the reference.
    pub fn align_and_translate(&self, target: &Frame) -> Result<Option<(AlignmentResult, Frame)>> {
        let Some(reference) = &self.reference else {
            return Ok(None);
        };
        let config = reference.config();
        Ok(self.align(target)?.map(|result| {
            let aligned = translate_frame(
                target,
                result.dx,
                result.dy,
                config.interpolation,
                config.clip_output,
            );
            (result, aligned)
        }))
    }

    pub fn prepare_target(&self, target: &Frame) -> Result<Option<PreparedTarget>> {
        match &self.reference {
            Some(reference) => reference.prepare_target(target),
            None => Ok(None),
        }
    }

    pub fn align_prepared(&self, target: &PreparedTarget) -> Result<Option<AlignmentResult>> {
        let Some(reference) = &self.reference else {
            return Ok(None);
        };
        let result = reference.align_prepared(target)?.map(|a| a.result);
        if let Some(result) = result {
            self.record(result);
        }
        Ok(result)
    }

    /// Align every slice of `stack` against the reference.
    ///
    /// Slices are independent: a slice that cannot be aligned yields a
    /// `None` result without affecting the others. Cancellation is checked
    /// between slices and aborts the whole batch.
    pub fn align_stack(
        &self,
        stack: &[Frame],
        outputs: BatchOutputs,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<SliceAlignment>> {
        if stack.is_empty() {
            return Err(DriftError::EmptySequence);
        }

        let total = stack.len();
        let counter = AtomicUsize::new(0);

        let process = |index: usize, frame: &Frame| -> Option<SliceAlignment> {
            if reporter.is_cancelled() {
                return None;
            }
            let slice = self.align_slice(index, frame, outputs);
            let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.advance(done, total);
            Some(slice)
        };

        let slices: Vec<Option<SliceAlignment>> = if total >= PARALLEL_FRAME_THRESHOLD {
            stack
                .par_iter()
                .enumerate()
                .map(|(i, frame)| process(i, frame))
                .collect()
        } else {
            let mut slices = Vec::with_capacity(total);
            for (i, frame) in stack.iter().enumerate() {
                let slice = process(i, frame);
                let stop = slice.is_none();
                slices.push(slice);
                if stop {
                    break;
                }
            }
            slices
        };

        let completed = counter.load(Ordering::Relaxed);
        if completed < total {
            reporter.log(&format!("Cancelled after {} of {} slices", completed, total));
            return Err(DriftError::Cancelled { completed, total });
        }

        let slices: Vec<SliceAlignment> = slices.into_iter().flatten().collect();
        let aligned = slices.iter().filter(|s| s.result.is_some()).count();
        info!(aligned, total, "Stack alignment finished");
        reporter.log(&format!("Aligned {} of {} slices", aligned, total));
        Ok(slices)
    }

    fn align_slice(&self, index: usize, frame: &Frame, outputs: BatchOutputs) -> SliceAlignment {
        let mut slice = SliceAlignment {
            index,
            ..Default::default()
        };
        let Some(reference) = &self.reference else {
            return slice;
        };

        let prepared = match reference.prepare_target(frame) {
            Ok(Some(prepared)) => prepared,
            Ok(None) => return slice,
            Err(err) => {
                warn!(index, %err, "Slice could not be prepared");
                return slice;
            }
        };
        if outputs.normalized_target {
            slice.normalized_target = Some(prepared.patch().mapv(|v| v as f32));
        }

        let alignment = match reference.align_prepared(&prepared) {
            Ok(Some(alignment)) => alignment,
            Ok(None) => return slice,
            Err(err) => {
                warn!(index, %err, "Slice could not be aligned");
                return slice;
            }
        };
        self.record(alignment.result);

        if outputs.correlation {
            slice.correlation = Some(alignment.surface.mapv(|v| v as f32));
        }
        if outputs.aligned {
            slice.aligned = Some(translate_frame(
                frame,
                alignment.result.dx,
                alignment.result.dy,
                reference.config().interpolation,
                reference.config().clip_output,
            ));
        }
        slice.result = Some(alignment.result);
        slice
    }
}

/// One-shot alignment: prepare the reference inline with a working size
/// covering both images, then align `target` against it.
pub fn align_pair(
    reference: &Frame,
    target: &Frame,
    config: &AlignConfig,
) -> Result<Option<AlignmentResult>> {
    let size = working_size(&[
        (reference.width(), reference.height()),
        (target.width(), target.height()),
    ]);
    let Some(prepared) = PreparedReference::new(reference, size, config, Arc::new(CpuBackend))?
    else {
        return Ok(None);
    };
    Ok(prepared.align(target)?.map(|a| a.result))
}
