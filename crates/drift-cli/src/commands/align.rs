use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use drift_core::align::AlignEngine;
use drift_core::config::{
    AlignConfig, BatchOutputs, Interpolation, SearchBounds, SubPixelMethod, WindowMethod,
    WindowShape,
};
use drift_core::frame::Frame;
use drift_core::io::image_io::{load_image, save_image, save_surface};
use drift_core::progress::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::summary::{print_align_summary, print_results};

#[derive(Clone, Copy, ValueEnum)]
pub enum WindowArg {
    None,
    Hanning,
    Cosine,
    Tukey,
}

impl From<WindowArg> for WindowMethod {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::None => WindowMethod::None,
            WindowArg::Hanning => WindowMethod::Hanning,
            WindowArg::Cosine => WindowMethod::Cosine,
            WindowArg::Tukey => WindowMethod::Tukey,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SubPixelArg {
    None,
    Cubic,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InterpolationArg {
    Nearest,
    Bilinear,
    Bicubic,
}

#[derive(Args)]
pub struct AlignArgs {
    /// Reference image
    pub reference: PathBuf,

    /// Target images to align onto the reference
    #[arg(required = true)]
    pub targets: Vec<PathBuf>,

    /// Directory for the translated targets (nothing is written without it)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Alignment config file (TOML); the options below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Window applied before transforming [default: tukey]
    #[arg(long, value_enum)]
    pub window: Option<WindowArg>,

    /// Use a radial instead of a separable window
    #[arg(long)]
    pub radial: bool,

    /// Report raw correlation instead of normalized scores
    #[arg(long)]
    pub no_normalize: bool,

    /// Sub-pixel refinement of the correlation peak [default: cubic]
    #[arg(long, value_enum)]
    pub subpixel: Option<SubPixelArg>,

    /// Resampling used for fractional translations [default: bicubic]
    #[arg(long, value_enum)]
    pub interpolation: Option<InterpolationArg>,

    /// Keep interpolation overshoot above the input maximum
    #[arg(long)]
    pub no_clip: bool,

    /// Largest shift (pixels, either axis) the search may report
    #[arg(long)]
    pub max_shift: Option<i64>,

    /// Also write correlation surfaces and normalized targets to the output directory
    #[arg(long)]
    pub diagnostics: bool,
}

/// Drives an indicatif bar from batch progress callbacks.
struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn log(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn advance(&self, done: usize, _total: usize) {
        self.bar.set_position(done as u64);
    }
}

pub fn run(args: &AlignArgs) -> Result<()> {
    let base = match args.config {
        Some(ref path) => super::config::load(path)?,
        None => AlignConfig::default(),
    };
    let config = apply_overrides(base, args);

    let reference = load_image(&args.reference)
        .with_context(|| format!("Failed to load reference {}", args.reference.display()))?;
    let targets: Vec<Frame> = args
        .targets
        .iter()
        .map(|path| {
            load_image(path).with_context(|| format!("Failed to load target {}", path.display()))
        })
        .collect::<Result<_>>()?;

    let target_dims = targets
        .iter()
        .map(|t| (t.width(), t.height()))
        .fold((0, 0), |(w, h), (tw, th)| (w.max(tw), h.max(th)));

    let mut engine = AlignEngine::new(config);
    engine.init_reference_for(Some(&reference), target_dims)?;
    let Some(prepared) = engine.reference() else {
        bail!(
            "Reference {} has no contrast to align against",
            args.reference.display()
        );
    };

    print_align_summary(
        engine.config(),
        &args.reference,
        targets.len(),
        prepared.size(),
        args.output_dir.as_deref(),
    );

    let save_diagnostics = args.diagnostics && args.output_dir.is_some();
    let outputs = BatchOutputs {
        aligned: args.output_dir.is_some(),
        correlation: save_diagnostics,
        normalized_target: save_diagnostics,
    };

    let bar = ProgressBar::new(targets.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("Aligning [{bar:40}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    let reporter = BarReporter { bar };
    let slices = engine.align_stack(&targets, outputs, &reporter)?;
    reporter.bar.finish();

    print_results(&args.targets, &slices);

    if let Some(ref dir) = args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for (path, slice) in args.targets.iter().zip(&slices) {
            if let Some(ref aligned) = slice.aligned {
                let out = output_path(dir, path, "", "tiff");
                save_image(aligned, &out)?;
                info!(path = %out.display(), "Saved aligned image");
            }
            if let Some(ref surface) = slice.correlation {
                save_surface(surface, &output_path(dir, path, "_correlation", "tiff"))?;
            }
            if let Some(ref patch) = slice.normalized_target {
                save_surface(patch, &output_path(dir, path, "_normalized", "tiff"))?;
            }
        }
        println!("\nOutput saved to {}", dir.display());
    }

    Ok(())
}

/// Layer the command-line flags that were given over `config`.
fn apply_overrides(mut config: AlignConfig, args: &AlignArgs) -> AlignConfig {
    if let Some(window) = args.window {
        config.window = window.into();
    }
    if args.radial {
        config.window_shape = WindowShape::Radial;
    }
    if args.no_normalize {
        config.normalized = false;
    }
    if let Some(max_shift) = args.max_shift {
        config.bounds = Some(SearchBounds::symmetric(max_shift.abs()));
    }
    if let Some(subpixel) = args.subpixel {
        config.subpixel = match subpixel {
            SubPixelArg::None => SubPixelMethod::None,
            SubPixelArg::Cubic => SubPixelMethod::Cubic,
        };
    }
    if let Some(interpolation) = args.interpolation {
        config.interpolation = match interpolation {
            InterpolationArg::Nearest => Interpolation::Nearest,
            InterpolationArg::Bilinear => Interpolation::Bilinear,
            InterpolationArg::Bicubic => Interpolation::Bicubic,
        };
    }
    if args.no_clip {
        config.clip_output = false;
    }
    config
}

/// `<dir>/<target stem><suffix>.<ext>`
fn output_path(dir: &Path, target: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "target".to_string());
    dir.join(format!("{stem}{suffix}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AlignArgs {
        AlignArgs {
            reference: PathBuf::from("ref.tiff"),
            targets: vec![PathBuf::from("a.tiff")],
            output_dir: None,
            config: None,
            window: None,
            radial: false,
            no_normalize: false,
            subpixel: None,
            interpolation: None,
            no_clip: false,
            max_shift: None,
            diagnostics: false,
        }
    }

    #[test]
    fn no_flags_keep_the_base_config() {
        assert_eq!(
            apply_overrides(AlignConfig::default(), &args()),
            AlignConfig::default()
        );
        let base = AlignConfig {
            window: WindowMethod::Cosine,
            normalized: false,
            ..Default::default()
        };
        assert_eq!(apply_overrides(base.clone(), &args()), base);
    }

    #[test]
    fn flags_override_defaults() {
        let config = apply_overrides(
            AlignConfig::default(),
            &AlignArgs {
                window: Some(WindowArg::None),
                radial: true,
                no_normalize: true,
                subpixel: Some(SubPixelArg::None),
                interpolation: Some(InterpolationArg::Nearest),
                no_clip: true,
                max_shift: Some(-9),
                ..args()
            },
        );
        assert_eq!(config.window, WindowMethod::None);
        assert_eq!(config.window_shape, WindowShape::Radial);
        assert!(!config.normalized);
        assert_eq!(config.bounds, Some(SearchBounds::symmetric(9)));
        assert_eq!(config.subpixel, SubPixelMethod::None);
        assert_eq!(config.interpolation, Interpolation::Nearest);
        assert!(!config.clip_output);
    }

    #[test]
    fn output_names_follow_target_stem() {
        let dir = Path::new("/out");
        assert_eq!(
            output_path(dir, Path::new("frames/f01.png"), "_correlation", "tiff"),
            PathBuf::from("/out/f01_correlation.tiff")
        );
        assert_eq!(
            output_path(dir, Path::new("f02.tif"), "", "tiff"),
            PathBuf::from("/out/f02.tiff")
        );
    }
}
