use std::path::{Path, PathBuf};

use console::Style;
use drift_core::align::SliceAlignment;
use drift_core::config::{AlignConfig, SubPixelMethod, WindowMethod, WindowShape};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_align_summary(
    config: &AlignConfig,
    reference: &Path,
    target_count: usize,
    patch_size: usize,
    output_dir: Option<&Path>,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Drift Alignment"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Reference"),
        s.path.apply_to(reference.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Targets"),
        s.value.apply_to(target_count)
    );
    match output_dir {
        Some(dir) => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.path.apply_to(dir.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.disabled.apply_to("offsets only")
        ),
    }
    println!();

    // Correlation
    println!("  {}", s.header.apply_to("Correlation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Patch"),
        s.value.apply_to(format!("{patch_size}x{patch_size}"))
    );
    if config.window == WindowMethod::None {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Window"),
            s.disabled.apply_to("none")
        );
    } else {
        let shape = match config.window_shape {
            WindowShape::Separable => "separable",
            WindowShape::Radial => "radial",
        };
        println!(
            "    {:<12}{} {}",
            s.label.apply_to("Window"),
            s.method.apply_to(config.window),
            s.label.apply_to(format!("({shape})"))
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Scores"),
        s.value.apply_to(if config.normalized { "normalized" } else { "raw" })
    );
    match config.bounds {
        Some(b) => println!(
            "    {:<12}{}",
            s.label.apply_to("Search"),
            s.value
                .apply_to(format!("x {}..{}, y {}..{}", b.min_x, b.max_x, b.min_y, b.max_y))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Search"),
            s.value.apply_to("half image")
        ),
    }
    if config.subpixel == SubPixelMethod::None {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Sub-pixel"),
            s.disabled.apply_to("disabled")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Sub-pixel"),
            s.method.apply_to(config.subpixel)
        );
    }
    println!();

    // Translation
    if output_dir.is_some() {
        println!("  {}", s.header.apply_to("Translation"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Resampling"),
            s.method.apply_to(config.interpolation)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Clip"),
            s.value.apply_to(if config.clip_output { "yes" } else { "no" })
        );
        println!();
    }
}

/// One line per target: offset and score, or why it has none.
pub fn print_results(targets: &[PathBuf], slices: &[SliceAlignment]) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Offsets"));
    for (path, slice) in targets.iter().zip(slices) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match slice.result {
            Some(r) => println!(
                "    {:<24}{}  {}",
                s.label.apply_to(name),
                s.value.apply_to(format!("dx {:>8.3}  dy {:>8.3}", r.dx, r.dy)),
                s.method.apply_to(format!("score {:.4}", r.score))
            ),
            None => println!(
                "    {:<24}{}",
                s.label.apply_to(name),
                s.disabled.apply_to("no alignment")
            ),
        }
    }
}
