use console::Style;
use coadd_core::pipeline::config::CoaddConfig;
use coadd_core::pipeline::CoaddOutput;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warning: Style,
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
            warning: Style::new().bold().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_coadd_summary(config: &CoaddConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Optimal Coadd"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();

    println!("  {}", s.header.apply_to("Exposures"));
    for (image, psf) in config.images.iter().zip(&config.psfs) {
        println!(
            "    {}  {}  {}",
            s.path.apply_to(image.display()),
            s.label.apply_to("psf"),
            s.path.apply_to(psf.display())
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Calibration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Zero point"),
        s.value.apply_to(&config.header.zero_point)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sky sigma"),
        s.value.apply_to(&config.header.sky_sigma)
    );
    println!();

    println!("  {}", s.header.apply_to("Normalization"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Units"),
        s.method.apply_to(config.normalization.units)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("PSF energy"),
        s.method.apply_to(config.normalization.psf_energy)
    );
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!();
}

pub fn print_result_summary(config: &CoaddConfig, output: &CoaddOutput) {
    let s = Styles::new();
    let (h, w) = output.image.dim();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Exposures"),
        s.value.apply_to(output.exposure_count)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Dimensions"),
        s.value.apply_to(format!("{w}x{h}"))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Imag. residual"),
        s.value.apply_to(format!("{:.3e}", output.max_imaginary_residual))
    );
    if output.non_finite_pixels > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Non-finite"),
            s.warning.apply_to(format!("{} pixels", output.non_finite_pixels))
        );
    }
    println!(
        "\n  Output saved to {}",
        s.path.apply_to(config.output.display())
    );
}
