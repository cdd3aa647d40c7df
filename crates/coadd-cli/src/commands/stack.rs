use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use coadd_core::consts::{DEFAULT_SKY_SIGMA_KEY, DEFAULT_ZP_KEY};
use coadd_core::pipeline::config::{CoaddConfig, HeaderKeyConfig, NormalizationConfig};
use coadd_core::pipeline::{run_coadd_reported, PipelineStage, ProgressReporter};
use coadd_core::stack::{OutputUnits, PsfEnergy};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::summary::{print_coadd_summary, print_result_summary};

#[derive(Clone, ValueEnum)]
pub enum PsfEnergyArg {
    /// Matrix product of each PSF with itself
    Matrix,
    /// Per-pixel square of each PSF
    Elementwise,
}

#[derive(Args)]
pub struct StackArgs {
    /// Aligned input images (FITS)
    #[arg(long, num_args = 1.., required_unless_present = "config")]
    pub images: Vec<PathBuf>,

    /// PSF files (FITS), one per image, same order
    #[arg(long, num_args = 1.., required_unless_present = "config")]
    pub psfs: Vec<PathBuf>,

    /// Coadd config file (TOML); replaces the other flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Header keyword holding the flux zero point
    #[arg(long, default_value = DEFAULT_ZP_KEY)]
    pub zp_key: String,

    /// Header keyword holding the sky standard deviation
    #[arg(long, default_value = DEFAULT_SKY_SIGMA_KEY)]
    pub sky_key: String,

    /// Normalize to flux units instead of standard deviations
    #[arg(long)]
    pub flux_units: bool,

    /// How the PSF energy term of the normalization is formed
    #[arg(long, value_enum, default_value = "matrix")]
    pub psf_energy: PsfEnergyArg,

    /// Output file path
    #[arg(short, long, default_value = "coadd.fits")]
    pub output: PathBuf,
}

struct BarReporter {
    pb: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.pb.set_message(stage.to_string());
        self.pb.set_length(total_items.unwrap_or(1) as u64);
        self.pb.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.pb.length() {
            self.pb.set_position(len);
        }
    }
}

pub fn run(args: &StackArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid coadd config")?
    } else {
        build_config_from_args(args)
    };
    config.validate()?;
    debug!(?config, "Resolved coadd config");

    print_coadd_summary(&config);

    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = Arc::new(BarReporter { pb: pb.clone() });

    let output = run_coadd_reported(&config, reporter)
        .with_context(|| format!("Coadd to {} failed", config.output.display()))?;
    pb.finish_with_message("Done");

    print_result_summary(&config, &output);
    Ok(())
}

fn build_config_from_args(args: &StackArgs) -> CoaddConfig {
    let psf_energy = match args.psf_energy {
        PsfEnergyArg::Matrix => PsfEnergy::MatrixProduct,
        PsfEnergyArg::Elementwise => PsfEnergy::Elementwise,
    };

    CoaddConfig {
        images: args.images.clone(),
        psfs: args.psfs.clone(),
        output: args.output.clone(),
        header: HeaderKeyConfig {
            zero_point: args.zp_key.clone(),
            sky_sigma: args.sky_key.clone(),
        },
        normalization: NormalizationConfig {
            units: OutputUnits::from_flux_units(args.flux_units),
            psf_energy,
        },
    }
}
