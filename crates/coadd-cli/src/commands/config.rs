use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use coadd_core::pipeline::config::{CoaddConfig, HeaderKeyConfig, NormalizationConfig};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default CoaddConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = CoaddConfig {
        images: vec![PathBuf::from("image_1.fits"), PathBuf::from("image_2.fits")],
        psfs: vec![PathBuf::from("psf_1.fits"), PathBuf::from("psf_2.fits")],
        output: PathBuf::from("coadd.fits"),
        header: HeaderKeyConfig::default(),
        normalization: NormalizationConfig::default(),
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
