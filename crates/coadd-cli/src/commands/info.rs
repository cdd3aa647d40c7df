use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use coadd_core::consts::{DEFAULT_SKY_SIGMA_KEY, DEFAULT_ZP_KEY};
use coadd_core::io::fits::{read_header_f64_optional, read_image};

#[derive(Args)]
pub struct InfoArgs {
    /// FITS files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Header keyword holding the flux zero point
    #[arg(long, default_value = DEFAULT_ZP_KEY)]
    pub zp_key: String,

    /// Header keyword holding the sky standard deviation
    #[arg(long, default_value = DEFAULT_SKY_SIGMA_KEY)]
    pub sky_key: String,
}

fn format_key(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v}"))
}

pub fn run(args: &InfoArgs) -> Result<()> {
    for path in &args.files {
        let image =
            read_image(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let zp = read_header_f64_optional(path, &args.zp_key)?;
        let sky = read_header_f64_optional(path, &args.sky_key)?;

        println!("File:        {}", path.display());
        println!("Dimensions:  {}x{}", image.ncols(), image.nrows());
        println!("{:<13}{}", format!("{}:", args.zp_key), format_key(zp));
        println!("{:<13}{}", format!("{}:", args.sky_key), format_key(sky));
        if let Some(sigma) = sky {
            println!("Variance:    {}", sigma * sigma);
        }
        println!();
    }

    Ok(())
}
