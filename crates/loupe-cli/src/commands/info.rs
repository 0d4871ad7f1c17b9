use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use loupe_core::config::EngineConfig;
use loupe_core::io::load_image;
use loupe_core::resample::MipChain;
use loupe_core::transform::{clamp_scale, ScaleBounds};

use super::view::parse_size;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,

    /// Viewport size used to report the fit scale
    #[arg(long, default_value = "800x600", value_parser = parse_size)]
    pub size: (u32, u32),
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let buffer = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let config = EngineConfig::default();
    let bounds = ScaleBounds::for_content(&config.zoom, buffer.size());
    let mips = MipChain::build(buffer.data(), buffer.format().has_alpha(), bounds.min);

    let size = buffer.size();
    let fit = clamp_scale(
        (args.size.0 as f64 / size.width as f64).min(args.size.1 as f64 / size.height as f64),
        bounds,
    );
    let raw_mb = (size.pixel_count() * buffer.format().channels()) as f64 / (1024.0 * 1024.0);

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}", size);
    println!("Format:      {}", buffer.format());
    println!("Alpha:       {}", if buffer.format().has_alpha() { "yes" } else { "no" });
    println!("Scale range: {:.2}x .. {:.2}x", bounds.min, bounds.max);
    println!("Fit scale:   {:.4}x in {}x{}", fit, args.size.0, args.size.1);
    println!("LOD levels:  {}", mips.depth());
    println!("Data size:   {:.1} MB", raw_mb);

    Ok(())
}
