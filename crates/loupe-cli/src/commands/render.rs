use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use loupe_core::io::save_block_png;
use loupe_core::resample::Quality;

use super::view::{open_engine, ViewArgs};

/// Upper bound on waiting for the background settled pass.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Args)]
pub struct RenderArgs {
    /// Input image file
    pub file: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Which tier of the kernel policy to render with
    #[arg(long, value_enum, default_value = "settled")]
    pub quality: QualityArg,

    /// Output PNG path
    #[arg(short, long, default_value = "frame.png")]
    pub output: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    Interactive,
    Settled,
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let mut engine = open_engine(&args.file, &args.view)?;

    let settle_window = engine.config().render.settle_window();
    let now = Instant::now();
    engine.tick(now);
    if args.quality == QualityArg::Settled {
        engine.tick(now + settle_window);
        let settled = engine.frame_info().is_some_and(|i| i.quality == Quality::Settled);
        if !settled && !engine.wait_for_settled(SETTLE_TIMEOUT) {
            bail!("Settled frame did not arrive within {:?}", SETTLE_TIMEOUT);
        }
    }
    let elapsed = now.elapsed();

    crate::summary::print_render_summary(&engine, elapsed);

    save_block_png(engine.current_frame(), &args.output)?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
