use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use loupe_core::geometry::Vec2;

use super::view::{open_engine, parse_point, ViewArgs};

#[derive(Args)]
pub struct ProbeArgs {
    /// Input image file
    pub file: PathBuf,

    /// Screen point X,Y to inspect
    #[arg(long, value_parser = parse_point)]
    pub point: (f64, f64),

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run(args: &ProbeArgs) -> Result<()> {
    let mut engine = open_engine(&args.file, &args.view)?;
    engine.on_cursor_move(Vec2::from(args.point))?;
    crate::summary::print_probe_summary(&engine.debug_snapshot());
    Ok(())
}
