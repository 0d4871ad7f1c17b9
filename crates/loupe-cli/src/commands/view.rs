use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use loupe_core::config::EngineConfig;
use loupe_core::engine::ViewportEngine;
use loupe_core::geometry::{Size, Vec2};
use loupe_core::io::load_image;
use loupe_core::pan::PanDirection;

/// How to place the image in the viewport before rendering or probing.
#[derive(Args, Clone, Debug)]
pub struct ViewArgs {
    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, default_value = "800x600", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Engine config TOML (see `loupe config`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fit the whole image before zooming
    #[arg(long)]
    pub fit: bool,

    /// Zoom steps; negative zooms out
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub zoom: f64,

    /// Screen point X,Y to zoom around (viewport center if omitted)
    #[arg(long, value_parser = parse_point)]
    pub at: Option<(f64, f64)>,

    /// Arrow-key pans applied after zooming, in order
    #[arg(long, value_enum)]
    pub key: Vec<KeyArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyArg {
    Up,
    Down,
    Left,
    Right,
}

impl From<KeyArg> for PanDirection {
    fn from(key: KeyArg) -> Self {
        match key {
            KeyArg::Up => PanDirection::Up,
            KeyArg::Down => PanDirection::Down,
            KeyArg::Left => PanDirection::Left,
            KeyArg::Right => PanDirection::Right,
        }
    }
}

/// Load the config and image, then replay the requested moves.
pub fn open_engine(file: &Path, view: &ViewArgs) -> Result<ViewportEngine> {
    let config = match view.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            EngineConfig::from_toml_str(&text).context("Invalid engine config")?
        }
        None => EngineConfig::default(),
    };

    let buffer =
        load_image(file).with_context(|| format!("Failed to load {}", file.display()))?;
    let mut engine = ViewportEngine::new(config, Size::new(view.size.0, view.size.1))?;
    engine.load(buffer)?;

    if view.fit {
        engine.on_fit();
    }
    if view.zoom != 0.0 {
        let anchor = view
            .at
            .map(Vec2::from)
            .unwrap_or_else(|| engine.viewport().center());
        let notch = engine.config().zoom.wheel_notch;
        engine.on_wheel(view.zoom * notch, anchor)?;
    }
    for &key in &view.key {
        engine.on_key_pan(key.into());
    }
    Ok(engine)
}

pub fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("viewport dimensions must be non-zero".into());
    }
    Ok((w, h))
}

pub fn parse_point(s: &str) -> std::result::Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err("point must be finite".into());
    }
    Ok((x, y))
}
