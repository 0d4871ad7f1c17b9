mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loupe", about = "Cursor-anchored image viewport, headless")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image metadata and the zoom range it gets
    Info(commands::info::InfoArgs),
    /// Render one viewport frame to a PNG
    Render(commands::render::RenderArgs),
    /// Report the content coordinate and pixel under a screen point
    Probe(commands::probe::ProbeArgs),
    /// Print or save the default engine config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Probe(args) => commands::probe::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
