mod game;
mod platform;

use anyhow::Result;
use clap::Parser;
use facet_kernel::{Engine, EngineConfig};
use game::{SceneSource, Showcase};
use platform::DesktopPlatform;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "facet-desktop", about = "Facet desktop demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON engine config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wavefront OBJ to show instead of the built-in quad
    #[arg(long)]
    obj: Option<PathBuf>,

    /// PNG or JPEG texture for the mesh
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Force vsync on
    #[arg(long, conflicts_with = "no_vsync")]
    vsync: bool,

    /// Force vsync off; the loop then paces itself to --target-fps
    #[arg(long)]
    no_vsync: bool,

    /// Frame rate the loop aims for without vsync
    #[arg(long)]
    target_fps: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if cli.vsync {
        config.window.vsync = true;
    }
    if cli.no_vsync {
        config.window.vsync = false;
    }
    if let Some(fps) = cli.target_fps {
        config.timing.target_fps = fps;
    }
    config.validate()?;

    let game = Showcase::new(SceneSource {
        obj: cli.obj,
        texture: cli.texture,
    });
    let engine = Engine::new(config.timing.clone()).with_title(config.window.title.clone());
    let window = config.window;
    let report = engine.run(game, move || Ok(DesktopPlatform::new(window)?))?;

    tracing::info!(
        updates = report.updates,
        frames = report.frames,
        fps = report.fps,
        ups = report.ups,
        "facet-desktop exiting"
    );
    Ok(())
}
