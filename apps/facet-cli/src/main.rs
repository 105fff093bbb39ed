use clap::{Parser, Subcommand};
use facet_assets::{AssetStore, MeshData, load_obj, parse_obj};
use facet_common::{Camera, SceneObject};
use facet_kernel::{
    BoxError, Engine, EngineConfig, Game, HeadlessPlatform, LoopConfig, ManualClock, RenderMode,
};
use facet_render::{DebugTextRenderer, RenderView, Renderer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "facet-cli", about = "CLI tool for facet meshes and loop timing")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Import a Wavefront OBJ file and report what the mesh keeps
    Import {
        file: PathBuf,
        /// Dump the reindexed mesh as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drive the game loop headless on a simulated clock
    Simulate {
        /// Frames to present before closing
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Seconds each presented frame takes
        #[arg(long, default_value = "0.0133333")]
        frame_time: f64,
        /// Relative frame time wobble in [0, 1)
        #[arg(long, default_value = "0.0")]
        jitter: f64,
        /// Simulation steps per second (overrides config)
        #[arg(long)]
        ups: Option<u32>,
        /// Sync target without vsync (overrides config)
        #[arg(long)]
        target_fps: Option<u32>,
        /// Only render in iterations that ran an update
        #[arg(long)]
        staggered: bool,
        /// JSON engine config to start from
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print a debug text frame of the demo scene
    Scene {
        /// Use this OBJ instead of the built-in quad
        #[arg(long)]
        obj: Option<PathBuf>,
        /// Camera position as x,y,z
        #[arg(
            long,
            value_delimiter = ',',
            allow_negative_numbers = true,
            default_values_t = [0.0, 0.0, 0.0]
        )]
        camera: Vec<f32>,
    },
    /// Write the default engine config as JSON
    Config {
        #[arg(short, long)]
        write: PathBuf,
    },
}

/// Counts steps and keeps the largest alpha seen.
#[derive(Default)]
struct Simulation {
    updates: u64,
    renders: u64,
    max_alpha: f64,
}

impl Game<HeadlessPlatform> for Simulation {
    fn initialize(&mut self, _platform: &mut HeadlessPlatform) -> Result<(), BoxError> {
        Ok(())
    }

    fn update(&mut self, _platform: &mut HeadlessPlatform, _dt: f64) {
        self.updates += 1;
    }

    fn render(&mut self, _platform: &mut HeadlessPlatform, alpha: f64) {
        self.renders += 1;
        self.max_alpha = self.max_alpha.max(alpha);
    }

    fn dispose(&mut self, _platform: &mut HeadlessPlatform) {
        tracing::debug!(
            updates = self.updates,
            renders = self.renders,
            max_alpha = self.max_alpha,
            "simulation disposed"
        );
    }
}

/// Deterministic frame times around `base`, each within `base * (1 ± jitter)`.
fn frame_times(base: f64, jitter: f64) -> Vec<f64> {
    (0..11)
        .map(|i| {
            let wobble = (i * 7 % 11) as f64 / 5.0 - 1.0;
            (base * (1.0 + jitter * wobble)).max(0.0)
        })
        .collect()
}

/// Reject simulation settings the loop cannot run meaningfully.
fn check_simulation(frames: u64, jitter: f64) -> anyhow::Result<()> {
    if frames == 0 {
        anyhow::bail!("--frames must be at least 1");
    }
    if !(0.0..1.0).contains(&jitter) {
        anyhow::bail!("jitter must be in [0, 1), got {jitter}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Info => {
            println!("facet-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", facet_kernel::crate_info());
            println!("render: {}", facet_render::crate_info());
            println!("assets: {}", facet_assets::crate_info());
            println!("input: {}", facet_input::crate_info());
            let timing = LoopConfig::default();
            println!(
                "defaults: ups={}, target_fps={}, report every {} ticks",
                timing.ups, timing.target_fps, timing.report_interval_ticks
            );
        }
        Commands::Import { file, json } => {
            let source = std::fs::read_to_string(&file)?;
            let doc = parse_obj(&source)?;
            let mesh = doc.to_mesh()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&mesh)?);
                return Ok(());
            }

            let mut store = AssetStore::new();
            let id = store.register_mesh(mesh.clone())?;
            println!("Imported {} as {id}", file.display());
            println!(
                "Source: positions={}, texcoords={}, normals={}, faces={}",
                doc.positions.len(),
                doc.texcoords.len(),
                doc.normals.len(),
                doc.faces.len()
            );
            println!(
                "Mesh: slots={}, indices={}, triangles={}, texcoords={}, normals={}",
                mesh.position_count(),
                mesh.vertex_count(),
                mesh.triangle_count(),
                mesh.has_texcoords(),
                mesh.has_normals()
            );

            let seams = doc.seam_conflicts();
            if seams.is_empty() {
                println!("Seams: none");
            } else {
                println!(
                    "Seams: {} position(s) share several texcoord/normal pairings; \
                     the last face wins",
                    seams.len()
                );
                for seam in &seams {
                    println!("  v{} -> {:?}", seam.position + 1, seam.pairings);
                }
            }
        }
        Commands::Simulate {
            frames,
            frame_time,
            jitter,
            ups,
            target_fps,
            staggered,
            config,
        } => {
            let mut engine_config = match config {
                Some(path) => EngineConfig::load(path)?,
                None => EngineConfig::default(),
            };
            if let Some(ups) = ups {
                engine_config.timing.ups = ups;
            }
            if let Some(fps) = target_fps {
                engine_config.timing.target_fps = fps;
            }
            if staggered {
                engine_config.timing.render_mode = RenderMode::Staggered;
            }
            check_simulation(frames, jitter)?;

            let times = frame_times(frame_time, jitter);
            // The loop sees the clock advanced by every present but the last.
            let elapsed: f64 = times
                .iter()
                .cycle()
                .take(frames.saturating_sub(1) as usize)
                .sum();
            let interval = 1.0 / f64::from(engine_config.timing.ups);

            println!(
                "Simulating {frames} frames at ~{frame_time:.4}s (jitter {jitter}), \
                 ups={}, mode={:?}",
                engine_config.timing.ups, engine_config.timing.render_mode
            );

            let clock = ManualClock::new();
            let engine = Engine::with_clock(engine_config.timing.clone(), clock.clone())
                .with_title(engine_config.window.title.clone());
            let (width, height) = (engine_config.window.width, engine_config.window.height);
            let report = engine.run(Simulation::default(), move || {
                Ok(HeadlessPlatform::new(width, height)
                    .with_clock(clock, times)
                    .close_after(frames))
            })?;

            println!("Simulated time: {elapsed:.3}s");
            println!(
                "Updates: {} (expected {})",
                report.updates,
                (elapsed / interval).floor() as u64
            );
            println!("Frames: {}", report.frames);
            println!("Last published: FPS={}, UPS={}", report.fps, report.ups);
            println!("Final state: {}", engine.state());
        }
        Commands::Scene { obj, camera } => {
            let mesh: MeshData = match obj {
                Some(path) => load_obj(path)?,
                None => MeshData::textured_quad(),
            };
            let mesh = Arc::new(mesh);

            let mut near = SceneObject::new(Arc::clone(&mesh));
            near.set_position(0.0, 0.0, -2.0);
            let mut far = SceneObject::new(mesh);
            far.set_position(-2.0, 0.0, -6.0);

            let [x, y, z] = camera[..] else {
                anyhow::bail!("--camera takes x,y,z, got {} value(s)", camera.len());
            };
            let view = RenderView {
                camera: Camera::new(glam::Vec3::new(x, y, z), glam::Vec3::ZERO),
                ..RenderView::default()
            };
            let mut renderer = DebugTextRenderer::new();
            print!("{}", renderer.draw(&[near, far], &view));
        }
        Commands::Config { write } => {
            EngineConfig::default().save(&write)?;
            println!("Wrote default config to {}", write.display());
        }
    }

    Ok(())
}
