use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ember_render::{render, Background, Bvh, Hittable, Randomization, RenderConfig};
use log::{info, LevelFilter};

mod scene;

/// Log levels accepted on the command line.
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in scenes.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SceneKind {
    /// Ground plus one sphere per material
    Trio,
    /// Random sphere field around three feature spheres
    Demo,
}

/// Command line arguments.
#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "A CPU Monte Carlo path tracer")]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 450)]
    height: u32,

    /// Number of samples per pixel
    #[arg(short, long, default_value_t = 64)]
    samples: u32,

    /// Maximum ray bounce depth
    #[arg(long, default_value_t = 16)]
    max_depth: u32,

    /// Built-in scene to render
    #[arg(long, value_enum, default_value = "trio")]
    scene: SceneKind,

    /// JSON scene description (overrides --scene)
    #[arg(long)]
    scene_file: Option<PathBuf>,

    /// Intersect the flat primitive list instead of building a BVH
    #[arg(long)]
    no_bvh: bool,

    /// Base seed for the per-bucket sample streams (and the demo scene)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Shade escaped rays by direction instead of the sky gradient
    #[arg(long)]
    direction_background: bool,

    /// Output PNG path
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    let (list, camera) = match &args.scene_file {
        Some(path) => scene::load_scene_file(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => match args.scene {
            SceneKind::Trio => scene::trio_scene(),
            SceneKind::Demo => scene::demo_scene(args.seed),
        },
    };
    info!("scene holds {} primitives", list.len());

    let world: Box<dyn Hittable> = if args.no_bvh {
        Box::new(list)
    } else {
        Box::new(Bvh::new(list.into_objects()))
    };

    let mut camera = camera.with_resolution(args.width, args.height);
    camera
        .initialize()
        .context("camera configuration rejected")?;

    let config = RenderConfig {
        samples_per_pixel: args.samples,
        max_depth: args.max_depth,
        background: if args.direction_background {
            Background::Direction
        } else {
            Background::SkyGradient
        },
        randomization: Randomization::MonteCarlo,
        seed: args.seed,
    };

    let start = Instant::now();
    let framebuffer = render(&camera, world.as_ref(), &config);
    info!("render finished in {:.2?}", start.elapsed());

    let image = image::RgbImage::from_raw(
        framebuffer.width,
        framebuffer.height,
        framebuffer.to_rgb8(),
    )
    .context("framebuffer does not match image dimensions")?;
    image
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}
