use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use rand::prelude::*;

use spheretrace::render::{render_with, Framebuffer, RenderConfig, Scheduler};
use spheretrace::scenes::SceneName;
use spheretrace::DEFAULT_MAX_DEPTH;

/// Path-traces a scene of spheres and writes it out as a PPM image.
#[derive(Parser, Debug)]
#[clap(version)]
struct Args {
    /// Image width in pixels; height follows from a 16:9 aspect ratio.
    #[clap(short, long, default_value_t = 640)]
    width: usize,
    /// Rays averaged per pixel.
    #[clap(short = 'n', long, default_value_t = 100)]
    samples: u32,
    /// Maximum bounces per ray.
    #[clap(short, long, default_value_t = DEFAULT_MAX_DEPTH)]
    depth: u32,
    /// Worker threads [default: all cores].
    #[clap(short = 't', long)]
    workers: Option<usize>,
    /// Rows handed to a worker at a time.
    #[clap(long, default_value_t = 4)]
    batch_rows: usize,
    /// Vertical field of view in degrees [default: chosen by the scene].
    #[clap(long)]
    vfov: Option<f32>,
    /// Scene to render: random, test or pair.
    #[clap(short, long, default_value = "random")]
    scene: SceneName,
    /// Seed for scene generation and sampling [default: from entropy].
    #[clap(long)]
    seed: Option<u64>,
    /// How rows are distributed: queue or rayon.
    #[clap(long, default_value = "queue")]
    scheduler: Scheduler,
    /// Output file [default: standard output].
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| SmallRng::from_entropy().gen());
    info!("seed {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut config = RenderConfig {
        samples_per_pixel: args.samples,
        max_depth: args.depth,
        batch_rows: args.batch_rows,
        seed,
        scheduler: args.scheduler,
        ..RenderConfig::with_width(args.width)
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.validate()?;

    let world = args.scene.build(&mut rng);
    info!("scene {} has {} objects", args.scene, world.len());
    let camera = args.scene.camera(config.aspect(), args.vfov);

    let image = render_with(&world, &camera, &config);

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_ppm(&image, BufWriter::new(file))
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_ppm(&image, BufWriter::new(stdout.lock())).context("writing image")?;
        }
    }
    Ok(())
}

fn write_ppm(image: &Framebuffer, mut out: impl Write) -> std::io::Result<()> {
    write!(out, "P6\n{} {}\n255\n", image.width(), image.height())?;
    out.write_all(&image.as_rgb_bytes())?;
    out.flush()
}
