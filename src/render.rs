//! Turning a scene and camera into pixels, using every core we're given.
//!
//! The image is cut into groups of whole rows. Each row is shaded by exactly
//! one worker into storage nobody else touches, which is what lets the
//! framebuffer be filled without locking individual pixels.

use std::any::Any;
use std::ops::Range;
use std::str::FromStr;
use std::time::Instant;

use crossbeam::channel;
use log::{debug, info, trace, warn};
use rand::prelude::*;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::object::{Hittable, Scene};
use crate::vec3::{Channel::*, Color};
use crate::{ray_color, Error, DEFAULT_MAX_DEPTH};

/// A gamma-corrected 8-bit pixel: red, green, blue, alpha.
pub type Rgba = [u8; 4];

/// Width over height for images sized by width alone.
pub const ASPECT_RATIO: f32 = 16. / 9.;

/// How rows are farmed out to workers. Both produce identical images; they
/// differ only in machinery.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scheduler {
    /// A dispatcher thread feeds row groups through a bounded queue to a fixed
    /// set of worker threads, which send finished rows back to the calling
    /// thread for placement.
    Queue,
    /// Row groups are disjoint mutable chunks of the framebuffer, handed out
    /// by a rayon pool sized to the worker count.
    Rayon,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::Queue
    }
}

impl FromStr for Scheduler {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queue" => Ok(Scheduler::Queue),
            "rayon" => Ok(Scheduler::Rayon),
            _ => Err(Error::UnknownScheduler(s.to_string())),
        }
    }
}

/// Knobs for a single render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Jittered camera rays averaged into each pixel.
    pub samples_per_pixel: u32,
    /// Bounce budget per camera ray. Zero is allowed and renders black.
    pub max_depth: u32,
    pub workers: usize,
    /// Rows handed to a worker at a time. Small batches balance load better;
    /// large ones spend less time on the queue.
    pub batch_rows: usize,
    /// Base seed for the per-row random streams.
    pub seed: u64,
    pub scheduler: Scheduler,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 400,
            height: 225,
            samples_per_pixel: 10,
            max_depth: DEFAULT_MAX_DEPTH,
            workers: rayon::current_num_threads(),
            batch_rows: 4,
            seed: 0xDEADBEEF,
            scheduler: Scheduler::default(),
        }
    }
}

impl RenderConfig {
    pub fn new(width: usize, height: usize) -> Self {
        RenderConfig {
            width,
            height,
            ..RenderConfig::default()
        }
    }

    /// Sizes the image by width, deriving the height from `ASPECT_RATIO`.
    pub fn with_width(width: usize) -> Self {
        let height = ((width as f32 / ASPECT_RATIO).round() as usize).max(1);
        RenderConfig::new(width, height)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Checks the preconditions `render_with` relies on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(Error::NoSamples);
        }
        if self.workers == 0 {
            return Err(Error::NoWorkers);
        }
        if self.batch_rows == 0 {
            return Err(Error::EmptyBatch);
        }
        Ok(())
    }
}

/// The finished image, row-major with the top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    /// Creates a framebuffer of fully transparent black. Rendering makes every
    /// pixel opaque, so any pixel with zero alpha was never written.
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![[0; 4]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at column `x` of row `y`, counting rows from the top.
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.row(y)[x]
    }

    pub fn row(&self, y: usize) -> &[Rgba] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    fn row_mut(&mut self, y: usize) -> &mut [Rgba] {
        &mut self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Rows from the top. A zero-width image has no pixels, so no rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgba]> {
        self.pixels.chunks(self.width.max(1))
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Packed RGB triples with alpha dropped, the layout most encoders want.
    pub fn as_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|px| px[..3].iter().copied())
            .collect()
    }
}

/// Renders `scene` through `camera` into a `width` x `height` image, averaging
/// `samples_per_pixel` rays per pixel, each allowed `max_depth` bounces, on
/// `workers` threads. Everything else comes from `RenderConfig::default()`.
///
/// Blocks until every pixel is done.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    width: usize,
    height: usize,
    samples_per_pixel: u32,
    max_depth: u32,
    workers: usize,
) -> Framebuffer {
    let config = RenderConfig {
        samples_per_pixel,
        max_depth,
        workers,
        ..RenderConfig::new(width, height)
    };
    render_with(scene, camera, &config)
}

/// Renders `world` through `camera` as described by `config`.
///
/// # Panics
///
/// If `config` fails `RenderConfig::validate`, or if shading any pixel
/// panics.
pub fn render_with<W: Hittable>(world: &W, camera: &Camera, config: &RenderConfig) -> Framebuffer {
    if let Err(e) = config.validate() {
        panic!("invalid render configuration: {}", e);
    }

    info!(
        "rendering {}x{} at {} spp, depth {}, {} workers, {} rows per batch ({:?})",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        config.workers,
        config.batch_rows,
        config.scheduler,
    );
    let start = Instant::now();

    let sampler = Sampler {
        world,
        camera,
        width: config.width,
        height: config.height,
        samples: config.samples_per_pixel,
        max_depth: config.max_depth,
        seed: config.seed,
    };
    let shade = |y: usize, row: &mut [Rgba]| sampler.shade_row(y, row);

    let mut fb = Framebuffer::new(config.width, config.height);
    schedule(
        config.scheduler,
        &mut fb,
        config.workers,
        config.batch_rows,
        &shade,
    );

    info!("render finished in {:.2?}", start.elapsed());
    fb
}

/// Per-pixel sampling loop, shared by every scheduler.
struct Sampler<'a, W> {
    world: &'a W,
    camera: &'a Camera,
    width: usize,
    height: usize,
    samples: u32,
    max_depth: u32,
    seed: u64,
}

impl<'a, W: Hittable> Sampler<'a, W> {
    fn shade_row(&self, y: usize, out: &mut [Rgba]) {
        let mut rng = row_rng(self.seed, y);
        // The viewport's t coordinate counts up from the bottom.
        let j = self.height - 1 - y;
        for (x, px) in out.iter_mut().enumerate() {
            let col: Color = (0..self.samples)
                .map(|_| {
                    let u = (x as f32 + rng.gen::<f32>()) / self.width as f32;
                    let v = (j as f32 + rng.gen::<f32>()) / self.height as f32;
                    let r = self.camera.get_ray(u, v, &mut rng);
                    ray_color(self.world, r, self.max_depth, &mut rng)
                })
                .sum();
            *px = to_rgba(col / self.samples as f32);
        }
    }
}

/// Each row draws from its own stream, so a row's pixels don't depend on
/// which worker shades it or when.
fn row_rng(seed: u64, y: usize) -> SmallRng {
    SmallRng::seed_from_u64(seed.wrapping_add(y as u64))
}

/// Gamma 2 correction and quantization of an averaged sample.
fn to_rgba(col: Color) -> Rgba {
    let col = col.map(f32::sqrt);

    fn to_u8(x: f32) -> u8 {
        (256. * x.max(0.).min(0.999)) as u8
    }

    [to_u8(col[R]), to_u8(col[G]), to_u8(col[B]), 255]
}

fn schedule<F>(scheduler: Scheduler, fb: &mut Framebuffer, workers: usize, batch_rows: usize, shade: &F)
where
    F: Fn(usize, &mut [Rgba]) + Sync,
{
    match scheduler {
        Scheduler::Queue => run_queue(fb, workers, batch_rows, shade),
        Scheduler::Rayon => run_rayon(fb, workers, batch_rows, shade),
    }
}

fn run_queue<F>(fb: &mut Framebuffer, workers: usize, batch_rows: usize, shade: &F)
where
    F: Fn(usize, &mut [Rgba]) + Sync,
{
    let (width, height) = (fb.width, fb.height);
    let (batch_tx, batch_rx) = channel::bounded::<Range<usize>>(workers);
    let (row_tx, row_rx) = channel::bounded::<(usize, Vec<Rgba>)>(workers * batch_rows);

    let outcome = crossbeam::scope(|s| {
        s.spawn(move |_| {
            for start in (0..height).step_by(batch_rows) {
                let rows = start..usize::min(start + batch_rows, height);
                trace!("dispatching rows {:?}", rows);
                if batch_tx.send(rows).is_err() {
                    // Every worker is gone; one of them must have panicked.
                    break;
                }
            }
        });

        for id in 0..workers {
            let batch_rx = batch_rx.clone();
            let row_tx = row_tx.clone();
            s.spawn(move |_| {
                let mut shaded = 0;
                for rows in batch_rx.iter() {
                    for y in rows {
                        let mut row = vec![[0; 4]; width];
                        shade(y, &mut row);
                        if row_tx.send((y, row)).is_err() {
                            return;
                        }
                        shaded += 1;
                    }
                }
                debug!("worker {} done after {} rows", id, shaded);
            });
        }

        // The workers now hold the only result senders, so the collector
        // below stops once the last of them exits.
        drop(row_tx);
        drop(batch_rx);

        let mut collected = 0;
        for (y, row) in row_rx.iter() {
            fb.row_mut(y).copy_from_slice(&row);
            collected += 1;
            debug!("collected row {} ({}/{})", y, collected, height);
        }
    });

    if let Err(payload) = outcome {
        // crossbeam bundles the payloads of every thread that panicked.
        let payload: Box<dyn Any + Send> = match payload.downcast::<Vec<Box<dyn Any + Send>>>() {
            Ok(mut panics) if !panics.is_empty() => panics.swap_remove(0),
            Ok(_) => Box::new("render thread panicked"),
            Err(payload) => payload,
        };
        std::panic::resume_unwind(payload);
    }
}

fn run_rayon<F>(fb: &mut Framebuffer, workers: usize, batch_rows: usize, shade: &F)
where
    F: Fn(usize, &mut [Rgba]) + Sync,
{
    let width = fb.width;
    let pixels = &mut fb.pixels;
    let go = move || {
        let pixels = pixels;
        pixels
            .par_chunks_mut(width * batch_rows)
            .enumerate()
            .for_each(|(batch, chunk)| {
                trace!("shading batch {}", batch);
                for (i, row) in chunk.chunks_mut(width).enumerate() {
                    shade(batch * batch_rows + i, row);
                }
            })
    };

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(go),
        Err(e) => {
            warn!("couldn't build a {}-thread pool ({}); using the global one", workers, e);
            go()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::material::Material;
    use crate::object::Sphere;
    use crate::vec3::{Point3, Vec3};

    const SCHEDULERS: [Scheduler; 2] = [Scheduler::Queue, Scheduler::Rayon];

    #[test]
    fn every_pixel_is_shaded_exactly_once() {
        let (w, h) = (13, 29);
        for &scheduler in &SCHEDULERS {
            for &workers in &[1, 3, 8, 40] {
                for &batch_rows in &[1, 4, 7, 100] {
                    let counts: Vec<AtomicUsize> = (0..w * h).map(|_| AtomicUsize::new(0)).collect();
                    let shade = |y: usize, row: &mut [Rgba]| {
                        assert_eq!(row.len(), w);
                        for (x, px) in row.iter_mut().enumerate() {
                            counts[y * w + x].fetch_add(1, Ordering::SeqCst);
                            *px = [x as u8, y as u8, 7, 255];
                        }
                    };

                    let mut fb = Framebuffer::new(w, h);
                    schedule(scheduler, &mut fb, workers, batch_rows, &shade);

                    for (i, count) in counts.iter().enumerate() {
                        assert_eq!(
                            count.load(Ordering::SeqCst),
                            1,
                            "pixel {} with {:?}, {} workers, {} rows/batch",
                            i,
                            scheduler,
                            workers,
                            batch_rows
                        );
                    }
                    for y in 0..h {
                        for x in 0..w {
                            assert_eq!(fb.pixel(x, y), [x as u8, y as u8, 7, 255]);
                        }
                    }
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "shader blew up")]
    fn queue_worker_panic_reaches_caller() {
        let shade = |y: usize, _: &mut [Rgba]| {
            if y == 5 {
                panic!("shader blew up");
            }
        };
        let mut fb = Framebuffer::new(4, 10);
        schedule(Scheduler::Queue, &mut fb, 3, 2, &shade);
    }

    #[test]
    #[should_panic(expected = "shader blew up")]
    fn rayon_worker_panic_reaches_caller() {
        let shade = |y: usize, _: &mut [Rgba]| {
            if y == 5 {
                panic!("shader blew up");
            }
        };
        let mut fb = Framebuffer::new(4, 10);
        schedule(Scheduler::Rayon, &mut fb, 3, 2, &shade);
    }

    #[test]
    fn gamma_and_quantization() {
        assert_eq!(to_rgba(Color::BLACK), [0, 0, 0, 255]);
        assert_eq!(to_rgba(Color::WHITE), [255, 255, 255, 255]);
        assert_eq!(to_rgba(Color::new(4., -1., 0.25)), [255, 0, 128, 255]);
    }

    #[test]
    fn validation_catches_degenerate_configs() {
        assert_eq!(RenderConfig::new(10, 10).validate(), Ok(()));
        assert_eq!(
            RenderConfig::new(0, 10).validate(),
            Err(Error::EmptyImage { width: 0, height: 10 })
        );
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::new(10, 10)
        };
        assert_eq!(config.validate(), Err(Error::NoSamples));
        let config = RenderConfig {
            workers: 0,
            ..RenderConfig::new(10, 10)
        };
        assert_eq!(config.validate(), Err(Error::NoWorkers));
        let config = RenderConfig {
            batch_rows: 0,
            ..RenderConfig::new(10, 10)
        };
        assert_eq!(config.validate(), Err(Error::EmptyBatch));
    }

    #[test]
    #[should_panic(expected = "samples per pixel")]
    fn render_rejects_zero_samples() {
        let camera = test_camera(1.);
        render(&Scene::new(), &camera, 4, 4, 0, 5, 1);
    }

    #[test]
    fn width_derives_height() {
        let config = RenderConfig::with_width(640);
        assert_eq!((config.width, config.height), (640, 360));
    }

    #[test]
    fn zero_depth_renders_opaque_black() {
        let scene = small_scene();
        let camera = test_camera(8. / 6.);
        let fb = render(&scene, &camera, 8, 6, 2, 0, 2);
        assert!(fb.pixels().iter().all(|&px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn output_is_reproducible_across_schedulers_and_workers() {
        let scene = small_scene();
        let camera = test_camera(16. / 9.);
        let base = RenderConfig {
            samples_per_pixel: 3,
            ..RenderConfig::new(16, 9)
        };
        let reference = render_with(&scene, &camera, &RenderConfig { workers: 1, ..base.clone() });
        for &scheduler in &SCHEDULERS {
            for &workers in &[2, 5] {
                let config = RenderConfig {
                    workers,
                    scheduler,
                    batch_rows: 2,
                    ..base.clone()
                };
                assert_eq!(render_with(&scene, &camera, &config), reference);
            }
        }
    }

    #[test]
    fn rgb_bytes_drop_alpha() {
        let mut fb = Framebuffer::new(2, 1);
        fb.row_mut(0).copy_from_slice(&[[1, 2, 3, 255], [4, 5, 6, 255]]);
        assert_eq!(fb.as_rgb_bytes(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(fb.rows().count(), 1);
    }

    #[test]
    fn zero_width_framebuffer_has_no_rows() {
        let fb = Framebuffer::new(0, 3);
        assert_eq!(fb.rows().count(), 0);
        assert!(fb.as_rgb_bytes().is_empty());
    }

    #[test]
    fn rayon_fills_rows_in_place() {
        let shade = |y: usize, row: &mut [Rgba]| {
            for px in row.iter_mut() {
                *px = [y as u8, 0, 0, 255];
            }
        };
        let mut fb = Framebuffer::new(3, 5);
        run_rayon(&mut fb, 2, 2, &shade);
        for y in 0..5 {
            assert!(fb.row(y).iter().all(|&px| px == [y as u8, 0, 0, 255]));
        }
    }

    fn small_scene() -> Scene {
        let mut scene = Scene::new();
        scene.push(Sphere::new(
            Point3::new(0., -100.5, -1.),
            100.,
            Material::Lambertian {
                albedo: Color::new(0.5, 0.5, 0.5),
            },
        ));
        scene.push(Sphere::new(
            Point3::new(0., 0., -1.),
            0.5,
            Material::Dielectric { ref_idx: 1.5 },
        ));
        scene
    }

    fn test_camera(aspect: f32) -> Camera {
        Camera::look(
            Point3::ORIGIN,
            Point3::new(0., 0., -1.),
            Vec3(0., 1., 0.),
            90.,
            aspect,
            0.,
            1.,
        )
    }
}
