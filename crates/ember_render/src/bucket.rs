//! Bucket (tile) decomposition and the parallel render loop.
//!
//! The integrator evaluates pixels independently, so the image is divided
//! into tiles that render concurrently under rayon. Each bucket owns its own
//! RNG stream; nothing mutable is shared between workers.

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::hittable::Hittable;
use crate::integrator::{sample_pixel, Framebuffer, RenderConfig};
use crate::material::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, ordered center-out.
///
/// Center buckets render first so the most important part of the image
/// appears early when results are streamed.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_center_out(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from the image center.
fn sort_center_out(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    buckets.sort_by(|a, b| {
        let a_center_x = a.x as f32 + a.width as f32 / 2.0;
        let a_center_y = a.y as f32 + a.height as f32 / 2.0;
        let b_center_x = b.x as f32 + b.width as f32 / 2.0;
        let b_center_y = b.y as f32 + b.height as f32 / 2.0;

        let a_dist = (a_center_x - center_x).powi(2) + (a_center_y - center_y).powi(2);
        let b_dist = (b_center_x - center_x).powi(2) + (b_center_y - center_y).powi(2);

        a_dist.partial_cmp(&b_dist).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    rng: &mut dyn rand::RngCore,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            pixels.push(sample_pixel(camera, world, global_x, global_y, config, rng));
        }
    }

    pixels
}

/// Render the whole image, buckets in parallel.
///
/// Each bucket draws from a `SmallRng` seeded from `config.seed` and the
/// bucket index, so a render is reproducible for a fixed seed while sample
/// draws stay independent across workers.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> Framebuffer {
    let buckets = generate_buckets(camera.image_width, camera.image_height, DEFAULT_BUCKET_SIZE);
    info!(
        "rendering {}x{}: {} buckets, {} samples/pixel, depth {}",
        camera.image_width,
        camera.image_height,
        buckets.len(),
        config.samples_per_pixel,
        config.max_depth
    );

    let results: Vec<(Bucket, Vec<Color>)> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(bucket.index as u64));
            let pixels = render_bucket(bucket, camera, world, config, &mut rng);
            debug!("bucket {} done ({} px)", bucket.index, bucket.pixel_count());
            (*bucket, pixels)
        })
        .collect();

    let mut image = Framebuffer::new(camera.image_width, camera.image_height);
    for (bucket, pixels) in results {
        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                image.set(
                    bucket.x + local_x,
                    bucket.y + local_y,
                    pixels[(local_y * bucket.width + local_x) as usize],
                );
            }
        }
    }

    image
}
