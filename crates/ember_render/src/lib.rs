//! Ember render core - CPU path tracing.
//!
//! A Monte Carlo path tracer: camera ray generation, sphere and BVH
//! intersection, material scattering, and the recursive radiance estimator.
//! Pixel evaluation is side-effect-free, so the bucket module can farm it
//! out across threads with rayon.

mod bucket;
mod bvh;
mod camera;
mod hittable;
mod integrator;
mod material;
mod sampling;
mod sphere;

pub use bucket::{generate_buckets, render, render_bucket, Bucket, DEFAULT_BUCKET_SIZE};
pub use bvh::Bvh;
pub use camera::{Camera, CameraError, Randomization};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::{
    color_to_rgb8, linear_to_gamma, radiance, sample_pixel, Background, Framebuffer, RenderConfig,
};
pub use material::{Color, Material, ScatterResult};
pub use sampling::{gen_f32, random_in_unit_disk, random_in_unit_sphere};
pub use sphere::Sphere;

/// Re-export common math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
