//! Recursive radiance estimation and the framebuffer it fills.

use ember_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::camera::{Camera, Randomization};
use crate::hittable::Hittable;
use crate::material::Color;

/// Lower bound of every intersection query. Keeps secondary rays from
/// re-hitting the surface they just left (shadow acne).
const T_MIN: f32 = 0.001;

/// What a ray that escapes the scene sees. A pure function of the ray
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// White-to-blue gradient keyed on the unit direction's y component.
    SkyGradient,
    /// Unit direction remapped into [0,1]^3. Debug visualization.
    Direction,
}

impl Background {
    /// Shade an escaped ray.
    pub fn shade(&self, ray: &Ray) -> Color {
        let unit = ray.direction().normalize();
        match self {
            Background::SkyGradient => {
                let a = 0.5 * (unit.y + 1.0);
                (1.0 - a) * Color::new(1.0, 1.0, 1.0) + a * Color::new(0.5, 0.7, 1.0)
            }
            Background::Direction => 0.5 * unit + Vec3::splat(0.5),
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce count before a path terminates as absorbed
    pub max_depth: u32,
    /// Shading of rays that miss the scene
    pub background: Background,
    /// Per-sample randomization mode
    pub randomization: Randomization,
    /// Base seed for the per-bucket sample streams
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 64,
            max_depth: 16,
            background: Background::SkyGradient,
            randomization: Randomization::MonteCarlo,
            seed: 0,
        }
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// Bounded recursion: `depth` counts down from `config.max_depth`, and at
/// zero the path terminates as absorbed (black). A hit delegates to the
/// material; absorption returns black, a scatter recurses with the
/// attenuation applied componentwise. A miss returns the background.
pub fn radiance(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    match world.hit(ray, Interval::new(T_MIN, f32::INFINITY)) {
        Some(rec) => match rec.material.scatter(ray, &rec, rng) {
            Some(scatter) => {
                scatter.attenuation * radiance(&scatter.scattered, world, depth - 1, config, rng)
            }
            None => Color::ZERO,
        },
        None => config.background.shade(ray),
    }
}

/// Average `samples_per_pixel` independent radiance estimates for one pixel.
pub fn sample_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut accum = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let ray = camera.make_ray(x, y, config.randomization, rng);
        accum += radiance(&ray, world, config.max_depth, config, rng);
    }
    accum / config.samples_per_pixel as f32
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize one channel: gamma correction, clamp to [0, 1], scale and
/// truncate to 8 bits.
#[inline]
fn to_byte(channel: f32) -> u8 {
    (255.99 * linear_to_gamma(channel).clamp(0.0, 1.0)) as u8
}

/// Convert a linear color to packed 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Dense row-major image of linear colors, origin at the top-left.
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Row-major RGB triples, top-to-bottom: width * height * 3 bytes for
    /// the external image encoder.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HittableList;
    use crate::material::Material;
    use crate::sphere::Sphere;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_sky_gradient_direction() {
        let up = Ray::new(Vec3::ZERO, Vec3::Y);
        let down = Ray::new(Vec3::ZERO, Vec3::NEG_Y);

        let up_color = Background::SkyGradient.shade(&up);
        let down_color = Background::SkyGradient.shade(&down);

        // Up is the blue end, down the white end.
        assert!(up_color.x < down_color.x);
        assert_eq!(down_color, Color::ONE);
    }

    #[test]
    fn test_direction_background_is_pure() {
        let ray = Ray::new(Vec3::new(5.0, -2.0, 1.0), Vec3::new(0.0, 1.0, 0.0));
        let shifted = Ray::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));

        // Only the direction matters, and scaling it changes nothing.
        assert_eq!(
            Background::Direction.shade(&ray),
            Background::Direction.shade(&shifted)
        );
        assert_eq!(Background::Direction.shade(&ray), Color::new(0.5, 1.0, 0.5));
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-4);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_color_to_rgb8_clamps() {
        // Out-of-range channels clamp instead of wrapping.
        assert_eq!(color_to_rgb8(Color::new(4.0, -1.0, 1.0)), [255, 0, 255]);
        let mid = color_to_rgb8(Color::splat(0.25));
        assert_eq!(mid, [127, 127, 127]); // sqrt(0.25) * 255.99 truncated
    }

    #[test]
    fn test_radiance_miss_returns_background() {
        let list = HittableList::new();
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        let color = radiance(&ray, &list, config.max_depth, &config, &mut rng);
        assert_eq!(color, config.background.shade(&ray));
    }

    #[test]
    fn test_depth_termination_in_mirror_trap() {
        // Two facing mirrors bounce an axial ray forever; the depth cap must
        // still terminate with a finite, non-negative color.
        let mirror = Arc::new(Material::metal(Color::splat(0.99), 0.0));
        let mut list = HittableList::new();
        list.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, 10.0),
            1.0,
            mirror.clone(),
        )));
        list.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -10.0),
            1.0,
            mirror,
        )));

        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let color = radiance(&ray, &list, config.max_depth, &config, &mut rng);
        assert!(color.is_finite());
        assert!(color.min_element() >= 0.0);
    }

    #[test]
    fn test_sample_pixel_convergence() {
        // Repeated renders of one pixel: more samples per pixel means less
        // variance across repeats (diffuse-only scene).
        let material = Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
        let mut list = HittableList::new();
        list.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            material.clone(),
        )));
        list.add(Box::new(Sphere::new(
            Vec3::new(0.0, -101.0, -3.0),
            100.0,
            material,
        )));

        let mut camera = Camera::new().with_resolution(16, 9);
        camera.initialize().unwrap();

        let variance_for = |samples: u32| {
            let config = RenderConfig {
                samples_per_pixel: samples,
                ..Default::default()
            };
            let repeats = 16;
            let values: Vec<f32> = (0..repeats)
                .map(|i| {
                    let mut rng = StdRng::seed_from_u64(1000 + i);
                    let c = sample_pixel(&camera, &list, 8, 4, &config, &mut rng);
                    (c.x + c.y + c.z) / 3.0
                })
                .collect();
            let mean = values.iter().sum::<f32>() / repeats as f32;
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / repeats as f32
        };

        let var_1 = variance_for(1);
        let var_64 = variance_for(64);
        assert!(
            var_64 < var_1,
            "variance did not shrink: {} vs {}",
            var_64,
            var_1
        );
    }

    #[test]
    fn test_framebuffer_rgb8_layout() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set(0, 0, Color::new(1.0, 0.0, 0.0));
        fb.set(1, 1, Color::new(0.0, 0.0, 1.0));

        let bytes = fb.to_rgb8();
        assert_eq!(bytes.len(), 12);
        // Top-left pixel first, row-major.
        assert_eq!(&bytes[0..3], &[255, 0, 0]);
        assert_eq!(&bytes[9..12], &[0, 0, 255]);
    }
}
