//! Camera for ray generation.

use ember_math::{Ray, Vec3};
use rand::RngCore;
use thiserror::Error;

use crate::sampling::{gen_f32, random_in_unit_disk};

/// Per-sample randomization mode for [`Camera::make_ray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Randomization {
    /// Deterministic center-of-pixel rays; no sub-pixel or lens jitter.
    None,
    /// Uniform sub-pixel jitter for antialiasing, plus lens sampling when
    /// the aperture is open.
    MonteCarlo,
}

/// Camera configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum CameraError {
    /// The vertical field of view must lie strictly between 0 and 180
    /// degrees.
    #[error("invalid field of view: {degrees} degrees (expected 0 < fov < 180)")]
    InvalidFov { degrees: f32 },
}

/// Camera mapping pixel coordinates to world-space rays.
///
/// Thin-lens look-at model with a vertical field of view, lens aperture, and
/// focus distance. [`Camera::initialize`] derives the image-plane state once;
/// [`Camera::make_ray`] is then a pure function of that state, the pixel
/// coordinate, and the caller's RNG, so it is safe to call from many threads
/// at once.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,       // Vertical field of view in degrees
    aperture: f32,   // Lens diameter; 0 disables defocus blur
    focus_dist: f32, // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            // Cached values (initialized to defaults)
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings: vertical fov in degrees, lens aperture (diameter),
    /// and focus distance.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Derive the image-plane state. Must be called before the first
    /// `make_ray`, and again after any setting changes.
    ///
    /// A field of view outside (0, 180) degrees is rejected and the
    /// previously derived state is left untouched.
    pub fn initialize(&mut self) -> Result<(), CameraError> {
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(CameraError::InvalidFov {
                degrees: self.vfov,
            });
        }

        self.center = self.look_from;

        // Viewport dimensions on the focus plane
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Camera basis vectors: w points from look_at back to the camera
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Viewport edge vectors and per-pixel deltas
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Upper left pixel location
        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        self.lens_radius = self.aperture / 2.0;

        Ok(())
    }

    /// Generate a ray for pixel (x, y).
    ///
    /// The image-plane target carries a (0.5, 0.5) offset from the pixel's
    /// top-left corner; `MonteCarlo` adds uniform jitter in [-0.5, 0.5]^2.
    /// With an open aperture the origin is sampled on the lens disk while the
    /// target stays on the focus plane, so objects at the focus distance
    /// remain sharp. An aperture of zero keeps the origin fixed at the camera
    /// center.
    pub fn make_ray(
        &self,
        x: u32,
        y: u32,
        randomization: Randomization,
        rng: &mut dyn RngCore,
    ) -> Ray {
        let offset = match randomization {
            Randomization::None => Vec3::ZERO,
            Randomization::MonteCarlo => {
                Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
            }
        };

        let pixel_sample = self.pixel00_loc
            + (x as f32 + offset.x) * self.pixel_delta_u
            + (y as f32 + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.lens_radius <= 0.0 || randomization == Randomization::None {
            self.center
        } else {
            let p = self.lens_radius * random_in_unit_disk(rng);
            self.center + p.x * self.u + p.y * self.v
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
