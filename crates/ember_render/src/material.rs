//! Surface scattering policies.
//!
//! The material set is fixed and small, so dispatch is a closed enum rather
//! than a trait object. A material stores only its own parameters and is
//! shared across primitives behind an `Arc`.

use ember_math::{Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_in_unit_sphere};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a scatter event: the attenuation applied to whatever the
/// scattered ray gathers, and the scattered ray itself.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// A surface material.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Diffuse surface.
    Lambertian { albedo: Color },
    /// Reflective surface; fuzz 0.0 is a perfect mirror, 1.0 very rough.
    Metal { albedo: Color, fuzz: f32 },
    /// Transparent surface with the given index of refraction
    /// (1.0 = air, 1.5 = glass, 2.4 = diamond).
    Dielectric { ior: f32 },
}

impl Material {
    /// Create a diffuse material with the given albedo.
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    /// Create a metal material. Fuzz is clamped to [0, 1].
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Create a dielectric material with the given index of refraction.
    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric { ior }
    }

    /// Scatter an incoming ray at a surface hit.
    ///
    /// Returns `Some((attenuation, scattered))` packed in a [`ScatterResult`],
    /// or None when the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match *self {
            Material::Lambertian { albedo } => {
                let mut direction = rec.normal + random_in_unit_sphere(rng);

                // Catch degenerate scatter direction
                if direction.length_squared() < 1e-8 {
                    direction = rec.normal;
                }

                Some(ScatterResult {
                    attenuation: albedo,
                    scattered: Ray::new(rec.point, direction),
                })
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let direction = (reflected + fuzz * random_in_unit_sphere(rng)).normalize();

                // The perturbed ray may end up below the surface; it is
                // still scattered, not absorbed.
                Some(ScatterResult {
                    attenuation: albedo,
                    scattered: Ray::new(rec.point, direction),
                })
            }
            Material::Dielectric { ior } => {
                let d = ray_in.direction();

                // Normals keep the primitive's outward orientation, so the
                // sign of d.n says whether we are entering or exiting.
                let (outward_normal, ni_over_nt, cosine) = if d.dot(rec.normal) > 0.0 {
                    (-rec.normal, ior, ior * d.dot(rec.normal) / d.length())
                } else {
                    (rec.normal, 1.0 / ior, -d.dot(rec.normal) / d.length())
                };

                let direction = match refract(d, outward_normal, ni_over_nt) {
                    // Snell has a real solution: Schlick reflectance decides
                    Some(refracted) if gen_f32(rng) >= schlick(cosine, ior) => refracted,
                    // reflected by probability, or forced by total internal
                    // reflection
                    _ => reflect(d, rec.normal),
                };

                Some(ScatterResult {
                    attenuation: Color::ONE,
                    scattered: Ray::new(rec.point, direction),
                })
            }
        }
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Mirror reflection of v about the normal n.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refraction of v through a surface with unit normal n, by Snell's law.
///
/// Returns None when there is no real solution (total internal reflection).
pub(crate) fn refract(v: Vec3, n: Vec3, ni_over_nt: f32) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation for Fresnel reflectance.
fn schlick(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_at_origin(material: &Material) -> HitRecord<'_> {
        HitRecord {
            t: 1.0,
            point: Vec3::ZERO,
            normal: Vec3::Y,
            material,
        }
    }

    #[test]
    fn test_lambertian_attenuation_is_albedo() {
        let albedo = Color::new(0.8, 0.6, 0.2);
        let material = Material::lambertian(albedo);
        let rec = hit_at_origin(&material);
        let ray = Ray::new(Vec3::new(0.0, 1.0, -1.0), Vec3::new(0.0, -1.0, 1.0));
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            let s = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(s.attenuation, albedo);
            assert_eq!(s.scattered.origin(), rec.point);
        }
    }

    #[test]
    fn test_energy_non_amplification() {
        // With albedo components <= 1, attenuation never exceeds one, so
        // repeated scattering cannot amplify radiance.
        let materials = [
            Material::lambertian(Color::new(1.0, 0.9, 0.5)),
            Material::metal(Color::new(0.9, 0.9, 0.9), 0.3),
        ];
        let ray = Ray::new(Vec3::new(0.0, 1.0, -1.0), Vec3::new(0.0, -1.0, 1.0));
        let mut rng = StdRng::seed_from_u64(2);

        for material in &materials {
            let rec = hit_at_origin(material);
            for _ in 0..100 {
                let s = material.scatter(&ray, &rec, &mut rng).unwrap();
                assert!(s.attenuation.max_element() <= 1.0);
                assert!(s.attenuation.min_element() >= 0.0);
            }
        }
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let material = Material::metal(Color::ONE, 0.0);
        let rec = hit_at_origin(&material);
        // 45 degree incidence in the XY plane
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(3);

        let s = material.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((s.scattered.direction() - expected).length() < 1e-5);
    }

    #[test]
    fn test_metal_always_scatters() {
        // Heavy fuzz can push the scattered ray below the surface; the
        // material still reports a scatter rather than absorption.
        let material = Material::metal(Color::ONE, 1.0);
        let rec = hit_at_origin(&material);
        let ray = Ray::new(Vec3::new(-1.0, 0.2, 0.0), Vec3::new(1.0, -0.2, 0.0));
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..200 {
            assert!(material.scatter(&ray, &rec, &mut rng).is_some());
        }
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Grazing exit from glass to air: no real solution.
        let v = Vec3::new(1.0, 0.05, 0.0);
        assert!(refract(v, Vec3::new(0.0, -1.0, 0.0), 1.5).is_none());

        // Head-on entry refracts.
        let v = Vec3::new(0.0, -1.0, 0.0);
        let refracted = refract(v, Vec3::Y, 1.0 / 1.5).unwrap();
        assert!((refracted - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_dielectric_forced_reflection_at_grazing_exit() {
        // Ray exiting the medium at grazing incidence: Snell has no real
        // solution, so every draw must pick reflection (reflect_prob = 1).
        let material = Material::dielectric(1.5);
        let rec = hit_at_origin(&material);
        let ray = Ray::new(Vec3::new(-1.0, -0.05, 0.0), Vec3::new(1.0, 0.05, 0.0));
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..200 {
            let s = material.scatter(&ray, &rec, &mut rng).unwrap();
            // Reflection stays inside the medium (negative y), refraction
            // would have escaped upward.
            assert!(s.scattered.direction().y < 0.0);
            assert_eq!(s.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_always_scatters() {
        let material = Material::dielectric(1.5);
        let rec = hit_at_origin(&material);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.3, -1.0, 0.1));
        let mut rng = StdRng::seed_from_u64(6);

        for _ in 0..200 {
            assert!(material.scatter(&ray, &rec, &mut rng).is_some());
        }
    }
}
