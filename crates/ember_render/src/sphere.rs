//! Sphere primitive.

use std::sync::Arc;

use ember_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;

/// A sphere primitive.
///
/// Holds a shared handle to its material; many spheres in a scene may
/// reference the same `Material`.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let b = 2.0 * oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Smaller root first; fall back to the larger one
        let mut root = (-b - sqrtd) / (2.0 * a);
        if !ray_t.surrounds(root) {
            root = (-b + sqrtd) / (2.0 * a);
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let point = ray.at(root);
        Some(HitRecord {
            t: root,
            point,
            normal: (point - self.center) / self.radius,
            material: &self.material,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Color;

    fn unit_sphere_at(center: Vec3) -> Sphere {
        Sphere::new(
            center,
            1.0,
            Arc::new(Material::lambertian(Color::splat(0.5))),
        )
    }

    #[test]
    fn test_sphere_entry_hit() {
        // A ray from distance d aimed at the center enters at t = d - r.
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .expect("centered ray must hit");
        assert!((rec.t - 4.0).abs() < 1e-4);
        assert!((rec.normal - Vec3::Z).length() < 1e-4);
        assert!((rec.normal.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_miss() {
        // Perpendicular offset greater than the radius: no hit.
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .is_none());

        // Ray pointing away from the sphere.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .is_none());
    }

    #[test]
    fn test_sphere_inside_hit_uses_larger_root() {
        // From the center, the smaller root is behind the origin; the larger
        // root (the exit point) must be returned with an outward normal.
        let sphere = unit_sphere_at(Vec3::ZERO);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY))
            .expect("ray from inside must hit the shell");
        assert!((rec.t - 1.0).abs() < 1e-4);
        // Outward orientation: the normal points along the ray here.
        assert!(rec.normal.dot(ray.direction()) > 0.0);
    }

    #[test]
    fn test_sphere_bbox_never_false_negative() {
        // Every ray that hits the sphere must also hit its bounding box.
        let sphere = unit_sphere_at(Vec3::new(0.5, -0.25, -4.0));
        let bbox = sphere.bounding_box();
        let range = Interval::new(0.001, f32::INFINITY);

        for ix in -4..=4 {
            for iy in -4..=4 {
                let direction = Vec3::new(ix as f32 * 0.1, iy as f32 * 0.1 - 0.1, -1.0);
                let ray = Ray::new(Vec3::ZERO, direction);
                if sphere.hit(&ray, range).is_some() {
                    assert!(bbox.hit(&ray, range), "bbox missed a sphere-hitting ray");
                }
            }
        }
    }

    #[test]
    fn test_sphere_t_range_respected() {
        let sphere = unit_sphere_at(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        // Entry at t=4 is outside a [0.001, 2] range; exit at t=6 is too.
        assert!(sphere.hit(&ray, Interval::new(0.001, 2.0)).is_none());

        // Range covering only the exit point returns the larger root.
        let rec = sphere.hit(&ray, Interval::new(5.0, 10.0)).unwrap();
        assert!((rec.t - 6.0).abs() < 1e-4);
    }
}
