//! Hittable trait, HitRecord, and the flat-list scene container.

use ember_math::{Aabb, Interval, Ray, Vec3};

use crate::material::Material;

/// Record of a ray-object intersection.
///
/// Produced transiently by intersection queries and consumed by one
/// scattering decision; it borrows the hit primitive's material rather than
/// owning it.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Ray parameter at the intersection
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Unit normal at the intersection, in the primitive's outward
    /// orientation
    pub normal: Vec3,
    /// Material of the primitive that was hit
    pub material: &'a Material,
}

/// Trait for objects that can be hit by rays.
///
/// Implementations return the nearest intersection strictly inside `ray_t`,
/// or None. Scenes are immutable once built, and `Send + Sync` here is what
/// lets many rendering threads traverse them concurrently.
pub trait Hittable: Send + Sync {
    /// Nearest hit along `ray` with parameter strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// A flat list of hittable objects, scanned linearly.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Consume the list, yielding its objects (e.g. to build a BVH).
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut best: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        // Shrinking the search range's max to the best t found so far is
        // what makes this return the nearest hit rather than the last one
        // tested; it also prunes the remaining candidates.
        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if let Some(rec) = object.hit(ray, interval) {
                closest_so_far = rec.t;
                best = Some(rec);
            }
        }

        best
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
