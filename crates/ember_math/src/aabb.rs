use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box used for conservative overlap rejection in the
/// BVH.
///
/// The box is stored as three intervals, one per axis. `Aabb::EMPTY` contains
/// nothing; surrounding it with any real box yields that box unchanged, which
/// is what lets BVH construction fold bounds without an init special case.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// The box minimum along an axis (0=X, 1=Y, 2=Z). Ordering key for BVH
    /// median partitioning.
    pub fn min_along(&self, axis: usize) -> f32 {
        self.axis_interval(axis).min
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method: each axis contributes an entry/exit pair computed from
    /// the inverse direction component (swapped when that component is
    /// negative, since dividing by a negative flips the interval order), and
    /// the running t-range is intersected with all three. Rejection is
    /// strict: a ray exactly grazing a face counts as a miss. A zero
    /// direction component divides to +/-infinity and falls out of the
    /// comparisons under IEEE semantics.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let ray_orig = r.origin;
        let ray_dir = r.direction;

        // X axis
        let adinv = 1.0 / ray_dir.x;
        let mut t0 = (self.x.min - ray_orig.x) * adinv;
        let mut t1 = (self.x.max - ray_orig.x) * adinv;
        if adinv < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }
        ray_t.min = t0.max(ray_t.min);
        ray_t.max = t1.min(ray_t.max);
        if ray_t.max <= ray_t.min {
            return false;
        }

        // Y axis
        let adinv = 1.0 / ray_dir.y;
        let mut t0 = (self.y.min - ray_orig.y) * adinv;
        let mut t1 = (self.y.max - ray_orig.y) * adinv;
        if adinv < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }
        ray_t.min = t0.max(ray_t.min);
        ray_t.max = t1.min(ray_t.max);
        if ray_t.max <= ray_t.min {
            return false;
        }

        // Z axis
        let adinv = 1.0 / ray_dir.z;
        let mut t0 = (self.z.min - ray_orig.z) * adinv;
        let mut t1 = (self.z.max - ray_orig.z) * adinv;
        if adinv < 0.0 {
            std::mem::swap(&mut t0, &mut t1);
        }
        ray_t.min = t0.max(ray_t.min);
        ray_t.max = t1.min(ray_t.max);
        if ray_t.max <= ray_t.min {
            return false;
        }

        true
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    /// An AABB that contains nothing.
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
