//! Bounding volume hierarchy acceleration structure.
//!
//! The tree is stored as an index-addressed arena of nodes rather than a
//! pointer-chasing tree of allocations; it is strictly acyclic and built
//! bottom-up once, then queried read-only.

use std::cmp::Ordering;

use ember_math::{Aabb, Interval, Ray};
use log::debug;

use crate::hittable::{HitRecord, Hittable};

/// Arena node. Children address other nodes by index.
enum Node {
    Branch {
        left: usize,
        right: usize,
        bbox: Aabb,
    },
    Leaf {
        object: usize,
        bbox: Aabb,
    },
    Empty,
}

impl Node {
    fn bbox(&self) -> Aabb {
        match self {
            Node::Branch { bbox, .. } | Node::Leaf { bbox, .. } => *bbox,
            Node::Empty => Aabb::EMPTY,
        }
    }
}

/// Binary BVH over a set of primitives.
///
/// Construction partitions the primitives at the median of their bounding-box
/// minima along an axis that cycles x -> y -> z with tree depth, using a
/// linear-time selection rather than a full sort. Leaves hold one primitive;
/// a set of two becomes a branch over two leaves with no further split.
pub struct Bvh {
    nodes: Vec<Node>,
    objects: Vec<Box<dyn Hittable>>,
    root: usize,
}

impl Bvh {
    /// Build a BVH over the given primitives.
    pub fn new(objects: Vec<Box<dyn Hittable>>) -> Self {
        let mut indices: Vec<usize> = (0..objects.len()).collect();
        let mut nodes = Vec::with_capacity(2 * objects.len() + 1);
        let root = Self::build(&objects, &mut indices, &mut nodes, 0);

        debug!(
            "built BVH over {} primitives ({} nodes)",
            objects.len(),
            nodes.len()
        );

        Self {
            nodes,
            objects,
            root,
        }
    }

    /// Number of primitives in the hierarchy.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check whether the hierarchy holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Recursive construction over a slice of object indices. Returns the
    /// arena index of the subtree root.
    fn build(
        objects: &[Box<dyn Hittable>],
        indices: &mut [usize],
        nodes: &mut Vec<Node>,
        depth: usize,
    ) -> usize {
        match indices.len() {
            0 => push(nodes, Node::Empty),
            1 => {
                let object = indices[0];
                let bbox = objects[object].bounding_box();
                push(nodes, Node::Leaf { object, bbox })
            }
            n => {
                let mid = n / 2;
                if n > 2 {
                    // Median by box minimum along the depth-cycled axis;
                    // selection, not a sort.
                    let axis = depth % 3;
                    indices.select_nth_unstable_by(mid, |&a, &b| {
                        let ka = objects[a].bounding_box().min_along(axis);
                        let kb = objects[b].bounding_box().min_along(axis);
                        ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
                    });
                }

                let (left_half, right_half) = indices.split_at_mut(mid);
                let left = Self::build(objects, left_half, nodes, depth + 1);
                let right = Self::build(objects, right_half, nodes, depth + 1);
                let bbox = Aabb::surrounding(&nodes[left].bbox(), &nodes[right].bbox());
                push(nodes, Node::Branch { left, right, bbox })
            }
        }
    }

    fn hit_node(&self, idx: usize, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match &self.nodes[idx] {
            Node::Empty => None,

            Node::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                self.objects[*object].hit(ray, ray_t)
            }

            Node::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = self.hit_node(*left, ray, ray_t);

                // The right subtree only has to beat the best left hit.
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = self.hit_node(*right, ray, Interval::new(ray_t.min, right_max));

                hit_right.or(hit_left)
            }
        }
    }
}

fn push(nodes: &mut Vec<Node>, node: Node) -> usize {
    nodes.push(node);
    nodes.len() - 1
}

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.hit_node(self.root, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.nodes[self.root].bbox()
    }
}
