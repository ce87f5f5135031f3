//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over the scene's primitive arena. Leaves store primitive
//! handles rather than the primitives themselves, so the tree is rebuilt
//! from the arena whenever geometry changes and is read-only while tracing.
//! Unbounded primitives (infinite planes) cannot be partitioned and are
//! kept in a separate list that every query tests.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{PrimId, Primitive, Ray};
use lumen_math::{Aabb, Vec3, PARALLEL_EPSILON};

/// Build parameters for the BVH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelConfig {
    /// Splitting stops at this depth.
    pub max_depth: usize,
    /// Nodes with this many primitives or fewer become leaves.
    pub min_leaf_size: usize,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            max_depth: 30,
            min_leaf_size: 3,
        }
    }
}

/// Shape of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
    pub max_leaf_size: usize,
    /// Bounded primitives stored in the tree
    pub primitives: usize,
    /// Primitives tested on every query
    pub unbounded: usize,
}

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug)]
enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf { prims: Vec<PrimId>, bbox: Aabb },
    /// Empty node (for edge cases).
    Empty,
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Distance at which `ray` enters this node, if before `ray.t`.
    #[inline]
    fn entry(&self, ray: &Ray, inv_dir: Vec3) -> Option<f32> {
        match self {
            BvhNode::Empty => None,
            _ => self.bbox().hit(ray.origin, inv_dir, 0.0, ray.t),
        }
    }
}

/// Primitive handle with its cached bounds, used during construction.
#[derive(Clone, Copy)]
struct BuildItem {
    id: PrimId,
    bbox: Aabb,
    centroid: Vec3,
}

/// Bounding volume hierarchy over a primitive slice.
#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    unbounded: Vec<PrimId>,
    stats: BvhStats,
}

impl Default for Bvh {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bvh {
    /// A tree that reports no hit for every query.
    pub fn empty() -> Self {
        Self {
            root: BvhNode::Empty,
            unbounded: Vec::new(),
            stats: BvhStats::default(),
        }
    }

    /// Build a tree over `primitives`. Handles index into the same slice,
    /// which must be passed unchanged to the query methods.
    pub fn build(primitives: &[Box<dyn Primitive>], config: AccelConfig) -> Self {
        let start = Instant::now();

        let mut items = Vec::with_capacity(primitives.len());
        let mut unbounded = Vec::new();
        for (i, prim) in primitives.iter().enumerate() {
            let id = PrimId::new(i);
            let bbox = prim.bounding_box();
            if bbox.is_finite() {
                items.push(BuildItem {
                    id,
                    bbox,
                    centroid: bbox.centroid(),
                });
            } else {
                unbounded.push(id);
            }
        }

        let mut stats = BvhStats {
            primitives: items.len(),
            unbounded: unbounded.len(),
            ..BvhStats::default()
        };
        let root = if items.is_empty() {
            BvhNode::Empty
        } else {
            Self::build_node(items, 0, &config, &mut stats)
        };

        log::info!(
            "BVH built in {:.2?}: {} primitives (+{} unbounded), {} nodes, {} leaves, depth {}, largest leaf {}",
            start.elapsed(),
            stats.primitives,
            stats.unbounded,
            stats.nodes,
            stats.leaves,
            stats.max_depth,
            stats.max_leaf_size
        );

        Self {
            root,
            unbounded,
            stats,
        }
    }

    /// Recursive construction.
    ///
    /// Median split: sort by centroid on the axis of largest centroid
    /// spread, split in half, recurse.
    fn build_node(
        mut items: Vec<BuildItem>,
        depth: usize,
        config: &AccelConfig,
        stats: &mut BvhStats,
    ) -> BvhNode {
        let n = items.len();
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);

        let bbox = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bbox));
        let centroid_bounds = items.iter().fold(Aabb::EMPTY, |mut acc, item| {
            acc.extend(item.centroid);
            acc
        });
        let axis = centroid_bounds.longest_axis();

        let small = n <= config.min_leaf_size.max(1);
        let too_deep = depth >= config.max_depth;
        // All centroids coincide: no split can separate them
        let degenerate = centroid_bounds.extent()[axis] < PARALLEL_EPSILON;

        if small || too_deep || degenerate {
            stats.leaves += 1;
            stats.max_leaf_size = stats.max_leaf_size.max(n);
            return BvhNode::Leaf {
                prims: items.iter().map(|item| item.id).collect(),
                bbox,
            };
        }

        items.sort_unstable_by(|a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));

        // Split at midpoint
        let right_items = items.split_off(n / 2);
        let left = Self::build_node(items, depth + 1, config, stats);
        let right = Self::build_node(right_items, depth + 1, config, stats);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    pub fn stats(&self) -> BvhStats {
        self.stats
    }

    /// True if the tree holds no primitive at all.
    pub fn is_empty(&self) -> bool {
        matches!(self.root, BvhNode::Empty) && self.unbounded.is_empty()
    }

    /// Find the closest hit, recording it in `ray`.
    ///
    /// Returns true if `ray` was updated with a closer hit.
    pub fn intersect(&self, primitives: &[Box<dyn Primitive>], ray: &mut Ray) -> bool {
        let mut hit_anything = false;
        for &id in &self.unbounded {
            hit_anything |= Self::test(primitives, id, ray);
        }

        let inv_dir = ray.inv_direction();
        if self.root.entry(ray, inv_dir).is_some() {
            hit_anything |= Self::intersect_node(&self.root, primitives, ray, inv_dir);
        }
        hit_anything
    }

    #[inline]
    fn test(primitives: &[Box<dyn Primitive>], id: PrimId, ray: &mut Ray) -> bool {
        match primitives.get(id.index()).and_then(|p| p.intersect(ray)) {
            Some(hit) => {
                ray.record(hit, id);
                true
            }
            None => false,
        }
    }

    /// Ordered traversal: the nearer child is visited first, the farther
    /// one only if it starts before the closest hit found so far.
    fn intersect_node(
        node: &BvhNode,
        primitives: &[Box<dyn Primitive>],
        ray: &mut Ray,
        inv_dir: Vec3,
    ) -> bool {
        match node {
            BvhNode::Empty => false,

            BvhNode::Leaf { prims, .. } => {
                let mut hit_anything = false;
                for &id in prims {
                    hit_anything |= Self::test(primitives, id, ray);
                }
                hit_anything
            }

            BvhNode::Branch { left, right, .. } => {
                let t_left = left.entry(ray, inv_dir);
                let t_right = right.entry(ray, inv_dir);

                let (near, t_near, far, t_far) = match (t_left, t_right) {
                    (Some(l), Some(r)) if r < l => (right, Some(r), left, Some(l)),
                    _ => (left, t_left, right, t_right),
                };

                let mut hit_anything = false;
                if t_near.is_some() {
                    hit_anything |= Self::intersect_node(near, primitives, ray, inv_dir);
                }
                if let Some(t) = t_far {
                    // Skip the far child when the hit is already in front of it
                    if t < ray.t {
                        hit_anything |= Self::intersect_node(far, primitives, ray, inv_dir);
                    }
                }
                hit_anything
            }
        }
    }

    /// True if anything blocks `ray` before its current `t`.
    ///
    /// Stops at the first blocker found; `ray` is not modified.
    pub fn occluded(&self, primitives: &[Box<dyn Primitive>], ray: &Ray) -> bool {
        let blocks = |id: &PrimId| {
            primitives
                .get(id.index())
                .is_some_and(|p| p.intersect(ray).is_some())
        };

        if self.unbounded.iter().any(&blocks) {
            return true;
        }
        let inv_dir = ray.inv_direction();
        Self::occluded_node(&self.root, ray, inv_dir, &blocks)
    }

    fn occluded_node(
        node: &BvhNode,
        ray: &Ray,
        inv_dir: Vec3,
        blocks: &impl Fn(&PrimId) -> bool,
    ) -> bool {
        if node.entry(ray, inv_dir).is_none() {
            return false;
        }
        match node {
            BvhNode::Empty => false,
            BvhNode::Leaf { prims, .. } => prims.iter().any(blocks),
            BvhNode::Branch { left, right, .. } => {
                Self::occluded_node(left, ray, inv_dir, blocks)
                    || Self::occluded_node(right, ray, inv_dir, blocks)
            }
        }
    }
}
