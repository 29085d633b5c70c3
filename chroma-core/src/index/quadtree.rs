//! # Spatial Index (Adaptive Quadtree)
//!
//! Partitions the (R,G) plane. Leaves hold up to `leaf_capacity` vectors and
//! split into four quadrants on overflow. Points outside the root region grow
//! the tree upward: a larger root is built and the old root becomes one of its
//! quadrants, so no stored vector is ever moved by growth.
//!
//! ## Search
//! Best-first branch and bound. A min-heap "fringe" orders pending nodes by the
//! Euclidean (R,G) distance from the query to their region; a bounded max-heap
//! keeps the best `k` vectors under the cosine metric. A node is dropped once
//! its region bound reaches the worst distance in a full best set.
//!
//! The bound (planar Euclidean, B ignored) and the ranking (cosine over R,G,B)
//! are different metrics, so the bound is not admissible for the ranking:
//! results are exact only when both orderings agree. Returned neighbors are
//! always sorted by cosine distance among the candidates actually visited.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, info, warn};

use crate::error::{IndexError, Result};
use crate::index::{QueryResult, VectorIndex};
use crate::vector::FeatureVector;

pub const DEFAULT_LEAF_CAPACITY: usize = 8;

/// Leaves narrower than this on both axes are never split further.
const MIN_SPLIT_EXTENT: f64 = 1e-9;

/// Quadrant slots, in child order.
const NW: usize = 0;
const NE: usize = 1;
const SW: usize = 2;
const SE: usize = 3;

/// Axis-aligned rectangle over the (R,G) plane, closed on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min_r: f64,
    pub max_r: f64,
    pub min_g: f64,
    pub max_g: f64,
}

impl Default for Region {
    /// Full 8-bit channel range.
    fn default() -> Self {
        Self::new(0.0, 255.0, 0.0, 255.0)
    }
}

impl Region {
    pub fn new(min_r: f64, max_r: f64, min_g: f64, max_g: f64) -> Self {
        Self { min_r, max_r, min_g, max_g }
    }

    /// Bounds must be finite with a positive extent on both axes.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_r, self.max_r, self.min_g, self.max_g].iter().all(|v| v.is_finite());
        if !finite || self.min_r >= self.max_r || self.min_g >= self.max_g {
            return Err(IndexError::InvalidRegion {
                min_r: self.min_r,
                max_r: self.max_r,
                min_g: self.min_g,
                max_g: self.max_g,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, r: f64, g: f64) -> bool {
        r >= self.min_r && r <= self.max_r && g >= self.min_g && g <= self.max_g
    }

    /// Euclidean distance from (r,g) to the nearest point of the region; 0 inside.
    #[inline]
    pub fn min_distance(&self, r: f64, g: f64) -> f64 {
        let dr = if r < self.min_r {
            self.min_r - r
        } else if r > self.max_r {
            r - self.max_r
        } else {
            0.0
        };
        let dg = if g < self.min_g {
            self.min_g - g
        } else if g > self.max_g {
            g - self.max_g
        } else {
            0.0
        };
        (dr * dr + dg * dg).sqrt()
    }

    #[inline]
    pub fn mid_r(&self) -> f64 {
        self.min_r * 0.5 + self.max_r * 0.5
    }

    #[inline]
    pub fn mid_g(&self) -> f64 {
        self.min_g * 0.5 + self.max_g * 0.5
    }

    pub fn width(&self) -> f64 {
        self.max_r - self.min_r
    }

    pub fn height(&self) -> f64 {
        self.max_g - self.min_g
    }

    /// True when `other` lies entirely inside this region.
    pub fn encloses(&self, other: &Region) -> bool {
        self.min_r <= other.min_r
            && self.max_r >= other.max_r
            && self.min_g <= other.min_g
            && self.max_g >= other.max_g
    }

    /// False once neither midpoint falls strictly inside its axis, i.e. a split
    /// would hand a child the parent's own bounds.
    fn is_divisible(&self) -> bool {
        let (r_mid, g_mid) = (self.mid_r(), self.mid_g());
        (self.min_r < r_mid && r_mid < self.max_r) || (self.min_g < g_mid && g_mid < self.max_g)
    }

    /// Children in slot order NW, NE, SW, SE.
    fn quadrants(&self) -> [Region; 4] {
        let (r_mid, g_mid) = (self.mid_r(), self.mid_g());
        [
            Region::new(self.min_r, r_mid, g_mid, self.max_g),
            Region::new(r_mid, self.max_r, g_mid, self.max_g),
            Region::new(self.min_r, r_mid, self.min_g, g_mid),
            Region::new(r_mid, self.max_r, self.min_g, g_mid),
        ]
    }

    /// Midpoint ties go west on R and north on G.
    #[inline]
    fn quadrant_of(&self, r: f64, g: f64) -> usize {
        let west = r <= self.mid_r();
        if g >= self.mid_g() {
            if west { NW } else { NE }
        } else if west {
            SW
        } else {
            SE
        }
    }

    /// Doubles the extent on each violated side; untouched axes keep their bounds.
    /// Bounds saturate at the finite `f64` range, so any finite point is reached.
    fn grown_toward(&self, r: f64, g: f64) -> Region {
        let mut grown = *self;
        if r < self.min_r {
            grown.min_r = (self.min_r - self.width()).max(f64::MIN);
        } else if r > self.max_r {
            grown.max_r = (self.max_r + self.width()).min(f64::MAX);
        }
        if g < self.min_g {
            grown.min_g = (self.min_g - self.height()).max(f64::MIN);
        } else if g > self.max_g {
            grown.max_g = (self.max_g + self.height()).min(f64::MAX);
        }
        grown
    }

    fn at_float_limit(&self) -> bool {
        [self.min_r, self.min_g].contains(&f64::MIN) || [self.max_r, self.max_g].contains(&f64::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadtreeConfig {
    /// Initial root region; grows on demand.
    pub region: Region,
    pub leaf_capacity: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self { region: Region::default(), leaf_capacity: DEFAULT_LEAF_CAPACITY }
    }
}

#[derive(Debug)]
enum NodeKind {
    Leaf(Vec<FeatureVector>),
    Internal(Box<[QuadNode; 4]>),
}

#[derive(Debug)]
struct QuadNode {
    region: Region,
    kind: NodeKind,
}

impl QuadNode {
    fn leaf(region: Region) -> Self {
        Self { region, kind: NodeKind::Leaf(Vec::new()) }
    }

    fn is_empty_leaf(&self) -> bool {
        matches!(&self.kind, NodeKind::Leaf(points) if points.is_empty())
    }

    /// Iterative descent: a grown root can sit on a long chain of old roots.
    fn insert(&mut self, vector: FeatureVector, capacity: usize) {
        let mut node = self;
        loop {
            let slot = node.region.quadrant_of(vector.r, vector.g);
            match node.kind {
                NodeKind::Internal(ref mut children) => node = &mut children[slot],
                NodeKind::Leaf(_) => break,
            }
        }
        if let NodeKind::Leaf(points) = &mut node.kind {
            points.push(vector);
        }
        if node.overflows(capacity) && node.can_split() {
            node.split(capacity);
        }
    }

    fn overflows(&self, capacity: usize) -> bool {
        matches!(&self.kind, NodeKind::Leaf(points) if points.len() > capacity)
    }

    /// Splitting helps only if the points can still be told apart.
    fn can_split(&self) -> bool {
        let NodeKind::Leaf(points) = &self.kind else {
            return false;
        };
        if !self.region.is_divisible() || self.region.width().max(self.region.height()) <= MIN_SPLIT_EXTENT {
            return false;
        }
        match points.first() {
            Some(first) => points.iter().any(|p| p.r != first.r || p.g != first.g),
            None => false,
        }
    }

    /// Turns this leaf into an internal node and redistributes its points.
    /// Children left over capacity are split in turn, from an explicit stack.
    fn split(&mut self, capacity: usize) {
        let mut pending: Vec<&mut QuadNode> = vec![self];
        while let Some(QuadNode { region, kind }) = pending.pop() {
            let children = Box::new(region.quadrants().map(QuadNode::leaf));
            let NodeKind::Leaf(points) = std::mem::replace(kind, NodeKind::Internal(children)) else {
                continue;
            };
            debug!(
                "Splitting leaf R [{}, {}] G [{}, {}] holding {} vectors",
                region.min_r, region.max_r, region.min_g, region.max_g, points.len()
            );
            let NodeKind::Internal(children) = kind else {
                continue;
            };
            for point in points {
                if let NodeKind::Leaf(held) = &mut children[region.quadrant_of(point.r, point.g)].kind {
                    held.push(point);
                }
            }
            for child in children.iter_mut() {
                if child.overflows(capacity) && child.can_split() {
                    pending.push(child);
                }
            }
        }
    }

    /// Depth-first visit of every node with its depth (root = 0).
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a QuadNode, usize)) {
        let mut stack: Vec<(&'a QuadNode, usize)> = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            visit(node, depth);
            if let NodeKind::Internal(children) = &node.kind {
                stack.extend(children.iter().map(|child| (child, depth + 1)));
            }
        }
    }
}

/// Entry in the best-k set; the heap top is the worst kept candidate.
struct MaxCandidate {
    distance: f64,
    vector: FeatureVector,
}

impl PartialEq for MaxCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for MaxCandidate {}
impl PartialOrd for MaxCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for MaxCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

/// Fringe entry; BinaryHeap pops largest, so comparisons are reversed.
struct Pending<'a> {
    bound: f64,
    node: &'a QuadNode,
}

impl PartialEq for Pending<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Pending<'_> {}
impl PartialOrd for Pending<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Pending<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.bound.total_cmp(&self.bound)
    }
}

pub struct Quadtree {
    root: QuadNode,
    leaf_capacity: usize,
    len: usize,
}

impl Quadtree {
    pub fn new(config: QuadtreeConfig) -> Result<Self> {
        config.region.validate()?;
        if config.leaf_capacity == 0 {
            return Err(IndexError::InvalidConfig("leaf_capacity must be at least 1".into()));
        }
        info!(
            "Initializing Quadtree (R: [{}, {}], G: [{}, {}], Leaf capacity: {})",
            config.region.min_r,
            config.region.max_r,
            config.region.min_g,
            config.region.max_g,
            config.leaf_capacity
        );
        Ok(Self { root: QuadNode::leaf(config.region), leaf_capacity: config.leaf_capacity, len: 0 })
    }

    pub fn root_region(&self) -> Region {
        self.root.region
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        self.root.walk(&mut |_, depth| deepest = deepest.max(depth));
        deepest
    }

    pub fn leaf_count(&self) -> usize {
        let mut leaves = 0;
        self.root.walk(&mut |node, _| {
            if matches!(node.kind, NodeKind::Leaf(_)) {
                leaves += 1;
            }
        });
        leaves
    }

    /// Largest number of vectors held by any single leaf.
    pub fn max_leaf_len(&self) -> usize {
        let mut largest = 0;
        self.root.walk(&mut |node, _| {
            if let NodeKind::Leaf(points) = &node.kind {
                largest = largest.max(points.len());
            }
        });
        largest
    }

    /// Grows the root until its region contains (r,g). No-op when it already does.
    fn ensure_root_contains(&mut self, r: f64, g: f64) {
        while !self.root.region.contains(r, g) {
            let old_region = self.root.region;
            let new_region = old_region.grown_toward(r, g);
            let slot = new_region.quadrant_of(old_region.mid_r(), old_region.mid_g());

            let old_root = std::mem::replace(&mut self.root, QuadNode::leaf(new_region));
            let mut children = new_region.quadrants().map(QuadNode::leaf);
            children[slot] = old_root;
            self.root.kind = NodeKind::Internal(Box::new(children));

            if new_region.at_float_limit() && !old_region.at_float_limit() {
                warn!("Quadtree root reached the f64 range limit; bounds saturate from here");
            }

            debug!(
                "Quadtree root grown to R [{}, {}] G [{}, {}] (old root in slot {})",
                new_region.min_r, new_region.max_r, new_region.min_g, new_region.max_g, slot
            );
        }
    }
}

impl VectorIndex for Quadtree {
    fn insert(&mut self, vector: FeatureVector) {
        if !vector.is_finite() {
            warn!("Quadtree skipping non-finite vector: {}", vector);
            return;
        }
        self.ensure_root_contains(vector.r, vector.g);
        self.root.insert(vector, self.leaf_capacity);
        self.len += 1;
    }

    fn query(&self, query: &FeatureVector, k: usize) -> QueryResult {
        let mut result = QueryResult::empty();
        if k == 0 || self.len == 0 {
            return result;
        }

        let (qr, qg) = (query.r, query.g);
        let mut best: BinaryHeap<MaxCandidate> = BinaryHeap::with_capacity(k + 1);
        let mut fringe: BinaryHeap<Pending<'_>> = BinaryHeap::new();
        fringe.push(Pending { bound: self.root.region.min_distance(qr, qg), node: &self.root });

        let mut worst_best = f64::INFINITY;

        while let Some(Pending { bound, node }) = fringe.pop() {
            if best.len() == k && bound >= worst_best {
                break;
            }

            match &node.kind {
                NodeKind::Leaf(points) => {
                    for point in points {
                        let distance = query.distance_to(point);
                        result.comparisons += 1;
                        if best.len() < k {
                            best.push(MaxCandidate { distance, vector: *point });
                            if best.len() == k {
                                worst_best = best.peek().map_or(f64::INFINITY, |c| c.distance);
                            }
                        } else if distance < worst_best {
                            best.pop();
                            best.push(MaxCandidate { distance, vector: *point });
                            worst_best = best.peek().map_or(f64::INFINITY, |c| c.distance);
                        }
                    }
                }
                NodeKind::Internal(children) => {
                    for child in children.iter() {
                        if child.is_empty_leaf() {
                            continue;
                        }
                        let child_bound = child.region.min_distance(qr, qg);
                        if best.len() == k && child_bound >= worst_best {
                            continue;
                        }
                        fringe.push(Pending { bound: child_bound, node: child });
                    }
                }
            }
        }

        let mut found = best.into_vec();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        result.neighbors = found.into_iter().map(|c| c.vector).collect();
        result
    }

    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &'static str {
        "quadtree"
    }
}
