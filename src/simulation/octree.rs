//! # Octree (3D)
//!
//! This module implements the **3D octree** shared by the collision
//! resolver and the force-directed layout. It is rebuilt from scratch
//! every step from the current body positions.
//!
//! ## Core Concepts
//!
//! - The space spanned by all bodies is expanded to a cube and recursively
//!   subdivided into 8 regions (octants).
//! - Each region becomes a node of the octree.
//! - A node holds at most one body directly; a second body arriving in an
//!   occupied leaf pushes both bodies down into child octants.
//! - Each node stores:
//!   - its cubic bounding box (used by pruning visitors),
//!   - total layout charge of its subtree and the charge-weighted centre
//!     (used by the Barnes–Hut charge force).
//!
//! ## Traversal
//!
//! [`SpatialIndex::visit`] walks the tree in pre-order. The visitor sees
//! every node before its children and returns `true` to prune the subtree.
//! The collision resolver prunes nodes outside its padded query box, the
//! charge force prunes nodes far enough away to be approximated.
//!
//! Node regions are fixed at build time. Visitors that move bodies during
//! a traversal see the regions of the positions the tree was built from.

use crate::simulation::states::{Body, NVec3};

/// Two bodies closer than this (L1 distance) are treated as coincident
/// during insertion: the resident stays and the newcomer goes one level
/// down, so insertion terminates even for identical positions.
const COINCIDENT_GAP: f64 = 0.01;

/// A single octree node.
///
/// Each node represents a cubic region of space that may contain:
/// - zero bodies (empty)
/// - exactly one body (leaf node, `body_index = Some(i)`)
/// - children, and exceptionally also one body when bodies coincide
///
/// Children are created lazily, so an internal node may have fewer
/// than 8 of them.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub charge: f64,        // total charge of the subtree
    pub point_charge: f64,  // charge of the body held directly
    pub com: NVec3,         // charge-weighted centre of the subtree
    pub bbox_min: NVec3,
    pub bbox_max: NVec3,
    pub children: [Option<usize>; 8], // indices into Octree::nodes
    pub body_index: Option<usize>,    // Some(i) if this node holds body i
}

impl OctreeNode {
    /// An empty node covering `[bbox_min, bbox_max]`
    pub fn new(bbox_min: NVec3, bbox_max: NVec3) -> Self {
        Self {
            charge: 0.0,
            point_charge: 0.0,
            com: NVec3::zeros(),
            bbox_min,
            bbox_max,
            children: [None; 8],
            body_index: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }

    /// Edge length of the (cubic) region
    pub fn width(&self) -> f64 {
        self.bbox_max.x - self.bbox_min.x
    }
}

/// Callback for [`SpatialIndex::visit`].
///
/// Return `true` to skip the children of `node`.
pub trait OctreeVisitor {
    fn visit(&mut self, node: &OctreeNode) -> bool;
}

impl<F> OctreeVisitor for F
where
    F: FnMut(&OctreeNode) -> bool,
{
    fn visit(&mut self, node: &OctreeNode) -> bool {
        self(node)
    }
}

/// A spatial index that can be walked with a pruning visitor
pub trait SpatialIndex {
    fn visit<V: OctreeVisitor + ?Sized>(&self, visitor: &mut V);
}

/// A complete octree built over a body set.
///
/// This structure owns:
/// - a vector of all octree nodes (`nodes`)
/// - an index into that list representing the root (`root`)
#[derive(Debug, Clone)]
pub struct Octree {
    pub nodes: Vec<OctreeNode>,
    pub root: usize,
}

impl Octree {
    /// Build an octree from the current body positions.
    ///
    /// This:
    /// 1. Computes a global cubic bounding box that encloses all bodies.
    /// 2. Creates a root node covering that bounding volume.
    /// 3. Inserts each body in order, subdividing nodes as needed.
    ///
    /// Charges are left at zero; call [`Octree::accumulate_charge`] when the
    /// tree is used for the Barnes–Hut charge force.
    ///
    /// # Parameters
    /// - `bodies`: The bodies whose positions are indexed. Node
    ///   `body_index` values refer to positions in this slice.
    pub fn build(bodies: &[Body]) -> Self {
        let (bbox_min, bbox_max) = compute_global_bbox(bodies);

        let root = 0;
        let mut tree = Octree {
            nodes: vec![OctreeNode::new(bbox_min, bbox_max)],
            root,
        };

        for i in 0..bodies.len() {
            tree.insert_body(root, i, bodies);
        }

        tree
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].is_leaf() && self.nodes[self.root].body_index.is_none()
    }

    /// Compute subtree charges and charge-weighted centres, bottom-up.
    ///
    /// Every body contributes `alpha * body.charge` as the `point_charge` of
    /// the node holding it. After this pass each node's:
    /// - `charge` is the sum of all point charges in its subtree,
    /// - `com` is the charge-weighted centre of those points (zero when the
    ///   subtree carries no charge).
    ///
    /// # Parameters
    /// - `bodies`: The same bodies the tree was built from.
    /// - `alpha` : Current layout temperature.
    pub fn accumulate_charge(&mut self, bodies: &[Body], alpha: f64) {
        let root = self.root;
        self.accumulate_node(bodies, alpha, root);
    }

    // helpers ==============================================================================

    /// Insert a single body into the octree, starting from the given node.
    ///
    /// - If the target node is an empty leaf, it stores the body.
    /// - If the target node is a leaf holding another body, the resident is
    ///   moved into the child octant for its position and the new body
    ///   follows into its own octant. A coincident resident stays put.
    /// - If the target node has children, the body is forwarded down into
    ///   the child octant for its position.
    fn insert_body(&mut self, node_idx: usize, body_idx: usize, bodies: &[Body]) {
        let pos = bodies[body_idx].x;
        let resident = self.nodes[node_idx].body_index;
        let is_leaf = self.nodes[node_idx].is_leaf();

        // Case 1: empty leaf -> store body here
        if resident.is_none() && is_leaf {
            self.nodes[node_idx].body_index = Some(body_idx);
            return;
        }

        // Case 2: leaf with a resident -> push the resident down unless it coincides
        if let (Some(existing), true) = (resident, is_leaf) {
            let gap = (bodies[existing].x - pos).abs().sum();
            if gap >= COINCIDENT_GAP {
                self.nodes[node_idx].body_index = None;
                self.insert_into_child(node_idx, existing, bodies);
            }
        }

        // Case 3: node has (or now has) children -> descend
        self.insert_into_child(node_idx, body_idx, bodies);
    }

    /// Forward a body into the child octant matching its position,
    /// creating the child node when it does not exist yet.
    fn insert_into_child(&mut self, node_idx: usize, body_idx: usize, bodies: &[Body]) {
        let bbox_min = self.nodes[node_idx].bbox_min;
        let bbox_max = self.nodes[node_idx].bbox_max;
        let child_idx = child_index_for_point(&bodies[body_idx].x, &bbox_min, &bbox_max);

        let child_node_idx = match self.nodes[node_idx].children[child_idx] {
            Some(idx) => idx,
            None => {
                let (cmin, cmax) = child_bbox(&bbox_min, &bbox_max, child_idx);
                let new_idx = self.nodes.len();
                self.nodes.push(OctreeNode::new(cmin, cmax));
                self.nodes[node_idx].children[child_idx] = Some(new_idx);
                new_idx
            }
        };

        self.insert_body(child_node_idx, body_idx, bodies);
    }

    fn accumulate_node(&mut self, bodies: &[Body], alpha: f64, node_idx: usize) {
        let mut charge = 0.0;
        let mut weighted = NVec3::zeros();

        // Snapshot by value so no borrow is held while recursing
        let body_index = self.nodes[node_idx].body_index;
        let children = self.nodes[node_idx].children;

        for child_idx in children.iter().flatten().copied() {
            self.accumulate_node(bodies, alpha, child_idx);
            let cn = &self.nodes[child_idx];
            if cn.charge != 0.0 {
                charge += cn.charge;
                weighted += cn.com * cn.charge;
            }
        }

        let mut point_charge = 0.0;
        if let Some(bidx) = body_index {
            let b = &bodies[bidx];
            point_charge = alpha * b.charge;
            charge += point_charge;
            weighted += b.x * point_charge;
        }

        let node = &mut self.nodes[node_idx];
        node.charge = charge;
        node.point_charge = point_charge;
        node.com = if charge != 0.0 { weighted / charge } else { NVec3::zeros() };
    }

    fn visit_node<V: OctreeVisitor + ?Sized>(&self, node_idx: usize, visitor: &mut V) {
        let node = &self.nodes[node_idx];
        if visitor.visit(node) {
            return;
        }
        for child_idx in node.children.iter().flatten() {
            self.visit_node(*child_idx, visitor);
        }
    }
}

impl SpatialIndex for Octree {
    fn visit<V: OctreeVisitor + ?Sized>(&self, visitor: &mut V) {
        self.visit_node(self.root, visitor);
    }
}

// helpers ===========================================================================

/// Compute a global cubic bounding box that encloses all bodies.
///
/// Finds the axis-aligned min and max over all positions and expands the
/// box into a **cube** around its centre, using the largest half-extent.
/// An empty body set yields a zero-sized box at the origin.
fn compute_global_bbox(bodies: &[Body]) -> (NVec3, NVec3) {
    if bodies.is_empty() {
        return (NVec3::zeros(), NVec3::zeros());
    }

    let mut min = NVec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = NVec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

    for b in bodies {
        min = min.inf(&b.x);
        max = max.sup(&b.x);
    }

    // Expand to a cube so every node is cubic
    let center = (min + max) * 0.5;
    let half = (max - min) * 0.5;
    let max_half = half.x.max(half.y).max(half.z);
    let half = NVec3::new(max_half, max_half, max_half);

    (center - half, center + half)
}

/// Compute the octant index for a point within a node's bounding box.
///
/// The index is encoded using 3 bits:
///
/// - Bit 0 (value 1): X axis = 0 for x < center.x, 1 otherwise
/// - Bit 1 (value 2): Y axis = 0 for y < center.y, 1 otherwise
/// - Bit 2 (value 4): Z axis = 0 for z < center.z, 1 otherwise
fn child_index_for_point(p: &NVec3, bbox_min: &NVec3, bbox_max: &NVec3) -> usize {
    let center = (bbox_min + bbox_max) * 0.5;
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; }
    if p.y >= center.y { idx |= 2; }
    if p.z >= center.z { idx |= 4; }

    idx
}

/// Compute the bounding box of a child octant, using the same 3-bit
/// encoding as [`child_index_for_point`].
fn child_bbox(parent_min: &NVec3, parent_max: &NVec3, child_idx: usize) -> (NVec3, NVec3) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    for axis in 0..3 {
        if child_idx & (1 << axis) == 0 {
            max[axis] = center[axis];
        } else {
            min[axis] = center[axis];
        }
    }

    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f64, y: f64, z: f64) -> Body {
        Body::new(NVec3::new(x, y, z), 1.0)
    }

    fn collect_bodies(tree: &Octree) -> Vec<usize> {
        let mut found = Vec::new();
        tree.visit(&mut |node: &OctreeNode| {
            if let Some(i) = node.body_index {
                found.push(i);
            }
            false
        });
        found.sort_unstable();
        found
    }

    #[test]
    fn every_body_lands_in_exactly_one_node() {
        let bodies: Vec<Body> = (0..50)
            .map(|i| {
                let f = i as f64;
                body_at((f * 0.37).sin() * 100.0, (f * 0.13).cos() * 100.0, (f * 0.07).sin() * 100.0)
            })
            .collect();
        let tree = Octree::build(&bodies);

        assert_eq!(collect_bodies(&tree), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn root_region_is_a_cube_enclosing_all_bodies() {
        let bodies = vec![body_at(0.0, 0.0, 0.0), body_at(10.0, 2.0, 1.0)];
        let tree = Octree::build(&bodies);
        let root = &tree.nodes[tree.root];

        let size = root.bbox_max - root.bbox_min;
        assert_eq!(size.x, size.y);
        assert_eq!(size.y, size.z);
        for b in &bodies {
            assert!(b.x.iter().zip(root.bbox_min.iter()).all(|(p, lo)| p >= lo));
            assert!(b.x.iter().zip(root.bbox_max.iter()).all(|(p, hi)| p <= hi));
        }
    }

    #[test]
    fn coincident_bodies_terminate() {
        let bodies = vec![body_at(1.0, 1.0, 1.0); 5];
        let tree = Octree::build(&bodies);

        assert_eq!(collect_bodies(&tree), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_build_has_only_root() {
        let tree = Octree::build(&[]);
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn pruning_stops_descent() {
        let bodies = vec![body_at(0.0, 0.0, 0.0), body_at(8.0, 8.0, 8.0)];
        let tree = Octree::build(&bodies);

        let mut visited = 0;
        tree.visit(&mut |_: &OctreeNode| {
            visited += 1;
            true
        });
        assert_eq!(visited, 1);
    }

    #[test]
    fn charge_accumulates_bottom_up() {
        let mut a = body_at(0.0, 0.0, 0.0);
        a.charge = -10.0;
        let mut b = body_at(4.0, 0.0, 0.0);
        b.charge = -30.0;
        let bodies = vec![a, b];

        let mut tree = Octree::build(&bodies);
        tree.accumulate_charge(&bodies, 0.5);

        let root = &tree.nodes[tree.root];
        assert!((root.charge - -20.0).abs() < 1e-12);
        // weighted toward the stronger charge
        assert!((root.com.x - 3.0).abs() < 1e-12);
    }
}
