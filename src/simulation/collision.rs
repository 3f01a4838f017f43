//! Pairwise sphere collision resolution
//!
//! Every step each non-fixed body walks the octree with a padded query box
//! and pushes apart the spheres it overlaps. A pair correction moves both
//! centres along their connecting axis, each by `damping` of the overlap,
//! so with the default damping of 0.5 an isolated pair just touches after
//! one pass. Crowded bodies converge over several steps.

use tracing::trace;

use crate::simulation::octree::{OctreeNode, OctreeVisitor, SpatialIndex};
use crate::simulation::params::CollisionParams;
use crate::simulation::states::{Body, NVec3};

/// Octree visitor that separates one target body from its neighbours.
///
/// The query box is captured from the target's position when the visitor
/// is created; the target itself moves as corrections are applied.
pub struct CollisionVisitor<'a> {
    target: usize,
    bodies: &'a mut [Body],
    params: &'a CollisionParams,
    query_min: NVec3,
    query_max: NVec3,
    corrections: usize,
}

impl<'a> CollisionVisitor<'a> {
    pub fn new(target: usize, bodies: &'a mut [Body], params: &'a CollisionParams) -> Self {
        let b = &bodies[target];
        let r = b.radius + params.padding;
        let reach = NVec3::new(r, r, r);
        let (query_min, query_max) = (b.x - reach, b.x + reach);

        Self {
            target,
            bodies,
            params,
            query_min,
            query_max,
            corrections: 0,
        }
    }

    /// Number of overlapping pairs corrected so far
    pub fn corrections(&self) -> usize {
        self.corrections
    }

    /// True when the node region and the query box are disjoint on some axis
    fn outside_query(&self, node: &OctreeNode) -> bool {
        (0..3).any(|axis| {
            node.bbox_min[axis] > self.query_max[axis] || node.bbox_max[axis] < self.query_min[axis]
        })
    }
}

impl OctreeVisitor for CollisionVisitor<'_> {
    fn visit(&mut self, node: &OctreeNode) -> bool {
        if let Some(other) = node.body_index {
            if other != self.target && separate(self.bodies, self.target, other, self.params) {
                self.corrections += 1;
            }
        }
        self.outside_query(node)
    }
}

/// Push bodies `i` and `j` apart if their spheres overlap.
///
/// With `d = x_i - x_j`, `len = |d|` and `sum_r = r_i + r_j`, an overlapping
/// pair (`len < sum_r`) takes the correction `c = d * (len - sum_r) / len * damping`:
/// body `i` moves by `-c`, body `j` by `+c`. Fixed bodies never move, the
/// other body still takes its own share.
///
/// Centres too close for `|d|` to be represented fall into the same case:
/// coincident centres have no connecting axis; they are separated along +X
/// by the same magnitude, `sum_r * damping` each.
///
/// Returns `true` when a correction was applied.
pub fn separate(bodies: &mut [Body], i: usize, j: usize, params: &CollisionParams) -> bool {
    let d = bodies[i].x - bodies[j].x;
    let len = d.norm();
    let sum_r = bodies[i].radius + bodies[j].radius;

    if !(len < sum_r) {
        return false;
    }

    // c is the displacement body j receives; body i takes -c
    // Unit axis first: (len - sum_r) / len overflows for subnormal len
    let c = if len > 0.0 {
        (d / len) * ((len - sum_r) * params.damping)
    } else {
        -NVec3::x() * (sum_r * params.damping)
    };

    if !bodies[i].fixed {
        bodies[i].x -= c;
    }
    if !bodies[j].fixed {
        bodies[j].x += c;
    }

    trace!(i, j, len, sum_r, "separated overlapping pair");
    true
}

/// Resolve overlaps for every non-fixed body using a spatial index.
///
/// Bodies are processed in insertion order. The index must have been built
/// over `bodies`; its node regions are not updated while bodies move.
pub fn resolve<I: SpatialIndex>(bodies: &mut [Body], index: &I, params: &CollisionParams) {
    let mut corrections = 0;
    for i in 0..bodies.len() {
        if bodies[i].fixed {
            continue;
        }
        let mut visitor = CollisionVisitor::new(i, bodies, params);
        index.visit(&mut visitor);
        corrections += visitor.corrections();
    }
    trace!(corrections, "collision pass done");
}

/// Resolve overlaps by testing every body against every other body.
///
/// Same per-body procedure as [`resolve`] without spatial pruning.
pub fn resolve_direct(bodies: &mut [Body], params: &CollisionParams) {
    let n = bodies.len();
    let mut corrections = 0;
    for i in 0..n {
        if bodies[i].fixed {
            continue;
        }
        for j in 0..n {
            if j != i && separate(bodies, i, j, params) {
                corrections += 1;
            }
        }
    }
    trace!(corrections, "direct collision pass done");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(dist: f64) -> Vec<Body> {
        vec![
            Body::new(NVec3::zeros(), 10.0),
            Body::new(NVec3::new(dist, 0.0, 0.0), 10.0),
        ]
    }

    #[test]
    fn separate_moves_both_by_half_the_overlap() {
        let mut bodies = pair(15.0);
        assert!(separate(&mut bodies, 0, 1, &CollisionParams::default()));

        assert!((bodies[0].x.x - -2.5).abs() < 1e-12);
        assert!((bodies[1].x.x - 17.5).abs() < 1e-12);
    }

    #[test]
    fn separate_ignores_touching_pair() {
        let mut bodies = pair(20.0);
        assert!(!separate(&mut bodies, 0, 1, &CollisionParams::default()));
        assert_eq!(bodies[1].x.x, 20.0);
    }

    #[test]
    fn separate_guards_coincident_centres() {
        let mut bodies = pair(0.0);
        assert!(separate(&mut bodies, 0, 1, &CollisionParams::default()));

        assert!((bodies[0].x.x - 10.0).abs() < 1e-12);
        assert!((bodies[1].x.x - -10.0).abs() < 1e-12);
    }

    #[test]
    fn damping_scales_the_correction() {
        let mut bodies = pair(15.0);
        let params = CollisionParams {
            damping: 0.25,
            ..CollisionParams::default()
        };
        separate(&mut bodies, 0, 1, &params);

        assert!((bodies[0].x.x - -1.25).abs() < 1e-12);
        assert!((bodies[1].x.x - 16.25).abs() < 1e-12);
    }

    #[test]
    fn direct_and_octree_agree_on_isolated_pair() {
        let params = CollisionParams::default();
        let mut a = pair(12.0);
        let mut b = a.clone();

        let tree = crate::simulation::octree::Octree::build(&a);
        resolve(&mut a, &tree, &params);
        resolve_direct(&mut b, &params);

        for (p, q) in a.iter().zip(&b) {
            assert!((p.x - q.x).norm() < 1e-12);
        }
    }
}
