//! Force terms for the force-directed layout
//!
//! Defines the `LayoutForce` trait, a `ForceSet` that applies terms in
//! order, and the two terms the layout uses: gravity toward the layout
//! centre and per-body charge evaluated with a Barnes–Hut octree

use crate::simulation::octree::{Octree, OctreeNode, OctreeVisitor, SpatialIndex};
use crate::simulation::states::{NVec3, SphereSystem};

/// Collection of layout force terms (gravity, charge, etc.)
/// Each term implements [`LayoutForce`] and runs once per tick, in the
/// order it was added
pub struct ForceSet {
    terms: Vec<Box<dyn LayoutForce + Send + Sync>>,
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add a force term
    pub fn with(mut self, term: impl LayoutForce + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Apply every term at temperature `alpha`
    pub fn apply_all(&self, alpha: f64, sys: &mut SphereSystem) {
        for term in &self.terms {
            term.apply(alpha, sys);
        }
    }
}

/// Trait for layout forces operating on [`SphereSystem`]
///
/// A term may move positions `x` directly, or nudge previous positions
/// `px`, which the verlet step turns into velocity. Fixed bodies must be
/// left alone
pub trait LayoutForce {
    fn apply(&self, alpha: f64, sys: &mut SphereSystem);
}

/// Pull toward the layout centre, proportional to the distance
pub struct Gravity {
    pub strength: f64,
    pub center: NVec3,
}

impl LayoutForce for Gravity {
    fn apply(&self, alpha: f64, sys: &mut SphereSystem) {
        let k = alpha * self.strength;
        if k == 0.0 {
            return;
        }
        for b in sys.bodies.iter_mut().filter(|b| !b.fixed) {
            b.x += (self.center - b.x) * k;
        }
    }
}

// =========================================================================================
// Barnes-Hut charge
// =========================================================================================

/// Per-body charge evaluated via a Barnes–Hut octree
/// Negative charges repel. Distant groups are approximated by their
/// charge-weighted centre when `width^2 / theta^2 < dist^2`
pub struct ChargeBarnesHut {
    pub theta: f64,
    pub charge_distance: f64,
}

impl LayoutForce for ChargeBarnesHut {
    fn apply(&self, alpha: f64, sys: &mut SphereSystem) {
        if sys.bodies.iter().all(|b| b.charge == 0.0) {
            return;
        }

        let mut tree = Octree::build(&sys.bodies);
        tree.accumulate_charge(&sys.bodies, alpha);

        let theta2 = self.theta * self.theta;
        let charge_distance2 = self.charge_distance * self.charge_distance;

        // px nudges are computed from a consistent snapshot of x
        let nudges: Vec<Option<NVec3>> = sys
            .bodies
            .iter()
            .enumerate()
            .map(|(i, b)| {
                if b.fixed {
                    return None;
                }
                let mut visitor = RepulseVisitor {
                    body: i,
                    pos: b.x,
                    theta2,
                    charge_distance2,
                    nudge: NVec3::zeros(),
                };
                tree.visit(&mut visitor);
                Some(visitor.nudge)
            })
            .collect();

        for (b, nudge) in sys.bodies.iter_mut().zip(nudges) {
            if let Some(n) = nudge {
                b.px += n;
            }
        }
    }
}

/// Accumulates the charge nudge on one body
struct RepulseVisitor {
    body: usize,
    pos: NVec3,
    theta2: f64,
    charge_distance2: f64,
    nudge: NVec3,
}

impl OctreeVisitor for RepulseVisitor {
    fn visit(&mut self, node: &OctreeNode) -> bool {
        if node.body_index != Some(self.body) {
            let d = node.com - self.pos;
            let dn = d.norm_squared();
            let dw = node.width();

            // Far enough: the whole subtree acts through its charge centre
            if dw * dw / self.theta2 < dn {
                if dn < self.charge_distance2 {
                    self.nudge -= d * (node.charge / dn);
                }
                return true;
            }

            if node.body_index.is_some() && dn > 0.0 && dn < self.charge_distance2 {
                self.nudge -= d * (node.point_charge / dn);
            }
        }
        node.charge == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::Body;

    #[test]
    fn gravity_pulls_free_bodies_toward_center() {
        let mut sys = SphereSystem::new(vec![
            Body::new(NVec3::new(10.0, 0.0, 0.0), 1.0),
            Body::fixed(NVec3::new(10.0, 0.0, 0.0), 1.0),
        ]);
        let gravity = Gravity { strength: 0.5, center: NVec3::zeros() };
        gravity.apply(1.0, &mut sys);

        assert!((sys.bodies[0].x.x - 5.0).abs() < 1e-12);
        assert_eq!(sys.bodies[1].x.x, 10.0);
    }

    #[test]
    fn negative_charge_pushes_previous_position_toward_source() {
        // px moving toward the source means the verlet velocity points away
        let mut root = Body::fixed(NVec3::zeros(), 0.1);
        root.charge = -100.0;
        let mut sys = SphereSystem::new(vec![root, Body::new(NVec3::new(10.0, 0.0, 0.0), 1.0)]);

        let charge = ChargeBarnesHut { theta: 0.8, charge_distance: f64::INFINITY };
        charge.apply(1.0, &mut sys);

        let b = &sys.bodies[1];
        assert!(b.px.x < b.x.x);
        assert_eq!(sys.bodies[0].px, NVec3::zeros());
    }

    #[test]
    fn charge_distance_cuts_off_far_sources() {
        let mut root = Body::fixed(NVec3::zeros(), 0.1);
        root.charge = -100.0;
        let mut sys = SphereSystem::new(vec![root, Body::new(NVec3::new(10.0, 0.0, 0.0), 1.0)]);

        let charge = ChargeBarnesHut { theta: 0.8, charge_distance: 5.0 };
        charge.apply(1.0, &mut sys);

        assert_eq!(sys.bodies[1].px, sys.bodies[1].x);
    }

    #[test]
    fn uncharged_system_is_untouched() {
        let mut sys = SphereSystem::new(vec![
            Body::new(NVec3::zeros(), 1.0),
            Body::new(NVec3::new(3.0, 0.0, 0.0), 1.0),
        ]);
        let charge = ChargeBarnesHut { theta: 0.8, charge_distance: f64::INFINITY };
        charge.apply(1.0, &mut sys);

        for b in &sys.bodies {
            assert_eq!(b.px, b.x);
        }
    }
}
