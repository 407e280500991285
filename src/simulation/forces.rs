//! Force / acceleration contributors for the n-body engine.
//!
//! Holds the softened point-mass kernel shared by the brute-force and
//! tree-approximated paths, the two mutual-force passes themselves, and the
//! non-mutual contributions (boundary reflection, quadratic friction).
//!
//! Sign convention, used consistently everywhere: with `rev = -1` in
//! reverse-physics mode and `+1` otherwise, a pair with `p_i * p_j * rev < 0`
//! repels and any other pair attracts. The tree path aggregates charges away,
//! so it applies the mode sign per body rather than per pair.

use crate::simulation::params::{Bounds, Parameters};
use crate::simulation::states::{NVec2, System};
use crate::simulation::quadtree::QuadTree;

/// Counters for force evaluations performed during a step: one `tree` count
/// per subtree collapsed to its center of mass, one `direct` count per leaf
/// evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceStats {
    pub direct_evals: u64,
    pub tree_evals: u64,
}

impl ForceStats {
    pub fn total(&self) -> u64 {
        self.direct_evals + self.tree_evals
    }
}

/// Softened gravitational acceleration at `pos` due to a point mass `m` at
/// `src`, in the repulsive orientation (pointing from `src` toward `pos`).
///
/// Magnitude is `G * m / (d^2 + epsilon^2)^1.5`; the epsilon softening keeps
/// the denominator positive at any separation. Zero separation returns the
/// zero vector, which also covers a body's interaction with itself.
pub fn point_mass_accel(pos: &NVec2, src: &NVec2, m: f64, params: &Parameters) -> NVec2 {
    let dir = pos - src;
    let d2 = dir.norm_squared();
    if d2 == 0.0 {
        return NVec2::zeros();
    }
    let fm = params.G / (d2 + params.epsilon * params.epsilon).powf(1.5);
    dir / d2.sqrt() * (fm * m)
}

/// Exact O(n^2) pairwise mutual forces, accumulated into each body's
/// acceleration. Used for validation and small n.
pub fn apply_mutual_brute(sys: &mut System, params: &Parameters, stats: &mut ForceStats) {
    let n = sys.bodies.len();
    let rev = if params.reverse_physics { -1.0 } else { 1.0 };

    // Loop over each unordered pair (i, j) with i < j.
    for i in 0..n {
        for j in (i + 1)..n {
            let xi = sys.bodies[i].x;
            let xj = sys.bodies[j].x;

            // Displacement from j to i; coincident bodies contribute nothing
            // (the normalized direction is undefined there).
            let r = xi - xj;
            let d2 = r.norm_squared();
            if d2 == 0.0 {
                continue;
            }

            // Force magnitude per unit mass under the softened law.
            let f = params.G / (d2 + params.epsilon * params.epsilon).powf(1.5);
            // Unit vector from body j toward body i.
            let dir = r / d2.sqrt();

            let mi = sys.bodies[i].m;
            let mj = sys.bodies[j].m;
            let charge = (sys.bodies[i].p as f64) * (sys.bodies[j].p as f64) * rev;

            // Mismatched charges (under the current mode) repel, matched
            // charges attract. Contributions are equal and opposite, scaled
            // by the partner's mass.
            let (dai, daj) = if charge < 0.0 {
                (dir * (f * mj), dir * (-f * mi))
            } else {
                (dir * (-f * mj), dir * (f * mi))
            };

            sys.bodies[i].a += dai;
            sys.bodies[j].a += daj;
            stats.direct_evals += 2;
        }
    }
}

/// Tree-approximated mutual forces: one Barnes-Hut traversal per body.
///
/// The tree returns repulsively-oriented accelerations, so the normal
/// (attract) mode subtracts the result and reverse mode adds it. Per-pair
/// charge information is unavailable here because subtrees aggregate their
/// bodies into one center of mass.
pub fn apply_mutual_tree(sys: &mut System, tree: &QuadTree, params: &Parameters, stats: &mut ForceStats) {
    for b in sys.bodies.iter_mut() {
        let acc = tree.acceleration_on(&b.x, params, stats);
        if params.reverse_physics {
            b.a += acc;
        } else {
            b.a -= acc;
        }
    }
}

/// Clamp bodies back inside the bounds and reflect the offending velocity
/// component, damped by `edge_damping`. The reflected component is forced to
/// point back into the box, so a body can never be pushed outward twice.
pub fn apply_edge_forces(sys: &mut System, bounds: &Bounds, params: &Parameters) {
    let k = params.edge_damping;
    for b in sys.bodies.iter_mut() {
        if b.x.x < bounds.x_min {
            b.x.x = bounds.x_min;
            b.v.x = (b.v.x * k).abs();
        }
        if b.x.x > bounds.x_max {
            b.x.x = bounds.x_max;
            b.v.x = -(b.v.x * k).abs();
        }
        if b.x.y < bounds.y_min {
            b.x.y = bounds.y_min;
            b.v.y = (b.v.y * k).abs();
        }
        if b.x.y > bounds.y_max {
            b.x.y = bounds.y_max;
            b.v.y = -(b.v.y * k).abs();
        }
    }
}

/// Velocity-proportional quadratic friction, added to the acceleration:
/// `a += -k * |v| * v`. The constant differs between attract and repel mode.
pub fn apply_friction(sys: &mut System, params: &Parameters) {
    let k = params.friction_constant();
    for b in sys.bodies.iter_mut() {
        b.a += b.v * (-k * b.v.norm());
    }
}
