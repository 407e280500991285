//! # Barnes-Hut QuadTree (2D)
//!
//! This module implements the 2D Barnes-Hut quadtree used to approximate
//! gravitational acceleration in an N-body system, replacing the naive
//! `O(N^2)` all-pairs force calculation with an approximate `O(N log N)`
//! method while keeping good accuracy for distant interactions.
//!
//! The key idea is to treat a group of distant bodies as a single pseudo-body
//! located at their center of mass. For sufficiently far clusters, evaluating
//! one interaction is drastically cheaper than computing many individual
//! forces.
//!
//! - The simulation bounds are recursively subdivided into 4 quadrants.
//! - Each quadrant becomes a node of the quadtree.
//! - A leaf holds at most one occupant; internal nodes hold exactly 4 children.
//! - Each node stores the total mass and center of mass of its subtree,
//!   its bounding box, its depth, and a generation count (number of
//!   subdivision events in its subtree).
//!
//! Two behaviors distinguish this tree from a plain Barnes-Hut tree:
//!
//! - **Depth-limited merging**: when two bodies collide in a leaf that has
//!   already reached `max_depth`, they are merged inelastically into one.
//!   Mass and momentum are conserved; kinetic energy is not. This is
//!   intentional and keeps the body count bounded in dense clusters. The
//!   losing body is tombstoned (mass set to 0) and purged by the engine.
//! - **Occupant snapshots**: each leaf stores the occupant's position and
//!   mass by value, taken at insert time, alongside its index into the
//!   owning collection. Force queries read only the snapshots, so the tree
//!   stays valid after the engine purges tombstones.
//!
//! The tree is rebuilt from scratch every step and discarded afterwards.
//! Nodes live in an arena (`Vec<QuadNode>`) and refer to each other by
//! index; generation counts propagate by an explicit walk up the parent
//! indices.

use crate::simulation::forces::{point_mass_accel, ForceStats};
use crate::simulation::params::{Bounds, Parameters};
use crate::simulation::states::{Body, NVec2};

// Quadrant indices, by sign of (dx, dy) relative to the node center.
pub const NE: usize = 0;
pub const NW: usize = 1;
pub const SW: usize = 2;
pub const SE: usize = 3;

/// A leaf's occupant: a handle into the owning body collection plus a
/// position/mass snapshot taken at insert time.
#[derive(Debug, Clone, Copy)]
pub struct Occupant {
    pub body: usize, // index into the simulation's body collection
    pub x: NVec2,
    pub m: f64,
}

/// A single quadtree node. A node is a leaf (`children == None`, at most one
/// occupant) or an internal node (exactly 4 children, no occupant).
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub center: NVec2,
    pub half_dim: NVec2, // half extents along x and y
    pub children: Option<[usize; 4]>, // indices into QuadTree::nodes
    pub occupant: Option<Occupant>,
    pub parent: Option<usize>,
    pub depth: u32,
    pub generations: u32, // subdivision events in this subtree, self included
    pub total_mass: f64,
    pub com: NVec2, // center of mass; geometric center while massless
}

impl QuadNode {
    fn new(center: NVec2, half_dim: NVec2, parent: Option<usize>, depth: u32) -> Self {
        QuadNode {
            center,
            half_dim,
            children: None,
            occupant: None,
            parent,
            depth,
            generations: 0,
            total_mass: 0.0,
            com: center,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The smaller half extent, used as the node size in the opening test.
    pub fn half_dim_min(&self) -> f64 {
        self.half_dim.x.min(self.half_dim.y)
    }
}

/// A complete 2D Barnes-Hut quadtree built over the simulation bounds.
pub struct QuadTree {
    pub nodes: Vec<QuadNode>,
    pub root: usize,
    pub max_depth_seen: u32, // deepest subdivided node in this build
}

/// Which quadrant of a node centered at `center` the point `pos` falls in.
/// Strict greater-than on both axes: points exactly on a dividing line go
/// south/west.
pub fn quadrant_of(center: &NVec2, pos: &NVec2) -> usize {
    if pos.y > center.y {
        if pos.x > center.x {
            NE
        } else {
            NW
        }
    } else if pos.x > center.x {
        SE
    } else {
        SW
    }
}

/// Center and half extents of the given child quadrant. The four children
/// tile the parent box exactly.
pub fn child_bounds(center: &NVec2, half_dim: &NVec2, quadrant: usize) -> (NVec2, NVec2) {
    let (sx, sy) = match quadrant {
        NE => (1.0, 1.0),
        NW => (-1.0, 1.0),
        SW => (-1.0, -1.0),
        SE => (1.0, -1.0),
        _ => panic!("quadrant index out of range: {quadrant}"),
    };
    let child_center = NVec2::new(
        center.x + sx * 0.5 * half_dim.x,
        center.y + sy * 0.5 * half_dim.y,
    );
    (child_center, 0.5 * half_dim)
}

impl QuadTree {
    /// An empty tree whose root covers the simulation bounds.
    pub fn new(bounds: &Bounds) -> Self {
        let root_node = QuadNode::new(bounds.center(), bounds.half_dim(), None, 0);
        QuadTree {
            nodes: vec![root_node],
            root: 0,
            max_depth_seen: 0,
        }
    }

    /// Build a tree over `bounds` containing every body in `bodies`. The
    /// caller runs `compute_centers` afterwards (the engine purges tombstones
    /// in between).
    ///
    /// Insertion may merge bodies that collide at the depth limit; merges
    /// mutate the surviving body in place and tombstone the other, which is
    /// why the collection is taken mutably.
    pub fn build(bounds: &Bounds, bodies: &mut [Body], params: &Parameters) -> Self {
        let mut tree = QuadTree::new(bounds);
        for i in 0..bodies.len() {
            tree.insert(i, bodies, params);
        }
        tree
    }

    pub fn node(&self, idx: usize) -> &QuadNode {
        &self.nodes[idx]
    }

    pub fn root_node(&self) -> &QuadNode {
        &self.nodes[self.root]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1 && self.nodes[self.root].occupant.is_none()
    }

    /// Insert body `body_idx` starting from the root.
    pub fn insert(&mut self, body_idx: usize, bodies: &mut [Body], params: &Parameters) {
        self.insert_at(self.root, body_idx, bodies, params);
    }

    /// Recursive insertion. If the node has children, delegate to the child
    /// selected by quadrant. If the node is an empty leaf, store the body as
    /// occupant. If the leaf is already occupied, subdivide and re-insert
    /// both bodies, unless the depth limit is reached, in which case the two
    /// bodies are merged inelastically.
    fn insert_at(&mut self, node_idx: usize, body_idx: usize, bodies: &mut [Body], params: &Parameters) {
        // Snapshot what we need by value so no borrow is live across the
        // recursion.
        let center = self.nodes[node_idx].center;
        let depth = self.nodes[node_idx].depth;

        if let Some(children) = self.nodes[node_idx].children {
            debug_assert!(
                self.nodes[node_idx].occupant.is_none(),
                "internal node holding an occupant"
            );
            let q = quadrant_of(&center, &bodies[body_idx].x);
            self.insert_at(children[q], body_idx, bodies, params);
            return;
        }

        let occupant = self.nodes[node_idx].occupant;
        match occupant {
            // Empty leaf: store the body here, snapshotting position and mass.
            None => {
                let b = &bodies[body_idx];
                self.nodes[node_idx].occupant = Some(Occupant {
                    body: body_idx,
                    x: b.x,
                    m: b.m,
                });
            }
            // Occupied leaf below the depth limit: subdivide and push both
            // bodies down one level.
            Some(existing) if depth <= params.max_depth => {
                self.nodes[node_idx].occupant = None;
                self.subdivide(node_idx);
                self.insert_at(node_idx, existing.body, bodies, params);
                self.insert_at(node_idx, body_idx, bodies, params);
            }
            // Occupied leaf at the depth limit: merge the incoming body into
            // the occupant. Mass and momentum are conserved; kinetic energy
            // is not.
            Some(existing) => {
                merge_bodies(bodies, existing.body, body_idx);
                // Refresh the leaf snapshot to the merged values.
                let survivor = &bodies[existing.body];
                self.nodes[node_idx].occupant = Some(Occupant {
                    body: existing.body,
                    x: survivor.x,
                    m: survivor.m,
                });
            }
        }
    }

    /// Split a leaf into four children covering its quadrants (NE, NW, SW,
    /// SE), then bump the generation count of this node and every ancestor.
    fn subdivide(&mut self, node_idx: usize) {
        debug_assert!(self.nodes[node_idx].children.is_none(), "subdividing an internal node");
        let center = self.nodes[node_idx].center;
        let half_dim = self.nodes[node_idx].half_dim;
        let child_depth = self.nodes[node_idx].depth + 1;

        let mut children = [0usize; 4];
        for (q, slot) in children.iter_mut().enumerate() {
            let (c_center, c_half) = child_bounds(&center, &half_dim, q);
            *slot = self.nodes.len();
            self.nodes.push(QuadNode::new(c_center, c_half, Some(node_idx), child_depth));
        }
        self.nodes[node_idx].children = Some(children);

        if child_depth > self.max_depth_seen {
            self.max_depth_seen = child_depth;
        }

        // Generation counts propagate by an explicit walk up the parent
        // indices rather than a back-pointer recursion.
        let mut cur = Some(node_idx);
        while let Some(i) = cur {
            self.nodes[i].generations += 1;
            cur = self.nodes[i].parent;
        }
    }

    /// Bottom-up recomputation of `total_mass` and `com` for every node,
    /// called once after the tree is fully populated.
    ///
    /// A leaf's center of mass is its occupant's position (or the node's own
    /// geometric center, with zero mass, if empty); an internal node combines
    /// its four children mass-weighted. Division by total mass is guarded:
    /// massless subtrees keep their geometric center.
    pub fn compute_centers(&mut self) {
        self.compute_centers_at(self.root);
    }

    fn compute_centers_at(&mut self, node_idx: usize) {
        match self.nodes[node_idx].children {
            Some(children) => {
                let mut mass = 0.0;
                let mut com = NVec2::zeros();
                for &child in &children {
                    self.compute_centers_at(child);
                    let cn = &self.nodes[child];
                    if cn.total_mass > 0.0 {
                        mass += cn.total_mass;
                        com += cn.com * cn.total_mass;
                    }
                }
                let node = &mut self.nodes[node_idx];
                if mass > 0.0 {
                    node.com = com / mass;
                } else {
                    node.com = node.center;
                }
                node.total_mass = mass;
            }
            None => {
                let node = &mut self.nodes[node_idx];
                match node.occupant {
                    Some(occ) => {
                        node.com = occ.x;
                        node.total_mass = occ.m;
                    }
                    None => {
                        node.com = node.center;
                        node.total_mass = 0.0;
                    }
                }
            }
        }
    }

    /// Net gravitational acceleration at `pos` via the Barnes-Hut
    /// approximation, in the *repulsive* orientation (unit vector from source
    /// toward `pos`); the caller applies the attract/repel sign.
    ///
    /// At an internal node whose opening ratio `half_dim_min / d` falls below
    /// `theta`, the whole subtree is evaluated as a single point mass at its
    /// center of mass; otherwise all four children are visited. Leaves are
    /// always evaluated directly. A body querying from its own position
    /// contributes nothing to itself (zero separation yields a zero vector
    /// under the softened kernel).
    pub fn acceleration_on(&self, pos: &NVec2, params: &Parameters, stats: &mut ForceStats) -> NVec2 {
        let mut acc = NVec2::zeros();
        self.accumulate(self.root, pos, params, stats, &mut acc);
        acc
    }

    fn accumulate(
        &self,
        node_idx: usize,
        pos: &NVec2,
        params: &Parameters,
        stats: &mut ForceStats,
        acc: &mut NVec2,
    ) {
        let node = &self.nodes[node_idx];

        // Massless subtrees contribute nothing.
        if node.total_mass == 0.0 {
            return;
        }

        match node.children {
            Some(children) => {
                let d = (pos - node.com).norm();
                // d == 0 gives an infinite ratio and forces a descent, so
                // the division is safe.
                if node.half_dim_min() / d < params.theta {
                    // Far enough away: one evaluation against the subtree's
                    // center of mass.
                    *acc += point_mass_accel(pos, &node.com, node.total_mass, params);
                    stats.tree_evals += 1;
                } else {
                    for &child in &children {
                        self.accumulate(child, pos, params, stats, acc);
                    }
                }
            }
            None => {
                // Leaf: direct evaluation against the occupant snapshot.
                // total_mass > 0 implies the occupant exists.
                if let Some(occ) = node.occupant {
                    *acc += point_mass_accel(pos, &occ.x, occ.m, params);
                    stats.direct_evals += 1;
                }
            }
        }
    }
}

/// Merge the incoming body into the occupant, in place.
///
/// - mass: exact sum, incoming body zeroed (tombstoned)
/// - position: mass-weighted average of the two positions
/// - velocity: `(m1*v1 + m2*v2) / (m1 + m2)` (momentum conservation)
/// - charge: the heavier body's sign; on an exact mass tie the occupant wins
/// - color: mass-fraction blend
///
/// The survivor's acceleration is reset; it will be recomputed later in the
/// step from the merged state.
fn merge_bodies(bodies: &mut [Body], occupant_idx: usize, incoming_idx: usize) {
    debug_assert_ne!(occupant_idx, incoming_idx);

    let occ = bodies[occupant_idx].clone();
    let inc = bodies[incoming_idx].clone();
    let total = occ.m + inc.m;

    // Two tombstones colliding have nothing to merge.
    if total > 0.0 {
        let survivor = &mut bodies[occupant_idx];
        survivor.x = (occ.x * occ.m + inc.x * inc.m) / total;
        survivor.v = (occ.v * occ.m + inc.v * inc.m) / total;
        survivor.m = total;
        survivor.p = if inc.m > occ.m { inc.p } else { occ.p };
        survivor.color = occ.color.lerp(inc.color, inc.m / total);
        survivor.a = NVec2::zeros();
    }

    bodies[incoming_idx].m = 0.0;
}
