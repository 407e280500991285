//! The simulation engine: owns the body population and the current quadtree
//! and orchestrates one full physics step.
//!
//! Step order is load-bearing and must not be rearranged:
//!
//! 1. drift positions by the previous step's velocities
//! 2. zero accelerations
//! 3. rebuild the quadtree from the drifted positions (merges happen here)
//! 4. purge tombstoned bodies
//! 5. recompute centers of mass bottom-up
//! 6. mutual forces (brute or tree, per configuration)
//! 7. boundary clamp + velocity reflection
//! 8. quadratic friction
//! 9. kick velocities by a full `dt`
//!
//! The very first advance replaces 1 with nothing and 9 with a half kick
//! (`dt/2`), initializing the leapfrog stagger exactly once.

use crate::simulation::forces::{
    apply_edge_forces, apply_friction, apply_mutual_brute, apply_mutual_tree, ForceStats,
};
use crate::simulation::integrator::{drift, kick, zero_accelerations};
use crate::simulation::params::{Bounds, ForceMethod, Parameters};
use crate::simulation::quadtree::QuadTree;
use crate::simulation::states::{Body, System};

pub struct BodySim {
    pub system: System,
    pub tree: QuadTree,
    pub params: Parameters, // plain data; the driver may mutate between steps
    pub bounds: Bounds,
    pub step_stats: ForceStats, // force evaluations of the most recent step
    pub bodies_removed: u64, // merge casualties over the whole run
    bootstrapped: bool,
}

impl BodySim {
    /// Build a simulation around an initial population. The initial tree is
    /// constructed immediately so overlays have something to draw before the
    /// first step.
    pub fn new(mut system: System, bounds: Bounds, params: Parameters) -> Self {
        let mut tree = QuadTree::build(&bounds, &mut system.bodies, &params);
        tree.compute_centers();
        BodySim {
            system,
            tree,
            params,
            bounds,
            step_stats: ForceStats::default(),
            bodies_removed: 0,
            bootstrapped: false,
        }
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.system.bodies.len()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    /// Deepest subdivision reached while building the current tree.
    pub fn max_depth_seen(&self) -> u32 {
        self.tree.max_depth_seen
    }

    /// Advance the simulation by `n` full steps, running the one-time
    /// half-kick bootstrap first if it has not happened yet.
    pub fn step(&mut self, n: u32) {
        if !self.bootstrapped {
            self.bootstrap();
        }
        for _ in 0..n {
            self.step_once();
        }
    }

    /// The one-time leapfrog initialization: a force pass followed by a half
    /// kick, with no drift. Idempotent via `step`; calling it directly twice
    /// would double the initial offset, so it is kept crate-internal to the
    /// `step` entry point.
    fn bootstrap(&mut self) {
        self.compute_forces();
        kick(&mut self.system, 0.5 * self.params.dt);
        self.bootstrapped = true;
    }

    /// One full step in the order documented on this module.
    fn step_once(&mut self) {
        drift(&mut self.system, self.params.dt);
        self.compute_forces();
        kick(&mut self.system, self.params.dt);
        self.system.t += self.params.dt;
    }

    /// Phases 2 through 8: everything between drift and kick.
    fn compute_forces(&mut self) {
        zero_accelerations(&mut self.system);

        // Rebuild the tree from scratch; depth-limit merges tombstone bodies
        // while inserting.
        self.tree = QuadTree::build(&self.bounds, &mut self.system.bodies, &self.params);

        // Purge after insertion: the merge that created a tombstone has
        // already been folded into the surviving occupant, and the leaf
        // snapshots keep the tree valid across the removal.
        self.bodies_removed += self.remove_zero_mass_bodies() as u64;

        self.tree.compute_centers();

        let mut stats = ForceStats::default();
        match self.params.force_method {
            ForceMethod::Brute => apply_mutual_brute(&mut self.system, &self.params, &mut stats),
            ForceMethod::Tree => {
                apply_mutual_tree(&mut self.system, &self.tree, &self.params, &mut stats)
            }
        }
        self.step_stats = stats;

        apply_edge_forces(&mut self.system, &self.bounds, &self.params);
        apply_friction(&mut self.system, &self.params);
    }

    /// Remove every tombstoned (mass == 0) body from the live collection,
    /// highest index first so earlier indices stay valid. Idempotent: with
    /// no tombstones present this is a no-op. Returns the number removed.
    pub fn remove_zero_mass_bodies(&mut self) -> usize {
        let doomed: Vec<usize> = self
            .system
            .bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_tombstone())
            .map(|(i, _)| i)
            .collect();
        for &i in doomed.iter().rev() {
            self.system.bodies.remove(i);
        }
        doomed.len()
    }
}
