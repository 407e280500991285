//! Numerical and physical parameters for the simulation.
//!
//! `Parameters` holds runtime settings:
//! - timestep and gravitational constant (`dt`, `G`),
//! - softening and Barnes-Hut opening ratio (`epsilon`, `theta`),
//! - subdivision limit for the quadtree (`max_depth`),
//! - friction constants and boundary damping,
//! - force method selection and the live attract/repel toggle.
//!
//! There are no globals: one `Parameters` value is passed explicitly into
//! tree construction, force computation, and the integration step.

use crate::simulation::states::NVec2;

/// Which mutual-force algorithm the engine runs each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMethod {
    /// Exact O(n^2) pairwise summation.
    Brute,
    /// Barnes-Hut quadtree approximation, O(n log n).
    Tree,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // time step
    pub G: f64, // gravitational constant
    pub epsilon: f64, // softening length, keeps the force law finite at d = 0
    pub theta: f64, // Barnes-Hut opening ratio (node size / distance)
    pub max_depth: u32, // quadtree subdivision limit; deeper collisions merge
    pub friction_attract: f64, // quadratic friction constant, attract mode
    pub friction_repel: f64, // quadratic friction constant, repel mode
    pub edge_damping: f64, // boundary reflection factor in [0, 1]
    pub force_method: ForceMethod,
    pub reverse_physics: bool, // flips the charge convention and friction constant
}

impl Default for Parameters {
    /// Defaults matching the canonical tuning: dt = 1/400, G = 1,
    /// epsilon = 0.4, theta = 0.3, max_depth = 17.
    fn default() -> Self {
        Parameters {
            dt: 1.0 / 400.0,
            G: 1.0,
            epsilon: 0.4,
            theta: 0.3,
            max_depth: 17,
            friction_attract: 0.001,
            friction_repel: 0.2,
            edge_damping: 1.0,
            force_method: ForceMethod::Tree,
            reverse_physics: false,
        }
    }
}

impl Parameters {
    /// Friction constant for the current physics mode.
    pub fn friction_constant(&self) -> f64 {
        if self.reverse_physics {
            self.friction_repel
        } else {
            self.friction_attract
        }
    }
}

/// Axis-aligned simulation bounds. Bodies are clamped back inside when a
/// drift step carries them out.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// Bounds centered on the origin with the given full extents.
    pub fn centered(x_ext: f64, y_ext: f64) -> Self {
        Bounds {
            x_min: -0.5 * x_ext,
            x_max: 0.5 * x_ext,
            y_min: -0.5 * y_ext,
            y_max: 0.5 * y_ext,
        }
    }

    pub fn center(&self) -> NVec2 {
        NVec2::new(0.5 * (self.x_min + self.x_max), 0.5 * (self.y_min + self.y_max))
    }

    /// Half extents along x and y.
    pub fn half_dim(&self) -> NVec2 {
        NVec2::new(0.5 * (self.x_max - self.x_min), 0.5 * (self.y_max - self.y_min))
    }

    /// The smaller of the two full extents.
    pub fn min_extent(&self) -> f64 {
        (self.x_max - self.x_min).min(self.y_max - self.y_min)
    }

    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }
}
