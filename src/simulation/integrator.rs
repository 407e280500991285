//! Leapfrog primitives for the fixed-step integrator.
//!
//! The engine advances the system with a kick-drift-kick style scheme spread
//! across frames: each full step drifts positions using the previous step's
//! velocities, recomputes accelerations, then kicks velocities by a full
//! `dt`. A single half-kick at startup offsets velocities by `dt/2` so the
//! interleaving is symmetric from the first frame on.

use crate::simulation::states::{NVec2, System};

/// Drift: `x += v * dt` for every body, advancing positions a full step
/// using the previous step's velocities.
pub fn drift(sys: &mut System, dt: f64) {
    for b in sys.bodies.iter_mut() {
        b.x += b.v * dt;
    }
}

/// Kick: `v += a * dt` for every body. Called with `dt/2` once at startup
/// and with the full `dt` every step after that.
pub fn kick(sys: &mut System, dt: f64) {
    for b in sys.bodies.iter_mut() {
        b.v += b.a * dt;
    }
}

/// Reset every body's acceleration before the force passes accumulate into
/// it.
pub fn zero_accelerations(sys: &mut System) {
    for b in sys.bodies.iter_mut() {
        b.a = NVec2::zeros();
    }
}
