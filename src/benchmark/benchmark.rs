//! Hand-rolled timing runs comparing the brute-force and tree force passes.
//!
//! Bodies are laid out deterministically (sin/cos lattices, no RNG) so runs
//! are comparable across machines and code changes. Output goes to stdout;
//! the curve variant prints CSV that can be pasted straight into a
//! spreadsheet.

use std::time::Instant;

use crate::simulation::engine::BodySim;
use crate::simulation::params::{Bounds, ForceMethod, Parameters};
use crate::simulation::states::{Body, NVec2, System};

/// Deterministic scattered system of `n` unit-mass bodies at rest.
fn make_system(n: usize) -> System {
    let mut bodies = Vec::with_capacity(n);
    for i in 0..n {
        let i_f = i as f64;
        let x = NVec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0);
        bodies.push(Body::at(x, 1.0));
    }
    System::new(bodies)
}

fn make_params(method: ForceMethod) -> Parameters {
    Parameters {
        force_method: method,
        ..Parameters::default()
    }
}

fn make_bounds() -> Bounds {
    // Comfortably contains the sin/cos lattice.
    Bounds::centered(12.0, 12.0)
}

/// Time a single full step under each force method for a range of N.
pub fn bench_mutual_forces() {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    for n in ns {
        let mut brute = BodySim::new(make_system(n), make_bounds(), make_params(ForceMethod::Brute));
        let mut tree = BodySim::new(make_system(n), make_bounds(), make_params(ForceMethod::Tree));

        // Warm up (also runs the half-kick bootstrap outside the timed region).
        brute.step(1);
        tree.step(1);

        let t0 = Instant::now();
        brute.step(1);
        let dt_brute = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        tree.step(1);
        let dt_tree = t1.elapsed().as_secs_f64();

        println!(
            "N = {n:5}, brute = {dt_brute:8.6} s, tree = {dt_tree:8.6} s, tree evals = {}",
            tree.step_stats.total()
        );
    }
}

/// Per-step timing curve over a sweep of N, printed as CSV.
pub fn bench_step_curve() {
    println!("N,brute_ms,tree_ms");

    for n in (200..=12800).step_by(200) {
        // Small n: average a few steps to smooth noise. Large n: one step,
        // or the brute pass alone takes minutes.
        let steps_brute: u32 = if n <= 800 { 5 } else { 1 };
        let steps_tree: u32 = if n <= 2000 { 3 } else { 1 };

        let mut brute = BodySim::new(make_system(n), make_bounds(), make_params(ForceMethod::Brute));
        brute.step(1); // warm-up + bootstrap

        let t0 = Instant::now();
        brute.step(steps_brute);
        let ms_brute = t0.elapsed().as_secs_f64() * 1000.0 / steps_brute as f64;

        let mut tree = BodySim::new(make_system(n), make_bounds(), make_params(ForceMethod::Tree));
        tree.step(1);

        let t1 = Instant::now();
        tree.step(steps_tree);
        let ms_tree = t1.elapsed().as_secs_f64() * 1000.0 / steps_tree as f64;

        println!("{n},{ms_brute:.6},{ms_tree:.6}");
    }
}
