//! Build fully-initialized simulations from configuration.
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a ready-to-step
//! [`BodySim`]: validated parameters, bounds, and a spawned body population.
//! Spawning draws from an injectable `Rng`, so a fixed seed reproduces the
//! same run and tests can pass their own source.

use std::f64::consts::TAU;

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{
    ForceMethodConfig, InitialConditionConfig, PopulationConfig, ScenarioConfig,
};
use crate::simulation::engine::BodySim;
use crate::simulation::params::{Bounds, ForceMethod, Parameters};
use crate::simulation::states::{Body, ColorTag, NVec2, System};

/// Base tag that spawned body colors are blended from.
const BASE_COLOR: ColorTag = ColorTag { r: 0, g: 196, b: 255 };

/// Tagged initial-condition strategy. Each variant produces a
/// `(position, velocity)` pair from a random source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialCondition {
    /// Position uniform over the bounds, at rest.
    UniformInBox,
    /// Random direction scaled by a uniform `[0, 0.1] * min_extent` radius,
    /// at rest.
    ClusterAtRest,
    /// Random direction scaled into a `[0.23, 0.35] * min_extent` ring, with
    /// tangential velocity proportional to the radius (orbital profile).
    RotatingRing,
}

impl InitialCondition {
    pub fn sample(&self, bounds: &Bounds, rng: &mut impl Rng) -> (NVec2, NVec2) {
        let center = bounds.center();
        match self {
            InitialCondition::UniformInBox => {
                let x = NVec2::new(
                    rng.gen_range(bounds.x_min..=bounds.x_max),
                    rng.gen_range(bounds.y_min..=bounds.y_max),
                );
                (x, NVec2::zeros())
            }
            InitialCondition::ClusterAtRest => {
                let u = random_unit(rng);
                let r = rng.gen_range(0.0..=0.1 * bounds.min_extent());
                (center + u * r, NVec2::zeros())
            }
            InitialCondition::RotatingRing => {
                let u = random_unit(rng);
                // Clockwise perpendicular of the radial direction.
                let tangent = NVec2::new(u.y, -u.x);
                let min_ext = bounds.min_extent();
                let r = rng.gen_range(0.23 * min_ext..=0.35 * min_ext);
                let x = u * r;
                (center + x, tangent * (2.0 * x.norm()))
            }
        }
    }
}

impl From<InitialConditionConfig> for InitialCondition {
    fn from(cfg: InitialConditionConfig) -> Self {
        match cfg {
            InitialConditionConfig::UniformInBox => InitialCondition::UniformInBox,
            InitialConditionConfig::ClusterAtRest => InitialCondition::ClusterAtRest,
            InitialConditionConfig::RotatingRing => InitialCondition::RotatingRing,
        }
    }
}

/// Uniformly random unit vector.
fn random_unit(rng: &mut impl Rng) -> NVec2 {
    let angle = rng.gen_range(0.0..TAU);
    NVec2::new(angle.cos(), angle.sin())
}

/// Spawn the initial body population described by `pop` inside `bounds`.
pub fn spawn_bodies(pop: &PopulationConfig, bounds: &Bounds, rng: &mut impl Rng) -> Vec<Body> {
    let condition = InitialCondition::from(pop.initial_condition);
    let avg_mass = pop.total_mass / pop.num_bodies as f64;
    let min_mass = (1.0 - pop.mass_dev) * avg_mass;
    let max_mass = (1.0 + pop.mass_dev) * avg_mass;

    (0..pop.num_bodies)
        .map(|_| {
            let (x, v) = condition.sample(bounds, rng);
            let m = rng.gen_range(min_mass..=max_mass);
            let p = if rng.gen::<f64>() < pop.neg_charge_prob { -1 } else { 1 };
            let random = ColorTag {
                r: rng.gen(),
                g: rng.gen(),
                b: rng.gen(),
            };
            let color = BASE_COLOR.lerp(random, rng.gen_range(0.5..=0.8));
            Body {
                x,
                v,
                a: NVec2::zeros(),
                m,
                p,
                color,
            }
        })
        .collect()
}

/// Build a [`BodySim`] from a loaded scenario configuration.
///
/// Configuration ranges are checked once, here; the step loop itself has no
/// error paths.
pub fn build_scenario(cfg: &ScenarioConfig) -> Result<BodySim> {
    let p = &cfg.parameters;
    ensure!(p.dt > 0.0, "dt must be positive, got {}", p.dt);
    ensure!(p.G.is_finite(), "G must be finite");
    ensure!(p.epsilon > 0.0, "epsilon must be positive, got {}", p.epsilon);
    ensure!(
        (0.0..=1.0).contains(&p.edge_damping),
        "edge_damping must lie in [0, 1], got {}",
        p.edge_damping
    );
    ensure!(p.friction_attract >= 0.0, "friction_attract must be non-negative");
    ensure!(p.friction_repel >= 0.0, "friction_repel must be non-negative");

    let e = &cfg.engine;
    let theta = e.theta.unwrap_or(0.3);
    ensure!(theta > 0.0, "theta must be positive, got {theta}");

    let b = &cfg.bounds;
    ensure!(b.x_ext > 0.0 && b.y_ext > 0.0, "bounds extents must be positive");

    let pop = &cfg.population;
    ensure!(pop.num_bodies > 0, "num_bodies must be positive");
    ensure!(pop.total_mass > 0.0, "total_mass must be positive");
    ensure!(
        (0.0..1.0).contains(&pop.mass_dev),
        "mass_dev must lie in [0, 1), got {}",
        pop.mass_dev
    );
    ensure!(
        (0.0..=1.0).contains(&pop.neg_charge_prob),
        "neg_charge_prob must lie in [0, 1], got {}",
        pop.neg_charge_prob
    );

    let params = Parameters {
        dt: p.dt,
        G: p.G,
        epsilon: p.epsilon,
        theta,
        max_depth: e.max_depth.unwrap_or(17),
        friction_attract: p.friction_attract,
        friction_repel: p.friction_repel,
        edge_damping: p.edge_damping,
        force_method: match e.force_method {
            ForceMethodConfig::Brute => ForceMethod::Brute,
            ForceMethodConfig::Tree => ForceMethod::Tree,
        },
        reverse_physics: e.reverse_physics.unwrap_or(false),
    };

    let bounds = Bounds::centered(b.x_ext, b.y_ext);
    let mut rng = StdRng::seed_from_u64(p.seed);
    let bodies = spawn_bodies(pop, &bounds, &mut rng);

    Ok(BodySim::new(System::new(bodies), bounds, params))
}
