pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, ColorTag, NVec2, System};
pub use simulation::params::{Bounds, ForceMethod, Parameters};
pub use simulation::quadtree::{child_bounds, quadrant_of, Occupant, QuadNode, QuadTree};
pub use simulation::forces::{point_mass_accel, ForceStats};
pub use simulation::engine::BodySim;
pub use simulation::scenario::{build_scenario, spawn_bodies, InitialCondition};

pub use configuration::config::{
    BoundsConfig, EngineConfig, ForceMethodConfig, InitialConditionConfig, ParametersConfig,
    PopulationConfig, ScenarioConfig,
};

pub use benchmark::benchmark::{bench_mutual_forces, bench_step_curve};
