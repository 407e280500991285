//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – force method, opening ratio, depth limit, mode
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`BoundsConfig`]     – extents of the simulation box
//! - [`PopulationConfig`] – how many bodies to spawn and with what profile
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario file
//!
//! # YAML format
//! An example scenario matching these types:
//!
//! ```yaml
//! engine:
//!   force_method: "tree"      # or "brute"
//!   theta: 0.3                # Barnes-Hut opening ratio
//!   max_depth: 17             # quadtree subdivision limit
//!   reverse_physics: false
//!
//! parameters:
//!   dt: 0.0025                # fixed step size
//!   G: 1.0                    # gravitational constant
//!   epsilon: 0.4              # softening length
//!   edge_damping: 1.0         # boundary reflection factor
//!   friction_attract: 0.001
//!   friction_repel: 0.2
//!   seed: 42                  # RNG seed, makes runs reproducible
//!
//! bounds:
//!   x_ext: 13.0
//!   y_ext: 7.5
//!
//! population:
//!   num_bodies: 64
//!   total_mass: 400.0
//!   mass_dev: 0.0
//!   neg_charge_prob: 0.0
//!   initial_condition: "rotating_ring"
//!
//! steps: 4000
//! ```
//!
//! The scenario builder maps this configuration into the runtime structs and
//! validates value ranges once, up front.

use serde::Deserialize;

/// Which mutual-force algorithm to run:
/// `force_method: "brute"` or `force_method: "tree"`.
#[derive(Deserialize, Debug, Clone, Copy)]
pub enum ForceMethodConfig {
    #[serde(rename = "brute")] // exact O(n^2) pairwise summation
    Brute,

    #[serde(rename = "tree")] // Barnes-Hut quadtree approximation
    Tree,
}

/// Which initial-condition generator produces each body's position and
/// velocity.
#[derive(Deserialize, Debug, Clone, Copy)]
pub enum InitialConditionConfig {
    #[serde(rename = "uniform_in_box")] // uniform position, at rest
    UniformInBox,

    #[serde(rename = "cluster_at_rest")] // small central cluster, at rest
    ClusterAtRest,

    #[serde(rename = "rotating_ring")] // ring with orbital velocity profile
    RotatingRing,
}

/// High-level engine configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub force_method: ForceMethodConfig,
    pub theta: Option<f64>, // opening ratio; default 0.3
    pub max_depth: Option<u32>, // subdivision limit; default 17
    pub reverse_physics: Option<bool>, // start in repel mode; default false
}

/// Global numerical and physical parameters for a scenario.
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64, // time step size
    pub G: f64, // gravitational constant
    pub epsilon: f64, // softening, prevents singular forces at small separations
    pub edge_damping: f64, // boundary reflection factor in [0, 1]
    pub friction_attract: f64, // quadratic friction constant, attract mode
    pub friction_repel: f64, // quadratic friction constant, repel mode
    pub seed: u64, // deterministic seed to make runs reproducible
}

/// Extents of the simulation box, centered on the origin.
#[derive(Deserialize, Debug, Clone)]
pub struct BoundsConfig {
    pub x_ext: f64, // full width
    pub y_ext: f64, // full height
}

/// How the initial body population is spawned.
#[derive(Deserialize, Debug, Clone)]
pub struct PopulationConfig {
    pub num_bodies: u32,
    pub total_mass: f64, // average mass = total_mass / num_bodies
    pub mass_dev: f64, // mass uniform in avg * [1 - dev, 1 + dev]
    pub neg_charge_prob: f64, // probability of a -1 charge
    pub initial_condition: InitialConditionConfig,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub bounds: BoundsConfig,
    pub population: PopulationConfig,
    pub steps: Option<u64>, // default step count for a headless run
}
