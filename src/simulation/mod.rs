pub mod states;
pub mod params;
pub mod quadtree;
pub mod forces;
pub mod integrator;
pub mod engine;
pub mod scenario;
