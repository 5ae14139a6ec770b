pub mod config;
pub mod domain;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{
    ExecutionConfig, InitialConditions, NeighborSearchKind, ObstacleConfig, OutputConfig,
    ParticleParamsConfig, SimulationConfig, TimingConfig, UniverseConfig,
};
pub use domain::{Domain, Obstacle};
pub use snapshot::Snapshot;
pub use vecmath::{angle_to_vec, vec_to_angle, Vec2};
