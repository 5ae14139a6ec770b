//! Vicsek alignment dynamics for self-propelled particles in a periodic box
//! with a rectangular obstacle.

pub mod boundary;
pub mod collision;
pub mod grid;
pub mod heading;
pub mod metrics;
pub mod neighbors;
pub mod noise;
pub mod output;
pub mod placement;
pub mod simulation;
pub mod swarm_state;

pub use boundary::wrap;
pub use collision::resolve;
pub use grid::UniformGrid;
pub use heading::next_heading;
pub use neighbors::{build_neighbor_query, BruteForceNeighbors, NeighborQuery};
pub use noise::NoiseSource;
pub use placement::{initialize, initialize_with_attempts};
pub use simulation::{step, step_serial, VicsekSimulation};
pub use swarm_state::SwarmState;
