use serde::{Deserialize, Serialize};

/// A snapshot of the swarm state and metrics at a specific tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of completed steps when the snapshot was taken.
    pub tick: u64,
    /// Simulated time (`tick * timestep`).
    pub time: f64,
    pub particle_count: u32,
    /// Polar order parameter: length of the mean unit heading vector, in [0, 1].
    pub order_parameter: f64,
    /// Direction of the mean unit heading vector, in (-pi, pi].
    pub mean_heading: f64,
    /// Particles whose position lies within the closed obstacle rectangle.
    pub particles_in_obstacle: u32,
    /// `neighbor_counts_distribution[k]` is the number of particles with exactly `k` neighbors
    /// (self included). The last bin also collects every larger count.
    pub neighbor_counts_distribution: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")] // Don't write "positions": null
    pub positions: Option<Vec<(f64, f64)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headings: Option<Vec<f64>>,
}
