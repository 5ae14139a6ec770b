use crate::grid::UniformGrid;
use crate::swarm_state::SwarmState;
use vicsek_common::{Domain, NeighborSearchKind, Vec2};

/// Finds the particles that influence a given particle's heading.
///
/// Implementations answer against the state passed to the last `rebuild`
/// call. A particle counts as its own neighbor, and indices come back in
/// ascending order so heading sums are accumulated in the same order by every
/// implementation.
pub trait NeighborQuery: Send + Sync {
    /// Rebuild internal structures from the current positions.
    fn rebuild(&mut self, state: &SwarmState);

    /// Indices `j` with `distance(position[idx], position[j]) < radius`, ascending.
    fn neighbors(&self, state: &SwarmState, idx: usize) -> Vec<usize>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Shared neighbor predicate. Strict: a particle exactly at the radius is not a neighbor.
#[inline(always)]
pub fn within_radius(a: Vec2, b: Vec2, radius: f64) -> bool {
    a.distance(b) < radius
}

/// Exhaustive pairwise search, O(N) per particle.
#[derive(Debug, Clone)]
pub struct BruteForceNeighbors {
    radius: f64,
}

impl BruteForceNeighbors {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl NeighborQuery for BruteForceNeighbors {
    fn rebuild(&mut self, _state: &SwarmState) {
        // Nothing to rebuild for brute force.
    }

    fn neighbors(&self, state: &SwarmState, idx: usize) -> Vec<usize> {
        let pos = state.position(idx);
        (0..state.len())
            .filter(|&j| within_radius(pos, state.position(j), self.radius))
            .collect()
    }

    fn name(&self) -> &'static str {
        "brute_force"
    }
}

/// Builds the neighbor search selected in the configuration.
pub fn build_neighbor_query(kind: NeighborSearchKind, domain: &Domain) -> Box<dyn NeighborQuery> {
    match kind {
        NeighborSearchKind::BruteForce => Box::new(BruteForceNeighbors::new(domain.interaction_radius())),
        NeighborSearchKind::Grid => {
            Box::new(UniformGrid::new(domain.box_size(), domain.interaction_radius()))
        }
    }
}
