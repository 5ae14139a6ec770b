use crate::neighbors::NeighborQuery;
use crate::swarm_state::SwarmState;
use log::warn;
use rayon::prelude::*;
use vicsek_common::{angle_to_vec, vec_to_angle, Obstacle, Vec2};

/// Sum of the unit heading vectors.
fn heading_sum(state: &SwarmState) -> Vec2 {
    state
        .headings()
        .iter()
        .fold(Vec2::zero(), |acc, &theta| acc + angle_to_vec(theta))
}

/// Polar order parameter: 1 for a perfectly aligned swarm, ~0 for random headings.
pub fn order_parameter(state: &SwarmState) -> f64 {
    if state.is_empty() {
        return 0.0;
    }
    heading_sum(state).length() / state.len() as f64
}

/// Direction of the mean heading vector, in (-pi, pi].
pub fn mean_heading(state: &SwarmState) -> f64 {
    vec_to_angle(heading_sum(state))
}

pub fn particles_in_obstacle(state: &SwarmState, obstacle: &Obstacle) -> u32 {
    (0..state.len())
        .filter(|&idx| obstacle.contains(state.position(idx)))
        .count() as u32
}

/// Neighbor count of every particle (self included), computed in parallel.
/// `query` must have been rebuilt for `state`.
pub fn neighbor_counts(state: &SwarmState, query: &dyn NeighborQuery) -> Vec<u32> {
    (0..state.len())
        .into_par_iter()
        .map(|idx| query.neighbors(state, idx).len() as u32)
        .collect()
}

/// `histogram[k]` = particles with exactly `k` neighbors; counts past the last bin land in it.
pub fn neighbor_count_histogram(counts: &[u32], bins: usize) -> Vec<u32> {
    let mut histogram = vec![0u32; bins];
    if bins == 0 {
        return histogram;
    }
    let mut overflow = 0;
    for &count in counts {
        let bin = (count as usize).min(bins - 1);
        if count as usize >= bins {
            overflow += 1;
        }
        histogram[bin] += 1;
    }
    if overflow > 0 {
        warn!(
            "{} particles have more than {} neighbors; counted in the last histogram bin.",
            overflow,
            bins - 1
        );
    }
    histogram
}
