use crate::swarm_state::SwarmState;
use anyhow::Result;
use log::debug;
use rand::distr::Uniform;
use rand::prelude::*;
use std::f64::consts::PI;
use vicsek_common::{Domain, Vec2};

/// Rejection-sampling attempts allowed per particle before placement gives up.
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

/// Places `particle_count` particles uniformly over the part of the box not
/// covered by the obstacle, with headings uniform over (-pi, pi].
pub fn initialize(domain: &Domain, seed: u64) -> Result<SwarmState> {
    initialize_with_attempts(domain, seed, DEFAULT_MAX_PLACEMENT_ATTEMPTS)
}

/// Like [`initialize`], with an explicit per-particle attempt budget.
///
/// Fails instead of looping forever when the obstacle leaves no free area or
/// a particle cannot be placed within `max_attempts` samples.
pub fn initialize_with_attempts(domain: &Domain, seed: u64, max_attempts: u32) -> Result<SwarmState> {
    let box_size = domain.box_size();
    let obstacle = domain.obstacle();
    if obstacle.covers_box(box_size) {
        anyhow::bail!(
            "Obstacle [{}, {}] x [{}, {}] covers the whole box; no particle can be placed.",
            obstacle.x_min,
            obstacle.x_max,
            obstacle.y_min,
            obstacle.y_max
        );
    }
    if max_attempts == 0 {
        anyhow::bail!("max_attempts must be greater than 0.");
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let coord_dist = Uniform::new(0.0, box_size)?;
    let turn_dist = Uniform::new(0.0, 2.0 * PI)?;

    let count = domain.particle_count();
    let mut positions = Vec::with_capacity(count);
    let mut rejected = 0u64;
    for particle_idx in 0..count {
        let mut placed = None;
        for _attempt in 0..max_attempts {
            let candidate = Vec2::new(rng.sample(coord_dist), rng.sample(coord_dist));
            if obstacle.contains(candidate) {
                rejected += 1;
                continue;
            }
            placed = Some(candidate);
            break;
        }
        match placed {
            Some(pos) => positions.push(pos),
            None => anyhow::bail!(
                "Could not place particle {} outside the obstacle after {} attempts \
                 (free area {:.3} of {:.3}).",
                particle_idx,
                max_attempts,
                domain.free_area(),
                box_size * box_size
            ),
        }
    }

    // pi - [0, 2pi) is (-pi, pi].
    let headings: Vec<f64> = (0..count).map(|_| PI - rng.sample(turn_dist)).collect();

    debug!("Placed {} particles ({} samples rejected by the obstacle).", count, rejected);
    SwarmState::new(&positions, headings)
}
