use crate::boundary::wrap;
use crate::collision::resolve;
use crate::heading::next_heading;
use crate::metrics::{
    mean_heading, neighbor_count_histogram, neighbor_counts, order_parameter, particles_in_obstacle,
};
use crate::neighbors::{build_neighbor_query, NeighborQuery};
use crate::noise::NoiseSource;
use crate::placement::initialize_with_attempts;
use crate::swarm_state::SwarmState;
use anyhow::Result;
use log::{debug, info, trace};
use rayon::prelude::*;
use vicsek_common::{Domain, SimulationConfig, Snapshot, Vec2};

const NEIGHBOR_HISTOGRAM_BINS: usize = 32;

/// Next position and heading of one particle, read only from `state`.
#[inline(always)]
fn advance_particle(
    domain: &Domain,
    state: &SwarmState,
    query: &dyn NeighborQuery,
    noise: &NoiseSource,
    idx: usize,
) -> (Vec2, f64) {
    let neighbor_headings: Vec<f64> = query
        .neighbors(state, idx)
        .into_iter()
        .map(|j| state.heading(j))
        .collect();

    let mut rng = noise.rng_for(state.tick(), idx);
    let heading = next_heading(&neighbor_headings, state.heading(idx), domain.noise_amplitude(), &mut rng);

    let moved = resolve(
        state.position(idx),
        heading,
        domain.speed(),
        domain.timestep(),
        domain.obstacle(),
    );
    (wrap(moved, domain.box_size()), heading)
}

/// Advances the swarm by one tick, evaluating particles in parallel.
///
/// Every particle reads the same frozen `state` and writes into fresh output
/// buffers, so the update is synchronous and independent of evaluation order.
/// The result is bit-identical to [`step_serial`].
pub fn step(
    domain: &Domain,
    state: &SwarmState,
    query: &mut dyn NeighborQuery,
    noise: &NoiseSource,
) -> SwarmState {
    query.rebuild(state);
    let query: &dyn NeighborQuery = query;

    let num_particles = state.len();
    let mut positions_x_out = vec![0.0; num_particles];
    let mut positions_y_out = vec![0.0; num_particles];
    let mut headings_out = vec![0.0; num_particles];

    positions_x_out
        .par_iter_mut()
        .zip(positions_y_out.par_iter_mut())
        .zip(headings_out.par_iter_mut())
        .enumerate()
        .for_each(|(idx, ((pos_x_out, pos_y_out), heading_out))| {
            let (pos, heading) = advance_particle(domain, state, query, noise, idx);
            *pos_x_out = pos.x;
            *pos_y_out = pos.y;
            *heading_out = heading;
        });

    state.succeeded_by(positions_x_out, positions_y_out, headings_out)
}

/// Single-threaded variant of [`step`].
pub fn step_serial(
    domain: &Domain,
    state: &SwarmState,
    query: &mut dyn NeighborQuery,
    noise: &NoiseSource,
) -> SwarmState {
    query.rebuild(state);
    let query: &dyn NeighborQuery = query;

    let num_particles = state.len();
    let mut positions_x_out = Vec::with_capacity(num_particles);
    let mut positions_y_out = Vec::with_capacity(num_particles);
    let mut headings_out = Vec::with_capacity(num_particles);
    for idx in 0..num_particles {
        let (pos, heading) = advance_particle(domain, state, query, noise, idx);
        positions_x_out.push(pos.x);
        positions_y_out.push(pos.y);
        headings_out.push(heading);
    }

    state.succeeded_by(positions_x_out, positions_y_out, headings_out)
}

/// Rejects a caller-supplied state that the step function could never produce:
/// positions outside `[0, box_size)`, particles inside the obstacle interior or
/// non-finite headings.
fn check_state(domain: &Domain, state: &SwarmState) -> Result<()> {
    let box_size = domain.box_size();
    let obstacle = domain.obstacle();
    for idx in 0..state.len() {
        let pos = state.position(idx);
        if !(0.0..box_size).contains(&pos.x) || !(0.0..box_size).contains(&pos.y) {
            anyhow::bail!(
                "Particle {} at ({}, {}) lies outside the box [0, {}).",
                idx,
                pos.x,
                pos.y,
                box_size
            );
        }
        if obstacle.interior_contains(pos) {
            anyhow::bail!("Particle {} at ({}, {}) lies inside the obstacle.", idx, pos.x, pos.y);
        }
        if !state.heading(idx).is_finite() {
            anyhow::bail!("Particle {} has a non-finite heading ({}).", idx, state.heading(idx));
        }
    }
    Ok(())
}

/// Owns one running simulation: the domain, the live swarm state, the
/// neighbor search, the noise stream and the recorded snapshots.
pub struct VicsekSimulation {
    config: SimulationConfig,
    domain: Domain,
    state: SwarmState,
    query: Box<dyn NeighborQuery>,
    noise: NoiseSource,
    parallel: bool,
    recorded_snapshots: Vec<Snapshot>,
}

impl VicsekSimulation {
    /// Validates the configuration and places the initial swarm.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let domain = config.to_domain()?;
        let seed = config.initial_conditions.seed;
        let max_attempts = config.initial_conditions.max_placement_attempts;
        let state = initialize_with_attempts(&domain, seed, max_attempts)?;
        Self::with_state(config, state)
    }

    /// Starts from a caller-supplied state instead of random placement.
    pub fn with_state(config: SimulationConfig, state: SwarmState) -> Result<Self> {
        let domain = config.to_domain()?;
        if state.len() != domain.particle_count() {
            anyhow::bail!(
                "Initial state has {} particles but the domain expects {}.",
                state.len(),
                domain.particle_count()
            );
        }

        check_state(&domain, &state)?;

        let query = build_neighbor_query(config.execution.neighbor_search, &domain);
        let noise = NoiseSource::new(config.initial_conditions.seed);
        let parallel = config.execution.parallel;
        info!(
            "Simulation ready: {} particles, neighbor search '{}', {} execution.",
            state.len(),
            query.name(),
            if parallel { "parallel" } else { "serial" }
        );

        Ok(Self {
            config,
            domain,
            state,
            query,
            noise,
            parallel,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Advances the simulation by one tick, replacing the current state.
    pub fn step(&mut self) {
        let next = if self.parallel {
            step(&self.domain, &self.state, self.query.as_mut(), &self.noise)
        } else {
            step_serial(&self.domain, &self.state, self.query.as_mut(), &self.noise)
        };
        self.state = next;
        trace!("Advanced to tick {}.", self.state.tick());
    }

    pub fn state(&self) -> &SwarmState {
        &self.state
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.state.tick()
    }

    /// Current positions as (x, y) tuples.
    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.state.positions()
    }

    pub fn headings(&self) -> &[f64] {
        self.state.headings()
    }

    /// Collects the metrics of the current state and stores them as a [`Snapshot`].
    pub fn record_snapshot(&mut self) -> &Snapshot {
        let tick = self.state.tick();
        let time = tick as f64 * self.domain.timestep();
        debug!("Recording snapshot at tick {} (t = {:.2})...", tick, time);

        self.query.rebuild(&self.state);
        let counts = neighbor_counts(&self.state, self.query.as_ref());
        let mean_neighbors = if counts.is_empty() {
            0.0
        } else {
            counts.iter().map(|&c| c as f64).sum::<f64>() / counts.len() as f64
        };
        debug!(
            "Neighbor stats: particles={}, avg_neighbors={:.2}, max_neighbors={}",
            counts.len(),
            mean_neighbors,
            counts.iter().copied().max().unwrap_or(0)
        );

        let include_particles = self.config.output.save_particles_in_snapshot;
        let snapshot = Snapshot {
            tick,
            time,
            particle_count: self.state.len() as u32,
            order_parameter: order_parameter(&self.state),
            mean_heading: mean_heading(&self.state),
            particles_in_obstacle: particles_in_obstacle(&self.state, self.domain.obstacle()),
            neighbor_counts_distribution: neighbor_count_histogram(&counts, NEIGHBOR_HISTOGRAM_BINS),
            positions: include_particles.then(|| self.state.positions()),
            headings: include_particles.then(|| self.state.headings().to_vec()),
        };

        self.recorded_snapshots.push(snapshot);
        &self.recorded_snapshots[self.recorded_snapshots.len() - 1]
    }

    pub fn recorded_snapshots(&self) -> &[Snapshot] {
        &self.recorded_snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::UniformGrid;
    use crate::neighbors::BruteForceNeighbors;
    use std::f64::consts::{FRAC_PI_2, PI};
    use vicsek_common::{NeighborSearchKind, Obstacle};

    fn two_particle_domain() -> Domain {
        Domain::new(10.0, 2, 1.0, 0.5, 1.0, 0.0, Obstacle::new(3.0, 7.0, 3.0, 7.0)).unwrap()
    }

    #[test]
    fn opposed_neighbors_turn_to_half_pi() {
        let domain = Domain::new(10.0, 2, 1.0, 0.5, 1.0, 0.0, Obstacle::new(8.0, 9.0, 8.0, 9.0)).unwrap();
        let state = SwarmState::new(&[Vec2::new(5.0, 5.0), Vec2::new(5.3, 5.0)], vec![0.0, PI]).unwrap();
        let mut query = BruteForceNeighbors::new(1.0);
        let next = step(&domain, &state, &mut query, &NoiseSource::new(1));

        assert_eq!(next.heading(0), FRAC_PI_2);
        assert_eq!(next.heading(1), FRAC_PI_2);
        assert!((next.position(0).x - 5.0).abs() < 1e-12);
        assert!((next.position(0).y - 5.5).abs() < 1e-12);
        assert!((next.position(1).x - 5.3).abs() < 1e-12);
        assert!((next.position(1).y - 5.5).abs() < 1e-12);
        assert_eq!(next.tick(), 1);
    }

    #[test]
    fn blocked_particle_keeps_position_but_turns() {
        let domain = two_particle_domain();
        // The neighbor behind it pulls the mean heading to 0.1; the move still hits the obstacle.
        let state = SwarmState::new(&[Vec2::new(2.99, 5.0), Vec2::new(2.5, 5.0)], vec![0.0, 0.2]).unwrap();
        let mut query = BruteForceNeighbors::new(1.0);
        let next = step(&domain, &state, &mut query, &NoiseSource::new(1));
        assert_eq!(next.position(0), Vec2::new(2.99, 5.0));
        assert_eq!(next.heading(0), 0.1);
        assert_eq!(next.heading(1), 0.1);
        assert_ne!(next.position(1), Vec2::new(2.5, 5.0));
    }

    #[test]
    fn crossing_left_edge_wraps() {
        let domain = two_particle_domain();
        let state = SwarmState::new(&[Vec2::new(0.1, 5.0), Vec2::new(9.0, 9.0)], vec![PI, 0.0]).unwrap();
        let mut query = BruteForceNeighbors::new(1.0);
        let next = step_serial(&domain, &state, &mut query, &NoiseSource::new(1));
        assert!((next.position(0).x - 9.6).abs() < 1e-12);
        assert!((next.position(0).y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn serial_parallel_and_grid_agree() {
        let mut config = SimulationConfig::default();
        config.particle_params.noise_amplitude = 0.4;
        let domain = config.to_domain().unwrap();
        let initial = crate::placement::initialize(&domain, 9).unwrap();
        let noise = NoiseSource::new(9);

        let mut brute = BruteForceNeighbors::new(domain.interaction_radius());
        let mut grid = UniformGrid::new(domain.box_size(), domain.interaction_radius());
        let mut a = initial.clone();
        let mut b = initial.clone();
        let mut c = initial;
        for _ in 0..25 {
            a = step(&domain, &a, &mut brute, &noise);
            b = step_serial(&domain, &b, &mut brute, &noise);
            c = step(&domain, &c, &mut grid, &noise);
        }
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn simulation_records_snapshots() {
        let mut config = SimulationConfig::default();
        config.execution.neighbor_search = NeighborSearchKind::Grid;
        let mut sim = VicsekSimulation::new(config).unwrap();
        sim.record_snapshot();
        sim.step();
        sim.step();
        let snapshot = sim.record_snapshot().clone();

        assert_eq!(sim.tick(), 2);
        assert_eq!(sim.recorded_snapshots().len(), 2);
        assert_eq!(snapshot.tick, 2);
        assert_eq!(snapshot.time, 2.0);
        assert_eq!(snapshot.particle_count, 100);
        assert_eq!(snapshot.neighbor_counts_distribution.iter().sum::<u32>(), 100);
        // Self is always a neighbor.
        assert_eq!(snapshot.neighbor_counts_distribution[0], 0);
        assert!((0.0..=1.0 + 1e-12).contains(&snapshot.order_parameter));
        assert_eq!(snapshot.positions.as_ref().map(Vec::len), Some(100));
        assert_eq!(snapshot.headings.as_deref(), Some(sim.headings()));
    }

    #[test]
    fn with_state_checks_particle_count() {
        let state = SwarmState::new(&[Vec2::new(1.0, 1.0)], vec![0.0]).unwrap();
        let err = VicsekSimulation::with_state(SimulationConfig::default(), state).err().unwrap();
        assert!(err.to_string().contains("expects 100"));
    }

    #[test]
    fn with_state_rejects_impossible_positions() {
        let mut config = SimulationConfig::default();
        config.initial_conditions.num_particles = Some(2);

        let inside = SwarmState::new(&[Vec2::new(5.0, 5.0), Vec2::new(1.0, 1.0)], vec![0.0, 0.0]).unwrap();
        let err = VicsekSimulation::with_state(config.clone(), inside).err().unwrap();
        assert!(err.to_string().contains("inside the obstacle"), "unexpected message: {}", err);

        let outside = SwarmState::new(&[Vec2::new(10.0, 5.0), Vec2::new(1.0, 1.0)], vec![0.0, 0.0]).unwrap();
        let err = VicsekSimulation::with_state(config.clone(), outside).err().unwrap();
        assert!(err.to_string().contains("outside the box"), "unexpected message: {}", err);

        let nan = SwarmState::new(&[Vec2::new(1.0, 5.0), Vec2::new(1.0, 1.0)], vec![f64::NAN, 0.0]).unwrap();
        let err = VicsekSimulation::with_state(config.clone(), nan).err().unwrap();
        assert!(err.to_string().contains("non-finite heading"), "unexpected message: {}", err);

        // On the obstacle edge is allowed.
        let edge = SwarmState::new(&[Vec2::new(3.0, 5.0), Vec2::new(1.0, 1.0)], vec![0.0, 0.0]).unwrap();
        assert!(VicsekSimulation::with_state(config, edge).is_ok());
    }

    #[test]
    fn tiny_radius_grid_simulation_runs() {
        let mut config = SimulationConfig::default();
        config.execution.neighbor_search = NeighborSearchKind::Grid;
        config.particle_params.interaction_radius = 1e-5;
        config.validate().unwrap();

        let mut sim = VicsekSimulation::new(config).unwrap();
        sim.step();
        assert_eq!(sim.tick(), 1);
        assert_eq!(sim.positions().len(), 100);
    }
}
