use crate::neighbors::{within_radius, NeighborQuery};
use crate::swarm_state::SwarmState;
use rayon::prelude::*;
use vicsek_common::Vec2;

/// Uniform bucket grid over the box, cell side equal to the interaction radius
/// (or `box_size / MAX_GRID_DIM` when that is larger).
///
/// Particles are bucketed with a counting sort: per-cell counts, a prefix sum
/// for the cell start offsets, then a scatter into `cell_particle_indices`.
/// Lookups only visit the cells overlapped by the query disc's bounding box,
/// which is the 3x3 block around the particle's cell (fewer at the box edges).
/// Like the brute-force search, the grid does not wrap across the periodic
/// boundary.
/// Upper bound on cells per axis. Radii much smaller than the box get cells
/// wider than the radius instead of an unbounded allocation.
pub const MAX_GRID_DIM: usize = 1024;

#[derive(Debug, Clone)]
pub struct UniformGrid {
    radius: f64,
    cell_size: f64,
    grid_dim: usize,
    // Grid cell index for each particle
    particle_grid_indices: Vec<u32>,
    // Number of particles in each grid cell
    cell_counts: Vec<u32>,
    // Start index in cell_particle_indices for each grid cell (prefix sum)
    cell_starts: Vec<u32>,
    // Particle indices sorted by grid cell
    cell_particle_indices: Vec<u32>,
}

impl UniformGrid {
    pub fn new(box_size: f64, radius: f64) -> Self {
        let cell_size = radius.max(box_size / MAX_GRID_DIM as f64);
        let grid_dim = ((box_size / cell_size).ceil() as usize).clamp(1, MAX_GRID_DIM);
        let num_grid_cells = grid_dim * grid_dim;
        Self {
            radius,
            cell_size,
            grid_dim,
            particle_grid_indices: Vec::new(),
            cell_counts: vec![0; num_grid_cells],
            cell_starts: vec![0; num_grid_cells],
            cell_particle_indices: Vec::new(),
        }
    }

    pub fn grid_dim(&self) -> usize {
        self.grid_dim
    }

    /// Column or row of the cell containing coordinate `v`, clamped to the grid.
    #[inline(always)]
    fn axis_cell(&self, v: f64) -> usize {
        let cell = (v / self.cell_size).floor();
        if cell <= 0.0 {
            0
        } else {
            (cell as usize).min(self.grid_dim - 1)
        }
    }

    #[inline(always)]
    fn cell_idx(&self, pos: Vec2) -> usize {
        self.axis_cell(pos.y) * self.grid_dim + self.axis_cell(pos.x)
    }

    /// Particle indices bucketed in the given cell.
    fn cell_members(&self, grid_idx: usize) -> &[u32] {
        let start = self.cell_starts[grid_idx] as usize;
        let end = start + self.cell_counts[grid_idx] as usize;
        &self.cell_particle_indices[start..end]
    }
}

impl NeighborQuery for UniformGrid {
    fn rebuild(&mut self, state: &SwarmState) {
        let num_particles = state.len();

        // Phase 1: Assign grid indices to each particle (Parallel).
        let mut particle_grid_indices = std::mem::take(&mut self.particle_grid_indices);
        particle_grid_indices.resize(num_particles, 0);
        {
            let grid = &*self;
            particle_grid_indices
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, grid_idx_out)| {
                    *grid_idx_out = grid.cell_idx(state.position(idx)) as u32;
                });
        }
        self.particle_grid_indices = particle_grid_indices;

        // Phase 2: Count particles in each grid cell.
        self.cell_counts.iter_mut().for_each(|c| *c = 0);
        for &grid_idx in &self.particle_grid_indices {
            self.cell_counts[grid_idx as usize] += 1;
        }

        // Phase 3: Cell start offsets from a prefix sum over the counts.
        let mut total_sum = 0;
        for (start, &count) in self.cell_starts.iter_mut().zip(self.cell_counts.iter()) {
            *start = total_sum;
            total_sum += count;
        }

        // Phase 4: Scatter particle indices into their cell's block.
        // Particles are visited in ascending order, so each block stays sorted.
        let mut write_offsets = self.cell_starts.clone();
        self.cell_particle_indices.resize(num_particles, 0);
        for (particle_idx, &grid_idx) in self.particle_grid_indices.iter().enumerate() {
            let slot = &mut write_offsets[grid_idx as usize];
            self.cell_particle_indices[*slot as usize] = particle_idx as u32;
            *slot += 1;
        }

        log::trace!(
            "Rebuilt {}x{} neighbor grid for {} particles.",
            self.grid_dim,
            self.grid_dim,
            num_particles
        );
    }

    fn neighbors(&self, state: &SwarmState, idx: usize) -> Vec<usize> {
        let pos = state.position(idx);
        // Any point closer than `radius` lies inside this block of cells.
        let x_lo = self.axis_cell(pos.x - self.radius);
        let x_hi = self.axis_cell(pos.x + self.radius);
        let y_lo = self.axis_cell(pos.y - self.radius);
        let y_hi = self.axis_cell(pos.y + self.radius);

        let mut found = Vec::new();
        for grid_y in y_lo..=y_hi {
            for grid_x in x_lo..=x_hi {
                let grid_idx = grid_y * self.grid_dim + grid_x;
                for &neighbor_idx in self.cell_members(grid_idx) {
                    let neighbor_idx = neighbor_idx as usize;
                    if within_radius(pos, state.position(neighbor_idx), self.radius) {
                        found.push(neighbor_idx);
                    }
                }
            }
        }
        found.sort_unstable();
        found
    }

    fn name(&self) -> &'static str {
        "uniform_grid"
    }
}
