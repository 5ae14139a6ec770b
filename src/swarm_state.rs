use anyhow::Result;
use serde::{Deserialize, Serialize};
use vicsek_common::Vec2;

/// Positions and headings of every particle at one tick.
///
/// Stored as a struct of arrays, like the engine's buffers. Particle `i` keeps
/// index `i` for the whole run. A state is never modified in place by the step
/// function: each tick builds a fresh `SwarmState` from the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmState {
    tick: u64,
    positions_x: Vec<f64>,
    positions_y: Vec<f64>,
    headings: Vec<f64>,
}

impl SwarmState {
    /// Creates the state at tick 0.
    pub fn new(positions: &[Vec2], headings: Vec<f64>) -> Result<Self> {
        let positions_x = positions.iter().map(|p| p.x).collect();
        let positions_y = positions.iter().map(|p| p.y).collect();
        Self::from_parts(0, positions_x, positions_y, headings)
    }

    pub fn from_parts(
        tick: u64,
        positions_x: Vec<f64>,
        positions_y: Vec<f64>,
        headings: Vec<f64>,
    ) -> Result<Self> {
        if positions_x.len() != positions_y.len() || positions_x.len() != headings.len() {
            anyhow::bail!(
                "State buffers differ in length: {} x, {} y, {} headings.",
                positions_x.len(),
                positions_y.len(),
                headings.len()
            );
        }
        Ok(Self {
            tick,
            positions_x,
            positions_y,
            headings,
        })
    }

    /// The state one tick after `self`, built from freshly written output buffers.
    pub(crate) fn succeeded_by(
        &self,
        positions_x: Vec<f64>,
        positions_y: Vec<f64>,
        headings: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(positions_x.len(), self.len());
        debug_assert_eq!(positions_y.len(), self.len());
        debug_assert_eq!(headings.len(), self.len());
        Self {
            tick: self.tick + 1,
            positions_x,
            positions_y,
            headings,
        }
    }

    /// Number of completed steps that produced this state.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    #[inline(always)]
    pub fn position(&self, idx: usize) -> Vec2 {
        Vec2::new(self.positions_x[idx], self.positions_y[idx])
    }

    #[inline(always)]
    pub fn heading(&self, idx: usize) -> f64 {
        self.headings[idx]
    }

    pub fn positions_x(&self) -> &[f64] {
        &self.positions_x
    }

    pub fn positions_y(&self) -> &[f64] {
        &self.positions_y
    }

    pub fn headings(&self) -> &[f64] {
        &self.headings
    }

    /// Current positions as (x, y) tuples, in particle order.
    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.positions_x
            .iter()
            .zip(self.positions_y.iter())
            .map(|(&x, &y)| (x, y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_at_tick_zero() {
        let state = SwarmState::new(&[Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)], vec![0.5, -0.5]).unwrap();
        assert_eq!(state.tick(), 0);
        assert_eq!(state.len(), 2);
        assert_eq!(state.position(1), Vec2::new(3.0, 4.0));
        assert_eq!(state.heading(0), 0.5);
        assert_eq!(state.positions(), vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn rejects_mismatched_buffers() {
        assert!(SwarmState::new(&[Vec2::zero()], vec![]).is_err());
        assert!(SwarmState::from_parts(3, vec![1.0], vec![1.0, 2.0], vec![0.0]).is_err());
    }
}
