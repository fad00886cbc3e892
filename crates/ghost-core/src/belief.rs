//! Posterior tracking for the hidden target position.
//!
//! [`BeliefState`] is a discrete Bayesian filter over the grid: after each
//! observation, every cell's weight is multiplied by the likelihood of that
//! observation under the hypothesis that the target sits there, then the
//! whole distribution is renormalized. The target never moves, so there is no
//! prediction/motion step between updates; readers expecting an HMM-style
//! transition model will not find one.

use crate::model::grid::{Cell, Grid};
use crate::model::observation::Observation;
use crate::sensor::SensorModel;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeliefError {
    /// Every cell received zero likelihood, so the posterior has no mass to
    /// renormalize. Observations generated by the session's own sensor can
    /// never do this while the noise floor is positive; hitting it means the
    /// likelihood tables and the observation stream disagree.
    InconsistentBelief,
}

impl fmt::Display for BeliefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeliefError::InconsistentBelief => {
                f.write_str("belief mass collapsed to zero during update")
            }
        }
    }
}

impl std::error::Error for BeliefError {}

/// Probability mass over every candidate target cell. Weights always sum to
/// 1.0 (within floating tolerance) outside of a failed update.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefState {
    grid: Grid,
    weights: Vec<f64>,
}

impl BeliefState {
    /// Uniform prior `1 / (W * H)` over the whole grid.
    pub fn uniform(grid: Grid) -> Self {
        let prior = 1.0 / grid.cell_count() as f64;
        Self {
            grid,
            weights: vec![prior; grid.cell_count()],
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn probability(&self, cell: Cell) -> f64 {
        self.weights[self.grid.index_of(cell)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.grid.cells().zip(self.weights.iter().copied())
    }

    pub fn total_mass(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Cell holding the largest posterior mass. Ties resolve to the first
    /// cell in row order.
    pub fn peak(&self) -> (Cell, f64) {
        let mut best = (Cell::new(0, 0), f64::MIN);
        for (cell, weight) in self.iter() {
            if weight > best.1 {
                best = (cell, weight);
            }
        }
        best
    }

    /// Sequential Bayes step: scale every cell by the likelihood of
    /// `observation` given the target sat there, then renormalize.
    ///
    /// Two identical consecutive observations are not idempotent: each one
    /// multiplies again and sharpens the peak further.
    pub fn update(
        &mut self,
        observation: Observation,
        queried: Cell,
        sensor: &SensorModel,
    ) -> Result<(), BeliefError> {
        let mut total = 0.0;
        for (index, cell) in self.grid.cells().enumerate() {
            let posterior = self.weights[index] * sensor.joint_likelihood(observation, cell, queried);
            self.weights[index] = posterior;
            total += posterior;
        }

        if total <= 0.0 {
            return Err(BeliefError::InconsistentBelief);
        }

        for weight in &mut self.weights {
            *weight /= total;
        }
        Ok(())
    }
}
