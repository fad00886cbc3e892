use ghost_core::belief::BeliefState;
use ghost_core::model::grid::Cell;

/// Lightweight read-only view over a [`BeliefState`] used by policies.
#[derive(Debug, Clone, Copy)]
pub struct BeliefSummary<'a> {
    belief: &'a BeliefState,
}

impl<'a> BeliefSummary<'a> {
    pub fn new(belief: &'a BeliefState) -> Self {
        Self { belief }
    }

    pub fn belief(&self) -> &'a BeliefState {
        self.belief
    }

    pub fn peak(&self) -> (Cell, f64) {
        self.belief.peak()
    }

    /// Shannon entropy of the posterior, in nats. Zero means the target is
    /// pinned to a single cell; `ln(W * H)` is the uniform prior.
    pub fn entropy(&self) -> f64 {
        self.belief
            .iter()
            .filter(|(_, weight)| *weight > 0.0)
            .map(|(_, weight)| -weight * weight.ln())
            .sum()
    }

    /// Probability mass concentrated in the top `count` cells.
    pub fn top_mass(&self, count: usize) -> f64 {
        let mut weights: Vec<f64> = self.belief.iter().map(|(_, weight)| weight).collect();
        weights.sort_by(|a, b| b.partial_cmp(a).expect("weights are finite"));
        weights.into_iter().take(count).sum()
    }
}
