use super::{PlayerAction, Policy, PolicyContext};
use ghost_core::model::grid::Cell;

/// Near-band readings cover a Manhattan radius of 2, so probing every third
/// column tiles the grid without redundant coverage.
const SWEEP_STRIDE: usize = 3;

/// Baseline scanner: probes cells in a fixed stride pattern, ignoring the
/// posterior until its budget runs out, then busts the peak.
#[derive(Debug, Clone, Default)]
pub struct SweepPolicy {
    cursor: usize,
}

impl SweepPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for SweepPolicy {
    fn choose(&mut self, ctx: &PolicyContext) -> PlayerAction {
        if ctx.status.sense_remaining == 0 || ctx.status.bust_remaining > ctx.status.sense_remaining
        {
            let (peak, _) = ctx.belief.peak();
            return PlayerAction::Bust(peak);
        }

        let width = ctx.grid.width() as usize;
        let index = self.cursor % ctx.grid.cell_count();
        self.cursor = (self.cursor + SWEEP_STRIDE) % ctx.grid.cell_count();

        let cell = Cell::new((index % width) as u16, (index / width) as u16);
        PlayerAction::Sense(cell)
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }
}
