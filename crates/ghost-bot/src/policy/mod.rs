mod greedy;
mod sweep;

pub use greedy::{GreedyConfig, GreedyPolicy};
pub use sweep::SweepPolicy;

use ghost_core::belief::BeliefState;
use ghost_core::game::session::SessionStatus;
use ghost_core::model::grid::{Cell, Grid};
use ghost_core::model::observation::Observation;

/// A single turn decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Sense(Cell),
    Bust(Cell),
}

/// Read-only session surface handed to a policy each turn. This is the same
/// view a presentation layer gets; the hidden target is not part of it.
pub struct PolicyContext<'a> {
    pub grid: Grid,
    pub status: SessionStatus,
    pub belief: &'a BeliefState,
    pub last_observation: Option<Observation>,
}

/// Unified interface for automated players.
pub trait Policy: Send {
    fn choose(&mut self, ctx: &PolicyContext) -> PlayerAction;

    /// Called when the session ends, for policies that keep per-game state.
    fn reset(&mut self) {}
}
