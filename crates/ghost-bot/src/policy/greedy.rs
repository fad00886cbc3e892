use super::{PlayerAction, Policy, PolicyContext};
use crate::summary::BeliefSummary;
use ghost_core::model::grid::Cell;
use std::env;
use tracing::{Level, event};

/// Tunable thresholds for the greedy posterior-peak player.
#[derive(Debug, Clone, Copy)]
pub struct GreedyConfig {
    /// Peak posterior probability at which the policy commits a bust.
    pub bust_threshold: f64,
    /// Senses kept in reserve; once the budget drops this low the policy
    /// stops probing and spends its busts on the current peak.
    pub sense_reserve: u32,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            bust_threshold: 0.5,
            sense_reserve: 0,
        }
    }
}

impl GreedyConfig {
    pub fn from_env() -> Self {
        let base = Self::default();
        let threshold = parse_env_f64("GG_BOT_BUST_THRESHOLD", base.bust_threshold);
        let reserve = parse_env_u32("GG_BOT_SENSE_RESERVE", base.sense_reserve);

        Self {
            bust_threshold: threshold.clamp(0.05, 0.99),
            sense_reserve: reserve.min(8),
        }
    }
}

fn parse_env_f64(key: &str, fallback: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(fallback)
}

fn parse_env_u32(key: &str, fallback: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(fallback)
}

/// Senses at the current posterior peak until the peak is confident enough
/// (or the budget runs dry), then busts it. A missed bust leaves the belief
/// untouched, so the policy remembers its attempts and never guesses the
/// same cell twice in one session.
#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    config: GreedyConfig,
    attempted: Vec<Cell>,
}

impl GreedyPolicy {
    pub fn new(config: GreedyConfig) -> Self {
        Self {
            config,
            attempted: Vec::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(GreedyConfig::from_env())
    }

    /// Best candidate that has not already been busted this session. Falls
    /// back to the global peak when every cell has been attempted.
    fn best_unattempted(&self, ctx: &PolicyContext) -> (Cell, f64) {
        ctx.belief
            .iter()
            .filter(|(cell, _)| !self.attempted.contains(cell))
            .max_by(|a, b| a.1.partial_cmp(&b.1).expect("weights are finite"))
            .unwrap_or_else(|| ctx.belief.peak())
    }
}

impl Default for GreedyPolicy {
    fn default() -> Self {
        Self::new(GreedyConfig::default())
    }
}

impl Policy for GreedyPolicy {
    fn choose(&mut self, ctx: &PolicyContext) -> PlayerAction {
        let summary = BeliefSummary::new(ctx.belief);
        let (peak, peak_probability) = self.best_unattempted(ctx);

        let must_bust = ctx.status.sense_remaining <= self.config.sense_reserve;
        let confident = peak_probability >= self.config.bust_threshold;

        let action = if ctx.status.bust_remaining > 0 && (confident || must_bust) {
            self.attempted.push(peak);
            PlayerAction::Bust(peak)
        } else if ctx.status.sense_remaining > 0 {
            PlayerAction::Sense(peak)
        } else {
            // No senses left and no busts left cannot reach a policy call;
            // the session would already be terminal.
            self.attempted.push(peak);
            PlayerAction::Bust(peak)
        };

        event!(
            Level::DEBUG,
            policy = "greedy",
            peak_x = peak.x,
            peak_y = peak.y,
            peak_probability,
            entropy = summary.entropy(),
            action = ?action,
            "greedy decision"
        );

        action
    }

    fn reset(&mut self) {
        self.attempted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::GreedyPolicy;
    use crate::policy::{PlayerAction, Policy, PolicyContext};
    use ghost_core::game::config::SessionConfig;
    use ghost_core::game::session::GameSession;
    use ghost_core::model::grid::Cell;

    fn context_for(session: &GameSession) -> PolicyContext<'_> {
        PolicyContext {
            grid: session.grid(),
            status: session.status(),
            belief: session.belief(),
            last_observation: session.last_observation(),
        }
    }

    #[test]
    fn senses_the_peak_while_uncertain() {
        let session =
            GameSession::with_target(&SessionConfig::default(), Cell::new(3, 5)).expect("session");
        let mut policy = GreedyPolicy::default();

        match policy.choose(&context_for(&session)) {
            PlayerAction::Sense(_) => {}
            other => panic!("expected a sensing probe, got {other:?}"),
        }
    }

    #[test]
    fn busts_once_the_peak_is_confident() {
        let target = Cell::new(3, 5);
        let mut session =
            GameSession::with_target(&SessionConfig::default(), target).expect("session");
        let mut policy = GreedyPolicy::default();

        // Repeated Exact readings drive the peak well past any threshold.
        for _ in 0..4 {
            session.query(target).expect("query");
        }
        assert!(session.belief().probability(target) > 0.5);

        assert_eq!(
            policy.choose(&context_for(&session)),
            PlayerAction::Bust(target)
        );
    }

    #[test]
    fn busts_the_peak_when_the_budget_runs_out() {
        let mut config = SessionConfig::default();
        config.sense_budget = 1;
        let mut session = GameSession::with_target(&config, Cell::new(0, 0)).expect("session");
        session.query(Cell::new(4, 4)).expect("spend the only sense");

        let mut policy = GreedyPolicy::default();
        match policy.choose(&context_for(&session)) {
            PlayerAction::Bust(_) => {}
            other => panic!("expected a bust with no senses left, got {other:?}"),
        }
    }

    #[test]
    fn never_busts_the_same_cell_twice() {
        let target = Cell::new(3, 5);
        let mut session =
            GameSession::with_target(&SessionConfig::default(), target).expect("session");
        for _ in 0..4 {
            session.query(target).expect("query");
        }

        let mut policy = GreedyPolicy::default();
        let first = policy.choose(&context_for(&session));
        let second = policy.choose(&context_for(&session));

        assert_eq!(first, PlayerAction::Bust(target));
        // With the confident cell spent, the policy goes back to probing or
        // busts elsewhere; it never repeats the same guess.
        match second {
            PlayerAction::Bust(cell) => assert_ne!(cell, target),
            PlayerAction::Sense(_) => {}
        }
    }

    #[test]
    fn env_parsing_falls_back_when_unset() {
        assert_eq!(super::parse_env_f64("GG_BOT_UNSET_FOR_TEST", 0.35), 0.35);
        assert_eq!(super::parse_env_u32("GG_BOT_UNSET_FOR_TEST", 3), 3);
    }
}
