use crate::belief::{BeliefError, BeliefState};
use crate::game::config::{ConfigError, SessionConfig};
use crate::model::grid::{Cell, Grid};
use crate::model::observation::Observation;
use crate::sensor::SensorModel;
use core::fmt;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Won,
    Lost,
}

/// Result of a single bust attempt. `GameOver` is a miss that spent the last
/// attempt and ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BustOutcome {
    Hit,
    Miss,
    GameOver,
}

/// What the presentation layer is currently allowed to draw over the grid.
/// Session-local display state only; resets to `Hidden` after every sensing
/// query so results are revealed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    Hidden,
    Probabilities,
    Directions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub sense_remaining: u32,
    pub bust_remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionError {
    OutOfBounds(Cell),
    Terminal,
    SenseExhausted,
    BustExhausted,
    Belief(BeliefError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::OutOfBounds(cell) => write!(f, "cell {cell} is outside the grid"),
            SessionError::Terminal => f.write_str("session is already over"),
            SessionError::SenseExhausted => f.write_str("no sensing budget remaining"),
            SessionError::BustExhausted => f.write_str("no bust attempts remaining"),
            SessionError::Belief(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Belief(err) => Some(err),
            _ => None,
        }
    }
}

/// One game of ghost hunting. Owns the only mutable state in the core: the
/// belief distribution, the resource counters, and the terminal flag. Every
/// player action is a single synchronous transition.
#[derive(Debug, Clone)]
pub struct GameSession {
    grid: Grid,
    target: Cell,
    sensor: SensorModel,
    belief: BeliefState,
    state: SessionState,
    sense_remaining: u32,
    bust_remaining: u32,
    reveal: RevealMode,
    last_observation: Option<Observation>,
    seed: u64,
}

impl GameSession {
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::random())
    }

    /// Deterministic construction: the seed fixes the target placement.
    pub fn with_seed(config: &SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let target = Cell::new(
            rng.gen_range(0..config.grid_width),
            rng.gen_range(0..config.grid_height),
        );
        Self::build(config, target, seed)
    }

    /// Scripted construction for drills and tests; the target is supplied
    /// instead of sampled.
    pub fn with_target(config: &SessionConfig, target: Cell) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.grid_width, config.grid_height);
        if !grid.contains(target) {
            return Err(ConfigError::TargetOutsideGrid);
        }
        Self::build(config, target, 0)
    }

    fn build(config: &SessionConfig, target: Cell, seed: u64) -> Result<Self, ConfigError> {
        let grid = Grid::new(config.grid_width, config.grid_height);
        Ok(Self {
            grid,
            target,
            sensor: SensorModel::new(config.sensor_mode, config.noise_profile()),
            belief: BeliefState::uniform(grid),
            state: SessionState::Active,
            sense_remaining: config.sense_budget,
            bust_remaining: config.bust_attempts,
            reveal: RevealMode::Hidden,
            last_observation: None,
            seed,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sensor(&self) -> &SensorModel {
        &self.sensor
    }

    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state != SessionState::Active
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            sense_remaining: self.sense_remaining,
            bust_remaining: self.bust_remaining,
        }
    }

    pub fn last_observation(&self) -> Option<Observation> {
        self.last_observation
    }

    pub fn reveal(&self) -> RevealMode {
        self.reveal
    }

    pub fn set_reveal(&mut self, mode: RevealMode) {
        self.reveal = mode;
    }

    /// Sense at `cell`: generate an observation against the hidden target,
    /// fold it into the belief, and spend one unit of budget.
    pub fn query(&mut self, cell: Cell) -> Result<Observation, SessionError> {
        if !self.grid.contains(cell) {
            return Err(SessionError::OutOfBounds(cell));
        }
        if self.is_terminal() {
            return Err(SessionError::Terminal);
        }
        if self.sense_remaining == 0 {
            return Err(SessionError::SenseExhausted);
        }

        let observation = self.sensor.observe(cell, self.target);
        self.belief
            .update(observation, cell, &self.sensor)
            .map_err(SessionError::Belief)?;

        self.sense_remaining -= 1;
        self.reveal = RevealMode::Hidden;
        self.last_observation = Some(observation);

        if self.sense_remaining == 0 && self.bust_remaining == 0 {
            self.state = SessionState::Lost;
        }

        Ok(observation)
    }

    /// Direct guess at the target's cell. A hit wins immediately and zeroes
    /// the remaining attempts; spending the last attempt on a miss loses.
    pub fn bust(&mut self, cell: Cell) -> Result<BustOutcome, SessionError> {
        if !self.grid.contains(cell) {
            return Err(SessionError::OutOfBounds(cell));
        }
        if self.is_terminal() {
            return Err(SessionError::Terminal);
        }
        if self.bust_remaining == 0 {
            return Err(SessionError::BustExhausted);
        }

        if cell == self.target {
            self.bust_remaining = 0;
            self.state = SessionState::Won;
            return Ok(BustOutcome::Hit);
        }

        self.bust_remaining -= 1;
        if self.bust_remaining == 0 {
            self.state = SessionState::Lost;
            return Ok(BustOutcome::GameOver);
        }
        Ok(BustOutcome::Miss)
    }
}

#[cfg(test)]
mod tests {
    use super::{BustOutcome, GameSession, RevealMode, SessionError, SessionState};
    use crate::game::config::SessionConfig;
    use crate::model::grid::Cell;
    use crate::model::proximity::ProximityClass;

    fn session_with_target(target: Cell) -> GameSession {
        GameSession::with_target(&SessionConfig::default(), target).expect("valid session")
    }

    #[test]
    fn busting_the_target_wins_and_seals_the_session() {
        let target = Cell::new(3, 5);
        let mut session = session_with_target(target);

        assert_eq!(session.bust(target).expect("bust"), BustOutcome::Hit);
        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(session.status().bust_remaining, 0);

        assert_eq!(session.bust(target), Err(SessionError::Terminal));
        assert_eq!(session.query(target), Err(SessionError::Terminal));
    }

    #[test]
    fn last_missed_bust_loses_immediately() {
        let mut config = SessionConfig::default();
        config.bust_attempts = 1;
        let mut session = GameSession::with_target(&config, Cell::new(0, 0)).expect("session");

        let outcome = session.bust(Cell::new(7, 7)).expect("bust resolves");
        assert_eq!(outcome, BustOutcome::GameOver);
        assert_eq!(session.state(), SessionState::Lost);
    }

    #[test]
    fn missed_bust_with_attempts_left_stays_active() {
        let mut session = session_with_target(Cell::new(0, 0));
        assert_eq!(session.bust(Cell::new(1, 1)).expect("bust"), BustOutcome::Miss);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.status().bust_remaining, 1);
    }

    #[test]
    fn query_spends_budget_and_hides_the_reveal() {
        let mut session = session_with_target(Cell::new(3, 5));
        session.set_reveal(RevealMode::Probabilities);

        let observation = session.query(Cell::new(3, 5)).expect("query");
        assert_eq!(observation.proximity, ProximityClass::Exact);
        assert_eq!(session.status().sense_remaining, 19);
        assert_eq!(session.reveal(), RevealMode::Hidden);
        assert_eq!(session.last_observation(), Some(observation));
    }

    #[test]
    fn exhausting_senses_with_no_busts_left_loses() {
        let mut config = SessionConfig::default();
        config.sense_budget = 2;
        config.bust_attempts = 0;
        let mut session = GameSession::with_target(&config, Cell::new(0, 0)).expect("session");

        session.query(Cell::new(1, 1)).expect("first query");
        assert_eq!(session.state(), SessionState::Active);
        session.query(Cell::new(2, 2)).expect("second query");
        assert_eq!(session.state(), SessionState::Lost);
    }

    #[test]
    fn exhausted_sense_budget_rejects_queries_but_allows_busting() {
        let mut config = SessionConfig::default();
        config.sense_budget = 1;
        let target = Cell::new(4, 4);
        let mut session = GameSession::with_target(&config, target).expect("session");

        session.query(Cell::new(4, 4)).expect("only query");
        assert_eq!(session.query(Cell::new(4, 4)), Err(SessionError::SenseExhausted));
        assert_eq!(session.bust(target).expect("bust"), BustOutcome::Hit);
    }

    #[test]
    fn out_of_grid_actions_are_rejected_without_spending() {
        let mut session = session_with_target(Cell::new(0, 0));
        let outside = Cell::new(8, 0);

        assert_eq!(session.query(outside), Err(SessionError::OutOfBounds(outside)));
        assert_eq!(session.bust(outside), Err(SessionError::OutOfBounds(outside)));
        assert_eq!(session.status().sense_remaining, 20);
        assert_eq!(session.status().bust_remaining, 2);
    }

    #[test]
    fn same_seed_reproduces_the_same_observation_stream() {
        let config = SessionConfig::default();
        let mut a = GameSession::with_seed(&config, 99).expect("session");
        let mut b = GameSession::with_seed(&config, 99).expect("session");
        assert_eq!(a.seed(), 99);

        for probe in [Cell::new(0, 0), Cell::new(7, 12), Cell::new(4, 6)] {
            let from_a = a.query(probe).expect("query a");
            let from_b = b.query(probe).expect("query b");
            assert_eq!(from_a, from_b);
        }
    }
}
