use ghost_core::game::config::SessionConfig;
use ghost_core::game::session::{BustOutcome, GameSession, SessionError, SessionState};
use ghost_core::model::bearing::BearingClass;
use ghost_core::model::grid::Cell;
use ghost_core::model::proximity::ProximityClass;
use ghost_core::sensor::SensorMode;

fn classic_config(mode: SensorMode) -> SessionConfig {
    SessionConfig {
        sensor_mode: mode,
        ..SessionConfig::default()
    }
}

#[test]
fn exact_reading_then_bust_wins_the_classic_board() {
    let config = classic_config(SensorMode::ProximityOnly);
    let target = Cell::new(3, 5);
    let mut session = GameSession::with_target(&config, target).expect("session");

    let observation = session.query(target).expect("query");
    assert_eq!(observation.proximity, ProximityClass::Exact);

    // After an Exact reading the queried cell must carry the single largest
    // weight in the distribution.
    let (peak, peak_probability) = session.belief().peak();
    assert_eq!(peak, target);
    for (cell, weight) in session.belief().iter() {
        if cell != target {
            assert!(weight < peak_probability);
        }
    }

    assert_eq!(session.bust(target).expect("bust"), BustOutcome::Hit);
    assert_eq!(session.state(), SessionState::Won);
}

#[test]
fn opposite_corner_reads_far_with_a_northwest_bearing() {
    let config = classic_config(SensorMode::ProximityAndBearing);
    let mut session = GameSession::with_target(&config, Cell::new(0, 0)).expect("session");

    let observation = session.query(Cell::new(7, 12)).expect("query");
    assert_eq!(observation.proximity, ProximityClass::Far);
    assert_eq!(observation.bearing, Some(BearingClass::NorthWest));
}

#[test]
fn repeated_queries_keep_sharpening_the_posterior() {
    let config = classic_config(SensorMode::ProximityOnly);
    let target = Cell::new(3, 5);
    let mut session = GameSession::with_target(&config, target).expect("session");

    let mut previous = session.belief().probability(target);
    for _ in 0..3 {
        session.query(target).expect("query");
        let current = session.belief().probability(target);
        assert!(current > previous);
        previous = current;
    }
}

#[test]
fn belief_mass_stays_normalized_across_a_full_session() {
    let config = classic_config(SensorMode::ProximityAndBearing);
    let mut session = GameSession::with_target(&config, Cell::new(6, 2)).expect("session");

    let probes = [
        Cell::new(0, 0),
        Cell::new(7, 12),
        Cell::new(3, 5),
        Cell::new(6, 2),
        Cell::new(6, 2),
        Cell::new(1, 11),
    ];
    for probe in probes {
        session.query(probe).expect("query");
        assert!((session.belief().total_mass() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn extended_sensor_concentrates_mass_faster_than_proximity_alone() {
    let target = Cell::new(5, 9);
    let probe = Cell::new(2, 3);

    let mut plain = GameSession::with_target(&classic_config(SensorMode::ProximityOnly), target)
        .expect("session");
    let mut extended =
        GameSession::with_target(&classic_config(SensorMode::ProximityAndBearing), target)
            .expect("session");

    plain.query(probe).expect("query");
    extended.query(probe).expect("query");

    // The bearing channel rules out most octants, so the extended posterior
    // at the true cell dominates the proximity-only one.
    assert!(extended.belief().probability(target) > plain.belief().probability(target));
}

#[test]
fn won_session_rejects_every_further_action() {
    let config = classic_config(SensorMode::ProximityOnly);
    let target = Cell::new(2, 2);
    let mut session = GameSession::with_target(&config, target).expect("session");

    session.query(Cell::new(1, 1)).expect("query");
    assert_eq!(session.bust(target).expect("bust"), BustOutcome::Hit);

    for cell in [target, Cell::new(0, 0), Cell::new(7, 12)] {
        assert_eq!(session.query(cell), Err(SessionError::Terminal));
        assert_eq!(session.bust(cell), Err(SessionError::Terminal));
    }
}

#[test]
fn two_missed_busts_end_in_a_loss() {
    let config = classic_config(SensorMode::ProximityOnly);
    let mut session = GameSession::with_target(&config, Cell::new(0, 0)).expect("session");

    assert_eq!(session.bust(Cell::new(5, 5)).expect("bust"), BustOutcome::Miss);
    assert_eq!(
        session.bust(Cell::new(6, 6)).expect("bust"),
        BustOutcome::GameOver
    );
    assert_eq!(session.state(), SessionState::Lost);
    assert_eq!(session.bust(Cell::new(0, 0)), Err(SessionError::Terminal));
}
