use crate::model::bearing::BearingClass;
use crate::model::proximity::ProximityClass;

/// Conditional observation probabilities for both sensor channels.
///
/// Each distance band splits its mass between the matching proximity class
/// and the three others: the matching class keeps the dominant share and the
/// complement is spread uniformly over the rest. The extreme bands (`Exact`,
/// `Far`) keep a configurable complement (the noise floor), so even a reading
/// taken on the target's own cell is never fully certain. Mid-range bands are
/// deliberately noisier; those splits are fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    extreme_floor: f64,
}

impl NoiseProfile {
    pub const DEFAULT_EXTREME_FLOOR: f64 = 0.01;
    pub const NEAR_COMPLEMENT: f64 = 0.2;
    pub const MEDIUM_COMPLEMENT: f64 = 0.3;
    pub const BEARING_MATCH: f64 = 0.9;
    pub const BEARING_MISMATCH: f64 = 0.1;

    pub const fn new(extreme_floor: f64) -> Self {
        Self { extreme_floor }
    }

    pub const fn extreme_floor(self) -> f64 {
        self.extreme_floor
    }

    /// Probability of reporting `observed` when the true Manhattan distance
    /// is `distance`.
    pub fn proximity_likelihood(self, observed: ProximityClass, distance: u32) -> f64 {
        let band = ProximityClass::from_distance(distance);
        let complement = match band {
            ProximityClass::Exact | ProximityClass::Far => self.extreme_floor,
            ProximityClass::Near => Self::NEAR_COMPLEMENT,
            ProximityClass::Medium => Self::MEDIUM_COMPLEMENT,
        };

        if observed == band {
            1.0 - complement
        } else {
            complement / (ProximityClass::ALL.len() - 1) as f64
        }
    }

    /// Probability of reporting `observed` when the true octant is `correct`.
    /// Independent of the proximity channel.
    pub fn bearing_likelihood(observed: BearingClass, correct: BearingClass) -> f64 {
        if observed == correct {
            Self::BEARING_MATCH
        } else {
            Self::BEARING_MISMATCH
        }
    }
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EXTREME_FLOOR)
    }
}
