use crate::model::bearing::BearingClass;
use crate::model::proximity::ProximityClass;
use core::fmt;

/// One sensor reading, produced per query and not stored by the core beyond
/// the update it feeds. The bearing channel is present only when the session
/// runs the extended sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub proximity: ProximityClass,
    pub bearing: Option<BearingClass>,
}

impl Observation {
    pub const fn proximity_only(proximity: ProximityClass) -> Self {
        Self {
            proximity,
            bearing: None,
        }
    }

    pub const fn with_bearing(proximity: ProximityClass, bearing: BearingClass) -> Self {
        Self {
            proximity,
            bearing: Some(bearing),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bearing {
            Some(bearing) => write!(f, "{} {}", self.proximity, bearing),
            None => write!(f, "{}", self.proximity),
        }
    }
}
