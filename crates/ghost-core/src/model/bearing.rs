use core::fmt;

/// Compass octant from a queried cell toward the target, 45 degrees wide and
/// centered on the eight principal directions. East spans
/// `[337.5, 360) ∪ [0, 22.5)` so every boundary sits on an odd multiple of
/// 22.5 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BearingClass {
    East = 0,
    NorthEast = 1,
    North = 2,
    NorthWest = 3,
    West = 4,
    SouthWest = 5,
    South = 6,
    SouthEast = 7,
}

impl BearingClass {
    pub const ALL: [BearingClass; 8] = [
        BearingClass::East,
        BearingClass::NorthEast,
        BearingClass::North,
        BearingClass::NorthWest,
        BearingClass::West,
        BearingClass::SouthWest,
        BearingClass::South,
        BearingClass::SouthEast,
    ];

    /// Octant for a displacement of `dx` cells east and `dy` cells north.
    /// A zero displacement has no angle; `atan2(0, 0)` is `0`, which lands in
    /// East, and that fixed resolution is part of the sensor contract.
    pub fn from_deltas(dx: i32, dy: i32) -> Self {
        let degrees = (dy as f64).atan2(dx as f64).to_degrees().rem_euclid(360.0);
        Self::from_degrees(degrees)
    }

    fn from_degrees(degrees: f64) -> Self {
        if !(22.5..337.5).contains(&degrees) {
            BearingClass::East
        } else if degrees < 67.5 {
            BearingClass::NorthEast
        } else if degrees < 112.5 {
            BearingClass::North
        } else if degrees < 157.5 {
            BearingClass::NorthWest
        } else if degrees < 202.5 {
            BearingClass::West
        } else if degrees < 247.5 {
            BearingClass::SouthWest
        } else if degrees < 292.5 {
            BearingClass::South
        } else {
            BearingClass::SouthEast
        }
    }

    /// Arrow glyph the presentation layer draws for this octant.
    pub const fn arrow(self) -> &'static str {
        match self {
            BearingClass::East => "→",
            BearingClass::NorthEast => "↗",
            BearingClass::North => "↑",
            BearingClass::NorthWest => "↖",
            BearingClass::West => "←",
            BearingClass::SouthWest => "↙",
            BearingClass::South => "↓",
            BearingClass::SouthEast => "↘",
        }
    }
}

impl fmt::Display for BearingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BearingClass::East => "E",
            BearingClass::NorthEast => "NE",
            BearingClass::North => "N",
            BearingClass::NorthWest => "NW",
            BearingClass::West => "W",
            BearingClass::SouthWest => "SW",
            BearingClass::South => "S",
            BearingClass::SouthEast => "SE",
        };
        f.write_str(label)
    }
}
