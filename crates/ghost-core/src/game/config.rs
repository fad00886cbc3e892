use crate::sensor::{NoiseProfile, SensorMode};
use core::fmt;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRID_WIDTH: u16 = 8;
pub const DEFAULT_GRID_HEIGHT: u16 = 13;
pub const DEFAULT_SENSE_BUDGET: u32 = 20;
pub const DEFAULT_BUST_ATTEMPTS: u32 = 2;

/// Everything a session needs at creation time. Validated before any state
/// is built; a config that passes [`SessionConfig::validate`] can always be
/// turned into a running session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_grid_width")]
    pub grid_width: u16,
    #[serde(default = "default_grid_height")]
    pub grid_height: u16,
    #[serde(default = "default_sense_budget")]
    pub sense_budget: u32,
    #[serde(default = "default_bust_attempts")]
    pub bust_attempts: u32,
    #[serde(default = "default_sensor_mode")]
    pub sensor_mode: SensorMode,
    /// Complement mass at the Exact/Far bands. 0.01 keeps the designed noise
    /// floor; 0.0 reproduces the hard-certainty variant.
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f64,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        if self.sense_budget == 0 && self.bust_attempts == 0 {
            return Err(ConfigError::NoOpeningResources);
        }

        if !self.noise_floor.is_finite() || !(0.0..1.0).contains(&self.noise_floor) {
            return Err(ConfigError::NoiseFloorOutOfRange(self.noise_floor));
        }

        Ok(())
    }

    pub fn noise_profile(&self) -> NoiseProfile {
        NoiseProfile::new(self.noise_floor)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            sense_budget: DEFAULT_SENSE_BUDGET,
            bust_attempts: DEFAULT_BUST_ATTEMPTS,
            sensor_mode: SensorMode::ProximityOnly,
            noise_floor: NoiseProfile::DEFAULT_EXTREME_FLOOR,
        }
    }
}

fn default_grid_width() -> u16 {
    DEFAULT_GRID_WIDTH
}

fn default_grid_height() -> u16 {
    DEFAULT_GRID_HEIGHT
}

fn default_sense_budget() -> u32 {
    DEFAULT_SENSE_BUDGET
}

fn default_bust_attempts() -> u32 {
    DEFAULT_BUST_ATTEMPTS
}

fn default_sensor_mode() -> SensorMode {
    SensorMode::ProximityOnly
}

fn default_noise_floor() -> f64 {
    NoiseProfile::DEFAULT_EXTREME_FLOOR
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    EmptyGrid { width: u16, height: u16 },
    NoOpeningResources,
    NoiseFloorOutOfRange(f64),
    TargetOutsideGrid,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGrid { width, height } => {
                write!(f, "grid {width}x{height} has no cells")
            }
            ConfigError::NoOpeningResources => {
                f.write_str("session must start with at least one sense or bust")
            }
            ConfigError::NoiseFloorOutOfRange(value) => {
                write!(f, "noise floor {value} is outside [0, 1)")
            }
            ConfigError::TargetOutsideGrid => f.write_str("target cell lies outside the grid"),
        }
    }
}

impl std::error::Error for ConfigError {}
