//! Ball release parameters chosen by a bot for a single throw

use crate::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};

pub const MIN_SPEED: f64 = 12.0;
pub const MAX_SPEED: f64 = 22.0;
pub const MAX_SPIN: f64 = 1.0;
/// Release angle bound in radians
pub const MAX_ANGLE: f64 = 0.25;
/// Lateral offset bound; anything past the gutter line still stays on the lane
pub const LANE_HALF_WIDTH: f64 = 5.0;

/// One ball release
///
/// Values are validated and clamped on construction and never change after.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrowDescriptor {
    lateral_offset: f64,
    speed: f64,
    spin: f64,
    angle: f64,
}

impl ThrowDescriptor {
    /// Build a descriptor, rejecting non-finite values and clamping the rest
    /// into their designed ranges
    pub fn new(lateral_offset: f64, speed: f64, spin: f64, angle: f64) -> Result<Self> {
        for (name, value) in [
            ("lateral_offset", lateral_offset),
            ("speed", speed),
            ("spin", spin),
            ("angle", angle),
        ] {
            if !value.is_finite() {
                return Err(ArenaError::invalid_input(format!(
                    "throw {} must be finite, got {}",
                    name, value
                ))
                .into());
            }
        }

        Ok(Self {
            lateral_offset: lateral_offset.clamp(-LANE_HALF_WIDTH, LANE_HALF_WIDTH),
            speed: speed.clamp(MIN_SPEED, MAX_SPEED),
            spin: spin.clamp(-MAX_SPIN, MAX_SPIN),
            angle: angle.clamp(-MAX_ANGLE, MAX_ANGLE),
        })
    }

    /// A straight ball at the given offset and speed
    pub fn straight(lateral_offset: f64, speed: f64) -> Result<Self> {
        Self::new(lateral_offset, speed, 0.0, 0.0)
    }

    pub fn lateral_offset(&self) -> f64 {
        self.lateral_offset
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn spin(&self) -> f64 {
        self.spin
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Speed mapped onto 0.0 (slowest) ..= 1.0 (fastest)
    pub fn normalized_speed(&self) -> f64 {
        (self.speed - MIN_SPEED) / (MAX_SPEED - MIN_SPEED)
    }
}
