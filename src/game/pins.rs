//! Pin deck layout and per-frame standing state

use crate::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};

/// Number of pins racked at the start of a frame
pub const PIN_COUNT: usize = 10;

/// Fixed position of a pin on the deck, in lane units
///
/// `x` is lateral (negative = left), `y` is depth measured from the head pin
/// (more negative = further back).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinPosition {
    pub x: f64,
    pub y: f64,
}

impl PinPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }

    pub fn distance_to_pin(&self, other: &PinPosition) -> f64 {
        self.distance_to(other.x, other.y)
    }

    /// Distance behind the head pin (always non-negative)
    pub fn depth(&self) -> f64 {
        -self.y
    }
}

/// Head pin plus four triangular rows
pub const PIN_LAYOUT: [PinPosition; PIN_COUNT] = [
    PinPosition::new(0.0, 0.0),
    PinPosition::new(-1.0, -2.6),
    PinPosition::new(1.0, -2.6),
    PinPosition::new(-2.0, -5.2),
    PinPosition::new(0.0, -5.2),
    PinPosition::new(2.0, -5.2),
    PinPosition::new(-3.0, -7.8),
    PinPosition::new(-1.0, -7.8),
    PinPosition::new(1.0, -7.8),
    PinPosition::new(3.0, -7.8),
];

/// Which pins are still standing in the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinState {
    standing: [bool; PIN_COUNT],
}

impl PinState {
    /// A freshly racked deck
    pub fn racked() -> Self {
        Self {
            standing: [true; PIN_COUNT],
        }
    }

    pub fn is_standing(&self, pin: usize) -> bool {
        self.standing.get(pin).copied().unwrap_or(false)
    }

    /// Mark a standing pin as fallen
    ///
    /// Pins only ever go from standing to fallen within a frame, so asking
    /// for a pin that is already down is rejected.
    pub fn knock_down(&mut self, pin: usize) -> Result<()> {
        match self.standing.get_mut(pin) {
            Some(slot) if *slot => {
                *slot = false;
                Ok(())
            }
            Some(_) => Err(ArenaError::invalid_input(format!("pin {} already fallen", pin + 1)).into()),
            None => Err(ArenaError::invalid_input(format!("no pin at index {}", pin)).into()),
        }
    }

    /// Re-rack all ten pins
    pub fn reset(&mut self) {
        self.standing = [true; PIN_COUNT];
    }

    pub fn standing_count(&self) -> usize {
        self.standing.iter().filter(|s| **s).count()
    }

    pub fn fallen_count(&self) -> usize {
        PIN_COUNT - self.standing_count()
    }

    pub fn standing_pins(&self) -> impl Iterator<Item = usize> + '_ {
        self.standing
            .iter()
            .enumerate()
            .filter(|(_, standing)| **standing)
            .map(|(pin, _)| pin)
    }

    pub fn as_flags(&self) -> [bool; PIN_COUNT] {
        self.standing
    }
}

impl Default for PinState {
    fn default() -> Self {
        Self::racked()
    }
}
