//! Geometric pin-fall simulator
//!
//! Maps a [`ThrowDescriptor`] onto the pins it knocks down. This is a cheap
//! proxy for pin physics: direct hits are decided by the distance between the
//! ball path and each pin, followed by a single pass of secondary pin action.

use crate::error::Result;
use crate::game::pins::{PinState, PIN_LAYOUT};
use crate::game::throw::ThrowDescriptor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A single pin falling as a result of a throw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinFall {
    /// Zero-based pin index into [`PIN_LAYOUT`]
    pub pin_index: usize,
    /// Seconds after impact, used only for replay rendering
    pub delay: f64,
    pub direction: f64,
    /// True when the pin was knocked over by another pin rather than the ball
    pub secondary: bool,
}

/// Tuning constants for the simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Ball entry points further out than this are gutter balls
    pub gutter_offset: f64,
    pub head_hit_radius: f64,
    pub direct_hit_radius: f64,
    /// Base reach of a falling pin; scaled by ball speed
    pub pin_action_radius: f64,
    /// Lateral hook per unit of spin, in radians
    pub spin_hook: f64,
    /// Delay per unit of depth for direct hits
    pub depth_delay: f64,
    /// Fixed delay added to each secondary fall
    pub chain_delay: f64,
    /// Upper bound of the random delay jitter
    pub delay_jitter: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            gutter_offset: 4.0,
            head_hit_radius: 1.4,
            direct_hit_radius: 1.4,
            pin_action_radius: 2.1,
            spin_hook: 0.15,
            depth_delay: 0.05,
            chain_delay: 0.05,
            delay_jitter: 0.1,
        }
    }
}

/// Resolves throws against a pin deck
///
/// Each simulator owns its random source; one simulator serves exactly one
/// competitor's game.
#[derive(Debug)]
pub struct ThrowSimulator {
    config: SimulatorConfig,
    rng: StdRng,
}

impl ThrowSimulator {
    /// Simulator seeded from system entropy
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Simulator with a fixed seed for reproducible runs
    pub fn seeded(config: SimulatorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Resolve one throw, marking newly fallen pins in `pins`
    ///
    /// Returns the falls ordered by delay. Pins already down are never
    /// considered.
    pub fn simulate(&mut self, throw: &ThrowDescriptor, pins: &mut PinState) -> Result<Vec<PinFall>> {
        let mut falls = self.direct_hits(throw, pins);
        let secondary = self.pin_action(throw, pins, &falls);
        falls.extend(secondary);

        for fall in &falls {
            pins.knock_down(fall.pin_index)?;
        }

        falls.sort_by(|a, b| a.delay.total_cmp(&b.delay));
        Ok(falls)
    }

    /// Lateral position of the ball path when it reaches `depth`
    fn path_x(&self, throw: &ThrowDescriptor, depth: f64) -> f64 {
        let heading = throw.angle() + throw.spin() * self.config.spin_hook;
        throw.lateral_offset() + depth * heading.tan()
    }

    fn direct_hits(&mut self, throw: &ThrowDescriptor, pins: &PinState) -> Vec<PinFall> {
        let mut falls = Vec::new();

        if throw.lateral_offset().abs() > self.config.gutter_offset {
            return falls;
        }

        let head = &PIN_LAYOUT[0];
        if pins.is_standing(0)
            && head.distance_to(throw.lateral_offset(), 0.0) < self.config.head_hit_radius
        {
            falls.push(PinFall {
                pin_index: 0,
                delay: 0.0,
                direction: throw.spin(),
                secondary: false,
            });
        }

        for (index, pin) in PIN_LAYOUT.iter().enumerate().skip(1) {
            if !pins.is_standing(index) {
                continue;
            }

            let ball_x = self.path_x(throw, pin.depth());
            if pin.distance_to(ball_x, pin.y) < self.config.direct_hit_radius {
                let delay = pin.depth() * self.config.depth_delay
                    + self.rng.gen::<f64>() * self.config.delay_jitter;
                let direction = throw.spin() + (self.rng.gen::<f64>() - 0.5) * 0.5;
                falls.push(PinFall {
                    pin_index: index,
                    delay,
                    direction,
                    secondary: false,
                });
            }
        }

        falls
    }

    /// One pass of pins knocking over their neighbours
    ///
    /// Only pins hit by the ball can trigger a secondary fall; a pin felled
    /// here does not fell a third pin.
    fn pin_action(
        &mut self,
        throw: &ThrowDescriptor,
        pins: &PinState,
        direct: &[PinFall],
    ) -> Vec<PinFall> {
        let speed_factor = 0.9 + 0.2 * throw.normalized_speed();
        let reach = self.config.pin_action_radius * speed_factor;
        let mut falls = Vec::new();

        for index in pins.standing_pins() {
            if direct.iter().any(|f| f.pin_index == index) {
                continue;
            }

            let pin = &PIN_LAYOUT[index];
            let trigger = direct
                .iter()
                .find(|f| PIN_LAYOUT[f.pin_index].distance_to_pin(pin) < reach);

            if let Some(trigger) = trigger {
                falls.push(PinFall {
                    pin_index: index,
                    delay: trigger.delay
                        + self.config.chain_delay
                        + self.rng.gen::<f64>() * self.config.delay_jitter,
                    direction: trigger.direction,
                    secondary: true,
                });
            }
        }

        falls
    }
}
