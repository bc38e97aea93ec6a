//! Append-only replay log of a single competitor's game

use crate::game::pins::{PinState, PIN_COUNT};
use crate::game::simulator::PinFall;
use crate::game::throw::ThrowDescriptor;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One throw as it should be shown back to a viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub frame_number: u8,
    pub throw_number: u8,
    pub throw: ThrowDescriptor,
    pub pin_falls: Vec<PinFall>,
    /// Standing flags after the throw resolved
    pub remaining_pins: [bool; PIN_COUNT],
    /// Microseconds since the match started
    pub timestamp_us: u64,
}

/// Replay entries for one game, in the order the throws were made
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    started: Instant,
    frames: Vec<ReplayFrame>,
}

impl ReplayRecorder {
    /// Start recording relative to the match start instant
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            frames: Vec::with_capacity(21),
        }
    }

    pub fn record(
        &mut self,
        frame_number: u8,
        throw_number: u8,
        throw: ThrowDescriptor,
        pin_falls: Vec<PinFall>,
        pins_after: &PinState,
    ) {
        self.frames.push(ReplayFrame {
            frame_number,
            throw_number,
            throw,
            pin_falls,
            remaining_pins: pins_after.as_flags(),
            timestamp_us: u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX),
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<ReplayFrame> {
        self.frames
    }
}
