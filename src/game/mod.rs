//! Bowling game engine
//!
//! This module holds the pin deck, the throw simulator that decides which
//! pins fall, the frame scoring state machine and the replay log.

pub mod pins;
pub mod replay;
pub mod scoring;
pub mod simulator;
pub mod throw;

// Re-export commonly used types
pub use pins::{PinPosition, PinState, PIN_COUNT, PIN_LAYOUT};
pub use replay::{ReplayFrame, ReplayRecorder};
pub use scoring::{
    cumulative_scores, score_frames, FrameRecord, FrameStatus, GameState, GameSummary,
    FRAMES_PER_GAME,
};
pub use simulator::{PinFall, SimulatorConfig, ThrowSimulator};
pub use throw::ThrowDescriptor;
