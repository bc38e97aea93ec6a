//! Ten-pin frame scoring state machine
//!
//! Frame scores are recomputed from the full throw history on every roll,
//! so a strike or spare recorded earlier resolves as soon as the throws it
//! depends on arrive. Frames are addressed by explicit frame number.

use crate::error::{ArenaError, Result};
use crate::game::pins::{PinState, PIN_COUNT};
use serde::{Deserialize, Serialize};

/// Frames in a complete game
pub const FRAMES_PER_GAME: u8 = 10;

const ALL_PINS: u8 = PIN_COUNT as u8;

/// Scoring state of a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "score", rename_all = "snake_case")]
pub enum FrameStatus {
    /// Waiting on throws in this frame or on bonus throws after it
    Unresolved,
    Open(u16),
    Spare(u16),
    Strike(u16),
}

/// One frame of a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// 1-based frame number
    pub frame_number: u8,
    pub throws: Vec<u8>,
    pub status: FrameStatus,
}

impl FrameRecord {
    pub fn is_strike(&self) -> bool {
        self.throws.first() == Some(&ALL_PINS)
    }

    pub fn is_spare(&self) -> bool {
        !self.is_strike() && self.throws.len() >= 2 && self.throws[0] + self.throws[1] == ALL_PINS
    }

    pub fn is_open(&self) -> bool {
        !self.is_strike() && self.throws.len() >= 2 && self.throws[0] + self.throws[1] < ALL_PINS
    }

    pub fn is_resolved(&self) -> bool {
        self.status != FrameStatus::Unresolved
    }

    /// The frame's score, once every throw it depends on has happened
    pub fn score(&self) -> Option<u16> {
        match self.status {
            FrameStatus::Unresolved => None,
            FrameStatus::Open(score) | FrameStatus::Spare(score) | FrameStatus::Strike(score) => {
                Some(score)
            }
        }
    }
}

/// Tallies computed once a game is complete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub total_score: u16,
    pub strikes: u8,
    pub spares: u8,
    pub open_frames: u8,
    /// Throws that knocked down nothing
    pub gutter_balls: u8,
}

impl GameSummary {
    fn from_game(frames: &[FrameRecord], rolls: &[u8], total_score: u16) -> Self {
        Self {
            total_score,
            strikes: frames.iter().filter(|f| f.is_strike()).count() as u8,
            spares: frames.iter().filter(|f| f.is_spare()).count() as u8,
            open_frames: frames.iter().filter(|f| f.is_open()).count() as u8,
            gutter_balls: rolls.iter().filter(|r| **r == 0).count() as u8,
        }
    }
}

/// Fold a throw history into frame records
///
/// Strike bonuses take the next two throws in temporal order, wherever they
/// fall; spare bonuses take the next one. Frames waiting on throws that have
/// not happened yet stay [`FrameStatus::Unresolved`].
pub fn score_frames(rolls: &[u8]) -> Vec<FrameRecord> {
    let bonus = |index: usize| rolls.get(index).map(|pins| *pins as u16);
    let mut frames = Vec::with_capacity(FRAMES_PER_GAME as usize);
    let mut index = 0;

    for frame_number in 1..=FRAMES_PER_GAME {
        let Some(&first) = rolls.get(index) else {
            break;
        };

        if frame_number == FRAMES_PER_GAME {
            let throws: Vec<u8> = rolls[index..].iter().take(3).copied().collect();
            let status = final_frame_status(&throws);
            frames.push(FrameRecord {
                frame_number,
                throws,
                status,
            });
            break;
        }

        if first == ALL_PINS {
            let status = match (bonus(index + 1), bonus(index + 2)) {
                (Some(a), Some(b)) => FrameStatus::Strike(10 + a + b),
                _ => FrameStatus::Unresolved,
            };
            frames.push(FrameRecord {
                frame_number,
                throws: vec![first],
                status,
            });
            index += 1;
            continue;
        }

        match rolls.get(index + 1) {
            Some(&second) => {
                let pinfall = first as u16 + second as u16;
                let status = if pinfall == 10 {
                    bonus(index + 2)
                        .map(|b| FrameStatus::Spare(10 + b))
                        .unwrap_or(FrameStatus::Unresolved)
                } else {
                    FrameStatus::Open(pinfall)
                };
                frames.push(FrameRecord {
                    frame_number,
                    throws: vec![first, second],
                    status,
                });
                index += 2;
            }
            None => {
                frames.push(FrameRecord {
                    frame_number,
                    throws: vec![first],
                    status: FrameStatus::Unresolved,
                });
                index += 1;
            }
        }
    }

    frames
}

/// Frame 10 scores its own throws, bonus throws included
fn final_frame_status(throws: &[u8]) -> FrameStatus {
    let total: u16 = throws.iter().map(|t| *t as u16).sum();
    match throws {
        [ALL_PINS, _, _] => FrameStatus::Strike(total),
        [ALL_PINS, ..] => FrameStatus::Unresolved,
        [a, b, _] if a + b == ALL_PINS => FrameStatus::Spare(total),
        [a, b] if a + b == ALL_PINS => FrameStatus::Unresolved,
        [_, _, ..] => FrameStatus::Open(throws[0] as u16 + throws[1] as u16),
        _ => FrameStatus::Unresolved,
    }
}

/// Running totals over the resolved prefix of a game
pub fn cumulative_scores(frames: &[FrameRecord]) -> Vec<u16> {
    frames
        .iter()
        .map_while(|frame| frame.score())
        .scan(0u16, |total, score| {
            *total += score;
            Some(*total)
        })
        .collect()
}

/// One competitor's progress through a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    frame: u8,
    throw_in_frame: u8,
    frame_start: usize,
    pins: PinState,
    rolls: Vec<u8>,
    frames: Vec<FrameRecord>,
    cumulative: Vec<u16>,
    complete: bool,
    summary: Option<GameSummary>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            frame: 1,
            throw_in_frame: 1,
            frame_start: 0,
            pins: PinState::racked(),
            rolls: Vec::new(),
            frames: Vec::new(),
            cumulative: Vec::new(),
            complete: false,
            summary: None,
        }
    }

    /// Replay a list of pin counts into a fresh game
    pub fn from_rolls(rolls: &[u8]) -> Result<Self> {
        let mut game = Self::new();
        for pins in rolls {
            game.record_roll(*pins)?;
        }
        Ok(game)
    }

    pub fn current_frame(&self) -> u8 {
        self.frame
    }

    /// 1-based throw index within the current frame
    pub fn current_throw(&self) -> u8 {
        self.throw_in_frame
    }

    /// `(frame, throw)` of the next throw, or `None` once complete
    pub fn next_throw(&self) -> Option<(u8, u8)> {
        (!self.complete).then_some((self.frame, self.throw_in_frame))
    }

    pub fn pins(&self) -> &PinState {
        &self.pins
    }

    /// Live pin deck handed to the simulator for the next throw
    pub fn pins_mut(&mut self) -> &mut PinState {
        &mut self.pins
    }

    pub fn rolls(&self) -> &[u8] {
        &self.rolls
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn frame(&self, frame_number: u8) -> Option<&FrameRecord> {
        self.frames.iter().find(|f| f.frame_number == frame_number)
    }

    pub fn cumulative_scores(&self) -> &[u16] {
        &self.cumulative
    }

    /// Score over the resolved frames so far
    pub fn running_score(&self) -> u16 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    /// Final score; only defined once the game is complete
    pub fn final_score(&self) -> Result<u16> {
        self.summary
            .as_ref()
            .map(|s| s.total_score)
            .ok_or_else(|| {
                ArenaError::IncompleteMatchState {
                    reason: format!(
                        "game in frame {} throw {} has no final score",
                        self.frame, self.throw_in_frame
                    ),
                }
                .into()
            })
    }

    /// Pins available to the next throw, from the throws already recorded
    pub fn pins_available(&self) -> u8 {
        let throws = &self.rolls[self.frame_start..];
        match throws {
            [] => ALL_PINS,
            [first] if *first == ALL_PINS => ALL_PINS,
            [first] => ALL_PINS - first,
            [ALL_PINS, ALL_PINS] => ALL_PINS,
            [ALL_PINS, second] => ALL_PINS - second,
            // Spare in frame 10
            _ => ALL_PINS,
        }
    }

    /// Record the pins knocked down by one throw and advance the game
    pub fn record_roll(&mut self, pins: u8) -> Result<()> {
        if self.complete {
            return Err(ArenaError::invalid_input("roll recorded after the game is complete").into());
        }

        let available = self.pins_available();
        if pins > available {
            return Err(ArenaError::invalid_input(format!(
                "frame {} throw {}: {} pins knocked down but only {} standing",
                self.frame, self.throw_in_frame, pins, available
            ))
            .into());
        }

        self.rolls.push(pins);
        self.frames = score_frames(&self.rolls);
        self.cumulative = cumulative_scores(&self.frames);
        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        let throws = self.rolls[self.frame_start..].to_vec();

        if self.frame < FRAMES_PER_GAME {
            if throws[0] == ALL_PINS || throws.len() == 2 {
                self.frame += 1;
                self.throw_in_frame = 1;
                self.frame_start = self.rolls.len();
                self.pins.reset();
            } else {
                self.throw_in_frame = 2;
            }
            return;
        }

        match throws[..] {
            [first] => {
                self.throw_in_frame = 2;
                if first == ALL_PINS {
                    self.pins.reset();
                }
            }
            [ALL_PINS, second] => {
                self.throw_in_frame = 3;
                if second == ALL_PINS {
                    self.pins.reset();
                }
            }
            [first, second] if first + second == ALL_PINS => {
                self.throw_in_frame = 3;
                self.pins.reset();
            }
            _ => self.finish(),
        }
    }

    fn finish(&mut self) {
        self.complete = true;
        let total = self.running_score();
        self.summary = Some(GameSummary::from_game(&self.frames, &self.rolls, total));
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::arena_error;

    fn play(rolls: &[u8]) -> GameState {
        GameState::from_rolls(rolls).unwrap()
    }

    #[test]
    fn test_perfect_game() {
        let game = play(&[10; 12]);
        assert!(game.is_complete());
        assert_eq!(game.final_score().unwrap(), 300);
        assert_eq!(
            game.cumulative_scores(),
            &[30, 60, 90, 120, 150, 180, 210, 240, 270, 300]
        );
        let summary = game.summary().unwrap();
        assert_eq!(summary.strikes, 10);
        assert_eq!(summary.spares, 0);
        assert_eq!(summary.open_frames, 0);
    }

    #[test]
    fn test_open_game_sums_pins() {
        let rolls = [3, 4, 0, 9, 1, 1, 8, 0, 2, 2, 5, 4, 7, 1, 0, 0, 6, 3, 4, 4];
        let game = play(&rolls);
        let expected: u16 = rolls.iter().map(|r| *r as u16).sum();

        assert!(game.is_complete());
        assert_eq!(game.rolls().len(), 20);
        assert_eq!(game.final_score().unwrap(), expected);
        let summary = game.summary().unwrap();
        assert_eq!(summary.open_frames, 10);
        assert_eq!(summary.gutter_balls, 4);
    }

    #[test]
    fn test_spare_bonus_pulls_only_next_throw() {
        let mut rolls = vec![10, 7, 3, 9, 0, 10];
        rolls.extend([0; 10]);
        rolls.extend([10, 10, 10]);
        let game = play(&rolls);

        assert!(game.is_complete());
        assert_eq!(game.frame(1).unwrap().status, FrameStatus::Strike(20));
        assert_eq!(game.frame(2).unwrap().status, FrameStatus::Spare(19));
        assert_eq!(game.frame(3).unwrap().status, FrameStatus::Open(9));
        assert_eq!(game.frame(4).unwrap().status, FrameStatus::Strike(10));
        assert_eq!(game.frame(10).unwrap().status, FrameStatus::Strike(30));
        assert_eq!(game.final_score().unwrap(), 88);
    }

    #[test]
    fn test_tenth_frame_spare_takes_one_bonus() {
        let mut rolls = vec![0; 18];
        rolls.extend([6, 4, 7]);
        let game = play(&rolls);

        assert!(game.is_complete());
        assert_eq!(game.frame(10).unwrap().status, FrameStatus::Spare(17));
        assert_eq!(game.final_score().unwrap(), 17);

        // No fourth throw in frame 10
        let mut game = game;
        let err = game.record_roll(0).unwrap_err();
        assert!(matches!(arena_error(&err), Some(ArenaError::InvalidInput { .. })));
    }

    #[test]
    fn test_ninth_frame_strike_chains_into_tenth() {
        let mut rolls = vec![0; 16];
        rolls.extend([10, 10, 10, 5]);
        let game = play(&rolls);

        assert!(game.is_complete());
        assert_eq!(game.frame(9).unwrap().status, FrameStatus::Strike(30));
        assert_eq!(game.frame(10).unwrap().status, FrameStatus::Strike(25));
        assert_eq!(game.final_score().unwrap(), 55);
    }

    #[test]
    fn test_tenth_frame_strike_then_remaining_pins() {
        let mut rolls = vec![0; 16];
        rolls.extend([10, 10, 3]);
        let mut game = play(&rolls);
        assert_eq!(game.current_throw(), 3);
        assert_eq!(game.pins_available(), 7);

        let err = game.record_roll(8).unwrap_err();
        assert!(matches!(arena_error(&err), Some(ArenaError::InvalidInput { .. })));

        game.record_roll(7).unwrap();
        assert_eq!(game.frame(9).unwrap().status, FrameStatus::Strike(23));
        assert_eq!(game.frame(10).unwrap().status, FrameStatus::Strike(20));
        assert_eq!(game.final_score().unwrap(), 43);
    }

    #[test]
    fn test_open_tenth_frame_ends_after_two_throws() {
        let mut rolls = vec![0; 18];
        rolls.extend([4, 5]);
        let game = play(&rolls);
        assert!(game.is_complete());
        assert_eq!(game.frame(10).unwrap().throws.len(), 2);
        assert_eq!(game.final_score().unwrap(), 9);
    }

    #[test]
    fn test_strike_resolves_when_bonus_arrives() {
        let mut game = GameState::new();

        game.record_roll(10).unwrap();
        assert_eq!(game.frame(1).unwrap().score(), None);
        assert!(game.cumulative_scores().is_empty());

        game.record_roll(3).unwrap();
        assert_eq!(game.frame(1).unwrap().score(), None);
        assert_eq!(game.current_frame(), 2);
        assert_eq!(game.current_throw(), 2);

        game.record_roll(4).unwrap();
        assert_eq!(game.frame(1).unwrap().status, FrameStatus::Strike(17));
        assert_eq!(game.frame(2).unwrap().status, FrameStatus::Open(7));
        assert_eq!(game.cumulative_scores(), &[17, 24]);
        assert_eq!(game.running_score(), 24);
    }

    #[test]
    fn test_consecutive_strikes_stay_unresolved() {
        let game = play(&[10, 10]);
        assert_eq!(game.frames().len(), 2);
        assert!(game.frames().iter().all(|f| !f.is_resolved()));
        assert!(game.cumulative_scores().is_empty());
    }

    #[test]
    fn test_rejects_too_many_pins() {
        let mut game = GameState::new();
        assert!(game.record_roll(11).is_err());

        game.record_roll(6).unwrap();
        let err = game.record_roll(5).unwrap_err();
        assert!(matches!(arena_error(&err), Some(ArenaError::InvalidInput { .. })));

        // State is untouched by the rejected roll
        assert_eq!(game.rolls(), &[6]);
        game.record_roll(4).unwrap();
        assert!(game.frame(1).unwrap().is_spare());
    }

    #[test]
    fn test_roll_after_complete_rejected() {
        let mut game = play(&[0; 20]);
        assert!(game.is_complete());
        assert_eq!(game.next_throw(), None);

        let err = game.record_roll(0).unwrap_err();
        assert!(matches!(arena_error(&err), Some(ArenaError::InvalidInput { .. })));
    }

    #[test]
    fn test_final_score_before_complete() {
        let game = play(&[10, 10, 10]);
        let err = game.final_score().unwrap_err();
        assert!(matches!(
            arena_error(&err),
            Some(ArenaError::IncompleteMatchState { .. })
        ));
    }

    #[test]
    fn test_pins_reset_between_frames() {
        let mut game = GameState::new();
        game.pins_mut().knock_down(0).unwrap();
        game.record_roll(1).unwrap();
        // Mid-frame: the fallen pin stays down
        assert_eq!(game.pins().standing_count(), 9);

        game.record_roll(0).unwrap();
        assert_eq!(game.current_frame(), 2);
        assert_eq!(game.pins().standing_count(), 10);
    }

    #[test]
    fn test_score_frames_is_pure_fold() {
        let frames = score_frames(&[9, 1, 10, 2]);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].status, FrameStatus::Spare(20));
        assert_eq!(frames[1].status, FrameStatus::Unresolved);
        assert_eq!(frames[2].status, FrameStatus::Unresolved);
        assert_eq!(cumulative_scores(&frames), vec![20]);
    }
}
