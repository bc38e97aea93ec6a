//! Property tests for frame scoring and rating updates

use pinfall::game::{FrameStatus, GameState};
use pinfall::rating::calculate_rating_update;
use pinfall::types::MatchOutcome;
use proptest::prelude::*;

/// Play a game from raw throw attempts, clamping each to the pins standing
fn play(attempts: &[u8]) -> GameState {
    let mut game = GameState::new();
    for attempt in attempts {
        if game.is_complete() {
            break;
        }
        let pins = (*attempt).min(game.pins_available());
        game.record_roll(pins).unwrap();
    }
    game
}

fn open_frame() -> impl Strategy<Value = (u8, u8)> {
    (0u8..=9).prop_flat_map(|first| (Just(first), 0u8..=(9 - first)))
}

proptest! {
    #[test]
    fn open_game_scores_sum_of_pins(frames in prop::collection::vec(open_frame(), 10)) {
        let rolls: Vec<u8> = frames.iter().flat_map(|(a, b)| [*a, *b]).collect();
        let game = GameState::from_rolls(&rolls).unwrap();

        let expected: u16 = rolls.iter().map(|r| *r as u16).sum();
        prop_assert!(game.is_complete());
        prop_assert_eq!(game.final_score().unwrap(), expected);
        prop_assert_eq!(game.summary().unwrap().open_frames, 10);
    }

    #[test]
    fn complete_games_are_consistent(attempts in prop::collection::vec(0u8..=10, 21)) {
        let mut game = play(&attempts);
        prop_assert!(game.is_complete());

        let final_score = game.final_score().unwrap();
        let cumulative = game.cumulative_scores();
        prop_assert!(final_score <= 300);
        prop_assert_eq!(cumulative.len(), 10);
        prop_assert_eq!(cumulative.last().copied(), Some(final_score));
        prop_assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(game.record_roll(0).is_err());
    }

    #[test]
    fn partial_games_only_total_resolved_frames(
        attempts in prop::collection::vec(0u8..=10, 21),
        cut in 0usize..21,
    ) {
        let game = play(&attempts[..cut]);
        let resolved = game.frames().iter().filter(|f| f.is_resolved()).count();
        let cumulative = game.cumulative_scores();

        prop_assert!(cumulative.len() <= resolved);
        prop_assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));
        if !game.is_complete() {
            prop_assert!(game.final_score().is_err());
        }
    }

    #[test]
    fn tenth_frame_spare_scores_its_bonus(first in 0u8..=9, bonus in 0u8..=10) {
        let mut rolls = vec![0u8; 18];
        rolls.extend([first, 10 - first, bonus]);
        let game = GameState::from_rolls(&rolls).unwrap();

        let tenth = game.frame(10).unwrap();
        prop_assert_eq!(tenth.status, FrameStatus::Spare(10 + bonus as u16));
        prop_assert_eq!(game.final_score().unwrap(), 10 + bonus as u16);
    }

    #[test]
    fn decisive_results_move_ratings_apart(
        rating_a in 100i32..3000,
        rating_b in 100i32..3000,
        score_a in 0u16..=300,
        score_b in 0u16..=300,
    ) {
        let update = calculate_rating_update(rating_a, rating_b, score_a, score_b, 32.0).unwrap();
        let swapped = calculate_rating_update(rating_b, rating_a, score_b, score_a, 32.0).unwrap();

        match update.outcome_a {
            MatchOutcome::Win => prop_assert!(update.delta_a >= 0 && update.delta_b <= 0),
            MatchOutcome::Loss => prop_assert!(update.delta_a <= 0 && update.delta_b >= 0),
            MatchOutcome::Draw => {}
        }
        prop_assert!((update.delta_a + update.delta_b).abs() <= 1);
        prop_assert!((update.delta_a - swapped.delta_b).abs() <= 1);
        prop_assert!((update.delta_b - swapped.delta_a).abs() <= 1);
        prop_assert_eq!(update.new_rating_a, rating_a + update.delta_a);
    }
}

#[test]
fn mixed_game_scores_bonuses_in_throw_order() {
    // X, 7/3, 9-0, X, then gutters up to a perfect tenth
    let mut rolls = vec![10, 7, 3, 9, 0, 10];
    rolls.extend([0u8; 10]);
    rolls.extend([10, 10, 10]);
    let game = GameState::from_rolls(&rolls).unwrap();

    assert_eq!(game.frame(1).unwrap().status, FrameStatus::Strike(20));
    assert_eq!(game.frame(2).unwrap().status, FrameStatus::Spare(19));
    assert_eq!(game.frame(3).unwrap().status, FrameStatus::Open(9));
    assert_eq!(game.frame(4).unwrap().status, FrameStatus::Strike(10));
    assert_eq!(game.frame(10).unwrap().status, FrameStatus::Strike(30));
    assert_eq!(game.cumulative_scores()[3], 58);
    assert_eq!(game.final_score().unwrap(), 88);
}

#[test]
fn equal_ratings_draw_is_zero_sum() {
    let update = calculate_rating_update(1200, 1200, 150, 150, 32.0).unwrap();
    assert_eq!(update.outcome_a, MatchOutcome::Draw);
    assert_eq!(update.delta_a, 0);
    assert_eq!(update.delta_b, 0);
}
