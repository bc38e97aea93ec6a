//! Integration tests for the pinfall arena
//!
//! These tests validate the entire system working together, including:
//! - Full matches in both execution modes
//! - Rating and lifetime counter updates after a match
//! - Event publishing through the publisher seam
//! - Error handling for unknown and duplicate competitors

mod fixtures;

use pinfall::error::{arena_error, ArenaError};
use pinfall::runner::ExecutionMode;
use pinfall::strategy::{BotStrategy, FixedThrowProvider, RandomStrategyProvider};
use pinfall::types::MatchStatus;
use std::sync::Arc;

use fixtures::{create_ace_arena, create_test_arena, six_pin_throw};

#[tokio::test]
async fn test_complete_match_workflow() {
    for mode in [ExecutionMode::Sequential, ExecutionMode::Concurrent] {
        let test = create_ace_arena(mode);
        let arena = &test.arena;

        // Step 1: Register both bots
        arena.register_competitor("ace", "Ace").unwrap();
        arena.register_competitor("rookie", "Rookie").unwrap();

        // Step 2: Both join the queue
        let first = arena.queue_competitor("ace", None).await.unwrap();
        let second = arena.queue_competitor("rookie", None).await.unwrap();
        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);
        assert_eq!(test.events.count_events_of_type("CompetitorQueued"), 2);

        // Step 3: Pair and play
        let result = arena.try_match("ace").await.unwrap().unwrap();
        assert_eq!(result.status, MatchStatus::Completed);
        assert_eq!(result.competitor_a.final_score, 300);
        assert_eq!(result.competitor_b.final_score, 0);
        assert_eq!(result.rating_update.delta_a, 16);
        assert_eq!(result.rating_update.delta_b, -16);

        // Step 4: Results committed
        let ace = arena.get_competitor("ace").unwrap();
        let rookie = arena.get_competitor("rookie").unwrap();
        assert_eq!(ace.rating, 1216);
        assert_eq!(rookie.rating, 1184);
        assert_eq!(ace.stats.matches_played, 1);
        assert_eq!(ace.stats.high_score, 300);
        assert_eq!(ace.stats.average_score, 300.0);
        assert_eq!(rookie.stats.losses, 1);

        // Step 5: Queue drained, events published
        assert_eq!(test.queue.size().unwrap(), 0);
        assert_eq!(test.events.count_events_of_type("MatchFound"), 1);
        assert_eq!(test.events.count_events_of_type("MatchCompleted"), 1);

        println!("✅ Complete match workflow passed ({})", mode);
    }
}

#[tokio::test]
async fn test_frame_scores_and_replay_are_consistent() {
    let test = create_test_arena(
        Arc::new(FixedThrowProvider::new(six_pin_throw())),
        ExecutionMode::Sequential,
    );
    let arena = &test.arena;
    arena.register_competitor("a", "A").unwrap();
    arena.register_competitor("b", "B").unwrap();
    arena.queue_competitor("a", None).await.unwrap();
    arena.queue_competitor("b", None).await.unwrap();

    let result = arena.try_match("b").await.unwrap().unwrap();

    for game in [&result.competitor_a, &result.competitor_b] {
        assert_eq!(game.frames.len(), 10);
        assert_eq!(game.cumulative_scores.len(), 10);
        assert_eq!(game.cumulative_scores.last().copied(), Some(game.final_score));
        assert!(game.cumulative_scores.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(game.summary.open_frames, 10);
        assert_eq!(game.replay.len(), 20);

        let knocked: usize = game.replay.iter().map(|r| r.pin_falls.len()).sum();
        assert_eq!(knocked as u16, game.final_score);
    }

    assert!(result.is_draw());
    println!("✅ Frame scores and replay consistency passed");
}

#[tokio::test]
async fn test_random_league_is_reproducible() {
    async fn play_league(seed: u64) -> Vec<(String, i32)> {
        let strategies = Arc::new(RandomStrategyProvider::seeded(seed));
        let test = create_test_arena(strategies.clone(), ExecutionMode::Sequential);
        for (i, strategy) in BotStrategy::ALL.iter().enumerate() {
            let id = format!("bot-{}", i);
            test.arena.register_competitor(&id, &id).unwrap();
            strategies.assign(&id, *strategy).unwrap();
        }

        for _ in 0..5 {
            test.arena.queue_idle_competitors().await.unwrap();
            test.arena.run_matchmaking_round().await.unwrap();
        }

        test.arena
            .leaderboard()
            .unwrap()
            .into_iter()
            .map(|c| (c.id, c.rating))
            .collect()
    }

    let first = play_league(77).await;
    let second = play_league(77).await;
    assert_eq!(first, second);

    let total: i32 = first.iter().map(|(_, rating)| rating).sum();
    assert_eq!(total, 4 * 1200);
    println!("✅ Reproducible league passed");
}

#[tokio::test]
async fn test_queue_errors() {
    let test = create_ace_arena(ExecutionMode::Sequential);
    let arena = &test.arena;
    arena.register_competitor("ace", "Ace").unwrap();

    let err = arena.queue_competitor("ghost", None).await.unwrap_err();
    assert!(matches!(
        arena_error(&err),
        Some(ArenaError::CompetitorNotFound { .. })
    ));

    arena.queue_competitor("ace", Some(40)).await.unwrap();
    let err = arena.queue_competitor("ace", Some(400)).await.unwrap_err();
    assert!(matches!(
        arena_error(&err),
        Some(ArenaError::QueueConflict { .. })
    ));

    // The original entry is untouched
    let entries = test.queue.waiting_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].tolerance, 40);
    assert_eq!(test.events.count_events_of_type("CompetitorQueued"), 1);

    // Alone in the queue: nobody to play
    assert!(arena.try_match("ace").await.unwrap().is_none());
    assert_eq!(test.queue.size().unwrap(), 1);

    println!("✅ Queue error handling passed");
}

#[tokio::test]
async fn test_match_completed_event_payload() {
    let test = create_ace_arena(ExecutionMode::Concurrent);
    let arena = &test.arena;
    arena.register_competitor("ace", "Ace").unwrap();
    arena.register_competitor("rookie", "Rookie").unwrap();
    arena.queue_competitor("rookie", None).await.unwrap();
    arena.queue_competitor("ace", None).await.unwrap();

    let result = arena.try_match("rookie").await.unwrap().unwrap();

    let completed = test
        .events
        .get_published_events()
        .into_iter()
        .find_map(|event| match event {
            pinfall::events::ArenaEvent::MatchCompleted(completed) => Some(completed),
            _ => None,
        })
        .unwrap();

    assert_eq!(completed.match_id, result.match_id);
    assert_eq!(completed.winner.as_deref(), Some("ace"));
    let rookie = completed
        .settlements
        .iter()
        .find(|s| s.competitor_id == "rookie")
        .unwrap();
    assert_eq!(rookie.delta(), -16);
    assert_eq!(rookie.final_score, 0);

    println!("✅ MatchCompleted payload passed");
}

#[tokio::test]
async fn test_runner_uses_injected_rating_calculator() {
    use pinfall::rating::FixedDeltaCalculator;
    use pinfall::runner::MatchRunner;
    use pinfall::types::Competitor;

    let strategy = FixedThrowProvider::new(fixtures::gutter_throw())
        .with_throw("ace", fixtures::strike_throw());
    let runner = MatchRunner::new(Arc::new(strategy), Arc::new(FixedDeltaCalculator::new(25)));

    let ace = Competitor::with_rating("ace", "Ace", 1500);
    let rookie = Competitor::with_rating("rookie", "Rookie", 900);
    let result = runner.run_match(&rookie, &ace).await.unwrap();

    assert_eq!(result.winner.as_deref(), Some("ace"));
    assert_eq!(result.settlement_for("ace"), Some((pinfall::types::MatchOutcome::Win, 1525)));
    assert_eq!(
        result.settlement_for("rookie"),
        Some((pinfall::types::MatchOutcome::Loss, 875))
    );

    println!("✅ Injected rating calculator passed");
}
