//! Full matches driven through the public `ArenaGame` surface.

use sumo_battle::bot::generate_bot_input;
use sumo_battle::round::MatchPhase;
use sumo_battle::{BattleState, SumoBattle};
use sumo_core::events::{GameEvent, RoundEndReason};
use sumo_core::game_trait::{ArenaGame, PlayerId, PlayerInputs};
use sumo_core::test_helpers::{default_config, make_players};

const DT: f32 = 1.0 / 60.0;

fn decode(game: &SumoBattle) -> BattleState {
    rmp_serde::from_slice(&game.serialize_state()).unwrap()
}

/// Drop `player_id` below the fall threshold through a state snapshot.
fn shove_off(game: &mut SumoBattle, player_id: PlayerId) {
    let mut state = decode(game);
    let fighter = state
        .fighters
        .iter_mut()
        .find(|f| f.id == player_id)
        .unwrap();
    fighter.position.y = state.arena.fall_threshold - 5.0;
    game.apply_state(&rmp_serde::to_vec(&state).unwrap());
}

fn step_until(game: &mut SumoBattle, phase: MatchPhase, events: &mut Vec<GameEvent>) {
    for _ in 0..2000 {
        if game.phase() == phase {
            return;
        }
        events.extend(game.update(0.1, &PlayerInputs::default()));
    }
    panic!("never reached {phase:?}");
}

#[test]
fn two_round_match_reaches_match_end() {
    let mut game = SumoBattle::default();
    game.init(&make_players(2), &default_config(2));
    let mut events = Vec::new();

    for round in 1..=2u32 {
        step_until(&mut game, MatchPhase::Active, &mut events);
        shove_off(&mut game, 2);
        events.extend(game.update(DT, &PlayerInputs::default()));
        assert!(game.is_round_complete());
        assert!(events.contains(&GameEvent::RoundEnded {
            round,
            reason: RoundEndReason::LastStanding,
            winner: Some(1),
        }));
        if round == 1 {
            step_until(&mut game, MatchPhase::Countdown, &mut events);
        }
    }
    step_until(&mut game, MatchPhase::MatchEnded, &mut events);

    assert!(game.is_match_complete());
    assert_eq!(events.last(), Some(&GameEvent::MatchEnded { winner: 1 }));
    let arenas: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::CountdownStarted { arena, .. } => Some(arena.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(arenas, ["classic", "volcano"]);

    let eliminations = events
        .iter()
        .filter(|e| matches!(e, GameEvent::PlayerEliminated { player_id: 2, .. }))
        .count();
    assert_eq!(eliminations, 2);
    assert_eq!(decode(&game).round.match_winner, Some(1));
}

#[test]
fn timeout_round_awards_nobody() {
    let mut config = default_config(3);
    config.round_duration = std::time::Duration::from_secs(5);
    let mut game = SumoBattle::default();
    game.init(&make_players(3), &config);

    let mut events = Vec::new();
    step_until(&mut game, MatchPhase::RoundEnding, &mut events);
    assert!(events.contains(&GameEvent::RoundEnded {
        round: 1,
        reason: RoundEndReason::Timeout,
        winner: None,
    }));
    assert!(decode(&game).fighters.iter().all(|f| f.round_wins == 0));
}

#[test]
fn bot_match_keeps_invariants() {
    let mut game = SumoBattle::default();
    game.init(&make_players(4), &default_config(2));
    let max_damage = game.config().combat.max_damage;
    let mut last_wins = vec![0u32; 4];

    for _ in 0..20_000 {
        let mut inputs = PlayerInputs::default();
        for id in 1..=4 {
            inputs.press(id, generate_bot_input(game.state(), id));
        }
        game.update(DT, &inputs);

        let state = game.state();
        let alive = state.fighters.iter().filter(|f| f.alive).count() as u32;
        assert_eq!(alive, state.alive_count);
        for (f, last) in state.fighters.iter().zip(last_wins.iter_mut()) {
            assert!(f.position.is_finite() && f.velocity.is_finite());
            assert!((0.0..=max_damage).contains(&f.damage));
            assert!(f.round_wins >= *last, "round wins went backwards");
            *last = f.round_wins;
        }
        if game.is_match_complete() {
            break;
        }
    }
    assert!(decode(&game).round.current_round >= 1);
}

#[test]
fn paused_battle_holds_still() {
    let mut game = SumoBattle::default();
    game.init(&make_players(2), &default_config(3));
    let mut events = Vec::new();
    step_until(&mut game, MatchPhase::Active, &mut events);

    game.pause();
    let frozen = game.serialize_state();
    for _ in 0..60 {
        assert!(game.update(DT, &PlayerInputs::default()).is_empty());
    }
    assert_eq!(game.serialize_state(), frozen);
    game.resume();
    game.update(DT, &PlayerInputs::default());
    assert_ne!(game.serialize_state(), frozen);
}
