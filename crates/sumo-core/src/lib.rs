pub mod events;
pub mod game_trait;
pub mod input;
pub mod player;

// Used by `arena_game_boilerplate!` expansions.
#[doc(hidden)]
pub use rmp_serde;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::events::GameEvent;
    use crate::game_trait::{ArenaGame, GameConfig, PlayerId, PlayerInputs, PlayerScore};
    use crate::input::DirectionalInput;
    use crate::player::{FighterProfile, Player, PlayerColor};

    /// Create `n` test players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                id: i as PlayerId + 1,
                display_name: format!("Player{}", i + 1),
                color: PlayerColor::for_seat(i),
                profile: FighterProfile::default(),
                is_bot: false,
            })
            .collect()
    }

    /// Create a GameConfig with the given round win target and a 90s round.
    pub fn default_config(round_win_target: u8) -> GameConfig {
        GameConfig {
            round_win_target,
            round_duration: Duration::from_secs(90),
            custom: HashMap::new(),
        }
    }

    /// Run N game ticks with no keys held, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn ArenaGame, n: usize, dt: f32) -> Vec<GameEvent> {
        let empty = PlayerInputs::default();
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt, &empty));
        }
        all_events
    }

    /// Inputs holding `input` for a single player.
    pub fn single_input(player_id: PlayerId, input: DirectionalInput) -> PlayerInputs {
        let mut inputs = PlayerInputs::default();
        inputs.press(player_id, input);
        inputs
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every ArenaGame implementation must pass these. Game crates call
    // them from their own #[cfg(test)] modules with concrete instances.

    /// After init() with N players, serialize_state() must return non-empty bytes.
    pub fn contract_init_creates_player_state(game: &mut dyn ArenaGame, player_count: usize) {
        let players = make_players(player_count);
        game.init(&players, &default_config(1));
        let state = game.serialize_state();
        assert!(
            !state.is_empty(),
            "serialize_state() must return non-empty bytes after init"
        );
    }

    /// Two identically initialized games must diverge once one receives input.
    ///
    /// Both games are first stepped `warmup_ticks` times without input so the
    /// input lands while the round is live.
    pub fn contract_input_changes_state(
        with_input: &mut dyn ArenaGame,
        without_input: &mut dyn ArenaGame,
        player_id: PlayerId,
        input: DirectionalInput,
        warmup_ticks: usize,
    ) {
        run_game_ticks(with_input, warmup_ticks, 0.1);
        run_game_ticks(without_input, warmup_ticks, 0.1);
        assert_eq!(
            with_input.serialize_state(),
            without_input.serialize_state(),
            "Identically driven games must stay identical"
        );

        let pressed = single_input(player_id, input);
        for _ in 0..5 {
            with_input.update(0.1, &pressed);
            without_input.update(0.1, &PlayerInputs::default());
        }
        assert_ne!(
            with_input.serialize_state(),
            without_input.serialize_state(),
            "Held input must change state"
        );
    }

    /// update() with dt>0 must advance the game state.
    pub fn contract_update_advances_time(game: &mut dyn ArenaGame) {
        let before = game.serialize_state();
        game.update(1.0, &PlayerInputs::default());
        let after = game.serialize_state();
        assert_ne!(
            before, after,
            "update(dt>0) must advance game state (timer)"
        );
    }

    /// Running update() enough times must eventually reach is_round_complete().
    pub fn contract_round_eventually_completes(game: &mut dyn ArenaGame, max_ticks: usize) {
        let empty = PlayerInputs::default();
        for _ in 0..max_ticks {
            game.update(1.0, &empty);
            if game.is_round_complete() {
                return;
            }
        }
        assert!(
            game.is_round_complete(),
            "Game must complete a round after {max_ticks} ticks of 1s each"
        );
    }

    /// serialize_state → apply_state must be stable after one roundtrip.
    pub fn contract_state_roundtrip_preserves(game: &mut dyn ArenaGame) {
        let state_a = game.serialize_state();
        game.apply_state(&state_a);
        let state_b = game.serialize_state();
        game.apply_state(&state_b);
        let state_c = game.serialize_state();
        assert_eq!(
            state_b, state_c,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// pause() must freeze state, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(game: &mut dyn ArenaGame) {
        game.pause();
        let before = game.serialize_state();
        let empty = PlayerInputs::default();
        game.update(1.0, &empty);
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        game.update(1.0, &empty);
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// player_left() must remove player data from state.
    pub fn contract_player_left_cleanup(
        game: &mut dyn ArenaGame,
        player_id: PlayerId,
        player_count: usize,
    ) {
        let before = game.serialize_state();
        game.player_left(player_id);
        let after = game.serialize_state();
        assert_ne!(before, after, "player_left must change state");
        let results = game.round_results();
        assert_eq!(
            results.len(),
            player_count - 1,
            "round_results should have {} entries after removing player",
            player_count - 1
        );
    }

    /// round_results() must return an entry for each seated player.
    pub fn contract_round_results_complete(
        game: &dyn ArenaGame,
        expected_players: usize,
    ) -> Vec<PlayerScore> {
        let results = game.round_results();
        assert_eq!(
            results.len(),
            expected_players,
            "round_results must have one entry per seated player"
        );
        results
    }
}
