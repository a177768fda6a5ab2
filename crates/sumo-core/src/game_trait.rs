use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::input::DirectionalInput;

/// Unique identifier for a player in the arena.
pub type PlayerId = u64;

/// Core trait every arena game implements.
///
/// The host application owns the frame loop, rendering, audio, and menus;
/// the game only advances its simulation and reports what happened.
pub trait ArenaGame {
    /// Game metadata for the mode-select screen.
    fn metadata(&self) -> GameMetadata;

    /// Called once when the roster is final. Starts the match.
    fn init(&mut self, players: &[super::player::Player], config: &GameConfig);

    /// Called each frame with the current key state of every local player.
    fn update(&mut self, dt: f32, inputs: &PlayerInputs) -> Vec<GameEvent>;

    /// Compact binary snapshot of the whole simulation state.
    fn serialize_state(&self) -> Vec<u8>;

    /// Restore a snapshot produced by [`ArenaGame::serialize_state`].
    fn apply_state(&mut self, state: &[u8]);

    /// Called when a local player drops out mid-match.
    fn player_left(&mut self, player_id: PlayerId);

    /// Simulation rate in Hz the host should aim for.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Rounds a player must win to take the match.
    fn round_win_target_hint(&self) -> u8 {
        1
    }

    /// Freeze the simulation (pause menu open).
    fn pause(&mut self);

    /// Unfreeze after [`ArenaGame::pause`].
    fn resume(&mut self);

    /// Whether the current round has been decided.
    fn is_round_complete(&self) -> bool;

    /// Whether the whole match has been decided.
    fn is_match_complete(&self) -> bool;

    /// Scores for the most recent round.
    fn round_results(&self) -> Vec<PlayerScore>;
}

/// Game metadata for the mode-select screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub min_players: u8,
    pub max_players: u8,
    pub estimated_round_duration: Duration,
}

/// Configuration chosen by the menu flow for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub round_win_target: u8,
    pub round_duration: Duration,
    pub custom: HashMap<String, serde_json::Value>,
}

/// Key state of every local player for a single frame.
#[derive(Debug, Clone, Default)]
pub struct PlayerInputs {
    pub inputs: HashMap<PlayerId, DirectionalInput>,
}

impl PlayerInputs {
    /// Input for `player_id`, or no keys pressed.
    pub fn get(&self, player_id: PlayerId) -> DirectionalInput {
        self.inputs.get(&player_id).copied().unwrap_or_default()
    }

    /// Merge a polled key state into this frame's inputs.
    pub fn press(&mut self, player_id: PlayerId, input: DirectionalInput) {
        self.inputs
            .entry(player_id)
            .and_modify(|existing| existing.merge(input))
            .or_insert(input);
    }
}

/// Score entry for a player at the end of a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: i32,
}

/// Generates the state snapshot and pause/resume boilerplate shared by arena games.
///
/// Requires the implementing struct to have a serializable `state` field of the
/// given type and a `paused: bool` field.
#[macro_export]
macro_rules! arena_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            $crate::rmp_serde::to_vec(&self.state).expect("battle state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            match $crate::rmp_serde::from_slice::<$StateType>(state) {
                Ok(s) => self.state = s,
                Err(e) => tracing::debug!(error = %e, "Ignored malformed state snapshot"),
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_reads_as_idle() {
        let inputs = PlayerInputs::default();
        assert!(inputs.get(7).is_idle());
    }

    #[test]
    fn press_merges_keys_within_a_frame() {
        let mut inputs = PlayerInputs::default();
        inputs.press(
            1,
            DirectionalInput {
                up: true,
                ..Default::default()
            },
        );
        inputs.press(
            1,
            DirectionalInput {
                left: true,
                ..Default::default()
            },
        );
        let merged = inputs.get(1);
        assert!(merged.up && merged.left);
        assert!(!merged.down && !merged.right);
    }
}
