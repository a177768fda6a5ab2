use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sumo_battle::SumoBattle;
use sumo_battle::bot::generate_bot_input;
use sumo_core::game_trait::{ArenaGame, GameConfig, PlayerId, PlayerInputs};
use sumo_core::player::{FighterProfile, Player, PlayerColor};

/// Masses handed out by seat so bots differ in weight class.
const SEAT_MASSES: [f32; 4] = [1.0, 1.3, 0.8, 1.1];

#[derive(Serialize)]
struct Standing {
    player_id: PlayerId,
    name: String,
    round_wins: u32,
    damage: f32,
    alive: bool,
}

#[derive(Serialize)]
struct Report {
    frames: u64,
    /// Rounds that reached an end, so an unfinished last round is not counted.
    rounds_played: u32,
    match_winner: Option<PlayerId>,
    standings: Vec<Standing>,
}

/// Value of `--name=value`, or `default` when absent or unparsable.
fn flag<T: FromStr>(name: &str, default: T) -> T {
    let prefix = format!("--{name}=");
    std::env::args()
        .skip(1)
        .find_map(|a| a.strip_prefix(&prefix).and_then(|v| v.parse().ok()))
        .unwrap_or(default)
}

fn roster(count: usize) -> Vec<Player> {
    (0..count)
        .map(|seat| Player {
            id: seat as PlayerId + 1,
            display_name: format!("Bot{}", seat + 1),
            color: PlayerColor::for_seat(seat),
            profile: FighterProfile {
                mass: SEAT_MASSES[seat % SEAT_MASSES.len()],
                ..FighterProfile::default()
            },
            is_bot: true,
        })
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seed: u64 = flag("seed", 0x5EED);
    let rounds: u8 = flag("rounds", 3);
    let players: usize = flag("players", 4);
    let max_frames: u64 = flag("max-frames", 60 * 60 * 10);

    let mut game = SumoBattle::new();
    let roster = roster(players);
    let config = GameConfig {
        round_win_target: rounds,
        // Zero keeps the configured round length.
        round_duration: Duration::ZERO,
        custom: HashMap::from([("seed".to_string(), serde_json::json!(seed))]),
    };
    if let Err(e) = game.try_init(&roster, &config) {
        tracing::error!(error = %e, "Could not start battle");
        std::process::exit(2);
    }

    let dt = 1.0 / game.tick_rate();
    let mut frames = 0;
    let mut rounds_played = 0;
    while frames < max_frames && !game.is_match_complete() {
        let mut inputs = PlayerInputs::default();
        for player in &roster {
            inputs.press(player.id, generate_bot_input(game.state(), player.id));
        }
        for event in game.update(dt, &inputs) {
            if event.is_round_end() {
                rounds_played += 1;
            }
            match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(frame = frames, event = %json, "Battle event"),
                Err(e) => tracing::warn!(error = %e, "Unencodable battle event"),
            }
        }
        game.drain_effects();
        frames += 1;
    }
    if !game.is_match_complete() {
        tracing::warn!(frames, "Frame budget exhausted before the match ended");
    }

    let state = game.state();
    let report = Report {
        frames,
        rounds_played,
        match_winner: state.round.match_winner,
        standings: state
            .fighters
            .iter()
            .map(|f| Standing {
                player_id: f.id,
                name: f.display_name.clone(),
                round_wins: f.round_wins,
                damage: f.damage,
                alive: f.alive,
            })
            .collect(),
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to encode report"),
    }
}
