pub mod arena;
pub mod bot;
pub mod collision;
pub mod config;
pub mod damage;
pub mod effects;
pub mod error;
pub mod fighter;
pub mod hazards;
pub mod physics;
pub mod round;
pub mod scoring;
pub mod snapshot;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use sumo_core::arena_game_boilerplate;
use sumo_core::events::GameEvent;
use sumo_core::game_trait::{
    ArenaGame, GameConfig, GameMetadata, PlayerId, PlayerInputs, PlayerScore,
};
use sumo_core::player::Player;

use arena::ArenaTheme;
use collision::CollisionSinks;
use config::{BattleConfig, ThemeSelection};
use effects::{BattleEffect, CameraShake};
use error::BattleError;
use fighter::Fighter;
use hazards::{Hazard, HazardContext};
use round::{MatchPhase, MatchState, Transition};
use scoring::RoundTally;
use snapshot::MinimapSnapshot;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Serializable simulation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    /// Sorted by player id.
    pub fighters: Vec<Fighter>,
    pub hazards: Vec<Hazard>,
    pub arena: ArenaTheme,
    pub round: MatchState,
    pub alive_count: u32,
    /// Simulated seconds since init, paused time excluded.
    pub clock: f32,
    pub camera_shake: CameraShake,
    /// Next index into the theme rotation.
    pub theme_cursor: usize,
}

/// The sumo battle controller.
pub struct SumoBattle {
    state: BattleState,
    themes: Vec<ArenaTheme>,
    rng: StdRng,
    effects: Vec<BattleEffect>,
    /// Events raised outside `update`, delivered by the next call.
    pending_events: Vec<GameEvent>,
    paused: bool,
    config: BattleConfig,
}

impl SumoBattle {
    pub fn new() -> Self {
        Self::with_config(BattleConfig::load())
    }

    pub fn with_config(config: BattleConfig) -> Self {
        Self {
            state: BattleState {
                round: MatchState::new(u32::from(config.round.round_win_target)),
                ..BattleState::default()
            },
            themes: config.arena.resolved_themes(),
            rng: StdRng::seed_from_u64(config.round.seed),
            effects: Vec::new(),
            pending_events: Vec::new(),
            paused: false,
            config,
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.round.phase
    }

    pub fn fighter(&self, player_id: PlayerId) -> Option<&Fighter> {
        self.state.fighters.iter().find(|f| f.id == player_id)
    }

    /// Camera shake intensity in `[0, 1]`.
    pub fn camera_shake(&self) -> f32 {
        self.state.camera_shake.intensity
    }

    pub fn minimap_snapshot(&self) -> MinimapSnapshot {
        MinimapSnapshot::capture(
            self.state.arena.platform_radius,
            &self.state.fighters,
            &self.state.hazards,
        )
    }

    /// Take the cosmetic effects raised since the last call.
    pub fn drain_effects(&mut self) -> Vec<BattleEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Validate the roster and settings, then start round 1's countdown.
    ///
    /// `config.custom` may carry `"seed"` (integer) and `"theme"` (name of the
    /// first arena). A nonzero round win target or round duration overrides
    /// the loaded config.
    pub fn try_init(&mut self, players: &[Player], config: &GameConfig) -> Result<(), BattleError> {
        if players.len() < MIN_PLAYERS {
            return Err(BattleError::NotEnoughPlayers {
                got: players.len(),
                min: MIN_PLAYERS,
            });
        }
        if players.len() > MAX_PLAYERS {
            return Err(BattleError::TooManyPlayers {
                got: players.len(),
                max: MAX_PLAYERS,
            });
        }

        let mut settings = self.config.clone();
        if config.round_win_target > 0 {
            settings.round.round_win_target = config.round_win_target;
        }
        if !config.round_duration.is_zero() {
            settings.round.max_round_duration = config.round_duration.as_secs_f32();
        }
        if let Some(seed) = config.custom.get("seed").and_then(serde_json::Value::as_u64) {
            settings.round.seed = seed;
        }
        settings.validate()?;

        let mut fighters = players
            .iter()
            .map(|p| Fighter::from_player(p, settings.physics.player_radius))
            .collect::<Result<Vec<_>, _>>()?;
        fighters.sort_by_key(|f| f.id);
        if let Some(pair) = fighters.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(BattleError::DuplicatePlayer {
                player_id: pair[0].id,
            });
        }

        self.themes = settings.arena.resolved_themes();
        let requested = config
            .custom
            .get("theme")
            .and_then(serde_json::Value::as_str);
        let named = requested.and_then(|name| self.themes.iter().position(|t| t.name == name));
        if let Some(name) = requested
            && named.is_none()
        {
            tracing::warn!(theme = name, "Unknown arena theme requested, using rotation");
        }

        self.rng = StdRng::seed_from_u64(settings.round.seed);
        self.config = settings;
        self.state = BattleState {
            fighters,
            round: MatchState::new(u32::from(self.config.round.round_win_target)),
            ..BattleState::default()
        };
        self.effects.clear();
        self.pending_events.clear();
        self.paused = false;

        self.state.round.begin_match();
        let index = match named {
            Some(index) => index,
            None => self.pick_theme_index(),
        };
        let event = self.layout_round(index);
        self.pending_events.push(event);

        tracing::info!(
            players = self.state.fighters.len(),
            seed = self.config.round.seed,
            round_win_target = self.config.round.round_win_target,
            "Sumo battle initialized"
        );
        Ok(())
    }

    /// Release all per-match state and return to `waiting`.
    pub fn teardown(&mut self) {
        self.state = BattleState {
            round: MatchState::new(u32::from(self.config.round.round_win_target)),
            ..BattleState::default()
        };
        self.effects.clear();
        self.pending_events.clear();
        self.paused = false;
    }

    /// Start a fresh match with the same roster. All round wins are cleared.
    pub fn restart_match(&mut self) {
        if self.state.fighters.is_empty() {
            return;
        }
        for fighter in &mut self.state.fighters {
            fighter.round_wins = 0;
        }
        self.state.round.begin_match();
        self.state.theme_cursor = 0;
        self.effects.clear();
        self.pending_events.clear();
        let index = self.pick_theme_index();
        let event = self.layout_round(index);
        self.pending_events.push(event);
        tracing::info!("Match restarted");
    }

    fn pick_theme_index(&mut self) -> usize {
        let count = self.themes.len();
        if count == 0 {
            return 0;
        }
        match self.config.round.theme_selection {
            ThemeSelection::Sequential => self.state.theme_cursor % count,
            ThemeSelection::Random => self.rng.random_range(0..count),
        }
    }

    /// Install theme `index` for the current round and put everyone on their spawn.
    fn layout_round(&mut self, index: usize) -> GameEvent {
        let theme = self.themes.get(index).cloned().unwrap_or_default();
        self.state.theme_cursor = (index + 1) % self.themes.len().max(1);
        self.state.hazards = hazards::build_hazards(&theme.hazards);

        let spawns = arena::spawn_points(
            self.state.fighters.len(),
            theme.platform_radius,
            self.config.physics.player_radius,
        );
        for (fighter, spawn) in self.state.fighters.iter_mut().zip(spawns) {
            fighter.reset_for_round(spawn);
        }
        self.state.alive_count = self.state.fighters.len() as u32;
        self.state.camera_shake = CameraShake::default();

        let round = self.state.round.current_round;
        tracing::info!(
            round,
            arena = %theme.name,
            hazards = self.state.hazards.len(),
            "Round countdown started"
        );
        let event = GameEvent::CountdownStarted {
            round,
            arena: theme.name.clone(),
        };
        self.state.arena = theme;
        event
    }

    /// Integrator, then hazards, then fighter-vs-fighter collisions.
    fn step_world(&mut self, dt: f32, inputs: &PlayerInputs) {
        let platform_radius = self.state.arena.platform_radius;
        for fighter in &mut self.state.fighters {
            let input = inputs.get(fighter.id);
            physics::integrate(fighter, input, dt, platform_radius, &self.config.physics);
        }

        let now = self.state.clock;
        let mut ctx = HazardContext {
            dt,
            now,
            platform_radius,
            combat: &self.config.combat,
            rng: &mut self.rng,
            effects: &mut self.effects,
            shake: &mut self.state.camera_shake,
        };
        hazards::run_hazards(&mut self.state.hazards, &mut self.state.fighters, &mut ctx);

        let mut sinks = CollisionSinks {
            rng: &mut self.rng,
            effects: &mut self.effects,
            shake: &mut self.state.camera_shake,
        };
        let hits = collision::resolve_collisions(
            &mut self.state.fighters,
            now,
            &self.config.combat,
            &mut sinks,
        );
        if !hits.is_empty() {
            tracing::trace!(hits = hits.len(), "Resolved fighter collisions");
        }
    }

    fn process_eliminations(&mut self, events: &mut Vec<GameEvent>) {
        let fallen =
            round::check_eliminations(&mut self.state.fighters, self.state.arena.fall_threshold);
        for elimination in fallen {
            self.state.alive_count = self.state.alive_count.saturating_sub(1);
            tracing::info!(
                player_id = elimination.player_id,
                knocked_out_by = ?elimination.knocked_out_by,
                alive = self.state.alive_count,
                "Fighter eliminated"
            );
            events.push(GameEvent::PlayerEliminated {
                player_id: elimination.player_id,
                knocked_out_by: elimination.knocked_out_by,
            });
        }
    }

    fn apply_transition(&mut self, transition: Transition, events: &mut Vec<GameEvent>) {
        let round = self.state.round.current_round;
        match transition {
            Transition::RoundStarted => {
                tracing::info!(round, arena = %self.state.arena.name, "Round started");
                events.push(GameEvent::RoundStarted {
                    round,
                    arena: self.state.arena.name.clone(),
                });
            },
            Transition::RoundEnded { reason, winner } => {
                tracing::info!(round, ?reason, winner = ?winner, "Round ended");
                events.push(GameEvent::RoundEnded {
                    round,
                    reason,
                    winner,
                });
            },
            Transition::MatchEnded { winner } => {
                tracing::info!(winner, rounds = round, "Match ended");
                events.push(GameEvent::MatchEnded { winner });
            },
            Transition::NextRound => {
                let index = self.pick_theme_index();
                events.push(self.layout_round(index));
            },
        }
    }
}

impl Default for SumoBattle {
    fn default() -> Self {
        Self::with_config(BattleConfig::default())
    }
}

impl ArenaGame for SumoBattle {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Sumo Battle".to_string(),
            description: "Ram your rivals off the platform. The more damage they take, the \
                          farther they fly."
                .to_string(),
            min_players: MIN_PLAYERS as u8,
            max_players: MAX_PLAYERS as u8,
            estimated_round_duration: Duration::from_secs(90),
        }
    }

    fn round_win_target_hint(&self) -> u8 {
        self.config.round.round_win_target
    }

    fn init(&mut self, players: &[Player], config: &GameConfig) {
        if let Err(e) = self.try_init(players, config) {
            tracing::warn!(error = %e, "Sumo battle setup rejected");
            self.teardown();
        }
    }

    fn update(&mut self, dt: f32, inputs: &PlayerInputs) -> Vec<GameEvent> {
        if self.paused {
            return Vec::new();
        }
        let mut events = std::mem::take(&mut self.pending_events);
        let dt = physics::sanitize_dt(dt, self.config.physics.max_dt);
        let phase = self.state.round.phase;
        if dt <= 0.0 || matches!(phase, MatchPhase::Waiting | MatchPhase::MatchEnded) {
            return events;
        }

        self.state.clock += dt;
        self.state
            .camera_shake
            .decay(self.config.combat.camera_shake_decay, dt);

        if matches!(phase, MatchPhase::Active | MatchPhase::RoundEnding) {
            self.step_world(dt, inputs);
        }
        if phase == MatchPhase::Active {
            self.process_eliminations(&mut events);
        }

        let transition = self.state.round.tick(
            dt,
            &mut self.state.fighters,
            self.state.alive_count,
            &self.config.round,
        );
        if let Some(transition) = transition {
            self.apply_transition(transition, &mut events);
        }
        events
    }

    arena_game_boilerplate!(state_type: BattleState);

    fn player_left(&mut self, player_id: PlayerId) {
        let Some(index) = self.state.fighters.iter().position(|f| f.id == player_id) else {
            return;
        };
        let fighter = self.state.fighters.remove(index);
        if fighter.alive {
            self.state.alive_count = self.state.alive_count.saturating_sub(1);
        }
        for hazard in &mut self.state.hazards {
            hazard.forget(player_id);
        }
        for other in &mut self.state.fighters {
            other.consecutive_hits.remove(&player_id);
            if other.last_hit_by == Some(player_id) {
                other.last_hit_by = None;
            }
        }
        tracing::info!(player_id, remaining = self.state.fighters.len(), "Fighter left");
    }

    fn is_round_complete(&self) -> bool {
        self.state.round.is_round_complete()
    }

    fn is_match_complete(&self) -> bool {
        self.state.round.phase == MatchPhase::MatchEnded
    }

    fn round_results(&self) -> Vec<PlayerScore> {
        self.state
            .fighters
            .iter()
            .map(|f| PlayerScore {
                player_id: f.id,
                score: scoring::calculate_score(&RoundTally {
                    won_round: self.state.round.round_winner == Some(f.id),
                    won_match: self.state.round.match_winner == Some(f.id),
                    survived: f.alive,
                    self_out: !f.alive && f.knocked_out_by.is_none(),
                    knockouts: f.knockouts,
                    damage_dealt: f.damage_dealt,
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec3;

    use sumo_core::events::RoundEndReason;
    use sumo_core::input::DirectionalInput;
    use sumo_core::test_helpers::{default_config, make_players, run_game_ticks};

    use super::*;
    use crate::hazards::{HazardDescriptor, build_hazards};

    const DT: f32 = 1.0 / 60.0;

    fn started(n: usize) -> SumoBattle {
        let mut game = SumoBattle::default();
        game.init(&make_players(n), &default_config(3));
        game
    }

    /// Step through the countdown into a live round.
    fn live(n: usize) -> SumoBattle {
        let mut game = started(n);
        while game.phase() != MatchPhase::Active {
            game.update(0.1, &PlayerInputs::default());
        }
        game
    }

    fn fighter_mut(game: &mut SumoBattle, id: PlayerId) -> &mut Fighter {
        game.state
            .fighters
            .iter_mut()
            .find(|f| f.id == id)
            .unwrap()
    }

    #[test]
    fn init_seats_every_player_on_spawn_ring() {
        let game = started(4);
        assert_eq!(game.state.fighters.len(), 4);
        assert_eq!(game.state.alive_count, 4);
        assert_eq!(game.phase(), MatchPhase::Countdown);
        assert_eq!(game.state.arena.name, "classic");
        for f in &game.state.fighters {
            assert!((f.distance_from_center() - 9.0).abs() < 1e-4);
        }
    }

    #[test]
    fn init_rejects_bad_rosters() {
        let mut game = SumoBattle::default();
        assert_eq!(
            game.try_init(&make_players(1), &default_config(3)),
            Err(BattleError::NotEnoughPlayers { got: 1, min: 2 })
        );
        assert_eq!(
            game.try_init(&make_players(5), &default_config(3)),
            Err(BattleError::TooManyPlayers { got: 5, max: 4 })
        );

        let mut players = make_players(2);
        players[1].profile.mass = 0.0;
        assert_eq!(
            game.try_init(&players, &default_config(3)),
            Err(BattleError::InvalidMass {
                player_id: 2,
                mass: 0.0,
            })
        );

        game.init(&players, &default_config(3));
        assert_eq!(game.phase(), MatchPhase::Waiting);
        assert!(game.state.fighters.is_empty());
        assert!(run_game_ticks(&mut game, 10, 0.1).is_empty());
    }

    #[test]
    fn init_rejects_repeated_player_id() {
        let mut players = make_players(3);
        players[1].id = 1;
        let mut game = SumoBattle::default();
        assert_eq!(
            game.try_init(&players, &default_config(3)),
            Err(BattleError::DuplicatePlayer { player_id: 1 })
        );
        assert!(game.state.fighters.is_empty());
        assert_eq!(game.phase(), MatchPhase::Waiting);
    }

    #[test]
    fn init_rejects_unbounded_damage_roll() {
        let mut config = BattleConfig::default();
        config.combat.damage_variation = f32::INFINITY;
        let mut game = SumoBattle::with_config(config);
        assert!(matches!(
            game.try_init(&make_players(2), &default_config(3)),
            Err(BattleError::InvalidConfig(msg)) if msg.contains("damage_variation")
        ));
        assert_eq!(game.phase(), MatchPhase::Waiting);
    }

    #[test]
    fn game_config_overrides_target_seed_and_theme() {
        let mut config = default_config(5);
        config.round_duration = Duration::from_secs(30);
        config.custom = HashMap::from([
            ("seed".to_string(), serde_json::json!(1234)),
            ("theme".to_string(), serde_json::json!("storm")),
        ]);
        let mut game = SumoBattle::default();
        game.init(&make_players(2), &config);

        assert_eq!(game.round_win_target_hint(), 5);
        assert_eq!(game.state.round.round_win_target, 5);
        assert_eq!(game.config.round.max_round_duration, 30.0);
        assert_eq!(game.config.round.seed, 1234);
        assert_eq!(game.state.arena.name, "storm");
        // Rotation continues after the requested theme.
        assert_eq!(game.state.theme_cursor, 5);
    }

    #[test]
    fn first_update_reports_countdown_then_round_start() {
        let mut game = started(2);
        let events = run_game_ticks(&mut game, 31, 0.1);
        assert_eq!(
            events[0],
            GameEvent::CountdownStarted {
                round: 1,
                arena: "classic".to_string(),
            }
        );
        assert!(events.contains(&GameEvent::RoundStarted {
            round: 1,
            arena: "classic".to_string(),
        }));
        assert_eq!(game.phase(), MatchPhase::Active);
    }

    #[test]
    fn countdown_freezes_fighters() {
        let mut game = started(2);
        let before = game.state.fighters.clone();
        let mut inputs = PlayerInputs::default();
        inputs.press(
            1,
            DirectionalInput {
                right: true,
                ..Default::default()
            },
        );
        game.update(0.1, &inputs);
        assert_eq!(game.state.fighters, before);
    }

    #[test]
    fn held_input_moves_fighter_in_live_round() {
        let mut game = live(2);
        let start = game.fighter(1).unwrap().position;
        let mut inputs = PlayerInputs::default();
        inputs.press(
            1,
            DirectionalInput {
                up: true,
                ..Default::default()
            },
        );
        for _ in 0..30 {
            game.update(DT, &inputs);
        }
        assert!(game.fighter(1).unwrap().position.z < start.z - 0.5);
    }

    #[test]
    fn fall_off_eliminates_exactly_once() {
        let mut game = live(4);
        // Two sinkholes under a fighter already below the threshold.
        game.state.hazards = build_hazards(&[
            HazardDescriptor::new("sinkhole", 9.0, 0.0),
            HazardDescriptor::new("sinkhole", 9.0, 0.0),
        ]);
        let f = fighter_mut(&mut game, 1);
        f.position = Vec3::new(9.0, -14.99, 0.0);
        f.velocity = Vec3::new(0.0, -30.0, 0.0);

        let events = game.update(DT, &PlayerInputs::default());
        let eliminated: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerEliminated { .. }))
            .collect();
        assert_eq!(eliminated.len(), 1);
        assert!(!game.fighter(1).unwrap().alive);
        assert_eq!(game.state.alive_count, 3);

        let events = run_game_ticks(&mut game, 10, DT);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::PlayerEliminated { .. }))
        );
        assert_eq!(game.state.alive_count, 3);
    }

    #[test]
    fn knockout_is_credited_to_last_hitter() {
        let mut game = live(3);
        let f = fighter_mut(&mut game, 2);
        f.position.y = -20.0;
        f.last_hit_by = Some(3);

        let events = game.update(DT, &PlayerInputs::default());
        assert!(events.contains(&GameEvent::PlayerEliminated {
            player_id: 2,
            knocked_out_by: Some(3),
        }));
        assert_eq!(game.fighter(3).unwrap().knockouts, 1);

        let results = game.round_results();
        let score = |id| results.iter().find(|r| r.player_id == id).unwrap().score;
        assert_eq!(score(3), scoring::RING_OUT_POINTS + scoring::SURVIVAL_POINTS);
        // Pushed off by player 3: no walk-off penalty.
        assert_eq!(score(2), 0);
    }

    #[test]
    fn last_standing_wins_round_and_match_progresses() {
        let mut game = live(2);
        fighter_mut(&mut game, 2).position.y = -20.0;

        let events = game.update(DT, &PlayerInputs::default());
        assert!(events.contains(&GameEvent::RoundEnded {
            round: 1,
            reason: RoundEndReason::LastStanding,
            winner: Some(1),
        }));
        assert!(game.is_round_complete());
        assert!(!game.is_match_complete());
        assert_eq!(game.fighter(1).unwrap().round_wins, 1);

        let results = game.round_results();
        let score = |id| results.iter().find(|r| r.player_id == id).unwrap().score;
        assert_eq!(score(1), scoring::ROUND_WIN_POINTS);
        assert_eq!(score(2), scoring::SELF_OUT_POINTS);

        let events = run_game_ticks(&mut game, 31, 0.1);
        assert!(events.contains(&GameEvent::CountdownStarted {
            round: 2,
            arena: "volcano".to_string(),
        }));
        assert_eq!(game.phase(), MatchPhase::Countdown);
        let f2 = game.fighter(2).unwrap();
        assert!(f2.alive);
        assert_eq!(f2.damage, 0.0);
        assert_eq!(game.fighter(1).unwrap().round_wins, 1);
        assert_eq!(game.state.alive_count, 2);
    }

    #[test]
    fn simultaneous_falls_are_a_draw() {
        let mut game = live(2);
        fighter_mut(&mut game, 1).position.y = -20.0;
        fighter_mut(&mut game, 2).position.y = -20.0;
        let events = game.update(DT, &PlayerInputs::default());
        assert!(events.contains(&GameEvent::RoundEnded {
            round: 1,
            reason: RoundEndReason::Draw,
            winner: None,
        }));
        assert!(game.state.fighters.iter().all(|f| f.round_wins == 0));
    }

    #[test]
    fn reaching_win_target_ends_match() {
        let mut game = SumoBattle::default();
        game.init(&make_players(2), &default_config(1));
        while game.phase() != MatchPhase::Active {
            game.update(0.1, &PlayerInputs::default());
        }
        fighter_mut(&mut game, 1).position.y = -20.0;
        let mut events = game.update(DT, &PlayerInputs::default());
        events.extend(run_game_ticks(&mut game, 31, 0.1));

        assert!(events.contains(&GameEvent::MatchEnded { winner: 2 }));
        assert!(game.is_match_complete());
        assert_eq!(game.state.round.match_winner, Some(2));

        // Terminal until restarted.
        let frozen = game.serialize_state();
        run_game_ticks(&mut game, 10, 0.1);
        assert_eq!(game.serialize_state(), frozen);

        game.restart_match();
        assert_eq!(game.phase(), MatchPhase::Countdown);
        assert_eq!(game.state.round.current_round, 1);
        assert!(game.state.fighters.iter().all(|f| f.round_wins == 0));
        let events = game.update(0.1, &PlayerInputs::default());
        assert!(matches!(
            events.first(),
            Some(GameEvent::CountdownStarted { round: 1, .. })
        ));
    }

    #[test]
    fn random_selection_is_seeded() {
        let mut config = BattleConfig::default();
        config.round.theme_selection = ThemeSelection::Random;
        let themes_for = |config: &BattleConfig| {
            let mut game = SumoBattle::with_config(config.clone());
            game.init(&make_players(2), &default_config(9));
            (0..5)
                .map(|_| {
                    let index = game.pick_theme_index();
                    game.layout_round(index);
                    game.state.arena.name.clone()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(themes_for(&config), themes_for(&config));
    }

    #[test]
    fn identical_seeds_evolve_identically() {
        let run = || {
            let mut game = started(4);
            let mut inputs = PlayerInputs::default();
            inputs.press(
                1,
                DirectionalInput {
                    left: true,
                    ..Default::default()
                },
            );
            inputs.press(
                3,
                DirectionalInput {
                    right: true,
                    ..Default::default()
                },
            );
            for _ in 0..600 {
                game.update(DT, &inputs);
            }
            game.serialize_state()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn player_left_mid_round_updates_alive_count() {
        let mut game = live(3);
        game.player_left(2);
        assert_eq!(game.state.alive_count, 2);
        assert!(game.fighter(2).is_none());
        game.player_left(42);
        assert_eq!(game.state.fighters.len(), 2);
    }

    #[test]
    fn effects_and_snapshot_are_exposed() {
        let mut game = live(2);
        let f1 = fighter_mut(&mut game, 1);
        f1.position = Vec3::new(-0.9, 1.0, 0.0);
        f1.velocity = Vec3::new(12.0, 0.0, 0.0);
        let f2 = fighter_mut(&mut game, 2);
        f2.position = Vec3::new(0.9, 1.0, 0.0);
        f2.velocity = Vec3::new(-12.0, 0.0, 0.0);

        game.update(DT, &PlayerInputs::default());
        assert!(game.camera_shake() > 0.0);
        let effects = game.drain_effects();
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, BattleEffect::Impact { .. }))
        );
        assert!(game.drain_effects().is_empty());

        let snap = game.minimap_snapshot();
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.platform_radius, 15.0);
    }

    #[test]
    fn teardown_returns_to_waiting() {
        let mut game = live(2);
        game.teardown();
        assert_eq!(game.phase(), MatchPhase::Waiting);
        assert!(game.state.fighters.is_empty());
        assert!(game.state.hazards.is_empty());
        assert_eq!(game.state.clock, 0.0);
    }

    #[test]
    fn non_finite_dt_is_ignored() {
        let mut game = live(2);
        let before = game.serialize_state();
        game.update(f32::NAN, &PlayerInputs::default());
        game.update(-1.0, &PlayerInputs::default());
        assert_eq!(game.serialize_state(), before);
    }

    #[test]
    fn metadata_reports_seat_range() {
        let meta = SumoBattle::default().metadata();
        assert_eq!(meta.min_players, 2);
        assert_eq!(meta.max_players, 4);
        assert_eq!(SumoBattle::default().tick_rate(), 60.0);
    }

    #[test]
    fn apply_state_truncated_no_panic() {
        let mut game = live(2);
        let state = game.serialize_state();
        game.apply_state(&state[..state.len() / 2]);
        assert_eq!(game.state.fighters.len(), 2);
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================

    #[test]
    fn contract_init_creates_player_state() {
        let mut game = SumoBattle::default();
        sumo_core::test_helpers::contract_init_creates_player_state(&mut game, 4);
    }

    #[test]
    fn contract_input_changes_state() {
        let mut with_input = started(2);
        let mut without_input = started(2);
        sumo_core::test_helpers::contract_input_changes_state(
            &mut with_input,
            &mut without_input,
            1,
            DirectionalInput {
                down: true,
                ..Default::default()
            },
            35,
        );
    }

    #[test]
    fn contract_update_advances_time() {
        let mut game = started(2);
        sumo_core::test_helpers::contract_update_advances_time(&mut game);
    }

    #[test]
    fn contract_round_eventually_completes() {
        let mut game = started(2);
        sumo_core::test_helpers::contract_round_eventually_completes(&mut game, 2000);
    }

    #[test]
    fn contract_state_roundtrip_preserves() {
        let mut game = live(2);
        run_game_ticks(&mut game, 10, DT);
        sumo_core::test_helpers::contract_state_roundtrip_preserves(&mut game);
    }

    #[test]
    fn contract_pause_stops_updates() {
        let mut game = started(2);
        sumo_core::test_helpers::contract_pause_stops_updates(&mut game);
    }

    #[test]
    fn contract_player_left_cleanup() {
        let mut game = started(3);
        sumo_core::test_helpers::contract_player_left_cleanup(&mut game, 3, 3);
    }

    #[test]
    fn contract_round_results_complete() {
        let game = started(4);
        sumo_core::test_helpers::contract_round_results_complete(&game, 4);
    }
}
