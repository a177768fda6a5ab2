use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use sumo_core::game_trait::PlayerId;
use sumo_core::player::{Player, PlayerColor};

use crate::error::BattleError;

/// Per-frame ground modifiers written by the hazard pass.
///
/// Cleared at the start of every hazard pass and read by the integrator on
/// the following frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceState {
    /// Standing on ice; `ice_friction` replaces ground friction.
    pub on_ice: bool,
    pub ice_friction: f32,
    /// How far the floor under this fighter has sunk (quicksand).
    pub floor_drop: f32,
    /// No floor at all (sinkhole).
    pub floorless: bool,
}

impl SurfaceState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Consecutive hits one attacker has landed on a victim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitStreak {
    pub count: u32,
    pub last_hit_time: f32,
}

/// A fighter sphere on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: PlayerId,
    pub display_name: String,
    pub color: PlayerColor,
    pub is_bot: bool,
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub move_force: f32,
    pub radius: f32,
    pub alive: bool,
    pub on_ground: bool,
    pub surface: SurfaceState,
    /// Accumulated damage percentage, never above the configured maximum.
    pub damage: f32,
    /// Seconds of dampened input left.
    pub hitstun: f32,
    /// Hit streaks keyed by attacker.
    pub consecutive_hits: BTreeMap<PlayerId, HitStreak>,
    pub round_wins: u32,
    /// Last player to damage this fighter this round.
    pub last_hit_by: Option<PlayerId>,
    /// Damage this fighter landed on opponents this round.
    pub damage_dealt: f32,
    /// Opponents eliminated while this fighter was their last hitter.
    pub knockouts: u32,
    /// Credited hitter when this fighter fell, if any.
    pub knocked_out_by: Option<PlayerId>,
    /// Accumulated rolling rotation (radians), cosmetic.
    pub roll_angle: f32,
}

impl Fighter {
    /// Build a fighter from a seated player. Mass must be strictly positive.
    pub fn from_player(player: &Player, radius: f32) -> Result<Self, BattleError> {
        let mass = player.profile.mass;
        if !mass.is_finite() || mass <= 0.0 {
            return Err(BattleError::InvalidMass {
                player_id: player.id,
                mass,
            });
        }
        let move_force = player.profile.move_force;
        if !move_force.is_finite() || move_force < 0.0 {
            return Err(BattleError::InvalidMoveForce {
                player_id: player.id,
                value: move_force,
            });
        }
        Ok(Self {
            id: player.id,
            display_name: player.display_name.clone(),
            color: player.color,
            is_bot: player.is_bot,
            position: Vec3::new(0.0, radius, 0.0),
            velocity: Vec3::ZERO,
            mass,
            move_force,
            radius,
            alive: true,
            on_ground: true,
            surface: SurfaceState::default(),
            damage: 0.0,
            hitstun: 0.0,
            consecutive_hits: BTreeMap::new(),
            round_wins: 0,
            last_hit_by: None,
            damage_dealt: 0.0,
            knockouts: 0,
            knocked_out_by: None,
            roll_angle: 0.0,
        })
    }

    /// `|velocity| * mass`, used to pick the attacker in a collision.
    pub fn momentum(&self) -> f32 {
        self.velocity.length() * self.mass
    }

    /// Horizontal distance from the arena center.
    pub fn distance_from_center(&self) -> f32 {
        Vec3::new(self.position.x, 0.0, self.position.z).length()
    }

    /// Place the fighter at `spawn` and clear everything except round wins.
    pub fn reset_for_round(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.alive = true;
        self.on_ground = true;
        self.surface.clear();
        self.damage = 0.0;
        self.hitstun = 0.0;
        self.consecutive_hits.clear();
        self.last_hit_by = None;
        self.damage_dealt = 0.0;
        self.knockouts = 0;
        self.knocked_out_by = None;
        self.roll_angle = 0.0;
    }
}

#[cfg(test)]
pub(crate) fn test_fighter(id: PlayerId, position: Vec3) -> Fighter {
    let player = Player {
        id,
        display_name: format!("Player{id}"),
        color: PlayerColor::for_seat(id as usize),
        profile: sumo_core::player::FighterProfile::default(),
        is_bot: false,
    };
    let mut fighter = Fighter::from_player(&player, 1.0).unwrap();
    fighter.position = position;
    fighter
}
