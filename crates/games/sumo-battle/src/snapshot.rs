use serde::{Deserialize, Serialize};

use sumo_core::game_trait::PlayerId;
use sumo_core::player::PlayerColor;

use crate::fighter::Fighter;
use crate::hazards::{Hazard, HazardType};

/// Top-down view of the platform for the minimap overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapSnapshot {
    pub platform_radius: f32,
    pub players: Vec<MinimapPlayer>,
    pub hazards: Vec<MinimapHazard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapPlayer {
    pub id: PlayerId,
    pub color: PlayerColor,
    /// Drawn with a bot marker.
    pub is_bot: bool,
    pub x: f32,
    pub z: f32,
    pub alive: bool,
    pub damage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapHazard {
    pub id: u32,
    pub kind: HazardType,
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    pub active: bool,
}

impl MinimapSnapshot {
    pub fn capture(platform_radius: f32, fighters: &[Fighter], hazards: &[Hazard]) -> Self {
        Self {
            platform_radius,
            players: fighters
                .iter()
                .map(|f| MinimapPlayer {
                    id: f.id,
                    color: f.color,
                    is_bot: f.is_bot,
                    x: f.position.x,
                    z: f.position.z,
                    alive: f.alive,
                    damage: f.damage,
                })
                .collect(),
            hazards: hazards
                .iter()
                .map(|h| MinimapHazard {
                    id: h.common.id,
                    kind: h.kind(),
                    x: h.common.position.x,
                    z: h.common.position.z,
                    radius: h.common.radius,
                    active: h.common.is_active,
                })
                .collect(),
        }
    }
}
