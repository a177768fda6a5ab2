use glam::Vec3;
use serde::{Deserialize, Serialize};

use sumo_core::game_trait::PlayerId;

use crate::hazards::HazardType;

/// Cosmetic records for the rendering collaborator. Drained every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEffect {
    /// Two fighters collided above the damage threshold.
    Impact { position: Vec3, speed: f32 },
    /// A hazard fired or struck a fighter.
    HazardBurst {
        hazard_id: u32,
        kind: HazardType,
        position: Vec3,
    },
    /// A strike will land at `position` after `delay` seconds.
    Telegraph {
        hazard_id: u32,
        kind: HazardType,
        position: Vec3,
        radius: f32,
        delay: f32,
    },
    Teleport {
        player_id: PlayerId,
        from: Vec3,
        to: Vec3,
    },
}

/// Camera shake intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraShake {
    pub intensity: f32,
}

impl CameraShake {
    /// Raise intensity to at least `amount`.
    pub fn add(&mut self, amount: f32) {
        if amount.is_finite() {
            self.intensity = self.intensity.max(amount).clamp(0.0, 1.0);
        }
    }

    /// Linear decay toward zero.
    pub fn decay(&mut self, rate: f32, dt: f32) {
        self.intensity = (self.intensity - rate * dt).max(0.0);
    }
}
