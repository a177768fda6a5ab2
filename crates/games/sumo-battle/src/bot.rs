use glam::Vec2;

use sumo_core::game_trait::PlayerId;
use sumo_core::input::DirectionalInput;

use crate::BattleState;
use crate::round::MatchPhase;

/// Share of the platform radius past which the bot heads back inward.
const EDGE_RETREAT_SHARE: f32 = 0.8;

/// Extra clearance kept around active hazards.
const HAZARD_MARGIN: f32 = 1.5;

/// Steering components smaller than this release the key.
const DEAD_ZONE: f32 = 0.3;

/// Base sway frequency (radians per second of battle clock).
const SWAY_RATE: f32 = 1.7;

/// Sideways weight at the peak of a sway.
const SWAY_WEIGHT: f32 = 0.6;

/// Generate directional input for a bot-controlled fighter.
pub fn generate_bot_input(state: &BattleState, bot_id: PlayerId) -> DirectionalInput {
    if state.round.phase != MatchPhase::Active {
        return DirectionalInput::default();
    }
    let Some(me) = state.fighters.iter().find(|f| f.id == bot_id) else {
        return DirectionalInput::default();
    };
    if !me.alive {
        return DirectionalInput::default();
    }

    let here = Vec2::new(me.position.x, me.position.z);
    let mut steer = Vec2::ZERO;

    // Charge the nearest opponent
    let nearest = state
        .fighters
        .iter()
        .filter(|f| f.alive && f.id != bot_id)
        .map(|f| Vec2::new(f.position.x, f.position.z))
        .min_by(|a, b| a.distance(here).total_cmp(&b.distance(here)));
    if let Some(target) = nearest {
        steer += (target - here).normalize_or_zero();
    }

    let radius = state.arena.platform_radius;
    if here.length() > radius * EDGE_RETREAT_SHARE {
        steer -= here.normalize_or_zero() * 2.0;
    }

    for hazard in state.hazards.iter().filter(|h| h.common.is_active) {
        let center = Vec2::new(hazard.common.position.x, hazard.common.position.z);
        let away = here - center;
        if away.length() < hazard.common.radius + HAZARD_MARGIN {
            steer += away.normalize_or_zero() * 1.5;
        }
    }

    steer += steer.perp() * sway(bot_id, state.clock);

    let direction = steer.normalize_or_zero();
    DirectionalInput::from_direction(direction.x, direction.y, DEAD_ZONE)
}

/// Sideways circling weight in `[-SWAY_WEIGHT, SWAY_WEIGHT]`.
///
/// Each seat sways at its own pace so bots don't mirror each other. Zero at
/// clock zero.
fn sway(bot_id: PlayerId, clock: f32) -> f32 {
    let pace = 1.0 + (bot_id % 4) as f32 * 0.23;
    (clock * SWAY_RATE * pace).sin() * SWAY_WEIGHT
}
