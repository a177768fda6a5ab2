use std::cmp::Ordering;

use glam::Vec3;
use rand::Rng;

use sumo_core::game_trait::PlayerId;

use crate::config::CombatConfig;
use crate::damage::{apply_damage, apply_knockback};
use crate::effects::{BattleEffect, CameraShake};
use crate::fighter::Fighter;

/// A damaging fighter-vs-fighter hit resolved this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub attacker: PlayerId,
    pub victim: PlayerId,
    pub damage: f32,
    pub impact_speed: f32,
}

/// Shared sinks for collision side effects.
pub struct CollisionSinks<'a, R: Rng> {
    pub rng: &'a mut R,
    pub effects: &'a mut Vec<BattleEffect>,
    pub shake: &'a mut CameraShake,
}

/// Resolve overlap between every unique pair of alive fighters.
pub fn resolve_collisions<R: Rng>(
    fighters: &mut [Fighter],
    now: f32,
    combat: &CombatConfig,
    sinks: &mut CollisionSinks<'_, R>,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    for j in 1..fighters.len() {
        let (head, tail) = fighters.split_at_mut(j);
        let b = &mut tail[0];
        for a in head.iter_mut() {
            if let Some(hit) = resolve_pair(a, b, now, combat, sinks) {
                hits.push(hit);
            }
        }
    }
    hits
}

fn resolve_pair<R: Rng>(
    a: &mut Fighter,
    b: &mut Fighter,
    now: f32,
    combat: &CombatConfig,
    sinks: &mut CollisionSinks<'_, R>,
) -> Option<Hit> {
    if !a.alive || !b.alive {
        return None;
    }
    let delta = b.position - a.position;
    let distance = delta.length();
    let contact = a.radius + b.radius;
    if !distance.is_finite() || distance >= contact {
        return None;
    }

    // Coincident centers separate along +X.
    let normal = if distance > 1e-6 { delta / distance } else { Vec3::X };
    let half_penetration = (contact - distance) * 0.5;
    a.position -= normal * half_penetration;
    b.position += normal * half_penetration;

    let approach = (b.velocity - a.velocity).dot(normal);
    if approach >= 0.0 {
        return None;
    }
    let impact_speed = -approach;

    let mut hit = None;
    if impact_speed > combat.min_collision_speed {
        let a_attacks = match a.momentum().partial_cmp(&b.momentum()) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => a.id < b.id,
        };
        let (attacker, victim) = if a_attacks {
            (&*a, &mut *b)
        } else {
            (&*b, &mut *a)
        };
        let attacker_id = attacker.id;
        let variation = if combat.damage_variation > 0.0 {
            sinks.rng.random_range(0.0..combat.damage_variation)
        } else {
            0.0
        };
        let raw = (combat.base_damage + variation) * (attacker.mass / victim.mass);
        let dealt = apply_damage(victim, raw, Some(attacker_id), now, combat);
        tracing::debug!(
            attacker = attacker_id,
            victim = victim.id,
            damage = dealt,
            impact_speed,
            "Collision hit"
        );
        hit = Some(Hit {
            attacker: attacker_id,
            victim: victim.id,
            damage: dealt,
            impact_speed,
        });
    }

    if let Some(hit) = &hit {
        let attacker = if hit.attacker == a.id { &mut *a } else { &mut *b };
        attacker.damage_dealt += hit.damage;
    }

    let impulse = -(1.0 + combat.player_restitution) * approach / (1.0 / a.mass + 1.0 / b.mass);
    a.velocity -= normal * (impulse / a.mass);
    b.velocity += normal * (impulse / b.mass);

    apply_knockback(a, -normal, impact_speed, combat);
    apply_knockback(b, normal, impact_speed, combat);

    if hit.is_some() {
        sinks.effects.push(BattleEffect::Impact {
            position: (a.position + b.position) * 0.5,
            speed: impact_speed,
        });
        sinks.shake.add(impact_speed * combat.camera_shake_per_speed);
    }
    hit
}
