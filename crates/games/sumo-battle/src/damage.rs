use glam::Vec3;

use sumo_core::game_trait::PlayerId;

use crate::config::CombatConfig;
use crate::fighter::{Fighter, HitStreak};

/// Damage multiplier for the `count`-th consecutive hit from one attacker.
pub fn combo_multiplier(count: u32) -> f32 {
    match count {
        0 | 1 => 1.0,
        2 => 1.3,
        3 => 1.6,
        4 => 2.0,
        _ => 2.5,
    }
}

/// Apply `raw` damage to `victim` and return the damage actually dealt.
///
/// Hits from a player escalate through [`combo_multiplier`]; environmental
/// hits (`attacker == None`) never do. Damage is capped at `max_damage`.
pub fn apply_damage(
    victim: &mut Fighter,
    raw: f32,
    attacker: Option<PlayerId>,
    now: f32,
    combat: &CombatConfig,
) -> f32 {
    let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };

    let multiplier = match attacker {
        Some(attacker_id) => {
            let streak = victim
                .consecutive_hits
                .entry(attacker_id)
                .or_insert(HitStreak {
                    count: 0,
                    last_hit_time: now,
                });
            if now - streak.last_hit_time > combat.combo_reset_window {
                streak.count = 0;
            }
            streak.count += 1;
            streak.last_hit_time = now;
            combo_multiplier(streak.count)
        },
        None => 1.0,
    };

    let before = victim.damage;
    let final_damage = raw * multiplier;
    victim.damage = (victim.damage + final_damage).clamp(before, combat.max_damage.max(before));
    victim.last_hit_by = attacker;
    victim.hitstun = victim.hitstun.max(combat.hitstun_duration);
    victim.damage - before
}

/// Knockback force for a damage percentage, before speed and mass scaling.
pub fn knockback_force(damage: f32, combat: &CombatConfig) -> f32 {
    let curve = damage_curve(damage);
    combat.base_knockback + (combat.max_knockback - combat.base_knockback) * curve
}

fn damage_curve(damage: f32) -> f32 {
    (damage / 100.0).max(0.0).powf(1.5)
}

/// Launch `fighter` along the horizontal part of `direction`.
///
/// Returns the velocity change that was applied.
pub fn apply_knockback(
    fighter: &mut Fighter,
    direction: Vec3,
    impact_speed: f32,
    combat: &CombatConfig,
) -> Vec3 {
    let dir = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
    if dir == Vec3::ZERO || !impact_speed.is_finite() || impact_speed <= 0.0 {
        return Vec3::ZERO;
    }
    let speed_factor = if combat.knockback_reference_speed > 0.0 {
        (impact_speed / combat.knockback_reference_speed).min(combat.knockback_max_speed_factor)
    } else {
        combat.knockback_max_speed_factor
    };
    let curve = damage_curve(fighter.damage);
    let force = knockback_force(fighter.damage, combat) * speed_factor;

    let upward = force * combat.knockback_upward_ratio * curve;
    let delta = (dir * force + Vec3::Y * upward) / fighter.mass;
    fighter.velocity += delta;
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::test_fighter;

    fn combat() -> CombatConfig {
        CombatConfig::default()
    }

    #[test]
    fn combo_tiers() {
        let tiers: Vec<f32> = (1..=6).map(combo_multiplier).collect();
        assert_eq!(tiers, vec![1.0, 1.3, 1.6, 2.0, 2.5, 2.5]);
    }

    #[test]
    fn fifth_hit_within_window_is_two_and_a_half() {
        let cfg = combat();
        let mut victim = test_fighter(2, Vec3::ZERO);
        let mut dealt = Vec::new();
        for i in 0..5 {
            dealt.push(apply_damage(&mut victim, 1.0, Some(1), i as f32 * 0.5, &cfg));
        }
        assert!((dealt[4] - 2.5).abs() < 1e-5);
        assert_eq!(victim.consecutive_hits[&1].count, 5);
    }

    #[test]
    fn streak_resets_after_window() {
        let cfg = combat();
        let mut victim = test_fighter(2, Vec3::ZERO);
        for i in 0..5 {
            apply_damage(&mut victim, 1.0, Some(1), i as f32 * 0.1, &cfg);
        }
        let late = 0.4 + cfg.combo_reset_window + 0.01;
        let dealt = apply_damage(&mut victim, 1.0, Some(1), late, &cfg);
        assert!((dealt - 1.0).abs() < 1e-5);
        assert_eq!(victim.consecutive_hits[&1].count, 1);
    }

    #[test]
    fn streaks_are_per_attacker() {
        let cfg = combat();
        let mut victim = test_fighter(3, Vec3::ZERO);
        apply_damage(&mut victim, 1.0, Some(1), 0.0, &cfg);
        apply_damage(&mut victim, 1.0, Some(1), 0.1, &cfg);
        let dealt = apply_damage(&mut victim, 1.0, Some(2), 0.2, &cfg);
        assert!((dealt - 1.0).abs() < 1e-5);
        assert_eq!(victim.last_hit_by, Some(2));
    }

    #[test]
    fn environmental_damage_never_escalates() {
        let cfg = combat();
        let mut victim = test_fighter(2, Vec3::ZERO);
        for i in 0..6 {
            let dealt = apply_damage(&mut victim, 2.0, None, i as f32 * 0.1, &cfg);
            assert!((dealt - 2.0).abs() < 1e-5);
        }
        assert!(victim.consecutive_hits.is_empty());
        assert_eq!(victim.last_hit_by, None);
    }

    #[test]
    fn damage_caps_at_max() {
        let cfg = combat();
        let mut victim = test_fighter(2, Vec3::ZERO);
        victim.damage = 95.0;
        let dealt = apply_damage(&mut victim, 50.0, None, 0.0, &cfg);
        assert_eq!(victim.damage, cfg.max_damage);
        assert!((dealt - 5.0).abs() < 1e-5);
    }

    #[test]
    fn hitstun_keeps_longer_stun() {
        let cfg = combat();
        let mut victim = test_fighter(2, Vec3::ZERO);
        victim.hitstun = 1.5;
        apply_damage(&mut victim, 1.0, Some(1), 0.0, &cfg);
        assert_eq!(victim.hitstun, 1.5);

        victim.hitstun = 0.0;
        apply_damage(&mut victim, 1.0, Some(1), 0.0, &cfg);
        assert_eq!(victim.hitstun, cfg.hitstun_duration);
    }

    #[test]
    fn knockback_endpoints() {
        let cfg = combat();
        assert_eq!(knockback_force(0.0, &cfg), cfg.base_knockback);
        assert!((knockback_force(100.0, &cfg) - cfg.max_knockback).abs() < 1e-4);
    }

    #[test]
    fn knockback_is_horizontal_along_direction() {
        let cfg = combat();
        let mut fighter = test_fighter(1, Vec3::ZERO);
        let delta = apply_knockback(&mut fighter, Vec3::new(0.0, 5.0, -2.0), 10.0, &cfg);
        assert_eq!(delta.x, 0.0);
        assert!(delta.z < 0.0);
        // No damage means no upward share.
        assert_eq!(delta.y, 0.0);
        assert_eq!(fighter.velocity, delta);
    }

    #[test]
    fn full_damage_knockback_lifts_by_upward_ratio() {
        let cfg = combat();
        let mut fighter = test_fighter(1, Vec3::ZERO);
        fighter.damage = 100.0;
        fighter.mass = 2.0;
        let delta = apply_knockback(&mut fighter, Vec3::X, cfg.knockback_reference_speed, &cfg);
        let horizontal = cfg.max_knockback / 2.0;
        assert!((delta.x - horizontal).abs() < 1e-3);
        assert!((delta.y - horizontal * cfg.knockback_upward_ratio).abs() < 1e-3);
        assert_eq!(delta.z, 0.0);
    }

    #[test]
    fn knockback_zero_speed_is_noop() {
        let cfg = combat();
        let mut fighter = test_fighter(1, Vec3::ZERO);
        fighter.damage = 80.0;
        assert_eq!(apply_knockback(&mut fighter, Vec3::X, 0.0, &cfg), Vec3::ZERO);
        assert_eq!(fighter.velocity, Vec3::ZERO);
    }

    #[test]
    fn knockback_heavier_fighter_moves_less() {
        let cfg = combat();
        let mut light = test_fighter(1, Vec3::ZERO);
        let mut heavy = test_fighter(2, Vec3::ZERO);
        heavy.mass = 3.0;
        let light_delta = apply_knockback(&mut light, Vec3::X, 10.0, &cfg);
        let heavy_delta = apply_knockback(&mut heavy, Vec3::X, 10.0, &cfg);
        assert!(heavy_delta.length() < light_delta.length());
    }

    // ================================================================
    // Property-based tests (proptest)
    // ================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn damage_stays_in_bounds(
                hits in proptest::collection::vec(
                    (-50.0f32..200.0, proptest::option::of(1u64..=4), 0.0f32..2.0),
                    1..60,
                ),
            ) {
                let cfg = CombatConfig::default();
                let mut victim = test_fighter(9, Vec3::ZERO);
                let mut now = 0.0;
                let mut previous = victim.damage;
                for (raw, attacker, gap) in hits {
                    now += gap;
                    apply_damage(&mut victim, raw, attacker, now, &cfg);
                    prop_assert!(victim.damage >= 0.0);
                    prop_assert!(victim.damage <= cfg.max_damage);
                    prop_assert!(victim.damage >= previous, "damage decreased");
                    previous = victim.damage;
                }
            }

            #[test]
            fn knockback_monotonic_in_damage(
                low in 0.0f32..100.0,
                extra in 0.0f32..100.0,
                angle in 0.0f32..std::f32::consts::TAU,
                impact in 0.1f32..40.0,
            ) {
                let cfg = CombatConfig::default();
                let high = (low + extra).min(cfg.max_damage);
                let direction = Vec3::new(angle.cos(), 0.0, angle.sin());

                let mut a = test_fighter(1, Vec3::ZERO);
                a.damage = low;
                let mut b = test_fighter(2, Vec3::ZERO);
                b.damage = high;

                let weak = apply_knockback(&mut a, direction, impact, &cfg).length();
                let strong = apply_knockback(&mut b, direction, impact, &cfg).length();
                prop_assert!(strong + 1e-4 >= weak, "{strong} < {weak}");
            }
        }
    }
}
