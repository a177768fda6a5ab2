use std::collections::BTreeMap;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use sumo_core::game_trait::PlayerId;

use crate::damage::apply_damage;
use crate::fighter::Fighter;

use super::periodic::horizontal_direction;
use super::{HazardBehavior, HazardCommon, HazardContext, HazardDescriptor, HazardKind, HazardType};

/// Fires once per `interval` seconds of accumulated time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageTicker {
    pub interval: f32,
    pub elapsed: f32,
}

impl DamageTicker {
    fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.05),
            elapsed: 0.0,
        }
    }

    fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            return true;
        }
        false
    }
}

/// Low-friction patch. Overrides ground friction for the next integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IcePatch {
    pub friction: f32,
}

impl IcePatch {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let common = HazardCommon::new(id, HazardType::IcePatch, desc, 4.0);
        let hazard = Self {
            friction: desc.friction.unwrap_or(0.01).clamp(0.0, 1.0),
        };
        (common, HazardKind::IcePatch(hazard))
    }
}

impl HazardBehavior for IcePatch {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        _ctx: &mut HazardContext<'_>,
    ) {
        for fighter in fighters.iter_mut() {
            if common.reach(fighter).is_none() {
                continue;
            }
            let surface = &mut fighter.surface;
            surface.ice_friction = if surface.on_ice {
                surface.ice_friction.min(self.friction)
            } else {
                self.friction
            };
            surface.on_ice = true;
        }
    }
}

/// Drags fighters toward its center and down through the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sinkhole {
    pub strength: f32,
    /// Seconds each fighter has been held.
    pub held: BTreeMap<PlayerId, f32>,
}

impl Sinkhole {
    /// Minimum downward speed added per evaluated frame.
    pub fn min_pull(&self) -> f32 {
        (self.strength * 1.5).max(15.0)
    }

    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Sinkhole, desc, 3.0);
        // Keeps pulling until the fighter falls out of the world.
        common.depth = 40.0;
        let hazard = Self {
            strength: desc.strength.or(desc.force).unwrap_or(10.0).max(0.0),
            held: BTreeMap::new(),
        };
        (common, HazardKind::Sinkhole(hazard))
    }
}

impl HazardBehavior for Sinkhole {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let min_pull = self.min_pull();
        for fighter in fighters.iter_mut() {
            let Some(distance) = common.reach(fighter) else {
                self.held.remove(&fighter.id);
                continue;
            };
            let held = self.held.entry(fighter.id).or_insert(0.0);
            *held += ctx.dt;

            let toward = -common.offset(fighter.position).normalize_or_zero();
            let falloff = common.falloff(distance);
            fighter.velocity += toward * self.strength * (1.0 + falloff) * ctx.dt;

            let below_surface = fighter.position.y < common.position.y;
            let mut pull = min_pull * (1.0 + *held);
            if below_surface {
                pull *= 2.0;
            }
            fighter.velocity.y -= pull;
            fighter.surface.floorless = true;
        }
    }

    fn forget(&mut self, player_id: PlayerId) {
        self.held.remove(&player_id);
    }
}

/// Molten pool: periodic damage that grows toward the center, plus a bubbling lift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LavaPool {
    pub damage: f32,
    pub lift: f32,
    pub ticker: DamageTicker,
}

impl LavaPool {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let common = HazardCommon::new(id, HazardType::LavaPool, desc, 3.5);
        let hazard = Self {
            damage: desc.damage.unwrap_or(6.0),
            lift: desc.force.unwrap_or(8.0),
            ticker: DamageTicker::new(desc.interval.unwrap_or(0.5)),
        };
        (common, HazardKind::LavaPool(hazard))
    }
}

impl HazardBehavior for LavaPool {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let burn = self.ticker.tick(ctx.dt);
        for fighter in fighters.iter_mut() {
            let Some(distance) = common.reach(fighter) else {
                continue;
            };
            let falloff = common.falloff(distance);
            fighter.velocity.y += self.lift * falloff * ctx.dt;
            if burn {
                apply_damage(fighter, self.damage * falloff, None, ctx.now, ctx.combat);
            }
        }
    }
}

/// Steady push along a direction with a slow gust cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindCurrent {
    pub direction: Vec3,
    pub force: f32,
    pub gust_phase: f32,
}

impl WindCurrent {
    const GUST_RATE: f32 = 1.3;
    const GUST_SHARE: f32 = 0.3;

    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let common = HazardCommon::new(id, HazardType::WindCurrent, desc, 6.0);
        let hazard = Self {
            direction: horizontal_direction(desc.direction),
            force: desc.force.unwrap_or(12.0),
            gust_phase: 0.0,
        };
        (common, HazardKind::WindCurrent(hazard))
    }

    fn gust(&self) -> f32 {
        1.0 + Self::GUST_SHARE * self.gust_phase.sin()
    }
}

impl HazardBehavior for WindCurrent {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        common.timer += ctx.dt;
        self.gust_phase = (self.gust_phase + Self::GUST_RATE * ctx.dt) % std::f32::consts::TAU;
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let gust = self.gust();
        for fighter in fighters.iter_mut() {
            let Some(distance) = common.reach(fighter) else {
                continue;
            };
            let push = self.force * common.falloff(distance) * gust / fighter.mass;
            fighter.velocity += self.direction * push * ctx.dt;
        }
    }
}

/// Lowers fighters into the ground, slows them, and nibbles damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quicksand {
    pub sink_rate: f32,
    pub max_depth: f32,
    /// Horizontal speed lost per frame at the center.
    pub slow: f32,
    pub damage: f32,
    pub ticker: DamageTicker,
    pub depth: BTreeMap<PlayerId, f32>,
}

impl Quicksand {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Quicksand, desc, 3.0);
        common.depth = 3.0;
        let hazard = Self {
            sink_rate: desc.speed.unwrap_or(0.6),
            max_depth: 0.8,
            slow: desc.strength.unwrap_or(0.15).clamp(0.0, 1.0),
            damage: desc.damage.unwrap_or(2.0),
            ticker: DamageTicker::new(desc.interval.unwrap_or(1.0)),
            depth: BTreeMap::new(),
        };
        (common, HazardKind::Quicksand(hazard))
    }
}

impl HazardBehavior for Quicksand {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let bite = self.ticker.tick(ctx.dt);
        for fighter in fighters.iter_mut() {
            let Some(distance) = common.reach(fighter) else {
                self.depth.remove(&fighter.id);
                continue;
            };
            let falloff = common.falloff(distance);
            let depth = self.depth.entry(fighter.id).or_insert(0.0);
            *depth = (*depth + self.sink_rate * falloff.max(0.25) * ctx.dt).min(self.max_depth);
            fighter.surface.floor_drop = fighter.surface.floor_drop.max(*depth);

            let keep = 1.0 - self.slow * falloff;
            fighter.velocity.x *= keep;
            fighter.velocity.z *= keep;

            if bite && self.damage > 0.0 {
                apply_damage(fighter, self.damage, None, ctx.now, ctx.combat);
            }
        }
    }

    fn forget(&mut self, player_id: PlayerId) {
        self.depth.remove(&player_id);
    }
}

/// Moving belt that carries grounded fighters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conveyor {
    pub direction: Vec3,
    pub force: f32,
}

impl Conveyor {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Conveyor, desc, 3.0);
        common.height = desc.height.unwrap_or(2.0);
        let hazard = Self {
            direction: horizontal_direction(desc.direction),
            force: desc.force.or(desc.speed).unwrap_or(14.0),
        };
        (common, HazardKind::Conveyor(hazard))
    }
}

impl HazardBehavior for Conveyor {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        for fighter in fighters.iter_mut() {
            if !fighter.on_ground {
                continue;
            }
            let Some(distance) = common.reach(fighter) else {
                continue;
            };
            fighter.velocity += self.direction * self.force * common.falloff(distance) * ctx.dt;
        }
    }
}

/// Spins fighters around its center while drawing them in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vortex {
    pub pull: f32,
    pub spin: f32,
}

impl Vortex {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let common = HazardCommon::new(id, HazardType::Vortex, desc, 5.0);
        let hazard = Self {
            pull: desc.force.unwrap_or(10.0),
            spin: desc.strength.unwrap_or(16.0),
        };
        (common, HazardKind::Vortex(hazard))
    }
}

impl HazardBehavior for Vortex {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        for fighter in fighters.iter_mut() {
            let Some(distance) = common.reach(fighter) else {
                continue;
            };
            let outward = common.outward(fighter);
            let tangent = Vec3::new(-outward.z, 0.0, outward.x);
            let falloff = common.falloff(distance);
            fighter.velocity += (tangent * self.spin - outward * self.pull) * falloff * ctx.dt;
        }
    }
}

/// Drifting cloud that damages whoever lingers inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToxicCloud {
    pub damage: f32,
    pub ticker: DamageTicker,
    pub drift: Vec3,
}

impl ToxicCloud {
    /// Clouds bounce back before this share of the platform radius.
    const DRIFT_LIMIT: f32 = 0.8;

    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let common = HazardCommon::new(id, HazardType::ToxicCloud, desc, 3.0);
        let hazard = Self {
            damage: desc.damage.unwrap_or(3.0),
            ticker: DamageTicker::new(desc.interval.unwrap_or(1.0)),
            drift: horizontal_direction(desc.direction) * desc.speed.unwrap_or(1.5),
        };
        (common, HazardKind::ToxicCloud(hazard))
    }
}

impl HazardBehavior for ToxicCloud {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        common.timer += ctx.dt;
        common.position += self.drift * ctx.dt;
        let center_offset = Vec3::new(common.position.x, 0.0, common.position.z);
        let limit = ctx.platform_radius * Self::DRIFT_LIMIT;
        if center_offset.length() > limit {
            let normal = center_offset.normalize_or_zero();
            let outward_speed = self.drift.dot(normal);
            if outward_speed > 0.0 {
                self.drift -= normal * (2.0 * outward_speed);
            }
        }
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if !self.ticker.tick(ctx.dt) {
            return;
        }
        for fighter in fighters.iter_mut() {
            let Some(distance) = common.reach(fighter) else {
                continue;
            };
            let dealt = self.damage * common.falloff(distance).max(0.5);
            apply_damage(fighter, dealt, None, ctx.now, ctx.combat);
        }
    }
}

/// Wandering funnel that pulls fighters in and lifts them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tornado {
    pub pull: f32,
    pub lift: f32,
    pub speed: f32,
    pub heading: f32,
}

impl Tornado {
    const WANDER_LIMIT: f32 = 0.7;

    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Tornado, desc, 3.0);
        common.height = desc.height.unwrap_or(8.0);
        let direction = horizontal_direction(desc.direction);
        let hazard = Self {
            pull: desc.force.unwrap_or(14.0),
            lift: desc.strength.unwrap_or(20.0),
            speed: desc.speed.unwrap_or(2.0),
            heading: direction.z.atan2(direction.x),
        };
        (common, HazardKind::Tornado(hazard))
    }
}

impl HazardBehavior for Tornado {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        common.timer += ctx.dt;
        self.heading += ctx.rng.random_range(-1.0f32..1.0) * 2.0 * ctx.dt;
        let step = Vec3::new(self.heading.cos(), 0.0, self.heading.sin()) * self.speed * ctx.dt;
        common.position += step;
        let center_offset = Vec3::new(common.position.x, 0.0, common.position.z);
        if center_offset.length() > ctx.platform_radius * Self::WANDER_LIMIT {
            // Head back toward the middle.
            self.heading = (-center_offset.z).atan2(-center_offset.x);
        }
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        for fighter in fighters.iter_mut() {
            let Some(distance) = common.reach(fighter) else {
                continue;
            };
            let falloff = common.falloff(distance);
            let toward = -common.outward(fighter);
            fighter.velocity += toward * self.pull * falloff * ctx.dt;
            fighter.velocity.y += self.lift * falloff * ctx.dt;
        }
    }
}
