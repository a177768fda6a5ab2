use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::damage::apply_damage;
use crate::effects::BattleEffect;
use crate::fighter::Fighter;

use super::{
    HazardBehavior, HazardCommon, HazardContext, HazardDescriptor, HazardKind, HazardType,
    random_platform_point,
};

/// Interval timer shared by periodic hazards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicTrigger {
    pub interval: f32,
    /// Set on the frame the timer elapses, consumed by the collision check.
    pub pending: bool,
}

impl PeriodicTrigger {
    fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.05),
            pending: false,
        }
    }

    /// Advance the hazard timer. Returns `true` on the frame it elapses.
    fn tick(&mut self, common: &mut HazardCommon, dt: f32) -> bool {
        common.timer += dt;
        if common.timer >= self.interval {
            common.timer = 0.0;
            self.pending = true;
            return true;
        }
        false
    }

    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Launch applied to every fighter in range when a periodic hazard fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchProfile {
    /// Upward speed added on launch.
    pub force: f32,
    /// Vertical speed never ends below this after a launch.
    pub min_launch: f32,
    /// Horizontal speed along the launch direction is raised to at least this.
    pub spread: f32,
    pub damage: f32,
    pub stun: f32,
}

impl LaunchProfile {
    fn from_descriptor(desc: &HazardDescriptor, defaults: LaunchProfile) -> Self {
        Self {
            force: desc.force.unwrap_or(defaults.force),
            min_launch: desc.min_launch.unwrap_or(defaults.min_launch),
            spread: desc.spread.unwrap_or(defaults.spread),
            damage: desc.damage.unwrap_or(defaults.damage),
            stun: desc.stun.unwrap_or(defaults.stun),
        }
    }

    fn launch(&self, fighter: &mut Fighter, direction: Vec3, ctx: &mut HazardContext<'_>) {
        fighter.velocity.y = (fighter.velocity.y + self.force).max(self.min_launch);
        let along = fighter.velocity.dot(direction);
        if along < self.spread {
            fighter.velocity += direction * (self.spread - along);
        }
        if self.damage > 0.0 {
            apply_damage(fighter, self.damage, None, ctx.now, ctx.combat);
        }
        fighter.hitstun = fighter.hitstun.max(self.stun);
    }
}

/// Launch every fighter in reach, outward or along `direction`. Returns how many were hit.
fn launch_in_reach(
    common: &HazardCommon,
    launch: &LaunchProfile,
    direction: Option<Vec3>,
    fighters: &mut [Fighter],
    ctx: &mut HazardContext<'_>,
) -> usize {
    let mut launched = 0;
    for fighter in fighters.iter_mut() {
        if common.reach(fighter).is_none() {
            continue;
        }
        let dir = direction.unwrap_or_else(|| common.outward(fighter));
        launch.launch(fighter, dir, ctx);
        launched += 1;
    }
    if launched > 0 {
        tracing::debug!(
            hazard = %common.kind,
            hazard_id = common.id,
            launched,
            "Hazard launched fighters"
        );
    }
    launched
}

fn fire(
    common: &HazardCommon,
    launch: &LaunchProfile,
    direction: Option<Vec3>,
    fighters: &mut [Fighter],
    ctx: &mut HazardContext<'_>,
    shake: f32,
) {
    common.burst(ctx);
    if launch_in_reach(common, launch, direction, fighters, ctx) > 0 {
        ctx.shake.add(shake);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LavaBurst {
    pub trigger: PeriodicTrigger,
    pub launch: LaunchProfile,
}

impl LavaBurst {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let common = HazardCommon::new(id, HazardType::LavaBurst, desc, 3.0);
        let launch = LaunchProfile::from_descriptor(
            desc,
            LaunchProfile {
                force: 18.0,
                min_launch: 16.0,
                spread: 8.0,
                damage: 12.0,
                stun: 0.5,
            },
        );
        let hazard = Self {
            trigger: PeriodicTrigger::new(desc.interval.unwrap_or(4.0)),
            launch,
        };
        (common, HazardKind::LavaBurst(hazard))
    }
}

impl HazardBehavior for LavaBurst {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        self.trigger.tick(common, ctx.dt);
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if self.trigger.take() {
            fire(common, &self.launch, None, fighters, ctx, 0.35);
        }
    }
}

/// Erupts on an interval, then keeps spraying upward for a short while.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geyser {
    pub trigger: PeriodicTrigger,
    pub launch: LaunchProfile,
    pub spray_duration: f32,
    pub spray_left: f32,
}

impl Geyser {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Geyser, desc, 2.5);
        common.is_active = false;
        let launch = LaunchProfile::from_descriptor(
            desc,
            LaunchProfile {
                force: 24.0,
                min_launch: 22.0,
                spread: 2.0,
                damage: 4.0,
                stun: 0.2,
            },
        );
        let hazard = Self {
            trigger: PeriodicTrigger::new(desc.interval.unwrap_or(5.0)),
            launch,
            spray_duration: desc.duration.unwrap_or(0.8),
            spray_left: 0.0,
        };
        (common, HazardKind::Geyser(hazard))
    }
}

impl HazardBehavior for Geyser {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        self.spray_left = (self.spray_left - ctx.dt).max(0.0);
        if self.trigger.tick(common, ctx.dt) {
            self.spray_left = self.spray_duration;
        }
        common.is_active = self.spray_left > 0.0;
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if self.trigger.take() {
            fire(common, &self.launch, None, fighters, ctx, 0.25);
            common.affected_players = fighters
                .iter()
                .filter(|f| common.reach(f).is_some())
                .map(|f| f.id)
                .collect();
            return;
        }
        if !common.is_active {
            common.affected_players.clear();
            return;
        }
        // Fighters stepping into the spray get lifted without extra damage.
        for fighter in fighters.iter_mut() {
            let inside = common.reach(fighter).is_some();
            if common.mark_inside(fighter.id, inside) {
                fighter.velocity.y = fighter.velocity.y.max(self.launch.min_launch);
            }
        }
    }
}

/// Telegraphed strike at a random platform point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeTargeting {
    pub warning: f32,
    /// Seconds until the telegraphed strike lands.
    pub countdown: Option<f32>,
    pub strike_pending: bool,
}

impl StrikeTargeting {
    fn new(warning: f32) -> Self {
        Self {
            warning: warning.max(0.0),
            countdown: None,
            strike_pending: false,
        }
    }

    fn update(
        &mut self,
        trigger: &mut PeriodicTrigger,
        common: &mut HazardCommon,
        ctx: &mut HazardContext<'_>,
    ) {
        if let Some(left) = self.countdown {
            let left = left - ctx.dt;
            if left <= 0.0 {
                self.countdown = None;
                self.strike_pending = true;
            } else {
                self.countdown = Some(left);
            }
        } else if trigger.tick(common, ctx.dt) {
            trigger.pending = false;
            let target = random_platform_point(ctx, 0.8);
            common.position.x = target.x;
            common.position.z = target.z;
            self.countdown = Some(self.warning);
            ctx.effects.push(BattleEffect::Telegraph {
                hazard_id: common.id,
                kind: common.kind,
                position: common.position,
                radius: common.radius,
                delay: self.warning,
            });
        }
        common.is_active = self.countdown.is_some();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lightning {
    pub trigger: PeriodicTrigger,
    pub targeting: StrikeTargeting,
    pub launch: LaunchProfile,
}

impl Lightning {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Lightning, desc, 2.0);
        common.is_active = false;
        common.height = desc.height.unwrap_or(6.0);
        let launch = LaunchProfile::from_descriptor(
            desc,
            LaunchProfile {
                force: 12.0,
                min_launch: 12.0,
                spread: 10.0,
                damage: 15.0,
                stun: 0.8,
            },
        );
        let hazard = Self {
            trigger: PeriodicTrigger::new(desc.interval.unwrap_or(6.0)),
            targeting: StrikeTargeting::new(desc.warning.unwrap_or(1.0)),
            launch,
        };
        (common, HazardKind::Lightning(hazard))
    }
}

impl HazardBehavior for Lightning {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        self.targeting.update(&mut self.trigger, common, ctx);
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if std::mem::take(&mut self.targeting.strike_pending) {
            fire(common, &self.launch, None, fighters, ctx, 0.5);
        }
    }
}

/// Heavier, slower strike than lightning with a longer warning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeteorStrike {
    pub trigger: PeriodicTrigger,
    pub targeting: StrikeTargeting,
    pub launch: LaunchProfile,
}

impl MeteorStrike {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::MeteorStrike, desc, 3.5);
        common.is_active = false;
        common.height = desc.height.unwrap_or(6.0);
        let launch = LaunchProfile::from_descriptor(
            desc,
            LaunchProfile {
                force: 20.0,
                min_launch: 18.0,
                spread: 12.0,
                damage: 18.0,
                stun: 1.0,
            },
        );
        let hazard = Self {
            trigger: PeriodicTrigger::new(desc.interval.unwrap_or(9.0)),
            targeting: StrikeTargeting::new(desc.warning.unwrap_or(1.5)),
            launch,
        };
        (common, HazardKind::MeteorStrike(hazard))
    }
}

impl HazardBehavior for MeteorStrike {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        self.targeting.update(&mut self.trigger, common, ctx);
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if std::mem::take(&mut self.targeting.strike_pending) {
            fire(common, &self.launch, None, fighters, ctx, 0.7);
        }
    }
}

/// Glows while charging, then blasts everyone nearby outward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObeliskBlast {
    pub trigger: PeriodicTrigger,
    pub launch: LaunchProfile,
    /// Seconds before the blast during which the obelisk glows.
    pub charge_time: f32,
}

impl ObeliskBlast {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::ObeliskBlast, desc, 5.0);
        common.is_active = false;
        let launch = LaunchProfile::from_descriptor(
            desc,
            LaunchProfile {
                force: 8.0,
                min_launch: 8.0,
                spread: 18.0,
                damage: 10.0,
                stun: 0.5,
            },
        );
        let hazard = Self {
            trigger: PeriodicTrigger::new(desc.interval.unwrap_or(7.0)),
            launch,
            charge_time: desc.warning.unwrap_or(1.0),
        };
        (common, HazardKind::ObeliskBlast(hazard))
    }
}

impl HazardBehavior for ObeliskBlast {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        self.trigger.tick(common, ctx.dt);
        common.is_active = common.timer >= self.trigger.interval - self.charge_time;
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if self.trigger.take() {
            fire(common, &self.launch, None, fighters, ctx, 0.4);
        }
    }
}

/// Wide pulse that shoves everyone along the wind direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SandstormPulse {
    pub trigger: PeriodicTrigger,
    pub launch: LaunchProfile,
    pub direction: Vec3,
}

impl SandstormPulse {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let common = HazardCommon::new(id, HazardType::SandstormPulse, desc, 8.0);
        let launch = LaunchProfile::from_descriptor(
            desc,
            LaunchProfile {
                force: 6.0,
                min_launch: 6.0,
                spread: 14.0,
                damage: 4.0,
                stun: 0.2,
            },
        );
        let hazard = Self {
            trigger: PeriodicTrigger::new(desc.interval.unwrap_or(8.0)),
            launch,
            direction: horizontal_direction(desc.direction),
        };
        (common, HazardKind::SandstormPulse(hazard))
    }
}

impl HazardBehavior for SandstormPulse {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        self.trigger.tick(common, ctx.dt);
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if self.trigger.take() {
            fire(common, &self.launch, Some(self.direction), fighters, ctx, 0.3);
        }
    }
}

/// Normalized horizontal direction, +X when unset or degenerate.
pub(super) fn horizontal_direction(direction: Option<Vec3>) -> Vec3 {
    direction
        .map(|d| Vec3::new(d.x, 0.0, d.z).normalize_or_zero())
        .filter(|d| *d != Vec3::ZERO)
        .unwrap_or(Vec3::X)
}
