use glam::Vec3;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::damage::apply_damage;
use crate::effects::BattleEffect;
use crate::fighter::Fighter;

use super::{
    HazardBehavior, HazardCommon, HazardContext, HazardDescriptor, HazardKind, HazardType,
    random_platform_point,
};

/// Call `on_enter` for each fighter on the frame it enters reach.
///
/// Fighters that left reach are dropped from the affected set, re-arming the hazard.
fn for_each_entry(
    common: &mut HazardCommon,
    fighters: &mut [Fighter],
    ctx: &mut HazardContext<'_>,
    mut on_enter: impl FnMut(&HazardCommon, &mut Fighter, &mut HazardContext<'_>),
) {
    for fighter in fighters.iter_mut() {
        let inside = common.reach(fighter).is_some();
        if common.mark_inside(fighter.id, inside) {
            on_enter(&*common, fighter, &mut *ctx);
        }
    }
}

fn jitter(rng: &mut StdRng, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.random_range(-amount..=amount)
    } else {
        0.0
    }
}

/// Move `fighter` to `destination` plus horizontal jitter and stop it dead.
fn teleport(fighter: &mut Fighter, destination: Vec3, spread: f32, ctx: &mut HazardContext<'_>) {
    let mut to = destination;
    to.x += jitter(ctx.rng, spread);
    to.z += jitter(ctx.rng, spread);
    to.y = to.y.max(fighter.radius);
    let from = fighter.position;
    fighter.position = to;
    fighter.velocity = Vec3::ZERO;
    ctx.effects.push(BattleEffect::Teleport {
        player_id: fighter.id,
        from,
        to,
    });
    tracing::debug!(player_id = fighter.id, ?from, ?to, "Teleported fighter");
}

/// Heavy damage and a long stun that stops the fighter almost dead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spikes {
    pub damage: f32,
    pub stun: f32,
}

impl Spikes {
    /// Velocity share kept after landing on spikes.
    const VELOCITY_KEPT: f32 = 0.05;

    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Spikes, desc, 1.5);
        common.height = desc.height.unwrap_or(2.0);
        let hazard = Self {
            damage: desc.damage.unwrap_or(20.0),
            stun: desc.stun.unwrap_or(1.5),
        };
        (common, HazardKind::Spikes(hazard))
    }
}

impl HazardBehavior for Spikes {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let (damage, stun) = (self.damage, self.stun);
        for_each_entry(common, fighters, ctx, |common, fighter, ctx| {
            apply_damage(fighter, damage, None, ctx.now, ctx.combat);
            fighter.hitstun = fighter.hitstun.max(stun);
            fighter.velocity *= Self::VELOCITY_KEPT;
            common.burst(ctx);
            ctx.shake.add(0.2);
        });
    }
}

/// Sends fighters to a fixed destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Teleporter {
    pub destination: Vec3,
    pub jitter: f32,
}

impl Teleporter {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Teleporter, desc, 1.5);
        common.height = desc.height.unwrap_or(2.0);
        // Without an explicit destination, mirror across the arena center.
        let mirrored = Vec3::new(-desc.position.x, 0.0, -desc.position.z);
        let hazard = Self {
            destination: desc.destination.unwrap_or(mirrored),
            jitter: desc.spread.unwrap_or(0.5).max(0.0),
        };
        (common, HazardKind::Teleporter(hazard))
    }
}

impl HazardBehavior for Teleporter {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let (destination, spread) = (self.destination, self.jitter);
        for_each_entry(common, fighters, ctx, |_, fighter, ctx| {
            teleport(fighter, destination, spread, ctx);
        });
    }
}

/// Sets upward speed to at least `force`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BouncePad {
    pub force: f32,
}

impl BouncePad {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::BouncePad, desc, 1.5);
        common.height = desc.height.unwrap_or(1.5);
        let hazard = Self {
            force: desc.force.unwrap_or(22.0),
        };
        (common, HazardKind::BouncePad(hazard))
    }
}

impl HazardBehavior for BouncePad {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let force = self.force;
        for_each_entry(common, fighters, ctx, |common, fighter, ctx| {
            fighter.velocity.y = fighter.velocity.y.max(force);
            common.burst(ctx);
        });
    }
}

/// Teleporter that flickers in and out, sending fighters somewhere random.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirageTeleporter {
    /// Fixed destination; a random platform point when unset.
    pub destination: Option<Vec3>,
    pub period: f32,
    pub visible_share: f32,
    pub jitter: f32,
}

impl MirageTeleporter {
    /// Random destinations stay within this share of the platform radius.
    const DESTINATION_SPREAD: f32 = 0.7;

    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::MirageTeleporter, desc, 1.5);
        common.height = desc.height.unwrap_or(2.0);
        let hazard = Self {
            destination: desc.destination,
            period: desc.interval.unwrap_or(3.0).max(0.1),
            visible_share: desc
                .duration
                .map_or(0.7, |d| d / desc.interval.unwrap_or(3.0).max(0.1))
                .clamp(0.0, 1.0),
            jitter: desc.spread.unwrap_or(0.5).max(0.0),
        };
        (common, HazardKind::MirageTeleporter(hazard))
    }
}

impl HazardBehavior for MirageTeleporter {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        common.timer = (common.timer + ctx.dt) % self.period;
        common.is_active = common.timer < self.period * self.visible_share;
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        if !common.is_active {
            common.affected_players.clear();
            return;
        }
        let (fixed, spread) = (self.destination, self.jitter);
        for_each_entry(common, fighters, ctx, |_, fighter, ctx| {
            let destination = match fixed {
                Some(d) => d,
                None => random_platform_point(ctx, Self::DESTINATION_SPREAD),
            };
            teleport(fighter, destination, spread, ctx);
        });
    }
}

/// Solid post that flings fighters straight back out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bumper {
    pub bounce_speed: f32,
}

impl Bumper {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Bumper, desc, 1.2);
        common.height = desc.height.unwrap_or(2.5);
        let hazard = Self {
            bounce_speed: desc.force.or(desc.speed).unwrap_or(16.0),
        };
        (common, HazardKind::Bumper(hazard))
    }
}

impl HazardBehavior for Bumper {
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let bounce = self.bounce_speed;
        for_each_entry(common, fighters, ctx, |common, fighter, ctx| {
            let outward = common.outward(fighter);
            let rim = common.position + outward * common.radius;
            fighter.position.x = rim.x;
            fighter.position.z = rim.z;
            fighter.velocity.x = outward.x * bounce;
            fighter.velocity.z = outward.z * bounce;
            common.burst(ctx);
            ctx.shake.add(0.15);
        });
    }
}

/// Rotating arm that swats fighters it passes over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweeper {
    pub angle: f32,
    /// Radians per second; negative spins clockwise.
    pub angular_speed: f32,
    pub push: f32,
    pub damage: f32,
    pub arm_width: f32,
}

impl Sweeper {
    pub(super) fn build(id: u32, desc: &HazardDescriptor) -> (HazardCommon, HazardKind) {
        let mut common = HazardCommon::new(id, HazardType::Sweeper, desc, 7.0);
        common.height = desc.height.unwrap_or(2.0);
        let start = desc.direction.unwrap_or(Vec3::X);
        let hazard = Self {
            angle: start.z.atan2(start.x),
            angular_speed: desc.speed.unwrap_or(1.2),
            push: desc.force.unwrap_or(14.0),
            damage: desc.damage.unwrap_or(6.0),
            arm_width: 0.5,
        };
        (common, HazardKind::Sweeper(hazard))
    }

    fn arm(&self) -> Vec3 {
        Vec3::new(self.angle.cos(), 0.0, self.angle.sin())
    }

    /// Whether `fighter` touches the arm segment.
    fn touches(&self, common: &HazardCommon, fighter: &Fighter) -> bool {
        if common.reach(fighter).is_none() {
            return false;
        }
        let offset = common.offset(fighter.position);
        let arm = self.arm();
        let along = offset.dot(arm).clamp(0.0, common.radius);
        (offset - arm * along).length() <= self.arm_width + fighter.radius
    }
}

impl HazardBehavior for Sweeper {
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        common.timer += ctx.dt;
        self.angle = (self.angle + self.angular_speed * ctx.dt) % std::f32::consts::TAU;
    }

    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    ) {
        let arm = self.arm();
        let spin = self.angular_speed.signum();
        let tangent = Vec3::new(-arm.z, 0.0, arm.x) * spin;
        for fighter in fighters.iter_mut() {
            let contact = self.touches(common, fighter);
            if common.mark_inside(fighter.id, contact) {
                fighter.velocity += tangent * self.push;
                if self.damage > 0.0 {
                    apply_damage(fighter, self.damage, None, ctx.now, ctx.combat);
                }
                common.burst(ctx);
            }
        }
    }
}
