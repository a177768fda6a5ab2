//! Arena hazards.
//!
//! Every hazard is a [`Hazard`]: shared [`HazardCommon`] state plus one
//! per-kind behavior struct implementing [`HazardBehavior`]. Kinds fall in
//! three families:
//!
//! - periodic ([`periodic`]): timer-driven bursts that launch everyone in range
//! - continuous ([`continuous`]): evaluated every frame with linear falloff
//! - one-shot ([`one_shot`]): fire once per continuous overlap

pub mod continuous;
pub mod one_shot;
pub mod periodic;

use std::collections::BTreeSet;

use glam::Vec3;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use sumo_core::game_trait::PlayerId;

use crate::config::CombatConfig;
use crate::effects::{BattleEffect, CameraShake};
use crate::fighter::Fighter;

use continuous::{
    Conveyor, IcePatch, LavaPool, Quicksand, Sinkhole, ToxicCloud, Tornado, Vortex, WindCurrent,
};
use one_shot::{BouncePad, Bumper, MirageTeleporter, Spikes, Sweeper, Teleporter};
use periodic::{Geyser, LavaBurst, Lightning, MeteorStrike, ObeliskBlast, SandstormPulse};

/// Hazard kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardType {
    LavaBurst,
    Geyser,
    Lightning,
    ObeliskBlast,
    SandstormPulse,
    MeteorStrike,
    IcePatch,
    Sinkhole,
    LavaPool,
    WindCurrent,
    Quicksand,
    Conveyor,
    Vortex,
    ToxicCloud,
    Tornado,
    Spikes,
    Teleporter,
    BouncePad,
    MirageTeleporter,
    Bumper,
    Sweeper,
}

impl HazardType {
    pub const ALL: [HazardType; 21] = [
        Self::LavaBurst,
        Self::Geyser,
        Self::Lightning,
        Self::ObeliskBlast,
        Self::SandstormPulse,
        Self::MeteorStrike,
        Self::IcePatch,
        Self::Sinkhole,
        Self::LavaPool,
        Self::WindCurrent,
        Self::Quicksand,
        Self::Conveyor,
        Self::Vortex,
        Self::ToxicCloud,
        Self::Tornado,
        Self::Spikes,
        Self::Teleporter,
        Self::BouncePad,
        Self::MirageTeleporter,
        Self::Bumper,
        Self::Sweeper,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LavaBurst => "lava_burst",
            Self::Geyser => "geyser",
            Self::Lightning => "lightning",
            Self::ObeliskBlast => "obelisk_blast",
            Self::SandstormPulse => "sandstorm_pulse",
            Self::MeteorStrike => "meteor_strike",
            Self::IcePatch => "ice_patch",
            Self::Sinkhole => "sinkhole",
            Self::LavaPool => "lava_pool",
            Self::WindCurrent => "wind_current",
            Self::Quicksand => "quicksand",
            Self::Conveyor => "conveyor",
            Self::Vortex => "vortex",
            Self::ToxicCloud => "toxic_cloud",
            Self::Tornado => "tornado",
            Self::Spikes => "spikes",
            Self::Teleporter => "teleporter",
            Self::BouncePad => "bounce_pad",
            Self::MirageTeleporter => "mirage_teleporter",
            Self::Bumper => "bumper",
            Self::Sweeper => "sweeper",
        }
    }

    /// Parse a descriptor tag. Case and `-`/`_` are not significant.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|kind| kind.as_str() == normalized)
    }
}

impl std::fmt::Display for HazardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal hazard entry from an arena theme. Unset fields use the kind's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardDescriptor {
    pub kind: String,
    pub position: Vec3,
    pub radius: Option<f32>,
    pub force: Option<f32>,
    pub interval: Option<f32>,
    pub damage: Option<f32>,
    pub stun: Option<f32>,
    pub destination: Option<Vec3>,
    pub direction: Option<Vec3>,
    pub friction: Option<f32>,
    pub strength: Option<f32>,
    pub height: Option<f32>,
    pub speed: Option<f32>,
    pub min_launch: Option<f32>,
    pub spread: Option<f32>,
    pub warning: Option<f32>,
    pub duration: Option<f32>,
}

impl HazardDescriptor {
    pub fn new(kind: &str, x: f32, z: f32) -> Self {
        Self {
            kind: kind.to_string(),
            position: Vec3::new(x, 0.0, z),
            ..Self::default()
        }
    }
}

/// State every hazard kind shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardCommon {
    pub id: u32,
    pub kind: HazardType,
    pub position: Vec3,
    pub radius: f32,
    /// Reach above the hazard's base.
    pub height: f32,
    /// Reach below the hazard's base.
    pub depth: f32,
    /// Seconds since creation or the last trigger.
    pub timer: f32,
    pub is_active: bool,
    /// Fighters currently inside, for one-shot edge detection.
    pub affected_players: BTreeSet<PlayerId>,
}

impl HazardCommon {
    fn new(id: u32, kind: HazardType, desc: &HazardDescriptor, radius: f32) -> Self {
        Self {
            id,
            kind,
            position: desc.position,
            radius: desc.radius.unwrap_or(radius).max(0.1),
            height: desc.height.unwrap_or(4.0),
            depth: 2.0,
            timer: 0.0,
            is_active: true,
            affected_players: BTreeSet::new(),
        }
    }

    /// Horizontal offset from the hazard center to `point`.
    pub fn offset(&self, point: Vec3) -> Vec3 {
        Vec3::new(point.x - self.position.x, 0.0, point.z - self.position.z)
    }

    /// Horizontal distance to `fighter` when it is alive and within reach.
    pub fn reach(&self, fighter: &Fighter) -> Option<f32> {
        if !fighter.alive {
            return None;
        }
        let distance = self.offset(fighter.position).length();
        let dy = fighter.position.y - self.position.y;
        (distance <= self.radius && dy <= self.height && dy >= -self.depth).then_some(distance)
    }

    /// `1 - distance / radius`, clamped to `[0, 1]`.
    pub fn falloff(&self, distance: f32) -> f32 {
        (1.0 - distance / self.radius).clamp(0.0, 1.0)
    }

    /// Horizontal unit vector from the center toward `fighter`, +X when centered.
    pub fn outward(&self, fighter: &Fighter) -> Vec3 {
        let offset = self.offset(fighter.position);
        if offset.length_squared() > 1e-8 {
            offset.normalize()
        } else {
            Vec3::X
        }
    }

    /// Track overlap for `player_id`. Returns `true` only on the entering frame.
    ///
    /// Leaving removes the entry immediately, re-arming the hazard.
    pub fn mark_inside(&mut self, player_id: PlayerId, inside: bool) -> bool {
        if inside {
            self.affected_players.insert(player_id)
        } else {
            self.affected_players.remove(&player_id);
            false
        }
    }

    fn burst(&self, ctx: &mut HazardContext<'_>) {
        ctx.effects.push(BattleEffect::HazardBurst {
            hazard_id: self.id,
            kind: self.kind,
            position: self.position,
        });
    }
}

/// Frame-scoped inputs and sinks handed to hazard behaviors.
pub struct HazardContext<'a> {
    pub dt: f32,
    /// Battle clock, used for combo timing.
    pub now: f32,
    pub platform_radius: f32,
    pub combat: &'a CombatConfig,
    pub rng: &'a mut StdRng,
    pub effects: &'a mut Vec<BattleEffect>,
    pub shake: &'a mut CameraShake,
}

/// Capabilities every hazard kind implements.
pub trait HazardBehavior {
    /// Advance timers and animation state.
    fn update(&mut self, common: &mut HazardCommon, ctx: &mut HazardContext<'_>) {
        common.timer += ctx.dt;
    }

    /// Apply this frame's effects to fighters within range.
    fn check_collision(
        &mut self,
        common: &mut HazardCommon,
        fighters: &mut [Fighter],
        ctx: &mut HazardContext<'_>,
    );

    /// Drop per-player bookkeeping for a fighter that left.
    fn forget(&mut self, _player_id: PlayerId) {}
}

/// Per-kind behavior state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    LavaBurst(LavaBurst),
    Geyser(Geyser),
    Lightning(Lightning),
    ObeliskBlast(ObeliskBlast),
    SandstormPulse(SandstormPulse),
    MeteorStrike(MeteorStrike),
    IcePatch(IcePatch),
    Sinkhole(Sinkhole),
    LavaPool(LavaPool),
    WindCurrent(WindCurrent),
    Quicksand(Quicksand),
    Conveyor(Conveyor),
    Vortex(Vortex),
    ToxicCloud(ToxicCloud),
    Tornado(Tornado),
    Spikes(Spikes),
    Teleporter(Teleporter),
    BouncePad(BouncePad),
    MirageTeleporter(MirageTeleporter),
    Bumper(Bumper),
    Sweeper(Sweeper),
}

impl HazardKind {
    fn behavior_mut(&mut self) -> &mut dyn HazardBehavior {
        match self {
            Self::LavaBurst(h) => h,
            Self::Geyser(h) => h,
            Self::Lightning(h) => h,
            Self::ObeliskBlast(h) => h,
            Self::SandstormPulse(h) => h,
            Self::MeteorStrike(h) => h,
            Self::IcePatch(h) => h,
            Self::Sinkhole(h) => h,
            Self::LavaPool(h) => h,
            Self::WindCurrent(h) => h,
            Self::Quicksand(h) => h,
            Self::Conveyor(h) => h,
            Self::Vortex(h) => h,
            Self::ToxicCloud(h) => h,
            Self::Tornado(h) => h,
            Self::Spikes(h) => h,
            Self::Teleporter(h) => h,
            Self::BouncePad(h) => h,
            Self::MirageTeleporter(h) => h,
            Self::Bumper(h) => h,
            Self::Sweeper(h) => h,
        }
    }
}

/// A live hazard on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub common: HazardCommon,
    pub kind: HazardKind,
}

impl Hazard {
    /// Build a hazard from a theme descriptor. Unknown kinds are skipped with a warning.
    pub fn from_descriptor(id: u32, desc: &HazardDescriptor) -> Option<Self> {
        let Some(kind) = HazardType::parse(&desc.kind) else {
            tracing::warn!(hazard = %desc.kind, "Skipping unknown hazard kind");
            return None;
        };
        let (common, behavior) = match kind {
            HazardType::LavaBurst => LavaBurst::build(id, desc),
            HazardType::Geyser => Geyser::build(id, desc),
            HazardType::Lightning => Lightning::build(id, desc),
            HazardType::ObeliskBlast => ObeliskBlast::build(id, desc),
            HazardType::SandstormPulse => SandstormPulse::build(id, desc),
            HazardType::MeteorStrike => MeteorStrike::build(id, desc),
            HazardType::IcePatch => IcePatch::build(id, desc),
            HazardType::Sinkhole => Sinkhole::build(id, desc),
            HazardType::LavaPool => LavaPool::build(id, desc),
            HazardType::WindCurrent => WindCurrent::build(id, desc),
            HazardType::Quicksand => Quicksand::build(id, desc),
            HazardType::Conveyor => Conveyor::build(id, desc),
            HazardType::Vortex => Vortex::build(id, desc),
            HazardType::ToxicCloud => ToxicCloud::build(id, desc),
            HazardType::Tornado => Tornado::build(id, desc),
            HazardType::Spikes => Spikes::build(id, desc),
            HazardType::Teleporter => Teleporter::build(id, desc),
            HazardType::BouncePad => BouncePad::build(id, desc),
            HazardType::MirageTeleporter => MirageTeleporter::build(id, desc),
            HazardType::Bumper => Bumper::build(id, desc),
            HazardType::Sweeper => Sweeper::build(id, desc),
        };
        Some(Self {
            common,
            kind: behavior,
        })
    }

    pub fn kind(&self) -> HazardType {
        self.common.kind
    }

    pub fn update(&mut self, ctx: &mut HazardContext<'_>) {
        self.kind.behavior_mut().update(&mut self.common, ctx);
    }

    pub fn check_collision(&mut self, fighters: &mut [Fighter], ctx: &mut HazardContext<'_>) {
        self.kind
            .behavior_mut()
            .check_collision(&mut self.common, fighters, ctx);
    }

    pub fn forget(&mut self, player_id: PlayerId) {
        self.common.affected_players.remove(&player_id);
        self.kind.behavior_mut().forget(player_id);
    }
}

/// Build runtime hazards for a theme, numbering them in order.
pub fn build_hazards(descriptors: &[HazardDescriptor]) -> Vec<Hazard> {
    descriptors
        .iter()
        .enumerate()
        .filter_map(|(i, desc)| Hazard::from_descriptor(i as u32, desc))
        .collect()
}

/// One hazard pass: clear surface flags, then update and evaluate every hazard.
pub fn run_hazards(hazards: &mut [Hazard], fighters: &mut [Fighter], ctx: &mut HazardContext<'_>) {
    for fighter in fighters.iter_mut() {
        fighter.surface.clear();
    }
    for hazard in hazards.iter_mut() {
        hazard.update(ctx);
        hazard.check_collision(fighters, ctx);
    }
}

/// Uniform random point on the platform within `fraction` of its radius, at height 0.
pub(crate) fn random_platform_point(ctx: &mut HazardContext<'_>, fraction: f32) -> Vec3 {
    use rand::Rng;
    let angle = ctx.rng.random_range(0.0..std::f32::consts::TAU);
    let distance = ctx.platform_radius * fraction * ctx.rng.random::<f32>().sqrt();
    Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::SeedableRng;

    use super::*;

    /// Owns everything a [`HazardContext`] borrows.
    pub struct Bench {
        pub combat: CombatConfig,
        pub rng: StdRng,
        pub effects: Vec<BattleEffect>,
        pub shake: CameraShake,
        pub now: f32,
    }

    impl Bench {
        pub fn new() -> Self {
            Self {
                combat: CombatConfig::default(),
                rng: StdRng::seed_from_u64(42),
                effects: Vec::new(),
                shake: CameraShake::default(),
                now: 0.0,
            }
        }

        /// Run one hazard frame: surface reset, update, then collision.
        pub fn step(&mut self, hazard: &mut Hazard, fighters: &mut [Fighter], dt: f32) {
            self.now += dt;
            let mut ctx = HazardContext {
                dt,
                now: self.now,
                platform_radius: 15.0,
                combat: &self.combat,
                rng: &mut self.rng,
                effects: &mut self.effects,
                shake: &mut self.shake,
            };
            run_hazards(std::slice::from_mut(hazard), fighters, &mut ctx);
        }
    }

    pub fn hazard(desc: HazardDescriptor) -> Hazard {
        Hazard::from_descriptor(0, &desc).unwrap()
    }
}
