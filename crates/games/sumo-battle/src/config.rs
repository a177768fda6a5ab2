use serde::{Deserialize, Serialize};

use crate::arena::{self, ArenaTheme};
use crate::error::BattleError;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "SUMO_BATTLE_CONFIG";
/// Config file read when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/battle.toml";

/// Data-driven configuration for the sumo battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub physics: PhysicsConfig,
    pub combat: CombatConfig,
    pub round: RoundConfig,
    pub arena: ArenaConfig,
}

/// Rigidbody integration tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration magnitude (units/s^2).
    pub gravity: f32,
    /// Velocity multiplier applied every frame (drag).
    pub air_resistance: f32,
    /// Fraction of horizontal speed lost per grounded frame.
    pub ground_friction: f32,
    /// Floor bounce coefficient.
    pub restitution: f32,
    /// Bounces slower than this come to rest.
    pub rest_speed: f32,
    /// Tolerance above rest height still counted as grounded.
    pub ground_epsilon: f32,
    /// Sphere radius shared by every fighter.
    pub player_radius: f32,
    /// Input scale while in hitstun.
    pub hitstun_input_multiplier: f32,
    /// Largest step accepted from the host; longer frames are clamped.
    pub max_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            air_resistance: 0.99,
            ground_friction: 0.08,
            restitution: 0.3,
            rest_speed: 0.5,
            ground_epsilon: 0.1,
            player_radius: 1.0,
            hitstun_input_multiplier: 0.3,
            max_dt: 0.1,
        }
    }
}

/// Damage, combo, and knockback tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub base_damage: f32,
    /// Upper bound of the random bonus added to base damage.
    pub damage_variation: f32,
    pub max_damage: f32,
    /// Seconds after which an attacker's hit streak on a victim expires.
    pub combo_reset_window: f32,
    pub hitstun_duration: f32,
    /// Approach speed below which collisions bounce without damage.
    pub min_collision_speed: f32,
    /// Fighter-vs-fighter bounce coefficient.
    pub player_restitution: f32,
    pub base_knockback: f32,
    pub max_knockback: f32,
    /// Vertical share of knockback at full damage curve.
    pub knockback_upward_ratio: f32,
    /// Impact speed that yields a 1x knockback speed factor.
    pub knockback_reference_speed: f32,
    pub knockback_max_speed_factor: f32,
    /// Camera shake raised per unit of impact speed.
    pub camera_shake_per_speed: f32,
    /// Camera shake lost per second.
    pub camera_shake_decay: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_damage: 5.0,
            damage_variation: 3.0,
            max_damage: 100.0,
            combo_reset_window: 3.0,
            hitstun_duration: 0.3,
            min_collision_speed: 2.0,
            player_restitution: 0.8,
            base_knockback: 6.0,
            max_knockback: 40.0,
            knockback_upward_ratio: 0.35,
            knockback_reference_speed: 10.0,
            knockback_max_speed_factor: 1.5,
            camera_shake_per_speed: 0.03,
            camera_shake_decay: 4.0,
        }
    }
}

/// How the next round's arena is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeSelection {
    #[default]
    Sequential,
    Random,
}

/// Round and match pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub round_win_target: u8,
    pub countdown_duration: f32,
    /// Pause between a round's end and the next countdown.
    pub round_end_delay: f32,
    pub max_round_duration: f32,
    pub theme_selection: ThemeSelection,
    /// Seed for every random draw in the simulation.
    pub seed: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_win_target: 3,
            countdown_duration: 3.0,
            round_end_delay: 3.0,
            max_round_duration: 90.0,
            theme_selection: ThemeSelection::Sequential,
            seed: 0x5EED,
        }
    }
}

/// Arena catalog. Themes listed here replace the built-in set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub themes: Vec<ArenaTheme>,
    /// Fall back to the built-in themes when `themes` is empty.
    pub include_builtin: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            themes: Vec::new(),
            include_builtin: true,
        }
    }
}

impl ArenaConfig {
    /// Themes that rounds cycle through.
    pub fn resolved_themes(&self) -> Vec<ArenaTheme> {
        if !self.themes.is_empty() {
            self.themes.clone()
        } else if self.include_builtin {
            arena::builtin_themes()
        } else {
            Vec::new()
        }
    }
}

impl BattleConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && let Some(config) = Self::read_file(&path)
        {
            return config;
        }
        Self::read_file(DEFAULT_CONFIG_PATH).unwrap_or_default()
    }

    fn read_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to parse battle config, using defaults");
                None
            },
        }
    }

    /// First tuning value that is NaN or infinite, by its TOML path.
    fn non_finite_field(&self) -> Option<&'static str> {
        let p = &self.physics;
        let c = &self.combat;
        let r = &self.round;
        [
            ("physics.gravity", p.gravity),
            ("physics.air_resistance", p.air_resistance),
            ("physics.ground_friction", p.ground_friction),
            ("physics.restitution", p.restitution),
            ("physics.rest_speed", p.rest_speed),
            ("physics.ground_epsilon", p.ground_epsilon),
            ("physics.player_radius", p.player_radius),
            ("physics.hitstun_input_multiplier", p.hitstun_input_multiplier),
            ("physics.max_dt", p.max_dt),
            ("combat.base_damage", c.base_damage),
            ("combat.damage_variation", c.damage_variation),
            ("combat.max_damage", c.max_damage),
            ("combat.combo_reset_window", c.combo_reset_window),
            ("combat.hitstun_duration", c.hitstun_duration),
            ("combat.min_collision_speed", c.min_collision_speed),
            ("combat.player_restitution", c.player_restitution),
            ("combat.base_knockback", c.base_knockback),
            ("combat.max_knockback", c.max_knockback),
            ("combat.knockback_upward_ratio", c.knockback_upward_ratio),
            ("combat.knockback_reference_speed", c.knockback_reference_speed),
            ("combat.knockback_max_speed_factor", c.knockback_max_speed_factor),
            ("combat.camera_shake_per_speed", c.camera_shake_per_speed),
            ("combat.camera_shake_decay", c.camera_shake_decay),
            ("round.countdown_duration", r.countdown_duration),
            ("round.round_end_delay", r.round_end_delay),
            ("round.max_round_duration", r.max_round_duration),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }

    /// Reject tuning values that would break the integrator or round flow.
    pub fn validate(&self) -> Result<(), BattleError> {
        let p = &self.physics;
        let c = &self.combat;
        let r = &self.round;

        if let Some(name) = self.non_finite_field() {
            return Err(BattleError::InvalidConfig(format!("{name} must be finite")));
        }

        let checks: [(bool, &str); 12] = [
            (
                p.gravity.is_finite() && p.gravity >= 0.0,
                "physics.gravity must be finite and >= 0",
            ),
            (
                p.air_resistance > 0.0 && p.air_resistance <= 1.0,
                "physics.air_resistance must be in (0, 1]",
            ),
            (
                (0.0..1.0).contains(&p.ground_friction),
                "physics.ground_friction must be in [0, 1)",
            ),
            (
                (0.0..=1.0).contains(&p.restitution),
                "physics.restitution must be in [0, 1]",
            ),
            (
                p.player_radius.is_finite() && p.player_radius > 0.0,
                "physics.player_radius must be > 0",
            ),
            (
                p.max_dt.is_finite() && p.max_dt > 0.0,
                "physics.max_dt must be > 0",
            ),
            (
                c.max_damage.is_finite() && c.max_damage > 0.0,
                "combat.max_damage must be > 0",
            ),
            (
                c.base_damage >= 0.0 && c.damage_variation >= 0.0,
                "combat damage values must be >= 0",
            ),
            (
                c.max_knockback >= c.base_knockback && c.base_knockback >= 0.0,
                "combat.max_knockback must be >= base_knockback >= 0",
            ),
            (
                (0.0..=1.0).contains(&c.player_restitution),
                "combat.player_restitution must be in [0, 1]",
            ),
            (r.round_win_target >= 1, "round.round_win_target must be >= 1"),
            (
                r.countdown_duration >= 0.0
                    && r.round_end_delay >= 0.0
                    && r.max_round_duration > 0.0,
                "round durations must be non-negative and max_round_duration > 0",
            ),
        ];
        if let Some((_, msg)) = checks.iter().find(|(ok, _)| !ok) {
            return Err(BattleError::InvalidConfig((*msg).to_string()));
        }

        let themes = self.arena.resolved_themes();
        if themes.is_empty() {
            return Err(BattleError::NoArenaThemes);
        }
        for theme in &themes {
            if !(theme.platform_radius.is_finite() && theme.platform_radius > 0.0) {
                return Err(BattleError::InvalidConfig(format!(
                    "arena '{}' needs a positive platform_radius",
                    theme.name
                )));
            }
            if theme.fall_threshold.is_nan() || theme.fall_threshold >= 0.0 {
                return Err(BattleError::InvalidConfig(format!(
                    "arena '{}' needs a fall_threshold below the platform",
                    theme.name
                )));
            }
        }
        Ok(())
    }
}
