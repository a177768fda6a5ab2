use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::hazards::HazardDescriptor;

/// Static platform definition, fixed for the length of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTheme {
    pub name: String,
    pub platform_radius: f32,
    /// World Y below which a fighter is eliminated.
    pub fall_threshold: f32,
    pub hazards: Vec<HazardDescriptor>,
}

impl Default for ArenaTheme {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            platform_radius: 15.0,
            fall_threshold: -15.0,
            hazards: Vec::new(),
        }
    }
}

impl ArenaTheme {
    fn named(name: &str, hazards: Vec<HazardDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            hazards,
            ..Self::default()
        }
    }
}

fn at(kind: &str, x: f32, z: f32) -> HazardDescriptor {
    HazardDescriptor::new(kind, x, z)
}

/// The built-in catalog, in sequential rotation order.
pub fn builtin_themes() -> Vec<ArenaTheme> {
    vec![
        ArenaTheme::named("classic", Vec::new()),
        ArenaTheme::named(
            "volcano",
            vec![
                at("lava_burst", 5.0, -4.0),
                at("lava_pool", -5.0, 3.0),
                HazardDescriptor {
                    radius: Some(2.5),
                    ..at("meteor_strike", 0.0, 0.0)
                },
                at("spikes", 4.0, 5.0),
            ],
        ),
        ArenaTheme::named(
            "glacier",
            vec![
                HazardDescriptor {
                    radius: Some(5.0),
                    ..at("ice_patch", 0.0, 0.0)
                },
                at("ice_patch", 7.0, 5.0),
                at("bounce_pad", -8.0, -3.0),
                at("geyser", -2.0, 5.0),
                at("bumper", 6.0, -6.0),
            ],
        ),
        ArenaTheme::named(
            "desert",
            vec![
                HazardDescriptor {
                    radius: Some(6.0),
                    direction: Some(Vec3::new(1.0, 0.0, 0.3)),
                    ..at("sandstorm_pulse", 0.0, 0.0)
                },
                at("quicksand", 6.0, 4.0),
                at("sinkhole", -6.0, -5.0),
                at("obelisk_blast", -7.0, 5.0),
                HazardDescriptor {
                    direction: Some(Vec3::new(-1.0, 0.0, 0.0)),
                    ..at("conveyor", 4.0, -7.0)
                },
                at("mirage_teleporter", 10.0, -5.0),
            ],
        ),
        ArenaTheme::named(
            "storm",
            vec![
                at("lightning", 0.0, 0.0),
                HazardDescriptor {
                    direction: Some(Vec3::Z),
                    ..at("wind_current", -5.0, 0.0)
                },
                at("tornado", 6.0, 6.0),
                at("toxic_cloud", -6.0, -6.0),
                at("vortex", 6.0, -6.0),
            ],
        ),
        ArenaTheme::named(
            "cosmic",
            vec![
                HazardDescriptor {
                    destination: Some(Vec3::new(0.0, 0.0, -4.0)),
                    ..at("teleporter", 12.0, 0.0)
                },
                HazardDescriptor {
                    destination: Some(Vec3::new(0.0, 0.0, 4.0)),
                    ..at("teleporter", -12.0, 0.0)
                },
                at("sweeper", 0.0, 0.0),
                at("bumper", 5.0, -5.0),
                at("bumper", -5.0, 5.0),
            ],
        ),
    ]
}

/// Fighter spawns evenly spaced on a ring at 60% of the platform radius.
pub fn spawn_points(count: usize, platform_radius: f32, height: f32) -> Vec<Vec3> {
    let ring = platform_radius * 0.6;
    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU * (i as f32) / (count.max(1) as f32);
            Vec3::new(ring * angle.cos(), height, ring * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::hazards::{HazardType, build_hazards};

    #[test]
    fn builtin_catalog_covers_every_hazard_kind() {
        let themes = builtin_themes();
        let kinds: BTreeSet<HazardType> = themes
            .iter()
            .flat_map(|t| build_hazards(&t.hazards))
            .map(|h| h.kind())
            .collect();
        assert_eq!(kinds.len(), HazardType::ALL.len());
    }

    #[test]
    fn classic_comes_first_and_is_empty() {
        let themes = builtin_themes();
        assert_eq!(themes[0].name, "classic");
        assert!(themes[0].hazards.is_empty());
    }

    #[test]
    fn theme_names_are_unique() {
        let themes = builtin_themes();
        let names: BTreeSet<&str> = themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), themes.len());
    }

    #[test]
    fn builtin_hazards_sit_on_the_platform() {
        for theme in builtin_themes() {
            for desc in &theme.hazards {
                let d = Vec3::new(desc.position.x, 0.0, desc.position.z).length();
                assert!(
                    d < theme.platform_radius,
                    "{} in {} is off the platform",
                    desc.kind,
                    theme.name
                );
            }
        }
    }

    #[test]
    fn teleporters_never_land_on_another_teleporter() {
        for theme in builtin_themes() {
            let hazards = build_hazards(&theme.hazards);
            for h in &hazards {
                let crate::hazards::HazardKind::Teleporter(t) = &h.kind else {
                    continue;
                };
                for other in hazards.iter().filter(|o| o.kind() == HazardType::Teleporter) {
                    let gap = other.common.offset(t.destination).length();
                    assert!(gap > other.common.radius + t.jitter + 1.0);
                }
            }
        }
    }

    #[test]
    fn nobody_spawns_on_a_one_shot_hazard() {
        let one_shot = [
            HazardType::Spikes,
            HazardType::Teleporter,
            HazardType::BouncePad,
            HazardType::MirageTeleporter,
            HazardType::Bumper,
        ];
        for theme in builtin_themes() {
            let hazards = build_hazards(&theme.hazards);
            for count in 2..=4 {
                for spawn in spawn_points(count, theme.platform_radius, 1.0) {
                    for h in hazards.iter().filter(|h| one_shot.contains(&h.kind())) {
                        let gap = h.common.offset(spawn).length();
                        assert!(
                            gap > h.common.radius + 1.0,
                            "{} spawn overlaps {} in {}",
                            count,
                            h.kind(),
                            theme.name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn spawn_ring_is_even() {
        for count in [2, 3, 4] {
            let points = spawn_points(count, 15.0, 1.0);
            assert_eq!(points.len(), count);
            for p in &points {
                let d = Vec3::new(p.x, 0.0, p.z).length();
                assert!((d - 9.0).abs() < 1e-4);
                assert_eq!(p.y, 1.0);
            }
            for i in 0..count {
                for j in (i + 1)..count {
                    assert!(points[i].distance(points[j]) > 2.0);
                }
            }
        }
    }

    #[test]
    fn theme_parses_from_toml_with_defaults() {
        let theme: ArenaTheme = toml::from_str(
            r#"
            name = "pit"
            [[hazards]]
            kind = "spikes"
            position = [1.0, 0.0, 2.0]
            "#,
        )
        .unwrap();
        assert_eq!(theme.platform_radius, 15.0);
        assert_eq!(theme.fall_threshold, -15.0);
        assert_eq!(theme.hazards[0].position, Vec3::new(1.0, 0.0, 2.0));
    }
}
