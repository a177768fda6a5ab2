use serde::{Deserialize, Serialize};

use crate::game_trait::PlayerId;

/// A local player seated for the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub color: PlayerColor,
    pub profile: FighterProfile,
    /// Driven by the built-in bot instead of a keyboard.
    pub is_bot: bool,
}

/// Physical build of a player's sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FighterProfile {
    /// Must be strictly positive.
    pub mass: f32,
    /// Force applied per held direction key.
    pub move_force: f32,
}

impl Default for FighterProfile {
    fn default() -> Self {
        Self {
            mass: 1.0,
            move_force: 40.0,
        }
    }
}

/// Sphere color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    /// One color per seat.
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor {
            r: 230,
            g: 57,
            b: 70,
        }, // Crimson
        PlayerColor {
            r: 69,
            g: 123,
            b: 157,
        }, // Steel blue
        PlayerColor {
            r: 244,
            g: 162,
            b: 97,
        }, // Sand
        PlayerColor {
            r: 42,
            g: 157,
            b: 143,
        }, // Jade
    ];

    /// Palette color for a zero-based seat index, wrapping around.
    pub fn for_seat(seat: usize) -> Self {
        Self::PALETTE[seat % Self::PALETTE.len()]
    }
}
