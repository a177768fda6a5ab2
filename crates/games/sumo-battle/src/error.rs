use sumo_core::game_trait::PlayerId;

/// Setup failures. The running simulation never produces these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BattleError {
    #[error("player {player_id} has mass {mass}; mass must be finite and greater than zero")]
    InvalidMass { player_id: PlayerId, mass: f32 },

    #[error("player {player_id} has move force {value}; expected a finite non-negative value")]
    InvalidMoveForce { player_id: PlayerId, value: f32 },

    #[error("need at least {min} players, got {got}")]
    NotEnoughPlayers { got: usize, min: usize },

    #[error("at most {max} players fit on the platform, got {got}")]
    TooManyPlayers { got: usize, max: usize },

    #[error("player id {player_id} is seated more than once")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("no arena themes available")]
    NoArenaThemes,

    #[error("invalid battle config: {0}")]
    InvalidConfig(String),
}
