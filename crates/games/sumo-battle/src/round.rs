use serde::{Deserialize, Serialize};

use sumo_core::events::RoundEndReason;
use sumo_core::game_trait::PlayerId;

use crate::config::RoundConfig;
use crate::fighter::Fighter;

/// Coarse match phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    #[default]
    Waiting,
    Countdown,
    Active,
    RoundEnding,
    MatchEnded,
}

/// Round and match progression.
///
/// Timers are plain accumulators advanced by [`MatchState::tick`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: MatchPhase,
    /// 1-based; 0 before the match starts.
    pub current_round: u32,
    pub round_win_target: u32,
    pub round_winner: Option<PlayerId>,
    pub match_winner: Option<PlayerId>,
    /// Seconds the current round has been active.
    pub round_timer: f32,
    /// Seconds spent in the current countdown or round-ending phase.
    pub phase_timer: f32,
    pub last_end_reason: Option<RoundEndReason>,
}

/// A phase change produced by [`MatchState::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    RoundStarted,
    RoundEnded {
        reason: RoundEndReason,
        winner: Option<PlayerId>,
    },
    MatchEnded {
        winner: PlayerId,
    },
    /// The round-ending delay ran out without a match winner.
    NextRound,
}

/// A fighter that fell below the arena's fall threshold this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elimination {
    pub player_id: PlayerId,
    pub knocked_out_by: Option<PlayerId>,
}

impl MatchState {
    pub fn new(round_win_target: u32) -> Self {
        Self {
            round_win_target: round_win_target.max(1),
            ..Self::default()
        }
    }

    /// Start round 1's countdown.
    pub fn begin_match(&mut self) {
        *self = Self {
            phase: MatchPhase::Countdown,
            current_round: 1,
            ..Self::new(self.round_win_target)
        };
    }

    pub fn is_round_complete(&self) -> bool {
        matches!(self.phase, MatchPhase::RoundEnding | MatchPhase::MatchEnded)
    }

    /// Advance phase timers and report at most one transition.
    pub fn tick(
        &mut self,
        dt: f32,
        fighters: &mut [Fighter],
        alive_count: u32,
        config: &RoundConfig,
    ) -> Option<Transition> {
        match self.phase {
            MatchPhase::Waiting | MatchPhase::MatchEnded => None,
            MatchPhase::Countdown => {
                self.phase_timer += dt;
                if self.phase_timer < config.countdown_duration {
                    return None;
                }
                self.phase = MatchPhase::Active;
                self.phase_timer = 0.0;
                self.round_timer = 0.0;
                Some(Transition::RoundStarted)
            },
            MatchPhase::Active => {
                self.round_timer += dt;
                let (reason, winner) = if alive_count <= 1 {
                    match fighters.iter_mut().find(|f| f.alive) {
                        Some(survivor) if alive_count == 1 => {
                            survivor.round_wins += 1;
                            (RoundEndReason::LastStanding, Some(survivor.id))
                        },
                        _ => (RoundEndReason::Draw, None),
                    }
                } else if self.round_timer >= config.max_round_duration {
                    (RoundEndReason::Timeout, None)
                } else {
                    return None;
                };
                self.phase = MatchPhase::RoundEnding;
                self.phase_timer = 0.0;
                self.round_winner = winner;
                self.last_end_reason = Some(reason);
                Some(Transition::RoundEnded { reason, winner })
            },
            MatchPhase::RoundEnding => {
                self.phase_timer += dt;
                if self.phase_timer < config.round_end_delay {
                    return None;
                }
                let champion = self.round_winner.filter(|&id| {
                    fighters
                        .iter()
                        .any(|f| f.id == id && f.round_wins >= self.round_win_target)
                });
                if let Some(winner) = champion {
                    self.phase = MatchPhase::MatchEnded;
                    self.match_winner = Some(winner);
                    return Some(Transition::MatchEnded { winner });
                }
                self.phase = MatchPhase::Countdown;
                self.current_round += 1;
                self.phase_timer = 0.0;
                self.round_timer = 0.0;
                self.round_winner = None;
                Some(Transition::NextRound)
            },
        }
    }
}

/// Eliminate every alive fighter below `fall_threshold`, crediting knockouts.
///
/// Non-finite heights count as fallen. Already-eliminated fighters are skipped,
/// so calling this repeatedly is safe.
pub fn check_eliminations(fighters: &mut [Fighter], fall_threshold: f32) -> Vec<Elimination> {
    let mut eliminated = Vec::new();
    for fighter in fighters.iter_mut() {
        let y = fighter.position.y;
        if !fighter.alive || (y.is_finite() && y >= fall_threshold) {
            continue;
        }
        fighter.alive = false;
        fighter.velocity = glam::Vec3::ZERO;
        let credited = fighter.last_hit_by.filter(|&by| by != fighter.id);
        fighter.knocked_out_by = credited;
        eliminated.push(Elimination {
            player_id: fighter.id,
            knocked_out_by: credited,
        });
    }

    for elimination in &eliminated {
        if let Some(by) = elimination.knocked_out_by
            && let Some(attacker) = fighters.iter_mut().find(|f| f.id == by)
        {
            attacker.knockouts += 1;
        }
    }
    eliminated
}
