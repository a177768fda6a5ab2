/// Points for being the last fighter on the platform.
pub const ROUND_WIN_POINTS: i32 = 10;
/// Added on top of the round win when that round also decided the match.
pub const MATCH_WIN_BONUS: i32 = 5;
/// Points per opponent who fell while this fighter was their last hitter.
pub const RING_OUT_POINTS: i32 = 4;
/// Damage percentage an opponent must absorb for each pressure point.
pub const DAMAGE_PER_POINT: f32 = 25.0;
/// Pressure points never exceed this, so knockouts stay the stronger play.
pub const MAX_PRESSURE_POINTS: i32 = 4;
/// Still on the platform when the round ended without winning it.
pub const SURVIVAL_POINTS: i32 = 2;
/// Fell off with no opponent to credit.
pub const SELF_OUT_POINTS: i32 = -3;

/// What one fighter did during a round.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundTally {
    pub won_round: bool,
    pub won_match: bool,
    /// On the platform when the round ended.
    pub survived: bool,
    /// Fell without `last_hit_by` set.
    pub self_out: bool,
    pub knockouts: u32,
    pub damage_dealt: f32,
}

/// Pressure points for damage landed on opponents.
pub fn pressure_points(damage_dealt: f32) -> i32 {
    if !damage_dealt.is_finite() || damage_dealt <= 0.0 {
        return 0;
    }
    ((damage_dealt / DAMAGE_PER_POINT) as i32).min(MAX_PRESSURE_POINTS)
}

/// Round score for one fighter.
pub fn calculate_score(tally: &RoundTally) -> i32 {
    let mut score = tally.knockouts as i32 * RING_OUT_POINTS + pressure_points(tally.damage_dealt);
    if tally.won_round {
        score += ROUND_WIN_POINTS;
        if tally.won_match {
            score += MATCH_WIN_BONUS;
        }
    } else if tally.survived {
        score += SURVIVAL_POINTS;
    } else if tally.self_out {
        score += SELF_OUT_POINTS;
    }
    score
}
