//! Point formulas for the three game modes. Every winning answer is worth at least
//! [`MIN_POINTS`].

pub const MIN_POINTS: u32 = 10;

const SPEED_BONUS_MAX: i64 = 50;
const MS_PER_BONUS_POINT: u64 = 100;

/// Points for a correct practice answer: `difficulty * 10` plus a speed bonus that
/// starts at 50 and loses one point per 100ms taken.
pub fn practice_score(difficulty: u8, time_taken_ms: u64) -> u32 {
    let base = u32::from(difficulty.clamp(1, 5)) * 10;
    let elapsed_points = i64::try_from(time_taken_ms / MS_PER_BONUS_POINT).unwrap_or(i64::MAX);
    let speed_bonus = (SPEED_BONUS_MAX - elapsed_points).clamp(0, SPEED_BONUS_MAX);
    base + speed_bonus as u32
}

pub fn hangman_score(wrong_guesses: u32) -> u32 {
    100u32
        .saturating_sub(wrong_guesses.saturating_mul(10))
        .max(MIN_POINTS)
}

/// `attempts` counts the winning attempt, so a first-try win carries no penalty.
pub fn missing_letter_score(attempts: u32, num_missing: u32) -> u32 {
    let earned = 50i64 * i64::from(num_missing) - i64::from(attempts.saturating_sub(1)) * 15;
    earned.max(i64::from(MIN_POINTS)) as u32
}
