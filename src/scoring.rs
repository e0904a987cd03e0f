//! Productivity scoring: fixed-weight linear combination of the four
//! weekly metrics, rounded to two decimal places.

const W_TASK: f64 = 0.4;
const W_SPEED: f64 = 0.2;
const W_PROFESSIONALISM: f64 = 0.2;
const W_ACTIVITY: f64 = 0.2;

/// Weighted productivity score. Inputs are not range-validated; callers may
/// submit out-of-range metrics and the result is not clamped.
pub fn calculate_productivity(task: f64, speed: f64, professionalism: f64, activity: f64) -> f64 {
    let score = task * W_TASK
        + speed * W_SPEED
        + professionalism * W_PROFESSIONALISM
        + activity * W_ACTIVITY;
    (score * 100.0).round() / 100.0
}
