//! Counter to needle angle mapping.
//!
//! The gauge page rotates its needle by `tanh(counter / 500) * 90` degrees.
//! The same mapping lives here so the server can log it and tests can pin it.

/// Counter value at which the needle reaches `tanh(1)` of full deflection.
pub const GAUGE_SCALE: f64 = 500.0;

/// Full deflection in degrees (either side of vertical).
pub const MAX_DEFLECTION_DEG: f64 = 90.0;

/// Largest angle the needle may report, a few ulps below full deflection.
const NEEDLE_LIMIT_DEG: f64 = MAX_DEFLECTION_DEG - MAX_DEFLECTION_DEG * f64::EPSILON;

/// Needle rotation in degrees for a counter value.
///
/// Monotonic, odd, and strictly inside `±MAX_DEFLECTION_DEG`. `tanh` rounds
/// to exactly 1.0 once `|counter|` passes roughly 9500, so the result is
/// clamped just short of full deflection from there on.
pub fn needle_angle(counter: i64) -> f64 {
    let angle = (counter as f64 / GAUGE_SCALE).tanh() * MAX_DEFLECTION_DEG;
    angle.clamp(-NEEDLE_LIMIT_DEG, NEEDLE_LIMIT_DEG)
}
