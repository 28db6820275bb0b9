//! Exponential retry backoff with jitter.
//!
//! The delivery engine schedules a failed delivery's next attempt at
//! `now + retry_delay(attempt_count)`. The exact timing constants were not
//! part of the original contract, so they are configurable with the
//! conservative defaults below.

use std::time::Duration;

use rand::Rng;

/// Default retry budget per delivery.
pub const DEFAULT_MAX_ATTEMPTS: i64 = 5;

/// Default backoff base delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);

/// Default backoff cap.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);

/// Jitter applied to each delay: ±25 % of the capped exponential value.
pub const JITTER_FRACTION: f64 = 0.25;

/// Compute the delay before the given attempt is retried.
///
/// `attempt_count` is the number of attempts already made (1-based after the
/// first failure). The delay is `base * 2^(attempt_count - 1)`, jittered by
/// [`JITTER_FRACTION`], and never exceeds `cap`.
pub fn retry_delay(attempt_count: i64, base: Duration, cap: Duration) -> Duration {
    // Exponent is clamped so the f64 math cannot overflow for absurd inputs.
    let exponent = attempt_count.saturating_sub(1).clamp(0, 32) as i32;
    let raw = base.as_secs_f64() * 2f64.powi(exponent);
    let capped = raw.min(cap.as_secs_f64());

    let jitter = rand::rng().random_range(-JITTER_FRACTION..=JITTER_FRACTION);
    let jittered = (capped * (1.0 + jitter)).min(cap.as_secs_f64());

    // Keep the delay strictly positive so next_attempt_at always advances.
    Duration::from_secs_f64(jittered.max(base.as_secs_f64() * (1.0 - JITTER_FRACTION)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
