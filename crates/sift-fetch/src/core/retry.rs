use std::time::Duration;

/// Delay before retry number `attempt` (0-indexed): `base * 2^attempt`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sift_fetch::retry_delay;
///
/// assert_eq!(retry_delay(0, Duration::from_millis(100)), Duration::from_millis(100));
/// assert_eq!(retry_delay(2, Duration::from_millis(100)), Duration::from_millis(400));
/// ```
pub fn retry_delay(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt))
}
