//! Bounded retry loops.
//!
//! Polling in the data path is always bounded. Each attempt runs the probe
//! first and only waits if the probe came back empty, so a condition that
//! is already true costs no delay at all.

use embedded_hal::delay::DelayNs;

/// Run `probe` up to `attempts` times, returning its first `Some`.
#[inline]
pub(crate) fn bounded_retry<T, F>(attempts: u32, mut probe: F) -> Option<T>
where
    F: FnMut() -> Option<T>,
{
    (0..attempts).find_map(|_| probe())
}

/// Run `probe` up to `attempts` times with `delay_us` between tries.
///
/// A delay follows every unsuccessful attempt, including the last one.
pub(crate) fn bounded_retry_with_delay<T, F, D>(
    attempts: u32,
    delay: &mut D,
    delay_us: u32,
    mut probe: F,
) -> Option<T>
where
    F: FnMut() -> Option<T>,
    D: DelayNs + ?Sized,
{
    for _ in 0..attempts {
        if let Some(value) = probe() {
            return Some(value);
        }
        delay.delay_us(delay_us);
    }
    None
}
