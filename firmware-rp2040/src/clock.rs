//! Monotonic clock for the engine's packet timeout.

use gcode_core::Clock;

/// [`Clock`] reading the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now_micros(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}
