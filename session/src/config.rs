//! Session configuration.

use cartprobe_bus::{PresenceProbe, TimingParams};
use cartprobe_calib::CalibConfig;

/// Compiled-in default fine timing, applied before any calibration has
/// run. Reference-safe on any media.
pub const DEFAULT_LATENCY: u8 = 0xFF;
pub const DEFAULT_PULSE_WIDTH: u8 = 0xFF;

/// Session tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Timing applied at Init, before any calibration.
    pub default_timing: TimingParams,
    /// Whether the suspension trap is engaged at all. When false, Init
    /// skips straight to Detect and Test ends in Hold.
    pub hotswap_enabled: bool,
    /// Presence probe configuration.
    pub probe: PresenceProbe,
    /// Calibration sweep configuration.
    pub calib: CalibConfig,
    /// Busy-wait spins between presence polls in SafeToRemove.
    pub poll_spins: u32,
    /// Busy-wait spins after identity read, before Test.
    pub settle_spins: u32,
    /// Busy-wait spins on the result screen, before SafeToRemove.
    pub result_spins: u32,
    /// Busy-wait spins between state-machine steps in [`run`].
    ///
    /// [`run`]: crate::Session::run
    pub idle_spins: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_timing: TimingParams::new(DEFAULT_LATENCY, DEFAULT_PULSE_WIDTH),
            hotswap_enabled: cfg!(not(feature = "no-hotswap")),
            probe: PresenceProbe::default(),
            calib: CalibConfig::default(),
            poll_spins: 100_000,
            settle_spins: 2_000_000,
            result_spins: 5_000_000,
            idle_spins: 10_000,
        }
    }
}

impl SessionConfig {
    /// Defaults with all delays zeroed; test harnesses step through
    /// states without burning cycles.
    pub fn immediate() -> Self {
        Self {
            poll_spins: 0,
            settle_spins: 0,
            result_spins: 0,
            idle_spins: 0,
            ..Self::default()
        }
    }
}

/// Bounded-rate busy wait.
pub(crate) fn delay(spins: u32) {
    for _ in 0..spins {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_is_reference_safe() {
        let config = SessionConfig::default();
        assert_eq!(config.default_timing, TimingParams::SLOWEST);
    }

    #[test]
    fn test_immediate_zeroes_delays() {
        let config = SessionConfig::immediate();
        assert_eq!(config.poll_spins, 0);
        assert_eq!(config.settle_spins, 0);
        assert_eq!(config.result_spins, 0);
        assert_eq!(config.idle_spins, 0);
        assert_eq!(config.calib, CalibConfig::default());
    }
}
