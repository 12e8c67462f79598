//! Bus timing parameter set.

use core::fmt;

/// Default coarse page-size register value.
const DEFAULT_PAGE_SIZE: u8 = 0x07;

/// Default coarse release-rate register value.
const DEFAULT_RELEASE_RATE: u8 = 0x03;

/// One complete set of bus timing register values.
///
/// Two fine parameters (latency, pulse width) and two coarse ones
/// (page size, release rate) together determine bus access speed.
/// The set is always applied atomically through
/// [`CartBus::set_timing`](crate::CartBus::set_timing) before any
/// transfer runs under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingParams {
    /// Fine: cycles before the first access strobe.
    pub latency: u8,
    /// Fine: width of the access strobe.
    pub pulse_width: u8,
    /// Coarse: page size for burst accesses.
    pub page_size: u8,
    /// Coarse: bus release rate.
    pub release_rate: u8,
}

impl TimingParams {
    /// Slowest documented-safe timing. Any functioning media must
    /// return stable data at this speed.
    pub const SLOWEST: Self = Self::new(0xFF, 0xFF);

    /// Create a timing set with the default coarse shape.
    pub const fn new(latency: u8, pulse_width: u8) -> Self {
        Self {
            latency,
            pulse_width,
            page_size: DEFAULT_PAGE_SIZE,
            release_rate: DEFAULT_RELEASE_RATE,
        }
    }

    /// Create a timing set with an explicit coarse shape.
    pub const fn with_shape(latency: u8, pulse_width: u8, page_size: u8, release_rate: u8) -> Self {
        Self {
            latency,
            pulse_width,
            page_size,
            release_rate,
        }
    }

    /// Whether this is the slowest-safe reference timing.
    pub const fn is_slowest(&self) -> bool {
        self.latency == 0xFF && self.pulse_width == 0xFF
    }
}

impl Default for TimingParams {
    fn default() -> Self {
        Self::SLOWEST
    }
}

impl fmt::Display for TimingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LAT={:#04X} PWD={:#04X} PGS={:#04X} RLS={:#04X}",
            self.latency, self.pulse_width, self.page_size, self.release_rate
        )
    }
}
