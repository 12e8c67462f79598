//! Calibration matrix and best-result tracking.

use core::fmt;

use cartprobe_bus::TimingParams;

/// Number of latency values swept (full 8-bit range).
pub const LATENCY_STEPS: usize = 256;

/// Minimum workable pulse width per latency value.
///
/// `None` means no tested pulse width reproduced the reference snapshot
/// for that latency. An out-of-band sentinel deliberately: the obvious
/// in-band 0xFF would collide with a legitimate minimum of 0xFF.
#[derive(Debug, Clone)]
pub struct CalibrationMatrix {
    min_pwd: [Option<u8>; LATENCY_STEPS],
}

impl CalibrationMatrix {
    /// Empty matrix, nothing tested yet.
    pub const fn new() -> Self {
        Self {
            min_pwd: [None; LATENCY_STEPS],
        }
    }

    /// Minimum workable pulse width for `latency`, if any was found.
    pub fn get(&self, latency: u8) -> Option<u8> {
        self.min_pwd[latency as usize]
    }

    /// Record a workable pulse width, keeping the minimum.
    pub fn record(&mut self, latency: u8, pulse_width: u8) {
        let slot = &mut self.min_pwd[latency as usize];
        match *slot {
            Some(current) if current <= pulse_width => {}
            _ => *slot = Some(pulse_width),
        }
    }

    /// If every entry in the `width`-wide block starting at `start` is
    /// present and identical, return that shared pulse width.
    pub fn block_uniform(&self, start: usize, width: usize) -> Option<u8> {
        let first = self.min_pwd[start]?;
        for &entry in &self.min_pwd[start..start + width] {
            if entry != Some(first) {
                return None;
            }
        }
        Some(first)
    }

    /// Fill every entry from `start` onward with `pulse_width`.
    pub fn fill_from(&mut self, start: usize, pulse_width: u8) {
        for slot in &mut self.min_pwd[start..] {
            *slot = Some(pulse_width);
        }
    }

    /// Iterate `(latency, entry)` pairs in ascending latency order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Option<u8>)> + '_ {
        self.min_pwd
            .iter()
            .enumerate()
            .map(|(lat, &pwd)| (lat as u8, pwd))
    }

    /// Number of latency values with a workable pulse width.
    pub fn successful(&self) -> usize {
        self.min_pwd.iter().filter(|e| e.is_some()).count()
    }
}

impl Default for CalibrationMatrix {
    fn default() -> Self {
        Self::new()
    }
}

/// The fastest working fine-parameter pair found by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestResult {
    /// Latency of the winning pair.
    pub latency: u8,
    /// Pulse width of the winning pair.
    pub pulse_width: u8,
}

impl BestResult {
    /// Scalar cost; lower is faster. Pulse width weighs double.
    pub const fn cost(&self) -> u32 {
        self.latency as u32 + 2 * self.pulse_width as u32
    }

    /// Full timing set for this pair (default coarse shape).
    pub const fn timing(&self) -> TimingParams {
        TimingParams::new(self.latency, self.pulse_width)
    }
}

impl fmt::Display for BestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LAT={:#04X}, PWD={:#04X}", self.latency, self.pulse_width)
    }
}
