//! Open-bus media presence detection.
//!
//! With no media attached, a bus read returns the low 16 bits of the
//! requested address (the "open-bus echo"), possibly shifted within the
//! returned word depending on the electrical behavior of the interface.
//! The detector samples four words at the start of the device space and
//! checks a configurable subset of them against that echo.

use crate::bus::CartBus;
use crate::{DEVICE_BASE, TRANSFER_GRANULE};

/// Number of 32-bit words sampled at the start of the device space.
pub const PROBE_WORDS: usize = 4;

/// Open-bus presence probe.
///
/// Only two of the four sampled words are checked by default (indices
/// 0 and 2); the pair is empirically tuned and kept configurable for
/// other bus hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceProbe {
    /// Indices (into the sampled words) that are checked.
    pub checked: [usize; 2],
}

impl Default for PresenceProbe {
    fn default() -> Self {
        Self { checked: [0, 2] }
    }
}

impl PresenceProbe {
    /// Decide whether media is attached.
    ///
    /// One granule-sized read covers all four sampled words. For each
    /// checked word, both 16-bit halves are compared against the word's
    /// own absolute address low 16 bits; a word deviating in *both*
    /// halves asserts presence. If every checked word matches the echo
    /// in at least one half, the bus is open and media is absent. The
    /// half-ambiguity deliberately tolerates byte-order shifts instead
    /// of requiring one exact echo position.
    pub fn is_present<B: CartBus>(&self, bus: &mut B) -> bool {
        let mut buf = [0u8; TRANSFER_GRANULE];
        bus.transfer(&mut buf, 0);

        for &idx in &self.checked {
            debug_assert!(idx < PROBE_WORDS);
            let byte = idx * 4;
            let word = u32::from_be_bytes([buf[byte], buf[byte + 1], buf[byte + 2], buf[byte + 3]]);

            let address = DEVICE_BASE + byte as u32;
            let echo = (address & 0xFFFF) as u16;

            let lower = word as u16;
            let upper = (word >> 16) as u16;

            if lower != echo && upper != echo {
                // Neither half carries the echo: something answered.
                return true;
            }
        }

        false
    }
}

/// Presence check with the default probe configuration.
pub fn is_present<B: CartBus>(bus: &mut B) -> bool {
    PresenceProbe::default().is_present(bus)
}
