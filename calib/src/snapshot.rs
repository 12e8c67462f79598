//! Reference snapshot: ground truth for one insertion cycle.

use cartprobe_bus::{CartBus, TimingParams};

/// Number of sampled locations.
pub const TEST_LOCATIONS: usize = 4;

/// Bytes read per location; a multiple of the transfer granule.
pub const BYTES_PER_LOCATION: usize = 128;

/// Byte spacing between consecutive sampled locations.
pub const LOCATION_SPACING: u32 = 128;

/// Device offset of location `i`.
pub(crate) const fn location_offset(i: usize) -> u32 {
    i as u32 * LOCATION_SPACING
}

/// Data read from the sampled locations at the slowest-safe timing.
///
/// Captured once per media-insertion cycle and treated as ground truth
/// for every trial in that cycle.
pub struct ReferenceSnapshot {
    blocks: [[u8; BYTES_PER_LOCATION]; TEST_LOCATIONS],
}

impl ReferenceSnapshot {
    /// Capture a snapshot. Applies [`TimingParams::SLOWEST`] first;
    /// the bus is left at that timing.
    pub fn capture<B: CartBus>(bus: &mut B) -> Self {
        bus.set_timing(TimingParams::SLOWEST);

        let mut blocks = [[0u8; BYTES_PER_LOCATION]; TEST_LOCATIONS];
        for (i, block) in blocks.iter_mut().enumerate() {
            bus.transfer(block, location_offset(i));
        }
        Self { blocks }
    }

    /// Re-read every sampled location under the currently applied
    /// timing and compare byte-for-byte. A trial succeeds only if all
    /// bytes of all locations match; any single mismatch fails it.
    pub fn matches<B: CartBus>(&self, bus: &mut B) -> bool {
        let mut scratch = [0u8; BYTES_PER_LOCATION];
        for (i, block) in self.blocks.iter().enumerate() {
            bus.transfer(&mut scratch, location_offset(i));
            if scratch != *block {
                return false;
            }
        }
        true
    }

    /// Captured bytes of location `i`.
    pub fn block(&self, i: usize) -> &[u8; BYTES_PER_LOCATION] {
        &self.blocks[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartprobe_bus::MockBus;

    fn always(_lat: u8, _pwd: u8) -> bool {
        true
    }

    fn never(_lat: u8, _pwd: u8) -> bool {
        false
    }

    #[test]
    fn test_capture_applies_slowest() {
        let mut bus = MockBus::new(always);
        bus.set_timing(TimingParams::new(0x10, 0x10));
        let _snap = ReferenceSnapshot::capture(&mut bus);
        assert_eq!(bus.timing(), TimingParams::SLOWEST);
    }

    #[test]
    fn test_matches_under_same_timing() {
        let mut bus = MockBus::new(always);
        let snap = ReferenceSnapshot::capture(&mut bus);
        assert!(snap.matches(&mut bus));
    }

    #[test]
    fn test_single_corrupt_byte_fails_trial() {
        // The mock corrupts every byte under a rejected timing, which
        // includes the first one; a trial must notice immediately.
        let mut bus = MockBus::new(never);
        let snap = {
            let mut clean = MockBus::new(always);
            ReferenceSnapshot::capture(&mut clean)
        };
        bus.set_timing(TimingParams::new(0x00, 0x00));
        assert!(!snap.matches(&mut bus));
    }

    #[test]
    fn test_locations_are_evenly_spaced() {
        assert_eq!(location_offset(0), 0);
        assert_eq!(location_offset(3), 3 * LOCATION_SPACING);
        assert_eq!(BYTES_PER_LOCATION % cartprobe_bus::TRANSFER_GRANULE, 0);
    }
}
