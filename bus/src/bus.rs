//! The bus access seam.

use crate::timing::TimingParams;
use crate::{DEVICE_SIZE, TRANSFER_GRANULE};

/// Raw access to the cartridge bus.
///
/// Implemented by the hardware controller on the target and by
/// [`MockBus`](crate::MockBus) on the host. Everything above this trait
/// (detection, identity, calibration, the session machine) is written
/// against it and never touches hardware directly.
pub trait CartBus {
    /// Program the four timing registers as one atomic set.
    ///
    /// Takes effect on the next transfer. There is no validity check and
    /// no error path: an unworkable speed shows up only as corrupted or
    /// absent data in subsequent reads.
    fn set_timing(&mut self, timing: TimingParams);

    /// Move `dest.len()` bytes from device offset `offset` into `dest`.
    ///
    /// Blocks until the transfer engine reports completion. Normal
    /// interrupt handling is suspended for the duration so the transfer
    /// cannot be torn by the suspension trap.
    ///
    /// # Contract
    ///
    /// `dest.len()` must be a positive multiple of
    /// [`TRANSFER_GRANULE`](crate::TRANSFER_GRANULE) and
    /// `offset + dest.len()` must not exceed
    /// [`DEVICE_SIZE`](crate::DEVICE_SIZE). Violations are programming
    /// errors and are debug-asserted by implementations.
    fn transfer(&mut self, dest: &mut [u8], offset: u32);
}

/// Shared contract check for `transfer` implementations.
pub(crate) fn debug_check_transfer(len: usize, offset: u32) {
    debug_assert!(len > 0, "zero-length bus transfer");
    debug_assert!(len % TRANSFER_GRANULE == 0, "transfer length not granule-aligned");
    debug_assert!(
        offset as u64 + len as u64 <= DEVICE_SIZE as u64,
        "transfer past end of device address space"
    );
}
