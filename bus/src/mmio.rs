//! Memory-mapped bus controller (target hardware only).
//!
//! Drives the DMA engine of the parallel bus controller directly through
//! its uncached register window. The engine moves data between device
//! space and RAM outside the CPU cache hierarchy, so callers' buffers are
//! writeback-invalidated around every transfer.

use bitflags::bitflags;
use core::arch::asm;
use core::sync::atomic::{compiler_fence, Ordering};

use crate::bus::{debug_check_transfer, CartBus};
use crate::timing::TimingParams;
use crate::DEVICE_BASE;

/// Physical base of the bus controller register block.
const CONTROLLER_BASE: u32 = 0x0460_0000;

/// Uncached (KSEG1) window base.
const KSEG1: u32 = 0xA000_0000;

// Register offsets from CONTROLLER_BASE.
const REG_RAM_ADDR: u32 = 0x00;
const REG_BUS_ADDR: u32 = 0x04;
const REG_WRITE_LEN: u32 = 0x0C; // device -> RAM, length - 1
const REG_STATUS: u32 = 0x10;
const REG_LATENCY: u32 = 0x14;
const REG_PULSE_WIDTH: u32 = 0x18;
const REG_PAGE_SIZE: u32 = 0x1C;
const REG_RELEASE: u32 = 0x20;

bitflags! {
    /// Bus controller status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PiStatus: u32 {
        /// DMA transfer in flight.
        const DMA_BUSY = 1 << 0;
        /// Register IO in flight.
        const IO_BUSY = 1 << 1;
        /// Last transfer raised an error.
        const ERROR = 1 << 2;
    }
}

#[inline]
fn io_read(reg: u32) -> u32 {
    let addr = (CONTROLLER_BASE + reg) | KSEG1;
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

#[inline]
fn io_write(reg: u32, value: u32) {
    let addr = (CONTROLLER_BASE + reg) | KSEG1;
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

/// Disable interrupts, returning the previous status word.
#[inline]
fn interrupts_off() -> u32 {
    let sr: u32;
    unsafe {
        asm!(
            "mfc0 {sr}, $12",
            "and {tmp}, {sr}, {mask}",
            "mtc0 {tmp}, $12",
            sr = out(reg) sr,
            tmp = out(reg) _,
            mask = in(reg) !1u32, // clear IE
        );
    }
    sr
}

/// Restore a status word saved by [`interrupts_off`].
#[inline]
fn interrupts_restore(sr: u32) {
    unsafe {
        asm!("mtc0 {sr}, $12", sr = in(reg) sr);
    }
}

/// Writeback-invalidate the data cache lines covering `buf`.
fn cache_writeback_invalidate(buf: &[u8]) {
    const LINE: usize = 16;
    let start = buf.as_ptr() as usize & !(LINE - 1);
    let end = buf.as_ptr() as usize + buf.len();
    let mut line = start;
    while line < end {
        unsafe {
            // Hit-Writeback-Invalidate (D-cache).
            asm!("cache 0x15, 0({addr})", addr = in(reg) line);
        }
        line += LINE;
    }
}

/// The hardware bus controller.
///
/// There is exactly one controller; constructing more than one handle
/// breaks the non-reentrancy guarantees of [`transfer`](CartBus::transfer).
pub struct MmioBus {
    _private: (),
}

impl MmioBus {
    /// Take the controller.
    ///
    /// # Safety
    ///
    /// The caller must guarantee this is the only live handle and that
    /// nothing else programs the controller registers concurrently.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }

    /// Current status register contents.
    pub fn status(&self) -> PiStatus {
        PiStatus::from_bits_truncate(io_read(REG_STATUS))
    }

    /// Spin until the engine is idle.
    fn wait_idle(&self) {
        while self
            .status()
            .intersects(PiStatus::DMA_BUSY | PiStatus::IO_BUSY)
        {
            core::hint::spin_loop();
        }
    }
}

impl CartBus for MmioBus {
    fn set_timing(&mut self, timing: TimingParams) {
        io_write(REG_LATENCY, timing.latency as u32);
        io_write(REG_PULSE_WIDTH, timing.pulse_width as u32);
        io_write(REG_PAGE_SIZE, timing.page_size as u32);
        io_write(REG_RELEASE, timing.release_rate as u32);
    }

    fn transfer(&mut self, dest: &mut [u8], offset: u32) {
        debug_check_transfer(dest.len(), offset);

        cache_writeback_invalidate(dest);

        let sr = interrupts_off();
        self.wait_idle();

        compiler_fence(Ordering::SeqCst);
        // The engine takes the physical RAM address of the destination
        // and the absolute bus address of the source.
        io_write(REG_RAM_ADDR, dest.as_mut_ptr() as u32 & 0x1FFF_FFFF);
        compiler_fence(Ordering::SeqCst);
        io_write(REG_BUS_ADDR, offset | DEVICE_BASE);
        compiler_fence(Ordering::SeqCst);
        io_write(REG_WRITE_LEN, dest.len() as u32 - 1);
        compiler_fence(Ordering::SeqCst);

        self.wait_idle();
        interrupts_restore(sr);

        cache_writeback_invalidate(dest);
    }
}
