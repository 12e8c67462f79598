//! The real watch-trap coordinator (target hardware only).
//!
//! No guarantees survive contact with this module: it reprograms the
//! processor's own fault machinery, parks in an assembly loop, and
//! relies on the chained watch intercept to pull execution back out.
//! If hotswap breaks on future hardware revisions, look here first.

use core::arch::{asm, global_asm};
use core::sync::atomic::{compiler_fence, Ordering};

use crate::except;
use crate::Hotswap;

/// Physical address of the boot-status register the privileged boot
/// routine polls; the watchpoint fires on reads of it.
const BOOT_STATUS_PHYS: u32 = 0x0404_0010;

/// WatchLo bit enabling the watchpoint for load accesses.
const WATCH_READ: u32 = 1 << 1;

/// Interrupt-controller mask register (uncached window).
const INTR_MASK: u32 = 0xA430_000C;

/// Mask-register write bits for the reset line.
const RESET_MASK_SET: u32 = 1 << 11;
const RESET_MASK_CLR: u32 = 1 << 10;

// The holding loop and its resume label. The loop never exits on its
// own; the watch intercept points EPC at the resume label, which simply
// returns to park's caller frame. Kept in assembly so nothing between
// the label and the return can be reordered or optimized away.
global_asm!(
    ".set noreorder",
    ".global __cartprobe_park_loop",
    "__cartprobe_park_loop:",
    "1:",
    "j 1b",
    "nop",
    ".global __cartprobe_park_resume",
    "__cartprobe_park_resume:",
    "jr $31",
    "nop",
    ".set reorder",
);

extern "C" {
    fn __cartprobe_park_loop();
    fn __cartprobe_park_resume();
}

#[inline]
fn cp0_status() -> u32 {
    let sr: u32;
    unsafe {
        asm!("mfc0 {sr}, $12", sr = out(reg) sr);
    }
    sr
}

#[inline]
fn cp0_set_watch_lo(value: u32) {
    unsafe {
        asm!("mtc0 {v}, $18", v = in(reg) value);
    }
}

fn reset_interrupt(enable: bool) {
    let bits = if enable { RESET_MASK_SET } else { RESET_MASK_CLR };
    unsafe {
        core::ptr::write_volatile(INTR_MASK as *mut u32, bits);
    }
}

/// The hardware suspension coordinator.
pub struct WatchTrap {
    _private: (),
}

impl WatchTrap {
    /// Take the coordinator.
    ///
    /// # Safety
    ///
    /// The caller must guarantee a single live instance, no nesting or
    /// concurrent `park` calls, a platform exception vector that routes
    /// through [`except::dispatch`], and interrupt handling quiesced
    /// around each `park` call.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Hotswap for WatchTrap {
    fn park(&mut self, on_reset: Option<fn()>, on_armed: Option<fn()>) {
        // The boot routine clobbers status; save it for the intercept
        // to restore into the trap frame.
        let sr = cp0_status();

        compiler_fence(Ordering::SeqCst);

        except::set_reset_hook(on_reset);
        reset_interrupt(on_reset.is_some());

        except::arm(sr, __cartprobe_park_resume as usize as u64);

        compiler_fence(Ordering::SeqCst);

        cp0_set_watch_lo(BOOT_STATUS_PHYS | WATCH_READ);

        if let Some(armed) = on_armed {
            armed();
        }

        compiler_fence(Ordering::SeqCst);

        // Only the watch intercept's EPC redirection gets us past this.
        unsafe {
            __cartprobe_park_loop();
        }

        compiler_fence(Ordering::SeqCst);

        // Disarm before anything else can touch the watched address.
        cp0_set_watch_lo(0);
        except::disarm();
        except::set_reset_hook(None);
    }
}
