//! Hotswap Suspension Coordinator
//!
//! Lets the operator physically disconnect and reconnect bus-attached
//! media while the processor keeps running, without the disconnection
//! being treated as a fatal bus fault.
//!
//! The real mechanism ([`WatchTrap`], target hardware only) parks
//! execution in a deliberately infinite holding loop and arms a hardware
//! watchpoint on a status register that the privileged boot routine is
//! known to poll. When the operator signals readiness, the watch
//! exception fires, and the chained handler redirects the trap's resume
//! address to the instruction after the loop, the only way out.
//!
//! ```text
//!  park()                                   watch exception
//!    │ save SR, chain handler                      │
//!    │ arm watchpoint ──────────────┐              │ restore saved SR
//!    ▼                              │              │ EPC ← resume label
//!  ┌──────────────┐                 │              ▼
//!  │ holding loop │ ◀── never exits on its own ─ resume label
//!  └──────────────┘                                │
//!                                disarm, unchain, return to caller
//! ```
//!
//! This deliberately manipulates the fault-handling machinery below the
//! platform's own safety guarantees. It is non-reentrant, must never be
//! nested, and is only sound with interrupt handling quiesced around the
//! arm/park/disarm region, which is why [`WatchTrap::new`] is `unsafe`.
//!
//! [`SimulatedSwap`] and [`NoSwap`] model the same contract for hosts
//! and for builds without physical hotswap.

#![no_std]
#![cfg_attr(target_arch = "mips64", feature(asm_experimental_arch))]

pub mod except;
mod sim;

#[cfg(target_arch = "mips64")]
mod mips;

pub use sim::{NoSwap, SimulatedSwap};

#[cfg(target_arch = "mips64")]
pub use mips::WatchTrap;

/// Suspension seam.
///
/// `park` is an opaque blocking operation with exactly one external
/// wakeup source: the operator's reset edge. It is not a cooperative
/// yield; callers must treat the whole call as a single atomic region
/// with respect to other fault or interrupt sources.
pub trait Hotswap {
    /// Park execution until the reset edge arrives.
    ///
    /// `on_reset`, if some, runs in the reset-signal handler context at
    /// the moment the operator signals readiness; afterwards normal flow
    /// resumes past `park`. When `on_reset` is none the reset interrupt
    /// is left disabled. `on_armed`, if some, runs once the watchpoint
    /// is armed but before the holding loop begins.
    fn park(&mut self, on_reset: Option<fn()>, on_armed: Option<fn()>);
}
