//! Cartridge Bus Access Layer
//!
//! Raw access to the memory-mapped parallel cartridge bus: programmable
//! timing registers, blocking DMA-style transfers, open-bus media
//! detection and header identity reads.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Cartridge Bus Layer                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐                 │
//! │  │   Timing   │  │  CartBus   │  │  Detection │                 │
//! │  │            │  │   trait    │  │            │                 │
//! │  │ TimingParams│ │ set_timing │  │ PresenceProbe│               │
//! │  │ SLOWEST    │  │ transfer   │  │ MediaIdentity│               │
//! │  └────────────┘  └─────┬──────┘  └────────────┘                 │
//! │                        │                                        │
//! │             ┌──────────┴──────────┐                             │
//! │             │                     │                             │
//! │        ┌────▼─────┐         ┌─────▼────┐                        │
//! │        │ MmioBus  │         │ MockBus  │                        │
//! │        │ (target) │         │ (tests)  │                        │
//! │        └──────────┘         └──────────┘                        │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything above the [`CartBus`] trait is hardware-independent and
//! unit-testable on the host through the `mock` feature.

#![no_std]
#![cfg_attr(target_arch = "mips64", feature(asm_experimental_arch))]

mod bus;
mod detect;
mod identity;
mod timing;

#[cfg(target_arch = "mips64")]
mod mmio;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use bus::CartBus;
pub use detect::{is_present, PresenceProbe, PROBE_WORDS};
pub use identity::{MediaIdentity, NAME_LEN, NAME_OFFSET};
pub use timing::TimingParams;

#[cfg(target_arch = "mips64")]
pub use mmio::{MmioBus, PiStatus};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockBus;

/// Device address-space base as seen on the bus.
pub const DEVICE_BASE: u32 = 0x1000_0000;

/// Device address-space size (8 MiB).
pub const DEVICE_SIZE: u32 = 0x0080_0000;

/// Minimum transfer granularity of the bus engine, in bytes.
/// Every transfer length must be a positive multiple of this.
pub const TRANSFER_GRANULE: usize = 16;
