//! Calibration Session
//!
//! Drives the whole insertion/calibration/removal cycle as a state
//! machine over the bus, swap and calibration layers.
//!
//! # State machine
//!
//! ```text
//! ┌──────┐ park/resume ┌──────────────┐ absent  ┌────────┐
//! │ Init │────────────▶│ SafeToRemove │────────▶│ Detect │◀─┐
//! └──────┘             └──────▲───────┘         └───┬────┘  │
//!    │ (no-hotswap)           │                     │ identity read
//!    │                        │ done/failed         ▼        │ removed
//!    │                        │                 ┌───────┐    │
//!    └───────────────────────────────────────▶  │ Test  │────┘
//!                             │                 └───┬───┘
//!                             └─────────────────────┤ (no-hotswap)
//!                                                   ▼
//!                                                ┌──────┐
//!                                                │ Hold │──▶ stays
//!                                                └──────┘
//! ```
//!
//! The machine owns all mutable session state (current media identity,
//! last calibration report); a single logical task steps it, so nothing
//! here locks.

#![no_std]

mod config;
mod console;
mod render;
mod state;
pub mod trace;

pub use config::{SessionConfig, DEFAULT_LATENCY, DEFAULT_PULSE_WIDTH};
pub use console::{CaptureConsole, Console, NullConsole};
pub use state::{Session, SessionState};
