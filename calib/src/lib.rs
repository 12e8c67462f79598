//! Timing Calibration Engine
//!
//! Finds the fastest stable bus timing for the attached media by
//! exhaustively sweeping the two fine timing parameters (latency,
//! pulse width; 256 × 256 combinations) and validating every candidate
//! against a reference snapshot captured at the slowest documented-safe
//! timing.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Calibration Pipeline                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  capture snapshot      sweep LAT 0..=255                     │
//! │  at SLOWEST      ───▶    sweep PWD 0..=255                   │
//! │  (ground truth)            trial read, byte-compare          │
//! │                            first success → matrix[LAT]       │
//! │                                                              │
//! │  early stop: a full block of identical matrix entries        │
//! │  fills the remainder and ends the sweep                      │
//! │                                                              │
//! │  best (LAT, PWD) under cost = LAT + 2·PWD  →  report         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The matrix, snapshot and report are all fixed-size; the engine
//! allocates nothing and owns no hardware; it drives any
//! [`CartBus`](cartprobe_bus::CartBus) implementation.

#![no_std]

mod engine;
mod grade;
mod matrix;
mod snapshot;

pub use engine::{
    CalibConfig, CalibrationError, CalibrationObserver, CalibrationReport, Calibrator,
};
pub use grade::SpeedGrade;
pub use matrix::{BestResult, CalibrationMatrix, LATENCY_STEPS};
pub use snapshot::{ReferenceSnapshot, BYTES_PER_LOCATION, LOCATION_SPACING, TEST_LOCATIONS};
