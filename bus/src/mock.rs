//! Software-modelled cartridge bus for host-side tests.
//!
//! Models the three behaviors the real bus exhibits: stable data when
//! the applied timing is workable, noisy data when it is not, and the
//! open-bus address echo when no media is attached.

use crate::bus::{debug_check_transfer, CartBus};
use crate::identity::{NAME_LEN, NAME_OFFSET};
use crate::timing::TimingParams;
use crate::DEVICE_BASE;

/// Timing model: decides whether a (latency, pulse width) pair yields
/// stable reads on the modelled media.
pub type TimingModel = fn(u8, u8) -> bool;

/// Mock bus with an injected timing model.
pub struct MockBus {
    present: bool,
    echo_shifted: bool,
    name: [u8; NAME_LEN],
    timing_ok: TimingModel,
    timing: TimingParams,
    transfers: usize,
    remove_after: Option<usize>,
}

impl MockBus {
    /// New mock with media attached and a default header name.
    pub fn new(timing_ok: TimingModel) -> Self {
        Self {
            present: true,
            echo_shifted: false,
            name: *b"MOCK TEST MEDIA     ",
            timing_ok,
            timing: TimingParams::SLOWEST,
            transfers: 0,
            remove_after: None,
        }
    }

    /// Detach the media; reads return the open-bus echo.
    pub fn remove(&mut self) {
        self.present = false;
    }

    /// Reattach the media.
    pub fn insert(&mut self) {
        self.present = true;
    }

    /// Whether the modelled media is attached.
    pub fn is_attached(&self) -> bool {
        self.present
    }

    /// Override the header name field.
    pub fn set_name(&mut self, name: [u8; NAME_LEN]) {
        self.name = name;
    }

    /// Shift the open-bus echo into the upper half of each word, with a
    /// deviating lower half. Models the byte-order ambiguity the
    /// detector must tolerate.
    pub fn set_echo_shifted(&mut self, shifted: bool) {
        self.echo_shifted = shifted;
    }

    /// Detach the media automatically once `count` total transfers have
    /// run. Used to simulate removal mid-sweep.
    pub fn remove_after(&mut self, count: usize) {
        self.remove_after = Some(count);
    }

    /// Total transfers issued so far.
    pub fn transfers(&self) -> usize {
        self.transfers
    }

    /// Currently applied timing set.
    pub fn timing(&self) -> TimingParams {
        self.timing
    }

    /// Stable content of the modelled ROM at `offset`.
    fn rom_byte(&self, offset: u32) -> u8 {
        let name_end = NAME_OFFSET + NAME_LEN as u32;
        if offset >= NAME_OFFSET && offset < name_end {
            self.name[(offset - NAME_OFFSET) as usize]
        } else {
            (offset as u8) ^ ((offset >> 8) as u8) ^ 0xA3
        }
    }

    /// Open-bus echo for the 32-bit word containing `offset`.
    fn echo_word(&self, word_offset: u32) -> u32 {
        let address = DEVICE_BASE + word_offset;
        let echo = address & 0xFFFF;
        if self.echo_shifted {
            // Echo in the upper half only; lower half deviates.
            (echo << 16) | (!echo & 0xFFFF)
        } else {
            (echo << 16) | echo
        }
    }
}

impl CartBus for MockBus {
    fn set_timing(&mut self, timing: TimingParams) {
        self.timing = timing;
    }

    fn transfer(&mut self, dest: &mut [u8], offset: u32) {
        debug_check_transfer(dest.len(), offset);
        self.transfers += 1;
        if let Some(limit) = self.remove_after {
            if self.transfers >= limit {
                self.present = false;
            }
        }

        if !self.present {
            for (i, chunk) in dest.chunks_exact_mut(4).enumerate() {
                let word = self.echo_word(offset + (i as u32) * 4);
                chunk.copy_from_slice(&word.to_be_bytes());
            }
            return;
        }

        let stable = (self.timing_ok)(self.timing.latency, self.timing.pulse_width);
        // Unworkable timings return garbage varying with the transfer
        // counter, so a snapshot captured from corrupt data still fails
        // to reproduce itself on re-read.
        let noise = self.transfers as u8 | 1;
        for (i, byte) in dest.iter_mut().enumerate() {
            let good = self.rom_byte(offset + i as u32);
            *byte = if stable { good } else { good ^ noise };
        }
    }
}
