//! Media identity read from the device header.

use core::fmt;

use crate::bus::CartBus;

/// Device offset of the name field in the media header.
pub const NAME_OFFSET: u32 = 0x20;

/// Length of the name field, in bytes.
pub const NAME_LEN: usize = 20;

/// Granule-aligned read length covering the name field.
const NAME_READ_LEN: usize = 32;

/// Fixed-length text label from the media header.
///
/// Only valid while presence holds; the session discards it on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaIdentity {
    bytes: [u8; NAME_LEN],
}

impl MediaIdentity {
    /// Read the identity from the attached media.
    ///
    /// Returns `None` when the field contains no printable ASCII byte at
    /// all, which the caller treats as a transient misread (bus noise or
    /// a half-seated cartridge) rather than a valid blank name.
    pub fn read<B: CartBus>(bus: &mut B) -> Option<Self> {
        let mut raw = [0u8; NAME_READ_LEN];
        bus.transfer(&mut raw, NAME_OFFSET);

        let mut bytes = [0u8; NAME_LEN];
        bytes.copy_from_slice(&raw[..NAME_LEN]);

        let id = Self { bytes };
        if id.has_printable() {
            Some(id)
        } else {
            None
        }
    }

    /// Construct directly from raw header bytes.
    pub const fn from_bytes(bytes: [u8; NAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Raw header bytes.
    pub const fn as_bytes(&self) -> &[u8; NAME_LEN] {
        &self.bytes
    }

    /// Whether at least one byte is printable ASCII.
    pub fn has_printable(&self) -> bool {
        self.bytes.iter().any(|&b| is_printable(b))
    }
}

const fn is_printable(b: u8) -> bool {
    b >= 0x20 && b <= 0x7E
}

impl fmt::Display for MediaIdentity {
    /// Renders the label with non-printable bytes shown as `.`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bytes {
            let c = if is_printable(b) { b as char } else { '.' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;

    fn any_timing(_lat: u8, _pwd: u8) -> bool {
        true
    }

    #[test]
    fn test_read_header_name() {
        let mut bus = MockBus::new(any_timing);
        bus.set_name(*b"HOTSWAP TEST MEDIA  ");
        let id = MediaIdentity::read(&mut bus).unwrap();
        assert_eq!(id.as_bytes(), b"HOTSWAP TEST MEDIA  ");
    }

    #[test]
    fn test_all_zero_name_is_misread() {
        let mut bus = MockBus::new(any_timing);
        bus.set_name([0u8; NAME_LEN]);
        assert!(MediaIdentity::read(&mut bus).is_none());
    }

    #[test]
    fn test_single_printable_byte_is_enough() {
        let mut name = [0u8; NAME_LEN];
        name[7] = b'X';
        let mut bus = MockBus::new(any_timing);
        bus.set_name(name);
        assert!(MediaIdentity::read(&mut bus).is_some());
    }

    #[test]
    fn test_display_masks_unprintable() {
        let mut name = *b"AB                  ";
        name[2] = 0x01;
        let id = MediaIdentity::from_bytes(name);
        let mut out = [0u8; 64];
        let mut cur = Cursor { buf: &mut out, len: 0 };
        use core::fmt::Write;
        write!(cur, "{}", id).unwrap();
        assert!(core::str::from_utf8(&cur.buf[..cur.len]).unwrap().starts_with("AB."));
    }

    struct Cursor<'a> {
        buf: &'a mut [u8],
        len: usize,
    }

    impl core::fmt::Write for Cursor<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
            self.len += bytes.len();
            Ok(())
        }
    }
}
