//! Console collaborator seam.
//!
//! The session only ever produces plain text: status lines and the
//! timing matrix grid. Rendering is fire-and-forget; a console cannot
//! fail in a way the session would act on.

use core::fmt;

/// Plain-text display sink.
///
/// `clear` wipes the screen, formatted text accumulates through
/// [`fmt::Write`], and `present` pushes the accumulated frame out.
pub trait Console: fmt::Write {
    /// Wipe the screen and reset the cursor.
    fn clear(&mut self);

    /// Push the accumulated frame to the operator.
    fn present(&mut self);
}

/// Console that discards everything.
#[derive(Debug, Default)]
pub struct NullConsole;

impl fmt::Write for NullConsole {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

impl Console for NullConsole {
    fn clear(&mut self) {}
    fn present(&mut self) {}
}

/// Fixed-capacity capture console; keeps the current frame's text for
/// inspection. Used by unit tests and by headless environments that
/// want to scrape output.
pub struct CaptureConsole {
    buf: [u8; Self::CAPACITY],
    len: usize,
    /// Screens cleared so far.
    pub clears: usize,
    /// Frames presented so far.
    pub presents: usize,
}

impl CaptureConsole {
    const CAPACITY: usize = 4096;

    /// New empty console.
    pub const fn new() -> Self {
        Self {
            buf: [0; Self::CAPACITY],
            len: 0,
            clears: 0,
            presents: 0,
        }
    }

    /// Text of the current frame.
    pub fn text(&self) -> &str {
        // Only &str bytes are ever appended.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Whether the current frame contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }
}

impl Default for CaptureConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for CaptureConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let room = Self::CAPACITY - self.len;
        let take = bytes.len().min(room);
        self.buf[self.len..self.len + take].copy_from_slice(&bytes[..take]);
        self.len += take;
        Ok(())
    }
}

impl Console for CaptureConsole {
    fn clear(&mut self) {
        self.len = 0;
        self.clears += 1;
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}
