//! Coarse speed grading of a calibration result.
//!
//! Maps the winning pair onto a nine-band scale by nearest anchor,
//! summing the absolute latency and pulse-width distances. The anchor
//! table spans the full range from the reference speed down to the
//! theoretical floor.

use core::fmt;

use crate::matrix::BestResult;

/// Nine-band speed grade, slowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpeedGrade {
    /// At or near the reference speed.
    Glacial,
    /// Barely faster than reference.
    Crawling,
    /// Noticeably slow.
    Sluggish,
    /// Below average.
    Plodding,
    /// Middle of the range.
    Fair,
    /// Usable headroom.
    Capable,
    /// Comfortably fast.
    Brisk,
    /// Faster than typical media has any business being.
    Overachiever,
    /// The theoretical floor.
    Perfectionist,
}

/// Anchor pairs, index-matched to the grade bands (slowest first).
const ANCHOR_LAT: [u8; 9] = [0xFF, 0xE0, 0xC0, 0xA0, 0x80, 0x60, 0x40, 0x20, 0x00];
const ANCHOR_PWD: [u8; 9] = [0xFF, 0xD4, 0xA9, 0x7E, 0x53, 0x28, 0x12, 0x09, 0x00];

const GRADES: [SpeedGrade; 9] = [
    SpeedGrade::Glacial,
    SpeedGrade::Crawling,
    SpeedGrade::Sluggish,
    SpeedGrade::Plodding,
    SpeedGrade::Fair,
    SpeedGrade::Capable,
    SpeedGrade::Brisk,
    SpeedGrade::Overachiever,
    SpeedGrade::Perfectionist,
];

impl SpeedGrade {
    /// Grade a calibration result by nearest anchor (L1 distance).
    pub fn for_result(best: &BestResult) -> Self {
        let mut nearest = SpeedGrade::Glacial;
        let mut nearest_distance = u32::MAX;

        for (i, &grade) in GRADES.iter().enumerate() {
            let lat_diff = (best.latency as i32 - ANCHOR_LAT[i] as i32).unsigned_abs();
            let pwd_diff = (best.pulse_width as i32 - ANCHOR_PWD[i] as i32).unsigned_abs();
            let distance = lat_diff + pwd_diff;
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest = grade;
            }
        }
        nearest
    }

    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Glacial => "glacial",
            Self::Crawling => "crawling",
            Self::Sluggish => "sluggish",
            Self::Plodding => "plodding",
            Self::Fair => "fair",
            Self::Capable => "capable",
            Self::Brisk => "brisk",
            Self::Overachiever => "an overachiever",
            Self::Perfectionist => "a perfectionist",
        }
    }
}

impl fmt::Display for SpeedGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
