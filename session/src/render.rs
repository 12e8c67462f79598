//! Text screens: status lines and the timing matrix grid.

use cartprobe_bus::MediaIdentity;
use cartprobe_calib::{CalibrationMatrix, CalibrationReport, SpeedGrade};

use crate::console::Console;

/// Screen title, first line of every frame.
pub const TITLE: &str = "Cartridge Bus Timing Probe";

/// Matrix grid geometry: 256 latency values as 16 rows of 16.
const GRID_COLS: usize = 16;
const GRID_ROWS: usize = 16;

/// Render a full-screen status message.
pub fn status<C: Console>(con: &mut C, lines: &[&str]) {
    con.clear();
    let _ = writeln!(con, "{}", TITLE);
    for line in lines {
        let _ = writeln!(con);
        let _ = writeln!(con, "{}", line);
    }
    con.present();
}

fn media_line<C: Console>(con: &mut C, media: Option<&MediaIdentity>) {
    match media {
        Some(id) => {
            let _ = writeln!(con, "\nMedia: {}", id);
        }
        None => {
            let _ = writeln!(con, "\nMedia: <unknown>");
        }
    }
}

fn matrix_grid<C: Console>(con: &mut C, matrix: &CalibrationMatrix) {
    let _ = writeln!(con, "\nTiming matrix (LAT 0-255, min PWD):");

    let _ = write!(con, "      ");
    for col in 0..GRID_COLS {
        let _ = write!(con, " {:X} ", col);
    }
    let _ = writeln!(con);

    for row in 0..GRID_ROWS {
        let base = row * GRID_COLS;
        let _ = write!(con, "LAT{:02X}: ", base);
        for col in 0..GRID_COLS {
            match matrix.get((base + col) as u8) {
                Some(pwd) => {
                    let _ = write!(con, "{:02X} ", pwd);
                }
                None => {
                    let _ = write!(con, "-- ");
                }
            }
        }
        let _ = writeln!(con);
    }
}

/// Render the "new cartridge" screen shown while the bus settles.
pub fn detected<C: Console>(con: &mut C, id: &MediaIdentity) {
    con.clear();
    let _ = writeln!(con, "{}", TITLE);
    let _ = writeln!(con, "\nNew cartridge detected");
    let _ = writeln!(con, "Media: {}", id);
    con.present();
}

/// Render sweep progress: the grid as known so far.
pub fn progress<C: Console>(con: &mut C, media: Option<&MediaIdentity>, matrix: &CalibrationMatrix) {
    con.clear();
    let _ = writeln!(con, "{}", TITLE);
    media_line(con, media);
    matrix_grid(con, matrix);
    con.present();
}

/// Render the final result screen: grid, winning pair and grade.
pub fn results<C: Console>(
    con: &mut C,
    media: Option<&MediaIdentity>,
    report: &CalibrationReport,
    grade: SpeedGrade,
) {
    con.clear();
    let _ = writeln!(con, "{}", TITLE);
    media_line(con, media);
    matrix_grid(con, &report.matrix);
    let _ = writeln!(con, "\nBest overall speed:");
    let _ = writeln!(con, "{}", report.best);
    let _ = writeln!(con, "This media is {}", grade);
    con.present();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CaptureConsole;
    use cartprobe_calib::BestResult;

    #[test]
    fn test_status_screen() {
        let mut con = CaptureConsole::new();
        status(&mut con, &["Safe to remove cartridge"]);
        assert!(con.contains(TITLE));
        assert!(con.contains("Safe to remove cartridge"));
        assert_eq!(con.presents, 1);
    }

    #[test]
    fn test_grid_shows_entries_and_gaps() {
        let mut matrix = CalibrationMatrix::new();
        matrix.record(0x00, 0x12);
        matrix.record(0x1F, 0xFF);

        let mut con = CaptureConsole::new();
        progress(&mut con, None, &matrix);

        assert!(con.contains("LAT00: 12 -- "));
        assert!(con.contains("LAT10: "));
        assert!(con.contains("FF \n"));
        assert!(con.contains("Media: <unknown>"));
    }

    #[test]
    fn test_results_screen_names_best_and_grade() {
        let report = CalibrationReport {
            best: BestResult { latency: 0x40, pulse_width: 0x12 },
            matrix: CalibrationMatrix::new(),
        };
        let id = MediaIdentity::from_bytes(*b"GRID TEST           ");

        let mut con = CaptureConsole::new();
        results(&mut con, Some(&id), &report, SpeedGrade::Brisk);

        assert!(con.contains("Media: GRID TEST"));
        assert!(con.contains("LAT=0x40, PWD=0x12"));
        assert!(con.contains("This media is brisk"));
    }
}
