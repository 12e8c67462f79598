//! Breadcrumb trace log.
//!
//! Fixed-slot record of session milestones (state transitions, parks,
//! calibration outcomes) for post-mortem inspection; never shown to the
//! operator. Static messages only, no allocation.

use spin::Mutex;

const MAX_ENTRIES: usize = 64;

struct TraceLog {
    entries: [Option<&'static str>; MAX_ENTRIES],
    count: usize,
}

static LOG: Mutex<TraceLog> = Mutex::new(TraceLog {
    entries: [None; MAX_ENTRIES],
    count: 0,
});

/// Record a milestone. Silently drops once the slots are full.
pub fn trace(message: &'static str) {
    let mut log = LOG.lock();
    if log.count < MAX_ENTRIES {
        let idx = log.count;
        log.entries[idx] = Some(message);
        log.count += 1;
    }
}

/// Total recorded milestones (capped at the slot count).
pub fn count() -> usize {
    LOG.lock().count
}

/// Copy recorded milestones into `out`, returning how many were copied.
pub fn snapshot(out: &mut [Option<&'static str>]) -> usize {
    let log = LOG.lock();
    let n = log.count.min(out.len());
    out[..n].copy_from_slice(&log.entries[..n]);
    n
}

/// Drop all recorded milestones.
pub fn reset() {
    let mut log = LOG.lock();
    log.entries = [None; MAX_ENTRIES];
    log.count = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_records_in_order() {
        // Other tests may trace concurrently; assert relative order of
        // our own breadcrumbs rather than absolute slot positions.
        reset();
        trace("trace-test-first");
        trace("trace-test-second");

        let mut out = [None; MAX_ENTRIES];
        let n = snapshot(&mut out);
        let first = out[..n].iter().position(|&e| e == Some("trace-test-first"));
        let second = out[..n].iter().position(|&e| e == Some("trace-test-second"));
        assert!(first.unwrap() < second.unwrap());
    }
}
