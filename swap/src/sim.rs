//! Host-side stand-ins for the watch-trap coordinator.

use crate::Hotswap;

/// Simulated suspension for non-physical environments.
///
/// Models the contract without touching any fault machinery: the
/// watchpoint "arms" instantly and the reset edge arrives immediately,
/// so `park` runs `on_armed`, then `on_reset`, then returns: the same
/// observable ordering the hardware path produces.
#[derive(Debug, Default)]
pub struct SimulatedSwap {
    /// Number of completed park/resume cycles.
    pub parks: usize,
}

impl SimulatedSwap {
    /// New simulated coordinator.
    pub const fn new() -> Self {
        Self { parks: 0 }
    }
}

impl Hotswap for SimulatedSwap {
    fn park(&mut self, on_reset: Option<fn()>, on_armed: Option<fn()>) {
        if let Some(armed) = on_armed {
            armed();
        }
        if let Some(reset) = on_reset {
            reset();
        }
        self.parks += 1;
    }
}

/// Disabled hotswap for builds that never detach media.
///
/// `park` returns immediately; neither callback runs, since the
/// operator never produced a reset edge.
#[derive(Debug, Default)]
pub struct NoSwap;

impl Hotswap for NoSwap {
    fn park(&mut self, _on_reset: Option<fn()>, _on_armed: Option<fn()>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    static SEQ: AtomicUsize = AtomicUsize::new(0);
    static ARMED_AT: AtomicUsize = AtomicUsize::new(0);
    static RESET_AT: AtomicUsize = AtomicUsize::new(0);

    fn armed() {
        ARMED_AT.store(SEQ.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
    }

    fn reset() {
        RESET_AT.store(SEQ.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
    }

    #[test]
    fn test_armed_runs_before_reset() {
        let mut swap = SimulatedSwap::new();
        swap.park(Some(reset), Some(armed));

        let armed_at = ARMED_AT.load(Ordering::SeqCst);
        let reset_at = RESET_AT.load(Ordering::SeqCst);
        assert!(armed_at > 0);
        assert!(reset_at > armed_at);
        assert_eq!(swap.parks, 1);
    }

    #[test]
    fn test_park_without_callbacks_returns() {
        let mut swap = SimulatedSwap::new();
        swap.park(None, None);
        swap.park(None, None);
        assert_eq!(swap.parks, 2);
    }

    #[test]
    fn test_noswap_never_fires_callbacks() {
        fn boom() {
            panic!("callback must not run in no-hotswap mode");
        }
        let mut swap = NoSwap;
        swap.park(Some(boom), Some(boom));
    }
}
