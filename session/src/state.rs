//! Insertion-cycle state machine driving detect, calibrate and report.

use cartprobe_bus::{CartBus, MediaIdentity, TimingParams};
use cartprobe_calib::{
    CalibrationError, CalibrationMatrix, CalibrationObserver, CalibrationReport, Calibrator,
    SpeedGrade, BYTES_PER_LOCATION,
};
use cartprobe_swap::Hotswap;

use crate::config::{delay, SessionConfig};
use crate::console::Console;
use crate::render;
use crate::trace::trace;

/// Where the session is in the insertion cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Applying the power-on timing and arming hotswap.
    Init,
    /// Hotswap armed, waiting for the media to be pulled.
    SafeToRemove,
    /// Waiting for media, then reading its identity.
    Detect,
    /// Calibration sweep and result screen.
    Test,
    /// Terminal result screen when hotswap is disabled.
    Hold,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SafeToRemove => "safe-to-remove",
            Self::Detect => "detect",
            Self::Test => "test",
            Self::Hold => "hold",
        }
    }
}

/// Runs indefinitely: park for hotswap, detect media, calibrate,
/// report, repeat. With hotswap disabled it calibrates whatever is
/// inserted once and holds the result screen.
pub struct Session<B, H, C> {
    bus: B,
    hotswap: H,
    console: C,
    config: SessionConfig,
    state: SessionState,
    media: Option<MediaIdentity>,
    report: Option<CalibrationReport>,
    first_init: bool,
}

/// Wakeup callback for the parked state. Runs in interrupt context,
/// so it must not touch the console or the trace lock.
fn reset_edge() {}

/// Re-renders the sweep grid as entries land.
struct MatrixProgress<'a, C: Console> {
    console: &'a mut C,
    media: Option<&'a MediaIdentity>,
}

impl<C: Console> CalibrationObserver for MatrixProgress<'_, C> {
    fn matrix_updated(&mut self, matrix: &CalibrationMatrix) {
        render::progress(self.console, self.media, matrix);
    }
}

impl<B, H, C> Session<B, H, C>
where
    B: CartBus,
    H: Hotswap,
    C: Console,
{
    pub fn new(bus: B, hotswap: H, console: C, config: SessionConfig) -> Self {
        Self {
            bus,
            hotswap,
            console,
            config,
            state: SessionState::Init,
            media: None,
            report: None,
            first_init: true,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Identity of the media currently under test, if any.
    pub fn media(&self) -> Option<&MediaIdentity> {
        self.media.as_ref()
    }

    /// Report from the most recent completed calibration.
    pub fn last_report(&self) -> Option<&CalibrationReport> {
        self.report.as_ref()
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn hotswap_mut(&mut self) -> &mut H {
        &mut self.hotswap
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Drive the state machine forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
            delay(self.config.idle_spins);
        }
    }

    /// Advance the state machine by one step.
    pub fn step(&mut self) {
        match self.state {
            SessionState::Init => self.step_init(),
            SessionState::SafeToRemove => self.step_safe_to_remove(),
            SessionState::Detect => self.step_detect(),
            SessionState::Test => self.step_test(),
            SessionState::Hold => self.step_hold(),
        }
    }

    fn step_init(&mut self) {
        trace("session: init");
        self.bus.set_timing(self.config.default_timing);

        if !self.config.hotswap_enabled {
            render::status(
                &mut self.console,
                &["No-hotswap mode", "Insert media before power-on"],
            );
            self.first_init = false;
            self.state = SessionState::Detect;
            return;
        }

        if self.first_init {
            render::status(
                &mut self.console,
                &[
                    "Press RESET to enable",
                    "cartridge hotswap support",
                    "Waiting for RESET...",
                ],
            );
        } else {
            render::status(&mut self.console, &["Initializing..."]);
        }

        self.hotswap.park(Some(reset_edge), None);
        trace("session: resumed from park");
        self.first_init = false;
        self.state = SessionState::SafeToRemove;
    }

    fn step_safe_to_remove(&mut self) {
        trace("session: safe to remove");
        render::status(&mut self.console, &["Safe to remove cartridge"]);
        while self.config.probe.is_present(&mut self.bus) {
            delay(self.config.poll_spins);
        }
        self.media = None;
        self.state = SessionState::Detect;
    }

    fn step_detect(&mut self) {
        if !self.config.probe.is_present(&mut self.bus) {
            render::status(&mut self.console, &["No cartridge inserted"]);
            return;
        }

        match MediaIdentity::read(&mut self.bus) {
            Some(id) => {
                trace("session: media detected");
                render::detected(&mut self.console, &id);
                self.media = Some(id);
                // Freshly seated media: let the connector settle before
                // trusting reads for the reference snapshot.
                delay(self.config.settle_spins);
                self.state = SessionState::Test;
            }
            None => {
                trace("session: identity unreadable, retrying");
            }
        }
    }

    fn step_test(&mut self) {
        trace("session: test");
        if !self.config.probe.is_present(&mut self.bus) {
            self.media = None;
            self.state = SessionState::Detect;
            return;
        }

        let calibrator = Calibrator::with_config(self.config.calib);
        let outcome = {
            let Session {
                bus,
                console,
                media,
                ..
            } = self;
            let mut progress = MatrixProgress {
                console,
                media: media.as_ref(),
            };
            calibrator.run(bus, &mut progress)
        };

        // The sweep leaves the bus at the last trialed timing.
        self.bus.set_timing(TimingParams::SLOWEST);

        if !self.config.probe.is_present(&mut self.bus) {
            // Pulled mid-sweep. Whatever the sweep concluded was
            // measured against a vanished device, so none of it holds.
            trace("session: media removed during test");
            render::status(&mut self.console, &["Cartridge removed during test"]);
            self.report = None;
            self.media = None;
            self.state = SessionState::Detect;
            return;
        }

        match outcome {
            Ok(report) => {
                self.bus.set_timing(report.best.timing());
                let mut confirm = [0u8; BYTES_PER_LOCATION];
                self.bus.transfer(&mut confirm, 0);

                let grade = SpeedGrade::for_result(&report.best);
                render::results(&mut self.console, self.media.as_ref(), &report, grade);
                self.bus.set_timing(TimingParams::SLOWEST);
                self.report = Some(report);
                trace("session: calibration complete");
            }
            Err(CalibrationError::NoWorkingSpeed) => {
                trace("session: no working speed");
                render::status(
                    &mut self.console,
                    &["No working speed found", "for this cartridge"],
                );
                self.report = None;
            }
            Err(CalibrationError::DataPathFault) => {
                trace("session: data path fault");
                render::status(
                    &mut self.console,
                    &["Data path fault at the", "reference timing, aborting"],
                );
                self.report = None;
            }
        }

        if self.config.hotswap_enabled {
            delay(self.config.result_spins);
            self.state = SessionState::SafeToRemove;
        } else {
            self.state = SessionState::Hold;
        }
    }

    fn step_hold(&mut self) {
        // Terminal: keep the last screen alive.
        match &self.report {
            Some(report) => {
                let grade = SpeedGrade::for_result(&report.best);
                render::results(&mut self.console, self.media.as_ref(), report, grade);
            }
            None => {
                render::status(&mut self.console, &["Calibration failed"]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CaptureConsole;
    use cartprobe_bus::MockBus;
    use cartprobe_swap::{NoSwap, SimulatedSwap};

    fn always_ok(_lat: u8, _pwd: u8) -> bool {
        true
    }

    fn banded(_lat: u8, pwd: u8) -> bool {
        pwd >= 0x30
    }

    fn hotswap_session(bus: MockBus) -> Session<MockBus, SimulatedSwap, CaptureConsole> {
        Session::new(
            bus,
            SimulatedSwap::new(),
            CaptureConsole::new(),
            SessionConfig::immediate(),
        )
    }

    fn held_session(bus: MockBus) -> Session<MockBus, NoSwap, CaptureConsole> {
        let config = SessionConfig {
            hotswap_enabled: false,
            ..SessionConfig::immediate()
        };
        Session::new(bus, NoSwap, CaptureConsole::new(), config)
    }

    #[test]
    fn test_init_parks_and_prompts_on_first_boot() {
        let mut bus = MockBus::new(always_ok);
        bus.remove();
        let mut session = hotswap_session(bus);

        session.step();
        assert_eq!(session.state(), SessionState::SafeToRemove);
        assert_eq!(session.hotswap_mut().parks, 1);
        assert!(session.console().contains("Press RESET"));
    }

    #[test]
    fn test_full_hotswap_cycle() {
        let mut bus = MockBus::new(banded);
        bus.set_name(*b"CYCLE TEST          ");
        bus.remove();
        let mut session = hotswap_session(bus);

        session.step(); // Init -> SafeToRemove
        session.step(); // SafeToRemove -> Detect (already absent)
        assert_eq!(session.state(), SessionState::Detect);

        session.step(); // still absent, stays put
        assert_eq!(session.state(), SessionState::Detect);
        assert!(session.console().contains("No cartridge inserted"));

        session.bus_mut().insert();
        session.step(); // Detect -> Test
        assert_eq!(session.state(), SessionState::Test);
        assert_eq!(session.media().map(|id| id.as_bytes()[0]), Some(b'C'));
        assert!(session.console().contains("New cartridge detected"));

        session.step(); // Test -> SafeToRemove, with a report
        assert_eq!(session.state(), SessionState::SafeToRemove);
        let report = session.last_report().unwrap();
        assert_eq!(report.best.pulse_width, 0x30);
        assert!(session.console().contains("Best overall speed"));
        assert!(session.console().contains("Media: CYCLE TEST"));
        assert_eq!(session.bus_mut().timing(), TimingParams::SLOWEST);
    }

    #[test]
    fn test_no_hotswap_holds_result_screen() {
        let mut session = held_session(MockBus::new(always_ok));

        session.step(); // Init -> Detect, no park
        assert_eq!(session.state(), SessionState::Detect);
        assert!(session.console().contains("No-hotswap mode"));

        session.step(); // Detect -> Test
        session.step(); // Test -> Hold
        assert_eq!(session.state(), SessionState::Hold);
        assert!(session.last_report().is_some());

        session.step(); // Hold is terminal
        assert_eq!(session.state(), SessionState::Hold);
        assert!(session.console().contains("Best overall speed"));
    }

    #[test]
    fn test_removal_mid_sweep_discards_everything() {
        let mut bus = MockBus::new(always_ok);
        // Presence check + identity read + presence check = 3 transfers,
        // capture + sanity = 8 more; detach lands inside the sweep.
        bus.remove_after(15);
        let mut session = held_session(bus);

        session.step(); // Init -> Detect
        session.step(); // Detect -> Test
        session.step(); // Test: media vanishes under the sweep

        assert_eq!(session.state(), SessionState::Detect);
        assert!(session.last_report().is_none());
        assert!(session.media().is_none());
        assert_eq!(session.bus_mut().timing(), TimingParams::SLOWEST);
        assert!(session.console().contains("Cartridge removed during test"));
    }

    #[test]
    fn test_unreadable_identity_stays_in_detect() {
        let mut bus = MockBus::new(always_ok);
        bus.set_name([0u8; 20]);
        let mut session = held_session(bus);

        session.step(); // Init -> Detect
        session.step();
        session.step();
        assert_eq!(session.state(), SessionState::Detect);
        assert!(session.media().is_none());
    }

    #[test]
    fn test_data_path_fault_reports_and_rearms() {
        fn never_ok(_lat: u8, _pwd: u8) -> bool {
            false
        }

        let mut bus = MockBus::new(never_ok);
        bus.remove();
        let mut session = hotswap_session(bus);

        session.step(); // Init -> SafeToRemove
        session.step(); // SafeToRemove -> Detect
        session.bus_mut().insert();
        session.step(); // Detect -> Test
        session.step(); // Test fails the sanity trial

        assert_eq!(session.state(), SessionState::SafeToRemove);
        assert!(session.last_report().is_none());
        assert!(session.console().contains("Data path fault"));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(SessionState::Init.as_str(), "init");
        assert_eq!(SessionState::Hold.as_str(), "hold");
    }
}
