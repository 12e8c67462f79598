//! Exception chaining for the suspension trap.
//!
//! The platform's exception vector is expected to build an
//! [`ExceptionFrame`] and call [`dispatch`]. While the trap is armed,
//! exactly one event category, the watch exception, is intercepted
//! and redirected; everything else falls through to the previously
//! registered fallback handler unchanged. The external reset signal
//! enters through [`reset_isr`].
//!
//! All slots are plain atomics: they are written with interrupts
//! quiesced and read from exception context, where taking a lock would
//! be its own hazard.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

/// Saved processor state at exception entry.
///
/// Built by the platform's vector stub before calling [`dispatch`];
/// mutations (status, EPC, registers) are applied on exception return.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct ExceptionFrame {
    /// General-purpose registers, index = architectural number.
    pub gpr: [u64; 32],
    /// Status register at the trap.
    pub sr: u32,
    /// Cause register at the trap.
    pub cause: u32,
    /// Resume address; redirected by the watch intercept.
    pub epc: u64,
    /// Faulting address, when the exception carries one.
    pub bad_vaddr: u64,
}

impl ExceptionFrame {
    /// Exception code field of the cause register.
    pub const fn exc_code(&self) -> u32 {
        (self.cause >> 2) & 0x1F
    }
}

/// Exception code of the watch exception.
pub const EXC_WATCH: u32 = 23;

/// Register clobbered by the privileged boot routine (t1). The
/// intercept writes an obvious sentinel there so a crash dump after a
/// misfire points straight at the redirection path.
const CLOBBERED_TEMP: usize = 9;

/// Sentinel written into the clobbered temp register.
pub const TEMP_SENTINEL: u64 = 0xA5A5_A5A5_5A5A_5A5A;

/// Chained exception handler signature.
pub type Handler = fn(&mut ExceptionFrame);

static FALLBACK: AtomicUsize = AtomicUsize::new(0);
static RESET_HOOK: AtomicUsize = AtomicUsize::new(0);
static ARMED: AtomicBool = AtomicBool::new(false);
static SAVED_SR: AtomicU32 = AtomicU32::new(0);
static RESUME_AT: AtomicU64 = AtomicU64::new(0);

fn load_fn<T>(slot: &AtomicUsize) -> Option<T> {
    let raw = slot.load(Ordering::Acquire);
    if raw == 0 {
        None
    } else {
        // Slot only ever holds a value stored by store_fn below.
        Some(unsafe { core::mem::transmute_copy::<usize, T>(&raw) })
    }
}

fn store_fn<T>(slot: &AtomicUsize, f: Option<T>) {
    let raw = match f {
        // Function pointers are non-null and usize-sized.
        Some(f) => unsafe { core::mem::transmute_copy::<T, usize>(&f) },
        None => 0,
    };
    slot.store(raw, Ordering::Release);
}

/// Register the platform's normal exception handler, returning the
/// previous one. Non-watch exceptions (and watch exceptions while the
/// trap is disarmed) are forwarded to it.
pub fn set_fallback(handler: Option<Handler>) -> Option<Handler> {
    let previous = load_fn(&FALLBACK);
    store_fn(&FALLBACK, handler);
    previous
}

/// Install or clear the reset-edge hook.
pub fn set_reset_hook(hook: Option<fn()>) {
    store_fn(&RESET_HOOK, hook);
}

/// Arm the watch intercept. `saved_sr` is restored into the frame on
/// intercept (the boot routine clobbers status); `resume_at` is where
/// the trap resumes execution.
// Callers outside tests live in the target-gated trap module.
#[cfg_attr(not(target_arch = "mips64"), allow(dead_code))]
pub(crate) fn arm(saved_sr: u32, resume_at: u64) {
    SAVED_SR.store(saved_sr, Ordering::Release);
    RESUME_AT.store(resume_at, Ordering::Release);
    ARMED.store(true, Ordering::Release);
}

/// Disarm the watch intercept.
#[cfg_attr(not(target_arch = "mips64"), allow(dead_code))]
pub(crate) fn disarm() {
    ARMED.store(false, Ordering::Release);
}

/// Whether the watch intercept is currently armed.
pub fn is_armed() -> bool {
    ARMED.load(Ordering::Acquire)
}

/// Exception entry point, called by the platform's vector stub.
pub fn dispatch(frame: &mut ExceptionFrame) {
    if ARMED.load(Ordering::Acquire) && frame.exc_code() == EXC_WATCH {
        frame.sr = SAVED_SR.load(Ordering::Acquire);
        frame.epc = RESUME_AT.load(Ordering::Acquire);
        frame.gpr[CLOBBERED_TEMP] = TEMP_SENTINEL;
        return;
    }

    if let Some(fallback) = load_fn::<Handler>(&FALLBACK) {
        fallback(frame);
    }
}

/// Reset-signal entry point, called by the platform's reset ISR.
/// Pure wakeup edge; carries no payload.
pub fn reset_isr() {
    if let Some(hook) = load_fn::<fn()>(&RESET_HOOK) {
        hook();
    }
}
