//! A scoped guard blocking the signals a modem hang-up typically raises, for the
//! duration of an accounting `STOP` call.
//!
//! The original blocks `SIGALRM`/`SIGCHLD`/`SIGHUP` with a bare pair of `signal()` calls
//! around the network call, with several early `return`s in between that skip the restore.
//! This guard instead acquires the mask on construction and restores it unconditionally in
//! `Drop`, so every exit path — including an early return or a panic unwinding through the
//! accounting call — puts the previous disposition back.

use nix::sys::signal::{self, SigHandler, Signal};

const GUARDED: [Signal; 3] = [Signal::SIGALRM, Signal::SIGCHLD, Signal::SIGHUP];

/// Holds the previous disposition of [`GUARDED`] so it can be restored on drop.
pub struct HangupSignalGuard {
    previous: [SigHandler; GUARDED.len()],
}

impl HangupSignalGuard {
    /// Installs `SIG_IGN` for every guarded signal, recording what was there before.
    ///
    /// # Safety considerations
    ///
    /// This calls into `sigaction(2)` via `nix`, which is safe here because the handler
    /// installed (`SIG_IGN`) does no work and cannot reenter Rust code.
    pub fn block() -> Self {
        let mut previous = [SigHandler::SigIgn; GUARDED.len()];

        for (slot, signal) in previous.iter_mut().zip(GUARDED) {
            // SAFETY: SIG_IGN is async-signal-safe and performs no reentrant work.
            *slot = unsafe { signal::signal(signal, SigHandler::SigIgn) }
                .unwrap_or(SigHandler::SigDfl);
        }

        Self { previous }
    }
}

impl Drop for HangupSignalGuard {
    fn drop(&mut self) {
        for (signal, handler) in GUARDED.into_iter().zip(self.previous) {
            // SAFETY: restoring whatever disposition was observed in `block`.
            let _ = unsafe { signal::signal(signal, handler) };
        }
    }
}
