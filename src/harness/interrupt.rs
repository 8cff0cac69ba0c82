//! Run-scope "stop after the current test" request.
//!
//! The SIGINT handler only stores to a static atomic. Everything else (reaping, reporting, choosing the exit
//! status) happens in the coordinator when it samples the request, once per test.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::libc;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

extern "C" fn record_sigint(_signal: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::SeqCst);
}

/// Cancellation flag sampled by the coordinator after each test is reaped.
#[derive(Debug, Clone, Default)]
pub struct StopRequest {
    requested: Arc<AtomicBool>,
    watch_sigint: bool,
}

impl StopRequest {
    /// A request that is only raised through [`StopRequest::request`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the SIGINT handler and return a request that is also raised by SIGINT.
    pub fn on_sigint() -> nix::Result<Self> {
        install_sigint_handler()?;
        Ok(Self {
            requested: Arc::default(),
            watch_sigint: true,
        })
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst) || (self.watch_sigint && SIGINT_RECEIVED.load(Ordering::SeqCst))
    }
}

#[allow(unsafe_code)]
fn install_sigint_handler() -> nix::Result<()> {
    let action = SigAction::new(SigHandler::Handler(record_sigint), SaFlags::empty(), SigSet::empty());
    // SAFETY: `record_sigint` only performs an atomic store, which is async-signal-safe.
    unsafe { sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}
