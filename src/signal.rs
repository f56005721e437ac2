//! The stop flag shared by the game loop, the collision handling and the
//! process interrupt handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{bail, Context, Result};
use log::info;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        StopFlag::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

static INTERRUPT_FLAG: OnceLock<StopFlag> = OnceLock::new();

extern "C" fn on_interrupt(_: nix::libc::c_int) {
    // Only an atomic store happens here.
    if let Some(flag) = INTERRUPT_FLAG.get() {
        flag.request();
    }
}

/// Routes SIGINT and SIGTERM to `flag`. Can be installed once per process.
pub fn install(flag: &StopFlag) -> Result<()> {
    if INTERRUPT_FLAG.set(flag.clone()).is_err() {
        bail!("interrupt handler is already installed");
    }

    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    for sig in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only performs an atomic store on an already initialized flag.
        unsafe { signal::sigaction(sig, &action) }
            .with_context(|| format!("failed to install {:?} handler", sig))?;
    }

    info!("Interrupt handlers installed");
    Ok(())
}
