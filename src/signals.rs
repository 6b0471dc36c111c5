//! Ctrl-C handling: the first signal asks the idle loop to stop and clock
//! out, a second one terminates the process.

use crate::errors::AppResult;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn install() -> AppResult<Arc<AtomicBool>> {
    let requested = Arc::new(AtomicBool::new(false));
    for sig in [SIGINT, SIGTERM] {
        // order matters: the shutdown check must see the flag before it is set
        flag::register_conditional_shutdown(sig, 1, Arc::clone(&requested))?;
        flag::register(sig, Arc::clone(&requested))?;
    }
    Ok(requested)
}
