use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::TimingResult;

/// Cooperative stop flag for the frame loop.
///
/// Clones share the flag; the Ctrl-C handler holds one of them.
#[derive(Clone, Debug, Default)]
pub struct ExitSignal {
    flag: Arc<AtomicBool>,
}

impl ExitSignal {
    pub fn new() -> Self {
        Self { flag: Arc::new(AtomicBool::new(false)) }
    }

    #[inline]
    pub fn request_exit(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Only one handler can be installed per process.
    pub fn install_ctrlc_handler(&self) -> TimingResult<()> {
        let s = self.clone();
        ctrlc::set_handler(move || {
            log::info!("ctrl-c received, stopping");
            s.request_exit();
        })?;
        Ok(())
    }
}
