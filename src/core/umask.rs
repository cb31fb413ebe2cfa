#[cfg(unix)]
use nix::sys::stat::{umask, Mode};
use tracing::debug;

/// Applies a process umask for the guard's lifetime and restores the previous one on drop.
pub struct UmaskGuard {
    #[cfg(unix)]
    previous: Option<Mode>,
}

impl UmaskGuard {
    #[cfg(unix)]
    pub fn apply(mask: Option<u32>) -> Self {
        let previous = mask.map(|mask| {
            debug!("applying umask {:04o}", mask);
            umask(Mode::from_bits_truncate(mask as nix::libc::mode_t))
        });
        Self { previous }
    }

    #[cfg(not(unix))]
    pub fn apply(mask: Option<u32>) -> Self {
        if mask.is_some() {
            debug!("umask is ignored on this platform");
        }
        Self {}
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(previous) = self.previous.take() {
            umask(previous);
        }
    }
}
