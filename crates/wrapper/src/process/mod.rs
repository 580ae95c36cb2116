//! OS process creation and status observation

mod spawn;
mod status;

pub use spawn::{ProcessBuilder, ProcessHandle, SpawnStrategy, PRELOAD_LIBRARY};
pub use status::Status;

/// Pid of the process that started this wrapper.
pub fn parent_pid() -> u32 {
    nix::unistd::getppid().as_raw() as u32
}
