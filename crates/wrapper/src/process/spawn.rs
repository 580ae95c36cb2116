use super::status::Status;
use crate::errors::{SpawnError, WaitError};
use intercept_common::Execution;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Child, Command};

#[cfg(target_os = "macos")]
const PRELOAD_KEY: &str = "DYLD_INSERT_LIBRARIES";
#[cfg(not(target_os = "macos"))]
const PRELOAD_KEY: &str = "LD_PRELOAD";

/// Library the `preload` strategy injects, fixed at build time.
pub const PRELOAD_LIBRARY: &str = env!("INTERCEPT_PRELOAD_LIBRARY");

/// How the child process is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnStrategy {
    /// Run the resolved execution as is.
    Plain,
    /// Additionally inject the interposition library, so the child's own
    /// descendants get intercepted as well.
    Preload { library: PathBuf },
}

impl SpawnStrategy {
    /// The strategy selected by the `preload` cargo feature.
    pub fn configured() -> Self {
        if cfg!(feature = "preload") {
            Self::Preload {
                library: PathBuf::from(PRELOAD_LIBRARY),
            }
        } else {
            Self::Plain
        }
    }

    /// Final environment of the child.
    fn environment(&self, resolved: &HashMap<String, String>) -> HashMap<String, String> {
        let mut environment = resolved.clone();
        if let Self::Preload { library } = self {
            let library = library.display().to_string();
            let value = match environment.get(PRELOAD_KEY) {
                Some(existing) if existing.split(':').any(|l| l == library) => existing.clone(),
                Some(existing) if !existing.is_empty() => format!("{library}:{existing}"),
                _ => library,
            };
            environment.insert(PRELOAD_KEY.to_string(), value);
            #[cfg(target_os = "macos")]
            environment.insert("DYLD_FORCE_FLAT_NAMESPACE".to_string(), "1".to_string());
        }
        environment
    }
}

/// Builds the OS process for a resolved execution.
pub struct ProcessBuilder<'a> {
    execution: &'a Execution,
}

impl<'a> From<&'a Execution> for ProcessBuilder<'a> {
    fn from(execution: &'a Execution) -> Self {
        Self { execution }
    }
}

impl ProcessBuilder<'_> {
    /// Spawn the child with exactly the resolved environment; nothing of
    /// this process's own environment leaks through.
    pub fn spawn(self, strategy: &SpawnStrategy) -> Result<ProcessHandle, SpawnError> {
        let execution = self.execution;
        let mut cmd = Command::new(&execution.executable);

        if let Some((arg0, rest)) = execution.arguments.split_first() {
            cmd.arg0(arg0);
            cmd.args(rest);
        }

        cmd.current_dir(&execution.working_dir)
            .env_clear()
            .envs(strategy.environment(&execution.environment));

        let child = cmd.spawn().map_err(|source| SpawnError {
            executable: execution.executable.clone(),
            source,
        })?;
        tracing::debug!(
            pid = child.id(),
            executable = %execution.executable.display(),
            "process spawned"
        );

        Ok(ProcessHandle { child })
    }
}

/// The live child. Only the supervisor waits on it.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    fn raw_pid(&self) -> Pid {
        Pid::from_raw(self.child.id() as i32)
    }

    /// Block until the child changes state (exit, death by signal, stop,
    /// continue).
    pub fn wait(&self) -> Result<Status, WaitError> {
        let flags = WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        loop {
            match waitpid(self.raw_pid(), Some(flags)) {
                Ok(raw) => match Status::from_wait_status(raw) {
                    Some(status) => return Ok(status),
                    None => continue,
                },
                Err(Errno::EINTR) => continue,
                Err(errno) => {
                    return Err(WaitError {
                        pid: self.pid(),
                        source: std::io::Error::from(errno),
                    })
                }
            }
        }
    }

    /// Kill the child and reap it. Used when supervision cannot start or
    /// cannot go on; returns the final status when it could be read.
    pub(crate) fn terminate(mut self) -> Option<Status> {
        if let Err(err) = self.child.kill() {
            tracing::warn!(pid = self.pid(), "failed to kill child: {err}");
        }
        loop {
            match self.wait() {
                Ok(status) if status.is_terminal() => return Some(status),
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!("failed to reap child: {:#}", anyhow::Error::new(err));
                    return None;
                }
            }
        }
    }
}
