//! Relay signals received by the wrapper to the supervised child
//!
//! The forwarder is a guard: handlers are registered when it is created,
//! and dropping it unregisters them and restores the dispositions found at
//! creation, whatever path the supervisor leaves by.
//! It only ever signals the child; waiting stays with the supervisor.

use crate::disposition::{self, SavedDispositions};
use crate::errors::SignalSetupError;
use crate::process::ProcessHandle;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::{getpgid, getpgrp, Pid};
use signal_hook::consts::signal::{
    SIGALRM, SIGCONT, SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2, SIGWINCH,
};
use signal_hook::iterator::{Handle, Signals};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Signals relayed to the child. Job-control stops (SIGTSTP, SIGTTIN,
/// SIGTTOU) keep their default effect on the wrapper itself, SIGCHLD is
/// ours, and SIGKILL/SIGSTOP cannot be caught at all.
pub const FORWARDED_SIGNALS: &[i32] = &[
    SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2, SIGALRM, SIGWINCH, SIGCONT,
];

const NO_TARGET: i32 = 0;

/// Where a relayed signal goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Destination {
    /// The child leads its own process group.
    Group(Pid),
    /// The child shares our group; signalling the group would hit us too.
    Process,
}

pub struct SignalForwarder {
    handle: Handle,
    target: Arc<AtomicI32>,
    thread: Option<JoinHandle<()>>,
    saved: Option<SavedDispositions>,
}

impl SignalForwarder {
    pub fn install(child: &ProcessHandle) -> Result<Self, SignalSetupError> {
        let pid = child.pid() as i32;
        let destination = destination_of(Pid::from_raw(pid));

        // Every early return below drops `saved` last, which undoes any
        // partial registration.
        let saved =
            SavedDispositions::capture(FORWARDED_SIGNALS).map_err(SignalSetupError::Register)?;
        let mut signals = Signals::new(FORWARDED_SIGNALS).map_err(SignalSetupError::Register)?;
        let handle = signals.handle();
        if let Err(err) = disposition::activate_registry_handlers(FORWARDED_SIGNALS) {
            handle.close();
            return Err(SignalSetupError::Register(err));
        }
        let target = Arc::new(AtomicI32::new(pid));

        let relay_target = Arc::clone(&target);
        let thread = thread::Builder::new()
            .name("signal-forwarder".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    relay(signal, &relay_target, destination);
                }
            });

        match thread {
            Ok(thread) => {
                tracing::debug!(pid, ?destination, "signal forwarding installed");
                Ok(Self {
                    handle,
                    target,
                    thread: Some(thread),
                    saved: Some(saved),
                })
            }
            Err(err) => {
                handle.close();
                Err(SignalSetupError::Thread(err))
            }
        }
    }

    /// The child has reached a terminal state; drop any further signal.
    pub fn disarm(&self) {
        self.target.store(NO_TARGET, Ordering::SeqCst);
    }
}

impl Drop for SignalForwarder {
    fn drop(&mut self) {
        self.disarm();
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("signal forwarding thread panicked");
            }
        }
        drop(self.saved.take());
        tracing::debug!("signal forwarding removed");
    }
}

fn destination_of(child: Pid) -> Destination {
    match getpgid(Some(child)) {
        Ok(group) if group == child && group != getpgrp() => Destination::Group(group),
        _ => Destination::Process,
    }
}

fn relay(signal: i32, target: &AtomicI32, destination: Destination) {
    let pid = target.load(Ordering::SeqCst);
    if pid == NO_TARGET {
        tracing::debug!(signal, "child already terminated, signal dropped");
        return;
    }
    let Ok(signal) = Signal::try_from(signal) else {
        return;
    };

    let result = match destination {
        Destination::Group(group) => killpg(group, signal),
        Destination::Process => kill(Pid::from_raw(pid), signal),
    };
    match result {
        Ok(()) => tracing::debug!(pid, %signal, "signal forwarded"),
        Err(errno) => tracing::debug!(pid, %signal, "signal not forwarded: {errno}"),
    }
}
