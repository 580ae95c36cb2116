//! Signal dispositions changed for the length of a supervised run
//!
//! Everything changed here is put back by a guard, so the wrapper leaves
//! supervision with the dispositions it was started with.

use crate::errors::SignalSetupError;
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::collections::BTreeMap;
use std::io;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::{Mutex, PoisonError};

/// Handler the signal registry installed the first time each signal was
/// registered. The registry installs it only once per process, so a
/// registration that follows a restore has to put it back itself.
static REGISTRY_HANDLERS: Mutex<BTreeMap<libc::c_int, libc::sigaction>> =
    Mutex::new(BTreeMap::new());

fn query(signal: libc::c_int) -> io::Result<libc::sigaction> {
    let mut current = MaybeUninit::<libc::sigaction>::uninit();
    // SAFETY: a null new action only reads the installed one.
    let res = unsafe { libc::sigaction(signal, ptr::null(), current.as_mut_ptr()) };
    Errno::result(res)?;
    // SAFETY: filled in by the successful call above.
    Ok(unsafe { current.assume_init() })
}

fn install(signal: libc::c_int, action: &libc::sigaction) -> io::Result<()> {
    // SAFETY: `action` was read back from the kernel earlier in this
    // process, so its handler is one that was already installed here.
    let res = unsafe { libc::sigaction(signal, action, ptr::null_mut()) };
    Errno::result(res)?;
    Ok(())
}

/// Dispositions read on creation and reinstated on drop.
pub(crate) struct SavedDispositions {
    saved: Vec<(libc::c_int, libc::sigaction)>,
}

impl SavedDispositions {
    pub(crate) fn capture(signals: &[libc::c_int]) -> io::Result<Self> {
        let saved = signals
            .iter()
            .map(|&signal| query(signal).map(|action| (signal, action)))
            .collect::<io::Result<_>>()?;
        Ok(Self { saved })
    }
}

impl Drop for SavedDispositions {
    fn drop(&mut self) {
        for (signal, action) in &self.saved {
            if let Err(err) = install(*signal, action) {
                tracing::warn!(signal, "cannot restore signal disposition: {err}");
            }
        }
    }
}

/// Make the registry's handler the installed one for every signal in
/// `signals`. Call right after registering them.
pub(crate) fn activate_registry_handlers(signals: &[libc::c_int]) -> io::Result<()> {
    let mut handlers = REGISTRY_HANDLERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    for &signal in signals {
        match handlers.get(&signal) {
            Some(action) => install(signal, action)?,
            None => {
                handlers.insert(signal, query(signal)?);
            }
        }
    }
    Ok(())
}

/// Keeps SIGCHLD at its default disposition while the guard lives. An
/// inherited SIG_IGN lets the kernel reap the child before its status can
/// be read.
pub(crate) struct DefaultChildSignal {
    previous: SigAction,
}

impl DefaultChildSignal {
    pub(crate) fn reset() -> Result<Self, SignalSetupError> {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        // SAFETY: the default disposition runs no handler code.
        let previous = unsafe { sigaction(Signal::SIGCHLD, &default) }
            .map_err(|errno| SignalSetupError::ChildSignal(errno.into()))?;
        Ok(Self { previous })
    }
}

impl Drop for DefaultChildSignal {
    fn drop(&mut self) {
        // SAFETY: reinstates the action that was installed before `reset`.
        if let Err(errno) = unsafe { sigaction(Signal::SIGCHLD, &self.previous) } {
            tracing::warn!("cannot restore SIGCHLD disposition: {errno}");
        }
    }
}

/// Address of the handler currently installed for `signal`.
#[cfg(test)]
pub(crate) fn installed_handler(signal: libc::c_int) -> libc::sighandler_t {
    query(signal).unwrap().sa_sigaction
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    extern "C" fn ignore(_: libc::c_int) {}

    fn set_handler(signal: Signal, handler: SigHandler) -> SigAction {
        let action = SigAction::new(handler, SaFlags::SA_RESTART, SigSet::empty());
        unsafe { sigaction(signal, &action) }.unwrap()
    }

    #[test]
    #[serial]
    fn saved_dispositions_come_back_on_drop() {
        let before = installed_handler(libc::SIGURG);
        let saved = SavedDispositions::capture(&[libc::SIGURG]).unwrap();

        let original = set_handler(Signal::SIGURG, SigHandler::Handler(ignore));
        assert_eq!(installed_handler(libc::SIGURG), ignore as libc::sighandler_t);

        drop(saved);
        assert_eq!(installed_handler(libc::SIGURG), before);
        unsafe { sigaction(Signal::SIGURG, &original) }.unwrap();
    }

    #[test]
    #[serial]
    fn child_signal_is_default_while_guarded() {
        let original = set_handler(Signal::SIGCHLD, SigHandler::Handler(ignore));

        let guard = DefaultChildSignal::reset().unwrap();
        assert_eq!(installed_handler(libc::SIGCHLD), libc::SIG_DFL);

        drop(guard);
        assert_eq!(installed_handler(libc::SIGCHLD), ignore as libc::sighandler_t);
        unsafe { sigaction(Signal::SIGCHLD, &original) }.unwrap();
    }
}
