use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;

/// One state change of the child as reported by `waitpid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Terminated normally with an exit code.
    Exited(i32),
    /// Terminated by a signal.
    Signaled(i32),
    /// Stopped by a job-control signal; still alive.
    Stopped(i32),
    /// Resumed after a stop; still alive.
    Continued,
}

impl Status {
    /// Map a raw wait status. Statuses that describe no state change of
    /// interest (ptrace stops, still-alive) map to `None`.
    pub(crate) fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Self::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Self::Signaled(signal as i32)),
            WaitStatus::Stopped(_, signal) => Some(Self::Stopped(signal as i32)),
            WaitStatus::Continued(_) => Some(Self::Continued),
            _ => None,
        }
    }

    pub fn is_exited(&self) -> bool {
        matches!(self, Self::Exited(_))
    }

    pub fn is_signaled(&self) -> bool {
        !self.is_exited()
    }

    /// True when the child is gone and no further status will follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited(_) | Self::Signaled(_))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            _ => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            Self::Exited(_) => None,
            Self::Signaled(signal) | Self::Stopped(signal) => Some(*signal),
            Self::Continued => Some(Signal::SIGCONT as i32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Pid;

    #[test]
    fn maps_wait_statuses() {
        let pid = Pid::from_raw(100);
        assert_eq!(
            Status::from_wait_status(WaitStatus::Exited(pid, 3)),
            Some(Status::Exited(3))
        );
        assert_eq!(
            Status::from_wait_status(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(Status::Signaled(9))
        );
        assert_eq!(
            Status::from_wait_status(WaitStatus::Stopped(pid, Signal::SIGTSTP)),
            Some(Status::Stopped(Signal::SIGTSTP as i32))
        );
        assert_eq!(
            Status::from_wait_status(WaitStatus::Continued(pid)),
            Some(Status::Continued)
        );
        assert_eq!(Status::from_wait_status(WaitStatus::StillAlive), None);
    }

    #[test]
    fn exactly_one_of_exited_and_signaled_holds() {
        for status in [
            Status::Exited(0),
            Status::Signaled(15),
            Status::Stopped(19),
            Status::Continued,
        ] {
            assert_ne!(status.is_exited(), status.is_signaled(), "{status:?}");
        }
    }

    #[test]
    fn only_exit_and_death_by_signal_are_terminal() {
        assert!(Status::Exited(2).is_terminal());
        assert!(Status::Signaled(9).is_terminal());
        assert!(!Status::Stopped(19).is_terminal());
        assert!(!Status::Continued.is_terminal());
    }

    #[test]
    fn exposes_code_and_signal() {
        assert_eq!(Status::Exited(2).code(), Some(2));
        assert_eq!(Status::Exited(2).signal(), None);
        assert_eq!(Status::Signaled(9).code(), None);
        assert_eq!(Status::Signaled(9).signal(), Some(9));
        assert_eq!(Status::Continued.signal(), Some(Signal::SIGCONT as i32));
    }
}
