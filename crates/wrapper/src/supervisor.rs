//! Process supervisor: resolve, spawn, watch, report
//!
//! One run walks `Resolving → Spawning → Running → Terminated` and never
//! goes back. Failures before the child exists report nothing; once the
//! child is running every state change is reported, in order, through the
//! same reporter.

use crate::disposition::DefaultChildSignal;
use crate::errors::{SignalSetupError, WaitError, WrapperError};
use crate::forwarder::SignalForwarder;
use crate::process::{parent_pid, ProcessBuilder, ProcessHandle, SpawnStrategy, Status};
use crate::rpc::{Reporter, Resolver};
use intercept_common::{Envelope, EventFactory, Execution, EXIT_FAILURE};
use nix::sys::signal::Signal;

pub struct Supervisor<'a> {
    resolver: &'a dyn Resolver,
    reporter: &'a dyn Reporter,
    strategy: SpawnStrategy,
}

impl<'a> Supervisor<'a> {
    pub fn new(
        resolver: &'a dyn Resolver,
        reporter: &'a dyn Reporter,
        strategy: SpawnStrategy,
    ) -> Self {
        Self {
            resolver,
            reporter,
            strategy,
        }
    }

    /// Run the requested execution to completion and return the exit code
    /// the wrapper shall exit with.
    pub fn run(&self, requested: &Execution) -> Result<i32, WrapperError> {
        self.run_with(requested, SignalForwarder::install)
    }

    fn run_with<F>(
        &self,
        requested: &Execution,
        install_forwarder: F,
    ) -> Result<i32, WrapperError>
    where
        F: FnOnce(&ProcessHandle) -> Result<SignalForwarder, SignalSetupError>,
    {
        let factory = EventFactory::new();

        let execution = self.resolver.resolve(requested)?;
        let _child_signal = DefaultChildSignal::reset()?;
        let child = ProcessBuilder::from(&execution).spawn(&self.strategy)?;

        let forwarder = match install_forwarder(&child) {
            Ok(forwarder) => forwarder,
            Err(err) => {
                child.terminate();
                return Err(err.into());
            }
        };

        tracing::info!(
            pid = child.pid(),
            rid = %factory.rid(),
            program = %execution.program_name(),
            "process started"
        );
        self.reporter
            .report(factory.start(child.pid(), parent_pid(), execution));

        let outcome = self.supervise(&child, &forwarder, &factory);
        drop(forwarder);

        let status = match outcome {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(pid = child.pid(), "supervision failed, killing the process");
                if let Some(status) = child.terminate() {
                    self.reporter.report(status_event(&factory, status));
                }
                return Err(err.into());
            }
        };

        let exit_code = status.code().unwrap_or(EXIT_FAILURE);
        tracing::info!(?status, exit_code, "process terminated");
        Ok(exit_code)
    }

    /// Report every state change until the child is gone.
    fn supervise(
        &self,
        child: &ProcessHandle,
        forwarder: &SignalForwarder,
        factory: &EventFactory,
    ) -> Result<Status, WaitError> {
        loop {
            let status = child.wait()?;
            if status.is_terminal() {
                forwarder.disarm();
            }

            tracing::debug!(?status, "process status changed");
            self.reporter.report(status_event(factory, status));

            if status.is_terminal() {
                return Ok(status);
            }
        }
    }
}

fn status_event(factory: &EventFactory, status: Status) -> Envelope {
    match status {
        Status::Exited(code) => factory.terminate(code),
        Status::Signaled(signal) | Status::Stopped(signal) => factory.signal(signal),
        Status::Continued => factory.signal(Signal::SIGCONT as i32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ResolutionError;
    use intercept_common::Event;
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::sys::wait::{waitpid, WaitPidFlag};
    use nix::unistd::Pid;
    use serial_test::serial;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingReporter {
        envelopes: Mutex<Vec<Envelope>>,
    }

    impl Reporter for RecordingReporter {
        fn report(&self, envelope: Envelope) {
            self.envelopes.lock().unwrap().push(envelope);
        }
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<Event> {
            self.envelopes
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.event.clone())
                .collect()
        }
    }

    /// Takes the child away from the supervisor as soon as it is reported.
    #[derive(Default)]
    struct ReapingReporter {
        inner: RecordingReporter,
    }

    impl Reporter for ReapingReporter {
        fn report(&self, envelope: Envelope) {
            if let Event::Start { pid, .. } = &envelope.event {
                let pid = Pid::from_raw(*pid as i32);
                kill(pid, Signal::SIGKILL).unwrap();
                waitpid(pid, None).unwrap();
            }
            self.inner.report(envelope);
        }
    }

    /// Answers every request with a fixed execution.
    struct FixedResolver(Execution);

    impl Resolver for FixedResolver {
        fn resolve(&self, _requested: &Execution) -> Result<Execution, ResolutionError> {
            Ok(self.0.clone())
        }
    }

    struct RejectingResolver;

    impl Resolver for RejectingResolver {
        fn resolve(&self, _requested: &Execution) -> Result<Execution, ResolutionError> {
            Err(ResolutionError::Rejected("no".to_string()))
        }
    }

    fn shell(script: &str, dir: &Path) -> Execution {
        Execution {
            executable: PathBuf::from("/bin/sh"),
            arguments: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            working_dir: dir.to_path_buf(),
            environment: HashMap::from([("PATH".to_string(), "/usr/bin:/bin".to_string())]),
        }
    }

    fn requested(dir: &Path) -> Execution {
        Execution {
            executable: PathBuf::from("cc"),
            arguments: vec!["cc".to_string(), "-c".to_string(), "main.c".to_string()],
            working_dir: dir.to_path_buf(),
            environment: HashMap::new(),
        }
    }

    fn run(resolver: &dyn Resolver, reporter: &RecordingReporter, dir: &Path) -> Result<i32, WrapperError> {
        Supervisor::new(resolver, reporter, SpawnStrategy::Plain).run(&requested(dir))
    }

    #[test]
    #[serial]
    fn normal_exit_reports_start_then_terminate() {
        let temp = TempDir::new().unwrap();
        let resolver = FixedResolver(shell("exit 2", temp.path()));
        let reporter = RecordingReporter::default();

        let exit_code = run(&resolver, &reporter, temp.path()).unwrap();

        assert_eq!(exit_code, 2);
        let events = reporter.events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::Start {
                pid,
                parent_pid: ppid,
                execution,
            } => {
                assert!(*pid > 0);
                assert_eq!(*ppid, parent_pid());
                assert_eq!(execution, &resolver.0);
            }
            other => panic!("expected start, got {other:?}"),
        }
        assert_eq!(events[1], Event::Terminate { exit_code: 2 });
    }

    #[test]
    #[serial]
    fn death_by_signal_reports_signal_and_fails() {
        let temp = TempDir::new().unwrap();
        let resolver = FixedResolver(shell("kill -9 $$", temp.path()));
        let reporter = RecordingReporter::default();

        let exit_code = run(&resolver, &reporter, temp.path()).unwrap();

        assert_eq!(exit_code, EXIT_FAILURE);
        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Start { .. }));
        assert_eq!(events[1], Event::Signal { number: 9 });
    }

    #[test]
    #[serial]
    fn stop_and_continue_are_reported_without_ending_supervision() {
        let temp = TempDir::new().unwrap();
        let script = "(sleep 0.3; kill -CONT $$) & kill -STOP $$; sleep 0.3; exit 5";
        let resolver = FixedResolver(shell(script, temp.path()));
        let reporter = RecordingReporter::default();

        let exit_code = run(&resolver, &reporter, temp.path()).unwrap();

        assert_eq!(exit_code, 5);
        let events = reporter.events();
        assert!(matches!(events.first(), Some(Event::Start { .. })));
        assert_eq!(events.last(), Some(&Event::Terminate { exit_code: 5 }));
        assert!(events.contains(&Event::Signal {
            number: Signal::SIGSTOP as i32
        }));
        assert!(events.contains(&Event::Signal {
            number: Signal::SIGCONT as i32
        }));
        let terminal = events
            .iter()
            .filter(|e| matches!(e, Event::Terminate { .. }))
            .count();
        assert_eq!(terminal, 1);
    }

    #[test]
    fn resolution_failure_reports_nothing() {
        let temp = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();

        let result = run(&RejectingResolver, &reporter, temp.path());

        assert!(matches!(result, Err(WrapperError::Resolution(_))));
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn spawn_failure_reports_nothing() {
        let temp = TempDir::new().unwrap();
        let mut missing = shell("exit 0", temp.path());
        missing.executable = PathBuf::from("/nonexistent/bin/cc");
        let resolver = FixedResolver(missing);
        let reporter = RecordingReporter::default();

        let result = run(&resolver, &reporter, temp.path());

        assert!(matches!(result, Err(WrapperError::Spawn(_))));
        assert!(reporter.events().is_empty());
    }

    #[test]
    #[serial]
    fn runs_the_resolved_executable_not_the_requested_one() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("ran");
        let resolver = FixedResolver(shell(&format!("touch {}", marker.display()), temp.path()));
        let reporter = RecordingReporter::default();

        let exit_code = run(&resolver, &reporter, temp.path()).unwrap();

        assert_eq!(exit_code, 0);
        assert!(fs::metadata(&marker).is_ok());
        match &reporter.events()[0] {
            Event::Start { execution, .. } => {
                assert_eq!(execution.executable, PathBuf::from("/bin/sh"))
            }
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn independent_runs_do_not_share_events() {
        let temp = TempDir::new().unwrap();
        let resolver = FixedResolver(shell("exit 0", temp.path()));
        let first = RecordingReporter::default();
        let second = RecordingReporter::default();

        run(&resolver, &first, temp.path()).unwrap();
        run(&resolver, &second, temp.path()).unwrap();

        let first = first.envelopes.into_inner().unwrap();
        let second = second.envelopes.into_inner().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert!(first.iter().all(|e| e.rid == first[0].rid));
        assert!(second.iter().all(|e| e.rid == second[0].rid));
        assert_ne!(first[0].rid, second[0].rid);
    }

    #[test]
    #[serial]
    fn forwarder_failure_kills_the_child_and_reports_nothing() {
        let temp = TempDir::new().unwrap();
        let resolver = FixedResolver(shell("sleep 30", temp.path()));
        let reporter = RecordingReporter::default();
        let spawned = Cell::new(0u32);

        let result = Supervisor::new(&resolver, &reporter, SpawnStrategy::Plain).run_with(
            &requested(temp.path()),
            |child| {
                spawned.set(child.pid());
                Err(SignalSetupError::Register(std::io::Error::other(
                    "no signal handlers",
                )))
            },
        );

        assert!(matches!(result, Err(WrapperError::SignalSetup(_))));
        assert!(reporter.events().is_empty());
        let pid = Pid::from_raw(spawned.get() as i32);
        assert_eq!(waitpid(pid, Some(WaitPidFlag::WNOHANG)), Err(Errno::ECHILD));
    }

    #[test]
    #[serial]
    fn wait_failure_is_an_error_and_leaves_no_child_behind() {
        let temp = TempDir::new().unwrap();
        let resolver = FixedResolver(shell("sleep 30", temp.path()));
        let reporter = ReapingReporter::default();

        let result = Supervisor::new(&resolver, &reporter, SpawnStrategy::Plain)
            .run(&requested(temp.path()));

        assert!(matches!(result, Err(WrapperError::Wait(_))));
        let events = reporter.inner.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Start { pid, .. } => {
                let pid = Pid::from_raw(*pid as i32);
                assert_eq!(waitpid(pid, Some(WaitPidFlag::WNOHANG)), Err(Errno::ECHILD));
            }
            other => panic!("expected start, got {other:?}"),
        }
    }
}
