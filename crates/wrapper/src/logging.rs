use crate::config::WrapperConfig;
use anyhow::Context;
use std::collections::HashMap;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the stderr subscriber.
///
/// Only fatal errors are shown unless `RUST_LOG` asks otherwise or the run
/// is verbose. Nothing is ever written to the child's own streams.
pub fn init(config: &WrapperConfig) -> anyhow::Result<()> {
    let default_level = if config.verbose { "debug" } else { "error" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(atty::is(atty::Stream::Stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(())
}

/// Record how this process was invoked.
pub fn record(argv: &[String], environment: &HashMap<String, String>) {
    tracing::debug!(
        pid = std::process::id(),
        ppid = crate::process::parent_pid(),
        ?argv,
        "wrapper invoked"
    );
    tracing::trace!(?environment, "inherited environment");
}
