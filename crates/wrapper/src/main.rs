//! Build command wrapper
//!
//! Installed once as `wrapper` and linked under the names of the build
//! tools to intercept. Exits with the wrapped command's exit code.

#[cfg(unix)]
fn main() -> std::process::ExitCode {
    use intercept_common::EXIT_FAILURE;
    use std::process::ExitCode;

    match intercept_wrapper::run_wrapper() {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(EXIT_FAILURE as u8)
        }
    }
}

#[cfg(not(unix))]
fn main() {
    eprintln!("wrapper is only supported on Unix hosts.");
    std::process::exit(1);
}
