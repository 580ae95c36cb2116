use std::{env, process::Command};

const DEFAULT_PRELOAD_LIBRARY: &str = "/usr/local/lib/intercept/libexec.so";

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=INTERCEPT_PRELOAD_LIBRARY");

    let version = env::var("CARGO_PKG_VERSION").unwrap();

    // Non-git builds (e.g. from a source tarball) fall back to the plain version
    let git_hash = if std::path::Path::new("../../.git").exists() {
        Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
    } else {
        None
    };

    let version_string = match git_hash {
        Some(hash) => format!("{version}-{hash}"),
        None => version,
    };
    println!("cargo:rustc-env=WRAPPER_VERSION={version_string}");

    // Where packagers install the interposition library used by the
    // `preload` spawn strategy.
    let preload_library =
        env::var("INTERCEPT_PRELOAD_LIBRARY").unwrap_or_else(|_| DEFAULT_PRELOAD_LIBRARY.to_string());
    println!("cargo:rustc-env=INTERCEPT_PRELOAD_LIBRARY={preload_library}");
}
