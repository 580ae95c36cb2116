//! Fully specified, ready-to-spawn command descriptor

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A command as it is (or shall be) executed.
///
/// `arguments` includes the program name at position zero, exactly as the
/// child will see it in its own argv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub executable: PathBuf,
    pub arguments: Vec<String>,
    pub working_dir: PathBuf,
    pub environment: HashMap<String, String>,
}

impl Execution {
    /// Build the requested execution from the invoking process's own
    /// argv, environment and working directory.
    pub fn capture<I>(
        argv: Vec<String>,
        envp: I,
        working_dir: PathBuf,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let program = argv.first().ok_or(ConfigError::EmptyCommand)?;
        Ok(Self {
            executable: PathBuf::from(program),
            arguments: argv,
            working_dir,
            environment: envp.into_iter().collect(),
        })
    }

    /// Copy of this execution with a different program to run.
    pub fn with_executable(&self, executable: &Path) -> Self {
        Self {
            executable: executable.to_path_buf(),
            ..self.clone()
        }
    }

    /// Program name for diagnostics.
    pub fn program_name(&self) -> String {
        self.executable
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.executable.display().to_string())
    }
}
