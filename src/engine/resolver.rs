//! Runtime resolution for the external engines
//!
//! Both engines are scripts run by a Python runtime. The runtime is looked up
//! fresh on every call, in this order:
//! 1. the runtime bundled under the resource directory
//! 2. the primary, then the secondary override variable
//! 3. platform candidate commands, each confirmed by a version probe

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::EngineError;
use crate::utils::AppConfig;

/// Flag passed to candidate commands to confirm they are a working runtime
pub const VERSION_FLAG: &str = "-V";

/// A launcher plus the fixed arguments that select the runtime
///
/// `py -3` is `{ program: "py", fixed_args: ["-3"] }`; argv is never built by
/// splitting a command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCommand {
    pub program: String,
    pub fixed_args: Vec<String>,
}

impl RuntimeCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            fixed_args: Vec::new(),
        }
    }

    pub fn with_args(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            fixed_args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.to_string_lossy().into_owned())
    }
}

impl std::fmt::Display for RuntimeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.fixed_args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Confirms that a candidate command is a usable runtime
#[cfg_attr(test, mockall::automock)]
pub trait VersionProbe: Send + Sync {
    fn accepts(&self, command: &RuntimeCommand) -> bool;
}

/// Runs `<command> -V` and accepts it on exit status 0
pub struct ProcessProbe;

impl VersionProbe for ProcessProbe {
    fn accepts(&self, command: &RuntimeCommand) -> bool {
        let mut probe = Command::new(&command.program);
        probe
            .args(&command.fixed_args)
            .arg(VERSION_FLAG)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            probe.creation_flags(super::CREATE_NO_WINDOW);
        }

        match probe.status() {
            Ok(status) => status.success(),
            Err(e) => {
                log::debug!("[resolver] probe {} failed: {}", command, e);
                false
            }
        }
    }
}

/// Default candidate commands for this platform, in priority order
pub fn default_candidates() -> Vec<RuntimeCommand> {
    if cfg!(windows) {
        vec![
            RuntimeCommand::with_args("py", &["-3"]),
            RuntimeCommand::new("py"),
            RuntimeCommand::new("python"),
            RuntimeCommand::new("python3"),
        ]
    } else {
        vec![RuntimeCommand::new("python3"), RuntimeCommand::new("python")]
    }
}

/// Location of the bundled runtime under a resource directory
pub fn bundled_runtime_path(resource_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        resource_dir.join("python").join("python.exe")
    } else {
        resource_dir.join("python").join("bin").join("python3")
    }
}

pub struct RuntimeResolver {
    bundled: PathBuf,
    primary_var: String,
    secondary_var: String,
    candidates: Vec<RuntimeCommand>,
    probe: Box<dyn VersionProbe>,
}

impl RuntimeResolver {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            bundled: bundled_runtime_path(&config.resource_dir),
            primary_var: config.primary_runtime_var.clone(),
            secondary_var: config.secondary_runtime_var.clone(),
            candidates: default_candidates(),
            probe: Box::new(ProcessProbe),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<RuntimeCommand>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_probe(mut self, probe: Box<dyn VersionProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Find a runtime, first success wins
    ///
    /// Nothing is cached: an operator who fixes the environment gets the new
    /// runtime on the next call without restarting the host.
    ///
    /// # Errors
    /// Returns `EngineError::Resolution` naming the override variable to set
    pub fn resolve(&self) -> Result<RuntimeCommand, EngineError> {
        if self.bundled.exists() {
            log::debug!("[resolver] using bundled runtime {}", self.bundled.display());
            return Ok(RuntimeCommand::from_path(&self.bundled));
        }

        for var in [&self.primary_var, &self.secondary_var] {
            if let Some(path) = std::env::var(var).ok().as_deref().and_then(override_path) {
                log::debug!("[resolver] using {} override {}", var, path.display());
                return Ok(RuntimeCommand::from_path(&path));
            }
        }

        for candidate in &self.candidates {
            if self.probe.accepts(candidate) {
                log::debug!("[resolver] using candidate {}", candidate);
                return Ok(candidate.clone());
            }
        }

        Err(EngineError::Resolution {
            primary_var: self.primary_var.clone(),
            secondary_var: self.secondary_var.clone(),
        })
    }
}

/// Turn an override value into an existing runtime path
///
/// On Windows an override may name the interpreter's directory; the
/// conventional executable name is appended and checked first.
fn override_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let path = PathBuf::from(value);
    if cfg!(windows) && !value.to_ascii_lowercase().ends_with(".exe") {
        let exe = path.join("python.exe");
        if exe.exists() {
            return Some(exe);
        }
    }

    path.exists().then_some(path)
}
