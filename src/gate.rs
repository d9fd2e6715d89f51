//! Lint/test gate: external checks that must pass before a commit.
//!
//! Checks run one at a time, each to completion. A check fails on a
//! non-zero exit status or when its output contains a failure marker.
//! A check that cannot be started at all is a fault, not a failure.

use std::path::{Path, PathBuf};
use std::process::Command as Process;

use crate::config::{CheckConfig, Config};

/// Why the gate did not pass.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A check ran and reported failure; the commit must not proceed.
    #[error("{check} failed:\n{message}")]
    Failed { check: String, message: String },
    /// A check could not be run; the gate could not be evaluated.
    #[error("could not run {check}: {source}")]
    Fault {
        check: String,
        #[source]
        source: std::io::Error,
    },
}

impl GateError {
    /// Name of the check that failed or faulted.
    pub fn check(&self) -> &str {
        match self {
            GateError::Failed { check, .. } | GateError::Fault { check, .. } => check,
        }
    }
}

/// Captured result of one finished check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutput {
    pub success: bool,
    /// stdout followed by stderr.
    pub output: String,
}

/// Runs a single check. The seam tests use to stand in for real processes.
pub trait CheckRunner {
    fn run(&self, check: &CheckConfig) -> std::io::Result<CheckOutput>;
}

/// Runs checks as child processes, optionally in a fixed directory.
#[derive(Debug, Default)]
pub struct ProcessRunner {
    cwd: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: Some(cwd.as_ref().to_path_buf()),
        }
    }
}

impl CheckRunner for ProcessRunner {
    fn run(&self, check: &CheckConfig) -> std::io::Result<CheckOutput> {
        let Some((program, args)) = check.command.split_first() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty command",
            ));
        };
        let mut process = Process::new(program);
        process.args(args);
        if let Some(ref dir) = self.cwd {
            process.current_dir(dir);
        }
        log::debug!("running check {}: {}", check.name, check.command.join(" "));
        let out = process.output()?;
        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));
        Ok(CheckOutput {
            success: out.status.success(),
            output,
        })
    }
}

/// The configured sequence of checks guarding a commit.
#[derive(Debug, Clone)]
pub struct Gate {
    checks: Vec<CheckConfig>,
    failure_markers: Vec<String>,
    message: String,
}

impl Gate {
    pub fn from_config(config: &Config) -> Self {
        Self {
            checks: config.gate.checks.clone(),
            failure_markers: config.gate.failure_markers.clone(),
            message: config.messages.gate.clone(),
        }
    }

    /// A gate with no checks always passes.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check in order, stopping at the first that does not pass.
    pub fn run(&self, runner: &dyn CheckRunner) -> Result<(), GateError> {
        for check in &self.checks {
            self.run_check(check, runner)?;
        }
        Ok(())
    }

    /// Run the named checks in order. Unknown names are skipped with a warning.
    pub fn run_named(&self, names: &[String], runner: &dyn CheckRunner) -> Result<(), GateError> {
        for name in names {
            match self.checks.iter().find(|c| &c.name == name) {
                Some(check) => self.run_check(check, runner)?,
                None => log::warn!("unknown gate check: {name}"),
            }
        }
        Ok(())
    }

    fn run_check(&self, check: &CheckConfig, runner: &dyn CheckRunner) -> Result<(), GateError> {
        let result = runner.run(check).map_err(|source| GateError::Fault {
            check: check.name.clone(),
            source,
        })?;

        let marker = self
            .failure_markers
            .iter()
            .find(|m| !m.is_empty() && result.output.contains(m.as_str()));

        if result.success && marker.is_none() {
            log::info!("check {} passed", check.name);
            return Ok(());
        }

        match marker {
            Some(m) => log::warn!("check {} failed (output contains {m:?})", check.name),
            None => log::warn!("check {} failed (non-zero exit)", check.name),
        }
        Err(GateError::Failed {
            check: check.name.clone(),
            message: self.message.clone(),
        })
    }
}
