//! Policy rules: per-command predicates with their violation messages.
//!
//! Every rule is a [`Rule`] trait object built once from configuration.
//! Rules are pure: they look at one partitioned [`Command`] and either
//! produce a [`Violation`] or nothing.

/// Detects `git commit` so the lint/test gate can run first.
pub mod git_commit;
/// Detects multi-line scripts passed inline to an interpreter (`python -c`).
pub mod inline_script;
/// Detects interpreters invoked outside the environment runner.
pub mod interpreter;
/// Detects banned tools invoked outside the environment runner.
pub mod tool;

use std::fmt;

use crate::config::EnvironmentConfig;
use crate::parse::Command;

/// Trait for policy rules.
///
/// Each implementation checks a single command (one segment of a possibly
/// chained line) and returns a `Violation` carrying its rendered message.
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    /// Check the command and return a violation if the rule matches.
    fn check(&self, command: &Command) -> Option<Violation>;
}

/// Stable identity of each built-in rule, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId {
    GitCommit,
    DirectInterpreter,
    DirectTool,
    InlineScript,
}

/// Whether a match is a policy violation or a trigger for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// The command may proceed only once the lint/test gate passes.
    Gate,
    /// The command breaks environment policy outright.
    Policy,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::GitCommit => "git-commit",
            RuleId::DirectInterpreter => "direct-interpreter",
            RuleId::DirectTool => "direct-tool",
            RuleId::InlineScript => "inline-script",
        }
    }

    pub fn kind(self) -> RuleKind {
        match self {
            RuleId::GitCommit => RuleKind::Gate,
            RuleId::DirectInterpreter | RuleId::DirectTool | RuleId::InlineScript => {
                RuleKind::Policy
            }
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A matching rule applied to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: RuleId,
    /// The offending command.
    pub command: Command,
    /// Rendered, user-facing message.
    pub message: String,
}

impl Violation {
    pub fn new(rule: RuleId, command: &Command, message: impl Into<String>) -> Self {
        Self {
            rule,
            command: command.clone(),
            message: message.into(),
        }
    }
}

/// Recognises interpreter words: exact names plus lenient prefixes
/// (`python3.` matches `python3.11`, and also `python3.foo`).
#[derive(Debug, Clone, Default)]
pub struct InterpreterMatcher {
    names: Vec<String>,
    prefixes: Vec<String>,
}

impl InterpreterMatcher {
    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self {
            names: config.interpreters.clone(),
            prefixes: config.interpreter_prefixes.clone(),
        }
    }

    pub fn matches(&self, token: &str) -> bool {
        self.names.iter().any(|n| n == token)
            || self
                .prefixes
                .iter()
                .any(|p| !p.is_empty() && token.starts_with(p.as_str()))
    }
}

/// Scan left to right for the first token accepted by `is_direct`.
/// Returns `None` as soon as a runner word is seen: everything after it
/// runs inside the managed environment.
fn first_direct_use<'a>(
    command: &'a Command,
    runners: &[String],
    is_direct: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    for token in command.tokens() {
        if runners.iter().any(|r| r == token) {
            return None;
        }
        if is_direct(token) {
            return Some(token);
        }
    }
    None
}
