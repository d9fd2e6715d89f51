//! bashgate: a Claude Code hook that gates Bash commands on project policy.
//!
//! A command line is split into words (honoring quotes), partitioned into
//! commands at control operators, and each command is checked against an
//! ordered [`rules::Rule`] set built from configuration. Policy violations
//! (running `python` or `pytest` outside the environment runner, inline
//! `python -c` scripts) deny or warn; a `git commit` runs the lint/test
//! [`gate`] first and is denied if it fails.
//!
//! # Architecture
//!
//! - **[`parse`]**: Tokenizer, partitioner, `Command` and operator types.
//! - **[`rules`]**: Rule trait and the built-in rules.
//! - **[`eval`]**: Rule set, policy/enforcement, verdicts.
//! - **[`gate`]**: External lint/test checks.
//! - **[`config`]**: Configuration loading: embedded defaults + user overlay merge.
//! - **[`hook`]**: Hook event parsing and stdout payloads.
//! - **[`logging`]**: Decision logging to `~/.local/share/bashgate/decisions.log`.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Rule set, policy application, and verdicts.
pub mod eval;
/// Lint/test gate run before commits.
pub mod gate;
/// Claude Code hook input/output.
pub mod hook;
/// File-based decision logging.
pub mod logging;
/// Shell command parsing: quote-aware tokenizer and operator partitioner.
pub mod parse;
/// Policy rules.
pub mod rules;

use rules::Violation;

/// Build the rule set from default config and classify a command line.
///
/// Reports every violation on the line and runs nothing. For enforcement
/// with the lint/test gate, build an [`eval::RuleSet`] and call
/// [`evaluate`](eval::RuleSet::evaluate).
pub fn classify(line: &str) -> Vec<Violation> {
    let config = config::Config::default_config();
    eval::RuleSet::from_config(&config).classify_line(line)
}
