pub mod decision;

pub use decision::{Decision, Verdict};

use crate::config::{Config, Enforcement, Policy};
use crate::gate::{CheckRunner, Gate, GateError};
use crate::parse::{self, Command};
use crate::rules::{
    Rule, RuleId, RuleKind, Violation, git_commit::GitCommitRule,
    inline_script::InlineScriptRule, interpreter::DirectInterpreterRule, tool::DirectToolRule,
};

/// Ordered rules plus the gate and policy that act on their matches.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
    gate: Gate,
    policy: Policy,
    enforcement: Enforcement,
}

impl RuleSet {
    /// Build the rule set from configuration. Disabled rules are left out;
    /// the rest keep declaration order.
    pub fn from_config(config: &Config) -> Self {
        let enabled = &config.rules;
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();

        if enabled.git_commit {
            rules.push(Box::new(GitCommitRule));
        }
        if enabled.direct_interpreter {
            rules.push(Box::new(DirectInterpreterRule::from_config(config)));
        }
        if enabled.direct_tool {
            rules.push(Box::new(DirectToolRule::from_config(config)));
        }
        if enabled.inline_script {
            rules.push(Box::new(InlineScriptRule::from_config(config)));
        }

        Self {
            rules,
            gate: Gate::from_config(config),
            policy: config.settings.policy,
            enforcement: config.settings.enforcement,
        }
    }

    /// Override the enforcement setting (e.g. from the --warn-only CLI flag).
    pub fn set_enforcement(&mut self, enforcement: Enforcement) {
        self.enforcement = enforcement;
    }

    /// Identities of the active rules, in evaluation order.
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Every rule matching the command, in rule order.
    pub fn classify(&self, command: &Command) -> Vec<Violation> {
        self.rules.iter().filter_map(|r| r.check(command)).collect()
    }

    /// The first rule matching the command.
    pub fn classify_first(&self, command: &Command) -> Option<Violation> {
        self.rules.iter().find_map(|r| r.check(command))
    }

    /// Every violation on a raw line, command by command. No gate, no policy.
    pub fn classify_line(&self, line: &str) -> Vec<Violation> {
        parse::split(line)
            .iter()
            .flat_map(|command| self.classify(command))
            .collect()
    }

    /// Evaluate a raw line: classify every command, apply policy and
    /// enforcement, and run the gate when a commit is detected.
    ///
    /// A blocking policy violation returns before the gate runs. A gate
    /// that fails yields `Deny`; a gate that cannot run is an error.
    pub fn evaluate(&self, line: &str, runner: &dyn CheckRunner) -> Result<Verdict, GateError> {
        let commands = parse::split(line);
        if commands.is_empty() {
            return Ok(Verdict::allow("empty"));
        }

        let mut gated = false;
        let mut violations = Vec::new();
        for command in &commands {
            for v in self.classify(command) {
                log::debug!("[{}] matched {}", v.command, v.rule);
                match v.rule.kind() {
                    RuleKind::Gate => gated = true,
                    RuleKind::Policy => violations.push(v),
                }
            }
        }

        if self.policy == Policy::FailFast {
            violations.truncate(1);
        }

        if !violations.is_empty() && self.enforcement == Enforcement::Block {
            return Ok(Verdict {
                decision: Decision::Deny,
                reason: render(&violations),
                violations,
            });
        }

        if gated && !self.gate.is_empty() {
            match self.gate.run(runner) {
                Ok(()) => {}
                Err(err @ GateError::Failed { .. }) => {
                    return Ok(Verdict {
                        decision: Decision::Deny,
                        reason: err.to_string(),
                        violations,
                    });
                }
                Err(fault) => return Err(fault),
            }
        }

        if !violations.is_empty() {
            return Ok(Verdict {
                decision: Decision::Warn,
                reason: render(&violations),
                violations,
            });
        }

        Ok(Verdict::allow(if gated {
            "commit checks passed"
        } else {
            "no policy violations"
        }))
    }
}

/// A single violation renders as its message verbatim; several are each
/// labelled with their command and rule.
fn render(violations: &[Violation]) -> String {
    if let [only] = violations {
        return only.message.clone();
    }
    violations
        .iter()
        .map(|v| format!("[{}] {}:\n{}", v.command, v.rule, v.message))
        .collect::<Vec<_>>()
        .join("\n\n")
}
