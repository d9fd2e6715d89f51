use crate::parse::Command;
use crate::rules::{Rule, RuleId, Violation};

/// Matches `git commit ...` in program position.
///
/// Only the first two words are considered: `echo git commit` and
/// `git -C repo commit` do not match.
pub struct GitCommitRule;

impl Rule for GitCommitRule {
    fn id(&self) -> RuleId {
        RuleId::GitCommit
    }

    fn check(&self, command: &Command) -> Option<Violation> {
        match command.tokens() {
            [program, sub, ..] if program == "git" && sub == "commit" => Some(Violation::new(
                RuleId::GitCommit,
                command,
                "git commit requires passing lint and test checks",
            )),
            _ => None,
        }
    }
}
