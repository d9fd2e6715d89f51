use crate::rules::Violation;

/// What the hook tells the host to do with the tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Decision {
    Allow,
    Warn,
    Deny,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Warn => "warn",
            Decision::Deny => "deny",
        }
    }
}

/// The engine's answer for one command line.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub decision: Decision,
    /// Policy violations that shaped the decision (gate triggers excluded).
    pub violations: Vec<Violation>,
    /// User-facing text: the policy or gate message verbatim when not allowed.
    pub reason: String,
}

impl Verdict {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Allow,
            violations: Vec::new(),
            reason: reason.into(),
        }
    }
}
