use crate::config::Config;
use crate::parse::Command;
use crate::rules::{Rule, RuleId, Violation, first_direct_use};

/// Placeholder in the message template replaced by the offending tool.
const TOOL_PLACEHOLDER: &str = "{tool}";

/// Flags banned tools (coverage, pyright, pytest, ruff, ...) run directly
/// instead of through an environment runner.
pub struct DirectToolRule {
    runners: Vec<String>,
    banned: Vec<String>,
    template: String,
}

impl DirectToolRule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            runners: config.environment.runners.clone(),
            banned: config.environment.banned_tools.clone(),
            template: config.messages.direct_tool.clone(),
        }
    }
}

impl Rule for DirectToolRule {
    fn id(&self) -> RuleId {
        RuleId::DirectTool
    }

    fn check(&self, command: &Command) -> Option<Violation> {
        let tool = first_direct_use(command, &self.runners, |t| {
            self.banned.iter().any(|b| b == t)
        })?;
        let message = self.template.replace(TOOL_PLACEHOLDER, tool);
        Some(Violation::new(RuleId::DirectTool, command, message))
    }
}
