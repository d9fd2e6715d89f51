use crate::config::Config;
use crate::parse::Command;
use crate::rules::{InterpreterMatcher, Rule, RuleId, Violation};

/// Flags inline code handed to an interpreter, e.g. `python -c '...'`.
///
/// Scanning covers the leading words of the command up to the first
/// non-option word; an interpreter found there has its options walked
/// for the inline flag, which must be followed by at least one more word.
/// The inline code itself is not inspected for newlines.
pub struct InlineScriptRule {
    interpreters: InterpreterMatcher,
    inline_flag: String,
    message: String,
}

impl InlineScriptRule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interpreters: InterpreterMatcher::from_config(&config.environment),
            inline_flag: config.environment.inline_flag.clone(),
            message: config.messages.inline_script.clone(),
        }
    }

    /// Walk the option words after the interpreter at `at`.
    fn has_inline_argument(&self, tokens: &[String], at: usize) -> bool {
        for j in at + 1..tokens.len() {
            if tokens[j] == self.inline_flag && j + 1 < tokens.len() {
                return true;
            }
            if !tokens[j].starts_with('-') {
                break;
            }
        }
        false
    }
}

impl Rule for InlineScriptRule {
    fn id(&self) -> RuleId {
        RuleId::InlineScript
    }

    fn check(&self, command: &Command) -> Option<Violation> {
        if self.inline_flag.is_empty() {
            return None;
        }
        let tokens = command.tokens();
        for (i, token) in tokens.iter().enumerate() {
            if self.interpreters.matches(token) && self.has_inline_argument(tokens, i) {
                return Some(Violation::new(RuleId::InlineScript, command, &self.message));
            }
            if !token.starts_with('-') {
                break;
            }
        }
        None
    }
}
