use crate::config::Config;
use crate::parse::Command;
use crate::rules::{InterpreterMatcher, Rule, RuleId, Violation, first_direct_use};

/// Flags an interpreter (`python`, `python3`, `python3.X`) run directly
/// instead of through an environment runner such as `hatch run python`.
pub struct DirectInterpreterRule {
    runners: Vec<String>,
    interpreters: InterpreterMatcher,
    message: String,
}

impl DirectInterpreterRule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            runners: config.environment.runners.clone(),
            interpreters: InterpreterMatcher::from_config(&config.environment),
            message: config.messages.direct_interpreter.clone(),
        }
    }
}

impl Rule for DirectInterpreterRule {
    fn id(&self) -> RuleId {
        RuleId::DirectInterpreter
    }

    fn check(&self, command: &Command) -> Option<Violation> {
        first_direct_use(command, &self.runners, |t| self.interpreters.matches(t))?;
        Some(Violation::new(RuleId::DirectInterpreter, command, &self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(tokens: &[&str]) -> bool {
        let rule = DirectInterpreterRule::from_config(&Config::default_config());
        let cmd: Command = tokens.iter().copied().collect();
        rule.check(&cmd).is_some()
    }

    #[test]
    fn match_python_script() {
        assert!(matches(&["python", "script.py"]));
    }

    #[test]
    fn match_versioned() {
        assert!(matches(&["python3.11", "-m", "pip", "list"]));
        assert!(matches(&["python3", "-V"]));
    }

    #[test]
    fn match_anywhere_in_command() {
        assert!(matches(&["env", "FOO=1", "python", "x.py"]));
        assert!(matches(&["time", "python3", "x.py"]));
    }

    #[test]
    fn no_match_after_runner() {
        assert!(!matches(&["hatch", "run", "python", "script.py"]));
        assert!(!matches(&["hatch", "--env", "develop", "run", "python3"]));
    }

    #[test]
    fn match_when_runner_comes_later() {
        assert!(matches(&["python", "-m", "hatch"]));
    }

    #[test]
    fn no_match_without_interpreter() {
        assert!(!matches(&["ls", "-la"]));
        assert!(!matches(&["cat", "python.txt"]));
    }

    #[test]
    fn configured_runner_suppresses() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [environment]
            runners = ["uv"]
        "#,
        );
        let rule = DirectInterpreterRule::from_config(&config);
        let cmd: Command = ["uv", "run", "python"].into_iter().collect();
        assert!(rule.check(&cmd).is_none());
    }

    #[test]
    fn message_from_config() {
        let config = Config::default_config();
        let rule = DirectInterpreterRule::from_config(&config);
        let cmd: Command = ["python"].into_iter().collect();
        assert_eq!(
            rule.check(&cmd).map(|v| v.message),
            Some(config.messages.direct_interpreter.clone())
        );
    }
}
