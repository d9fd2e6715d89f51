//! bashgate: PreToolUse/PostToolUse hook for Claude Code.
//!
//! Reads the hook event as JSON from stdin. For Bash commands, writes a
//! deny decision to stdout when policy is violated or the lint/test gate
//! fails on a commit; stays silent otherwise. After file edits, runs the
//! configured linters and reports failures without blocking.
//!
//! Flags:
//!   --dump-config        print the effective configuration and exit
//!   --warn-only          report policy violations without denying
//!   --explain <command>  show how a command line is split and classified

use std::io::Read;
use std::process::ExitCode;

use bashgate::config::{Config, Enforcement};
use bashgate::eval::{Decision, RuleSet};
use bashgate::gate::{CheckRunner, Gate, ProcessRunner};
use bashgate::hook::{Action, HookInput, deny_output};
use bashgate::{logging, parse};

/// Exit status for unusable input.
const EXIT_FAILURE: u8 = 1;
/// Exit status the host treats as a blocking error.
const EXIT_BLOCKING: u8 = 2;

/// What one hook invocation writes and how it exits.
#[derive(Debug, Default, PartialEq, Eq)]
struct Outcome {
    stdout: Option<String>,
    stderr: Option<String>,
    code: u8,
}

impl Outcome {
    fn error(code: u8, message: String) -> Self {
        Self {
            stdout: None,
            stderr: Some(message),
            code,
        }
    }

    fn emit(self) -> ExitCode {
        if let Some(out) = self.stdout {
            println!("{out}");
        }
        if let Some(err) = self.stderr {
            eprintln!("{err}");
        }
        ExitCode::from(self.code)
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("bashgate: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.iter().any(|a| a == "--dump-config") {
        return match config.to_toml() {
            Ok(s) => {
                print!("{s}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("bashgate: cannot render config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let rules = rule_set(&config, &args);

    if let Some(pos) = args.iter().position(|a| a == "--explain") {
        print!("{}", explain(&rules, &args[pos + 1..].join(" ")));
        return ExitCode::SUCCESS;
    }

    logging::init(&config.settings);

    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read stdin");
        return ExitCode::FAILURE;
    }

    handle(&input, &config, &rules, |cwd| match cwd {
        Some(dir) => ProcessRunner::in_dir(dir),
        None => ProcessRunner::new(),
    })
    .emit()
}

/// Rule set for this invocation, with command-line overrides applied.
fn rule_set(config: &Config, args: &[String]) -> RuleSet {
    let mut rules = RuleSet::from_config(config);
    if args.iter().any(|a| a == "--warn-only") {
        rules.set_enforcement(Enforcement::Warn);
    }
    rules
}

/// Process one hook event. `runner_for` builds the check runner for the
/// event's working directory.
fn handle<R, F>(input: &str, config: &Config, rules: &RuleSet, runner_for: F) -> Outcome
where
    R: CheckRunner,
    F: FnOnce(Option<&str>) -> R,
{
    let hook_input = match HookInput::from_json(input) {
        Ok(v) => v,
        Err(e) => return Outcome::error(EXIT_FAILURE, format!("JSON parse error: {e}")),
    };

    let runner = runner_for(hook_input.cwd.as_deref());

    match hook_input.route(&config.post_edit) {
        Action::CheckCommand(command) => check_command(rules, &command, &runner),
        Action::PostEdit => post_edit(config, &hook_input, &runner),
        Action::Ignore => Outcome::default(),
    }
}

fn check_command(rules: &RuleSet, command: &str, runner: &dyn CheckRunner) -> Outcome {
    let verdict = match rules.evaluate(command, runner) {
        Ok(v) => v,
        Err(fault) => {
            log::error!("gate could not run for {command:?}: {fault}");
            return Outcome::error(EXIT_BLOCKING, format!("bashgate: {fault}"));
        }
    };

    logging::log_decision(command, &verdict);

    match verdict.decision {
        Decision::Deny => match serde_json::to_string(&deny_output(&verdict.reason)) {
            Ok(s) => Outcome {
                stdout: Some(s),
                ..Outcome::default()
            },
            Err(e) => Outcome::error(EXIT_BLOCKING, format!("bashgate: {e}")),
        },
        Decision::Warn => Outcome {
            stderr: Some(format!("bashgate: warning:\n{}", verdict.reason)),
            ..Outcome::default()
        },
        Decision::Allow => Outcome::default(),
    }
}

/// Run the post-edit checks; failures are reported, never blocking.
fn post_edit(config: &Config, input: &HookInput, runner: &dyn CheckRunner) -> Outcome {
    let file = input
        .tool_input
        .as_ref()
        .and_then(|t| t.file_path.as_deref())
        .unwrap_or("?");
    log::debug!("post-edit checks after editing {file}");

    let gate = Gate::from_config(config);
    match gate.run_named(&config.post_edit.checks, runner) {
        Ok(()) => Outcome::default(),
        Err(e) => {
            log::warn!("post-edit checks after {file}: {e}");
            Outcome {
                stderr: Some(format!("bashgate: {e}")),
                ..Outcome::default()
            }
        }
    }
}

/// Each command of the line with the rules it matches.
fn explain(rules: &RuleSet, line: &str) -> String {
    let ids: Vec<&str> = rules.rule_ids().iter().map(|id| id.as_str()).collect();
    let mut out = format!("rules: {}\n", ids.join(", "));

    let commands = parse::split(line);
    if commands.is_empty() {
        out.push_str("(no commands)\n");
        return out;
    }
    for command in &commands {
        out.push_str(&format!("[{command}]\n"));
        let violations = rules.classify(command);
        if violations.is_empty() {
            out.push_str("  ok\n");
        }
        for v in violations {
            let summary = v.message.lines().next().unwrap_or_default();
            out.push_str(&format!("  {}: {summary}\n", v.rule));
        }
    }
    out
}
