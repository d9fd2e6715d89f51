use std::fs::OpenOptions;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config::Settings;
use crate::eval::Verdict;

/// Longest command prefix written to a decision line.
const MAX_COMMAND_CHARS: usize = 200;

/// Install a file logger appending to `settings.log_file`.
/// Best-effort: failures leave logging disabled (logging must never block the hook).
pub fn init(settings: &Settings) {
    let Some(path) = log_path(settings) else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let _ = WriteLogger::init(level(settings), config, file);
}

/// Resolved log file, or `None` when logging is disabled.
fn log_path(settings: &Settings) -> Option<PathBuf> {
    if settings.log_file.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(
        shellexpand::tilde(settings.log_file.trim()).into_owned(),
    ))
}

/// Configured level, falling back to `info` for unknown names.
fn level(settings: &Settings) -> LevelFilter {
    settings.log_level.parse().unwrap_or(LevelFilter::Info)
}

/// Record one decision.
pub fn log_decision(command: &str, verdict: &Verdict) {
    log::info!("{}", decision_line(command, verdict));
}

/// Compact single-line record: decision, rules, truncated command, reason.
fn decision_line(command: &str, verdict: &Verdict) -> String {
    let reason_oneline = verdict.reason.trim().replace('\n', "; ").replace('\t', " ");
    let cmd_truncated: String = command
        .chars()
        .take(MAX_COMMAND_CHARS)
        .map(|c| if matches!(c, '\n' | '\t') { ' ' } else { c })
        .collect();
    let rules: Vec<&str> = verdict.violations.iter().map(|v| v.rule.as_str()).collect();
    let rules = if rules.is_empty() {
        "-".to_string()
    } else {
        rules.join(",")
    };
    format!(
        "{decision}\t{rules}\t{cmd_truncated}\t{reason_oneline}",
        decision = verdict.decision.as_str(),
    )
}
