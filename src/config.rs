use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Env var naming an explicit user config file.
pub const CONFIG_ENV_VAR: &str = "BASHGATE_CONFIG";

/// Implicit user config location, relative to `$HOME`.
const USER_CONFIG_PATH: &str = "~/.config/bashgate/config.toml";

/// Failure to load an explicitly requested config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub post_edit: PostEditConfig,
}

/// How many policy violations a line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Stop at the first policy violation.
    #[default]
    FailFast,
    /// Report every policy violation on the line.
    CollectAll,
}

/// What a policy violation does to the tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Deny the tool call with the violation message.
    #[default]
    Block,
    /// Log the violation and let the tool call proceed.
    Warn,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub enforcement: Enforcement,
    /// Decision log path; `~` is expanded. Empty disables logging.
    #[serde(default)]
    pub log_file: String,
    #[serde(default)]
    pub log_level: String,
}

/// The allow-list table consumed by the interpreter and tool rules.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct EnvironmentConfig {
    /// Environment-runner programs; any of them earlier in a command
    /// suppresses the direct-usage rules.
    #[serde(default)]
    pub runners: Vec<String>,
    #[serde(default)]
    pub interpreters: Vec<String>,
    #[serde(default)]
    pub interpreter_prefixes: Vec<String>,
    #[serde(default)]
    pub inline_flag: String,
    #[serde(default)]
    pub banned_tools: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct RulesConfig {
    #[serde(default)]
    pub git_commit: bool,
    #[serde(default)]
    pub direct_interpreter: bool,
    #[serde(default)]
    pub direct_tool: bool,
    #[serde(default)]
    pub inline_script: bool,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Messages {
    #[serde(default)]
    pub direct_interpreter: String,
    /// `{tool}` is replaced with the offending tool name.
    #[serde(default)]
    pub direct_tool: String,
    #[serde(default)]
    pub inline_script: String,
    #[serde(default)]
    pub gate: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct GateConfig {
    #[serde(default)]
    pub failure_markers: Vec<String>,
    /// Run in order before a `git commit` may proceed.
    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CheckConfig {
    pub name: String,
    /// Program followed by its arguments.
    pub command: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct PostEditConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Host tool names (case-insensitive) that trigger the post-edit checks.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Names of `[[gate.checks]]` entries to run after an edit.
    #[serde(default)]
    pub checks: Vec<String>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    environment: EnvironmentOverlay,
    #[serde(default)]
    rules: RulesOverlay,
    #[serde(default)]
    messages: MessagesOverlay,
    #[serde(default)]
    gate: GateOverlay,
    #[serde(default)]
    post_edit: PostEditOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    policy: Option<Policy>,
    enforcement: Option<Enforcement>,
    log_file: Option<String>,
    log_level: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct EnvironmentOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    runners: Vec<String>,
    #[serde(default)]
    interpreters: Vec<String>,
    #[serde(default)]
    interpreter_prefixes: Vec<String>,
    inline_flag: Option<String>,
    #[serde(default)]
    banned_tools: Vec<String>,
    #[serde(default)]
    remove_runners: Vec<String>,
    #[serde(default)]
    remove_interpreters: Vec<String>,
    #[serde(default)]
    remove_interpreter_prefixes: Vec<String>,
    #[serde(default)]
    remove_banned_tools: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RulesOverlay {
    git_commit: Option<bool>,
    direct_interpreter: Option<bool>,
    direct_tool: Option<bool>,
    inline_script: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct MessagesOverlay {
    direct_interpreter: Option<String>,
    direct_tool: Option<String>,
    inline_script: Option<String>,
    gate: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct GateOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    failure_markers: Vec<String>,
    #[serde(default)]
    remove_failure_markers: Vec<String>,
    /// Checks are replaced wholesale when given; order matters.
    checks: Option<Vec<CheckConfig>>,
}

#[derive(Debug, Deserialize, Default)]
struct PostEditOverlay {
    #[serde(default)]
    replace: bool,
    enabled: Option<bool>,
    #[serde(default)]
    tools: Vec<String>,
    #[serde(default)]
    checks: Vec<String>,
    #[serde(default)]
    remove_tools: Vec<String>,
    #[serde(default)]
    remove_checks: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. If `$BASHGATE_CONFIG` is set, merge that file (errors are returned)
    /// 3. Otherwise merge ~/.config/bashgate/config.toml if it exists
    ///    (parse errors are reported on stderr and the defaults kept)
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            return Self::load_from(Path::new(&expanded));
        }
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_user_overlay() {
            config.apply_overlay(overlay);
        }
        Ok(config)
    }

    /// Defaults merged with the overlay at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let overlay: ConfigOverlay =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        Ok(config)
    }

    /// Try to load the implicit user overlay.
    fn load_user_overlay() -> Option<ConfigOverlay> {
        let path = shellexpand::tilde(USER_CONFIG_PATH).into_owned();
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("bashgate: config parse error: {e}");
                None
            }
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        override_with(&mut self.settings.policy, s.policy);
        override_with(&mut self.settings.enforcement, s.enforcement);
        override_with(&mut self.settings.log_file, s.log_file);
        override_with(&mut self.settings.log_level, s.log_level);

        // Environment
        let e = overlay.environment;
        merge_list(
            &mut self.environment.runners,
            e.runners,
            &e.remove_runners,
            e.replace,
        );
        merge_list(
            &mut self.environment.interpreters,
            e.interpreters,
            &e.remove_interpreters,
            e.replace,
        );
        merge_list(
            &mut self.environment.interpreter_prefixes,
            e.interpreter_prefixes,
            &e.remove_interpreter_prefixes,
            e.replace,
        );
        merge_list(
            &mut self.environment.banned_tools,
            e.banned_tools,
            &e.remove_banned_tools,
            e.replace,
        );
        override_with(&mut self.environment.inline_flag, e.inline_flag);

        // Rules
        let r = overlay.rules;
        override_with(&mut self.rules.git_commit, r.git_commit);
        override_with(&mut self.rules.direct_interpreter, r.direct_interpreter);
        override_with(&mut self.rules.direct_tool, r.direct_tool);
        override_with(&mut self.rules.inline_script, r.inline_script);

        // Messages
        let m = overlay.messages;
        override_with(&mut self.messages.direct_interpreter, m.direct_interpreter);
        override_with(&mut self.messages.direct_tool, m.direct_tool);
        override_with(&mut self.messages.inline_script, m.inline_script);
        override_with(&mut self.messages.gate, m.gate);

        // Gate
        let g = overlay.gate;
        merge_list(
            &mut self.gate.failure_markers,
            g.failure_markers,
            &g.remove_failure_markers,
            g.replace,
        );
        override_with(&mut self.gate.checks, g.checks);

        // Post-edit
        let p = overlay.post_edit;
        override_with(&mut self.post_edit.enabled, p.enabled);
        merge_list(
            &mut self.post_edit.tools,
            p.tools,
            &p.remove_tools,
            p.replace,
        );
        merge_list(
            &mut self.post_edit.checks,
            p.checks,
            &p.remove_checks,
            p.replace,
        );
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    pub(crate) fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert!(!config.environment.runners.is_empty());
        assert!(!config.environment.interpreters.is_empty());
        assert!(!config.environment.banned_tools.is_empty());
        assert!(!config.gate.checks.is_empty());
        assert!(!config.messages.gate.is_empty());
    }

    #[test]
    fn default_config_has_expected_entries() {
        let config = Config::default_config();
        assert_eq!(config.environment.runners, vec!["hatch"]);
        assert_eq!(config.environment.inline_flag, "-c");
        for tool in ["coverage", "pyright", "pytest", "ruff"] {
            assert!(config.environment.banned_tools.contains(&tool.to_string()));
        }
        assert!(config.messages.direct_tool.contains("{tool}"));
    }

    #[test]
    fn default_settings() {
        let config = Config::default_config();
        assert_eq!(config.settings.policy, Policy::FailFast);
        assert_eq!(config.settings.enforcement, Enforcement::Block);
    }

    #[test]
    fn default_gate_checks_in_order() {
        let config = Config::default_config();
        let names: Vec<&str> = config.gate.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["linters", "testers"]);
        assert_eq!(
            config
                .gate
                .checks
                .iter()
                .find(|c| c.name == "testers")
                .map(|c| c.command.clone()),
            Some(vec![
                "hatch".to_string(),
                "--env".into(),
                "develop".into(),
                "run".into(),
                "testers".into(),
            ])
        );
    }

    #[test]
    fn default_rules_all_enabled() {
        let r = Config::default_config().rules;
        assert!(r.git_commit && r.direct_interpreter && r.direct_tool && r.inline_script);
    }

    // ── Merge semantics ──

    #[test]
    fn overlay_extends_banned_tools() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [environment]
            banned_tools = ["mypy"]
        "#,
        );
        assert!(config.environment.banned_tools.contains(&"ruff".to_string()));
        assert!(config.environment.banned_tools.contains(&"mypy".to_string()));
    }

    #[test]
    fn overlay_removes_banned_tool() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [environment]
            remove_banned_tools = ["coverage"]
        "#,
        );
        assert!(!config.environment.banned_tools.contains(&"coverage".to_string()));
        assert!(config.environment.banned_tools.contains(&"pytest".to_string()));
    }

    #[test]
    fn overlay_replace_environment() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [environment]
            replace = true
            runners = ["uv"]
            interpreters = ["python"]
            banned_tools = ["mypy"]
        "#,
        );
        assert_eq!(config.environment.runners, vec!["uv"]);
        assert_eq!(config.environment.interpreters, vec!["python"]);
        assert_eq!(config.environment.banned_tools, vec!["mypy"]);
        assert!(config.environment.interpreter_prefixes.is_empty());
        // Scalars are untouched by replace
        assert_eq!(config.environment.inline_flag, "-c");
    }

    #[test]
    fn overlay_no_duplicates() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [environment]
            runners = ["hatch"]
        "#,
        );
        let count = config
            .environment
            .runners
            .iter()
            .filter(|s| *s == "hatch")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn overlay_settings_scalars() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            policy = "collect_all"
            enforcement = "warn"
        "#,
        );
        assert_eq!(config.settings.policy, Policy::CollectAll);
        assert_eq!(config.settings.enforcement, Enforcement::Warn);
        assert_eq!(config.settings.log_level, "info");
    }

    #[test]
    fn overlay_disables_rule() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [rules]
            inline_script = false
        "#,
        );
        assert!(!config.rules.inline_script);
        assert!(config.rules.direct_tool);
    }

    #[test]
    fn overlay_replaces_gate_checks() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [[gate.checks]]
            name = "lint"
            command = ["make", "lint"]
        "#,
        );
        assert_eq!(
            config.gate.checks,
            vec![CheckConfig {
                name: "lint".into(),
                command: vec!["make".into(), "lint".into()],
            }]
        );
        // Markers merge independently
        assert_eq!(config.gate.failure_markers, vec!["errors", "failed"]);
    }

    #[test]
    fn overlay_message_override() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [messages]
            direct_tool = "no {tool} here"
        "#,
        );
        assert_eq!(config.messages.direct_tool, "no {tool} here");
        assert!(!config.messages.gate.is_empty());
    }

    #[test]
    fn overlay_post_edit() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [post_edit]
            enabled = false
            remove_tools = ["MultiEdit"]
        "#,
        );
        assert!(!config.post_edit.enabled);
        assert_eq!(config.post_edit.tools, vec!["Write", "Edit"]);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(
            config.environment.banned_tools,
            original.environment.banned_tools
        );
        assert_eq!(config.gate.checks, original.gate.checks);
        assert_eq!(config.settings.policy, original.settings.policy);
    }

    #[test]
    fn overlay_rejects_unknown_policy() {
        let parsed: Result<ConfigOverlay, _> = toml::from_str(
            r#"
            [settings]
            policy = "sometimes"
        "#,
        );
        assert!(parsed.is_err());
    }

    // ── File loading ──

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings]\nenforcement = \"warn\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.settings.enforcement, Enforcement::Warn);
        assert_eq!(config.environment.runners, vec!["hatch"]);
    }

    #[test]
    fn load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_from_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings\npolicy = ").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("cannot parse config"));
    }

    #[test]
    fn dump_round_trips() {
        let config = Config::default_config();
        let dumped = config.to_toml().unwrap();
        let reparsed: Config = toml::from_str(&dumped).unwrap();
        assert_eq!(reparsed.gate.checks, config.gate.checks);
        assert_eq!(reparsed.messages.gate, config.messages.gate);
    }
}
