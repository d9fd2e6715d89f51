//! Claude Code hook protocol: the JSON event on stdin and the permission
//! decision written to stdout.

use serde::Deserialize;

use crate::config::PostEditConfig;

/// The subset of the hook event this crate reads. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    pub hook_event_name: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<ToolInput>,
    /// Working directory of the session; gate checks run here.
    pub cwd: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    pub command: Option<String>,
    pub file_path: Option<String>,
}

/// What the hook should do with an event.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Classify (and possibly gate) a Bash command line.
    CheckCommand(String),
    /// Run the post-edit checks for a file write/edit.
    PostEdit,
    /// Not ours: exit quietly.
    Ignore,
}

impl HookInput {
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    /// Event name; hosts that omit it are treated as `PreToolUse`.
    pub fn event(&self) -> &str {
        self.hook_event_name.as_deref().unwrap_or("PreToolUse")
    }

    fn tool_is(&self, name: &str) -> bool {
        self.tool_name
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(name))
    }

    /// Decide how to handle this event.
    pub fn route(&self, post_edit: &PostEditConfig) -> Action {
        match self.event() {
            "PreToolUse" if self.tool_is("Bash") => {
                let command = self
                    .tool_input
                    .as_ref()
                    .and_then(|t| t.command.as_deref())
                    .unwrap_or_default();
                if command.trim().is_empty() {
                    Action::Ignore
                } else {
                    Action::CheckCommand(command.to_string())
                }
            }
            "PostToolUse"
                if post_edit.enabled && post_edit.tools.iter().any(|t| self.tool_is(t)) =>
            {
                Action::PostEdit
            }
            _ => Action::Ignore,
        }
    }
}

/// The stdout payload denying a tool call with `reason`.
pub fn deny_output(reason: &str) -> serde_json::Value {
    serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": "PreToolUse",
            "permissionDecision": "deny",
            "permissionDecisionReason": reason,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn route(json: &str) -> Action {
        let input = HookInput::from_json(json).unwrap();
        input.route(&Config::default_config().post_edit)
    }

    #[test]
    fn bash_pre_tool_use_checks_command() {
        assert_eq!(
            route(
                r#"{"hook_event_name":"PreToolUse","tool_name":"Bash","tool_input":{"command":"git commit"}}"#
            ),
            Action::CheckCommand("git commit".into())
        );
    }

    #[test]
    fn missing_event_defaults_to_pre_tool_use() {
        assert_eq!(
            route(r#"{"tool_name":"bash","tool_input":{"command":"ls"}}"#),
            Action::CheckCommand("ls".into())
        );
    }

    #[test]
    fn empty_command_ignored() {
        assert_eq!(
            route(r#"{"tool_name":"Bash","tool_input":{"command":"  "}}"#),
            Action::Ignore
        );
        assert_eq!(route(r#"{"tool_name":"Bash"}"#), Action::Ignore);
    }

    #[test]
    fn other_tools_ignored() {
        assert_eq!(
            route(r#"{"hook_event_name":"PreToolUse","tool_name":"Read","tool_input":{"file_path":"/x"}}"#),
            Action::Ignore
        );
    }

    #[test]
    fn post_edit_for_write_and_edit() {
        for tool in ["Write", "Edit", "edit", "MultiEdit"] {
            let json = format!(
                r#"{{"hook_event_name":"PostToolUse","tool_name":"{tool}","tool_input":{{"file_path":"a.py"}}}}"#
            );
            assert_eq!(route(&json), Action::PostEdit, "tool: {tool}");
        }
    }

    #[test]
    fn post_edit_disabled() {
        let mut config = Config::default_config();
        config.post_edit.enabled = false;
        let input =
            HookInput::from_json(r#"{"hook_event_name":"PostToolUse","tool_name":"Write"}"#).unwrap();
        assert_eq!(input.route(&config.post_edit), Action::Ignore);
    }

    #[test]
    fn post_bash_ignored() {
        assert_eq!(
            route(r#"{"hook_event_name":"PostToolUse","tool_name":"Bash","tool_input":{"command":"ls"}}"#),
            Action::Ignore
        );
    }

    #[test]
    fn unknown_fields_tolerated() {
        let input = HookInput::from_json(
            r#"{"session_id":"abc","transcript_path":"/t","cwd":"/repo","tool_name":"Bash","tool_input":{"command":"ls","description":"list"}}"#,
        )
        .unwrap();
        assert_eq!(input.cwd.as_deref(), Some("/repo"));
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(HookInput::from_json("{not json").is_err());
    }

    #[test]
    fn deny_payload_shape() {
        let out = deny_output("use hatch");
        assert_eq!(out["hookSpecificOutput"]["permissionDecision"], "deny");
        assert_eq!(
            out["hookSpecificOutput"]["permissionDecisionReason"],
            "use hatch"
        );
        assert_eq!(out["hookSpecificOutput"]["hookEventName"], "PreToolUse");
    }
}
