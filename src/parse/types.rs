//! Types produced by the shell parser and consumed by the rule layer.

use std::fmt;

/// Shell control operator separating consecutive commands on one line.
///
/// Only recognised when it stands alone as a token: `a&&b` is a single
/// word to the tokenizer and is never split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOperator {
    /// `;`: run next unconditionally
    Semi,
    /// `&`: run previous in the background
    Background,
    /// `|`: pipe stdout
    Pipe,
    /// `&&`: run next only if previous succeeded
    And,
    /// `||`: run next only if previous failed
    Or,
}

impl ControlOperator {
    /// The operator's shell syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlOperator::Semi => ";",
            ControlOperator::Background => "&",
            ControlOperator::Pipe => "|",
            ControlOperator::And => "&&",
            ControlOperator::Or => "||",
        }
    }

    /// Recognise a standalone token as an operator.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            ";" => Some(ControlOperator::Semi),
            "&" => Some(ControlOperator::Background),
            "|" => Some(ControlOperator::Pipe),
            "&&" => Some(ControlOperator::And),
            "||" => Some(ControlOperator::Or),
            _ => None,
        }
    }
}

/// One shell invocation within a (possibly chained) command line.
///
/// Always non-empty when produced by [`partition`](super::partition).
/// `tokens()[0]` is conventionally the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tokens: Vec<String>,
}

impl Command {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The program word, if any.
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}

impl<S: Into<String>> FromIterator<S> for Command {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Renders the command shell-quoted, so tokens with embedded spaces stay
/// recognisable in logs and reasons.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match shlex::try_join(self.tokens.iter().map(String::as_str)) {
            Ok(joined) => f.write_str(&joined),
            // Tokens containing NUL can't be quoted; fall back to a plain join
            Err(_) => f.write_str(&self.tokens.join(" ")),
        }
    }
}
