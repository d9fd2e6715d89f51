use super::tokenize::tokenize;
use super::types::{Command, ControlOperator};

/// Regroup a token stream into commands, splitting at standalone control
/// operators (`;`, `&`, `|`, `&&`, `||`). Operators are dropped and empty
/// groups (leading, trailing, or doubled operators) are skipped.
pub fn partition<S: AsRef<str>>(tokens: &[S]) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        if ControlOperator::from_token(token).is_some() {
            if !current.is_empty() {
                commands.push(Command::new(std::mem::take(&mut current)));
            }
            continue;
        }
        current.push(token.to_string());
    }

    if !current.is_empty() {
        commands.push(Command::new(current));
    }

    commands
}

/// Tokenize a raw command line and partition it into commands.
pub fn split(line: &str) -> Vec<Command> {
    partition(&tokenize(line))
}
