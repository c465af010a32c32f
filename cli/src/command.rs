//! Parsing of shell command lines.
//!
//! ```text
//! on <type> [label] [args...]      register a recording listener
//! fail <type> <message...>         register a listener that always fails
//! off <type> [label]               look up (or remove) a listener
//! emit <type> [params] [args...]   dispatch an event
//! list                             describe every listener
//! help | exit
//! ```
//!
//! Words are split on whitespace, except inside double quotes and inside
//! balanced `{}` / `[]`, so JSON values can be written inline. Each argument
//! is read as JSON and falls back to a plain string.

use serde_json::Value;
use thiserror::Error;

/// Label meaning "no scope".
pub const ANONYMOUS: &str = "-";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
  #[error("empty command")]
  Empty,
  #[error("unknown command `{0}` (try `help`)")]
  Unknown(String),
  #[error("`{command}` needs {what}")]
  Missing { command: &'static str, what: &'static str },
  #[error("`{0}` takes no arguments")]
  Unexpected(&'static str),
  #[error("unterminated {0}")]
  Unterminated(&'static str),
  #[error("unbalanced `{0}`")]
  Unbalanced(char),
  #[error("dispatch failed: {0}")]
  Dispatch(#[from] rusty_events::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  On { event_type: String, label: String, args: Vec<Value> },
  Fail { event_type: String, message: String },
  Off { event_type: String, label: Option<String> },
  Emit { event_type: String, parameters: Value, args: Vec<Value> },
  List,
  Help,
  Exit,
}

impl Command {
  pub fn parse(line: &str) -> Result<Self, CommandError> {
    let words = split_words(line)?;
    let mut words = words.into_iter();
    let Some(name) = words.next() else {
      return Err(CommandError::Empty);
    };

    let command = match name.as_str() {
      "on" => {
        let event_type = words.next().ok_or(CommandError::Missing { command: "on", what: "an event type" })?;
        let label = words.next().unwrap_or_else(|| ANONYMOUS.to_string());
        Command::On { event_type, label, args: words.map(|w| to_value(&w)).collect() }
      }
      "fail" => {
        let event_type = words.next().ok_or(CommandError::Missing { command: "fail", what: "an event type" })?;
        let message: Vec<String> = words.collect();
        if message.is_empty() {
          return Err(CommandError::Missing { command: "fail", what: "a message" });
        }
        Command::Fail { event_type, message: message.join(" ") }
      }
      "off" => {
        let event_type = words.next().ok_or(CommandError::Missing { command: "off", what: "an event type" })?;
        let label = words.next();
        if words.next().is_some() {
          return Err(CommandError::Unexpected("off <type> [label]"));
        }
        Command::Off { event_type, label }
      }
      "emit" => {
        let event_type = words.next().ok_or(CommandError::Missing { command: "emit", what: "an event type" })?;
        let parameters = words.next().map(|w| to_value(&w)).unwrap_or(Value::Null);
        Command::Emit { event_type, parameters, args: words.map(|w| to_value(&w)).collect() }
      }
      "list" => no_args(Command::List, "list", words)?,
      "help" => no_args(Command::Help, "help", words)?,
      "exit" | "quit" => no_args(Command::Exit, "exit", words)?,
      other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
  }
}

fn no_args(
  command: Command,
  name: &'static str,
  mut rest: impl Iterator<Item = String>,
) -> Result<Command, CommandError> {
  match rest.next() {
    Some(_) => Err(CommandError::Unexpected(name)),
    None => Ok(command),
  }
}

/// Read a word as JSON, or as a plain string when it is not valid JSON.
pub fn to_value(word: &str) -> Value {
  serde_json::from_str(word).unwrap_or_else(|_| Value::String(word.to_string()))
}

/// Split a line into words, keeping quoted strings and bracketed JSON intact.
pub fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut depth: Vec<char> = Vec::new();
  let mut in_string = false;
  let mut escaped = false;

  for c in line.chars() {
    if in_string {
      current.push(c);
      if escaped {
        escaped = false;
      } else if c == '\\' {
        escaped = true;
      } else if c == '"' {
        in_string = false;
      }
      continue;
    }
    match c {
      '"' => {
        in_string = true;
        current.push(c);
      }
      '{' | '[' => {
        depth.push(c);
        current.push(c);
      }
      '}' | ']' => {
        let open = if c == '}' { '{' } else { '[' };
        if depth.pop() != Some(open) {
          return Err(CommandError::Unbalanced(c));
        }
        current.push(c);
      }
      c if c.is_whitespace() && depth.is_empty() => {
        if !current.is_empty() {
          words.push(std::mem::take(&mut current));
        }
      }
      c => current.push(c),
    }
  }

  if in_string {
    return Err(CommandError::Unterminated("string"));
  }
  if let Some(open) = depth.pop() {
    return Err(CommandError::Unbalanced(open));
  }
  if !current.is_empty() {
    words.push(current);
  }
  Ok(words)
}
