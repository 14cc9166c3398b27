//! Debug commands and their wire form
//!
//! Grammar understood by the worker-side debugger:
//!
//! ```text
//! break <line> | clear <line> | condition <id> <expr> | continue | next
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Command for a worker's interactive debugger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DebugCommand {
    /// Set a breakpoint on a line
    Break(u32),
    /// Remove the breakpoint on a line
    Clear(u32),
    /// Replace the condition of a breakpoint
    Condition {
        /// Debugger-assigned id
        breakpoint_id: u32,
        /// New condition expression
        expr: String,
    },
    /// Resume execution
    Continue,
    /// Execute the next line
    Next,
}

impl fmt::Display for DebugCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Break(line) => write!(f, "break {line}"),
            Self::Clear(line) => write!(f, "clear {line}"),
            Self::Condition {
                breakpoint_id,
                expr,
            } => write!(f, "condition {breakpoint_id} {expr}"),
            Self::Continue => f.write_str("continue"),
            Self::Next => f.write_str("next"),
        }
    }
}

/// Command text that does not follow the grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    /// Unknown verb
    #[error("unknown debug command: {0:?}")]
    UnknownVerb(String),

    /// Verb needs an argument that is missing
    #[error("missing argument for {0}")]
    MissingArgument(&'static str),

    /// Argument is not a non-negative integer
    #[error("invalid number {value:?} for {verb}")]
    InvalidNumber {
        /// Verb being parsed
        verb: &'static str,
        /// Offending text
        value: String,
    },

    /// Verb takes no argument but one was given
    #[error("unexpected argument for {0}")]
    UnexpectedArgument(&'static str),
}

impl FromStr for DebugCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, rest) = match s.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim_start()),
            None => (s, ""),
        };

        match verb {
            "break" => parse_number("break", rest).map(Self::Break),
            "clear" => parse_number("clear", rest).map(Self::Clear),
            "condition" => {
                let (id, expr) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Self::Condition {
                    breakpoint_id: parse_number("condition", id)?,
                    expr: expr.to_string(),
                })
            }
            "continue" => no_argument("continue", rest).map(|()| Self::Continue),
            "next" => no_argument("next", rest).map(|()| Self::Next),
            other => Err(CommandParseError::UnknownVerb(other.to_string())),
        }
    }
}

fn parse_number(verb: &'static str, text: &str) -> Result<u32, CommandParseError> {
    if text.is_empty() {
        return Err(CommandParseError::MissingArgument(verb));
    }
    text.parse().map_err(|_| CommandParseError::InvalidNumber {
        verb,
        value: text.to_string(),
    })
}

fn no_argument(verb: &'static str, rest: &str) -> Result<(), CommandParseError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError::UnexpectedArgument(verb))
    }
}

/// Outbound payload addressed to one worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugCommandRequest {
    /// Target operator
    pub operator_id: String,
    /// Target worker
    pub worker_id: String,
    /// Command text
    pub cmd: String,
}

impl DebugCommandRequest {
    /// Build the payload for `command`
    #[must_use]
    pub fn new(operator_id: &str, worker_id: &str, command: &DebugCommand) -> Self {
        Self {
            operator_id: operator_id.to_string(),
            worker_id: worker_id.to_string(),
            cmd: command.to_string(),
        }
    }

    /// Parse the command text back
    ///
    /// # Errors
    /// - `CommandParseError` if `cmd` does not follow the grammar
    pub fn command(&self) -> Result<DebugCommand, CommandParseError> {
        self.cmd.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_follows_grammar() {
        assert_eq!(DebugCommand::Break(10).to_string(), "break 10");
        assert_eq!(DebugCommand::Clear(1).to_string(), "clear 1");
        assert_eq!(
            DebugCommand::Condition {
                breakpoint_id: 1,
                expr: "x < 10".to_string()
            }
            .to_string(),
            "condition 1 x < 10"
        );
        assert_eq!(DebugCommand::Continue.to_string(), "continue");
        assert_eq!(DebugCommand::Next.to_string(), "next");
    }

    #[test]
    fn parses_condition_with_spaces() {
        assert_eq!(
            "condition 3 a and b > 2".parse::<DebugCommand>().unwrap(),
            DebugCommand::Condition {
                breakpoint_id: 3,
                expr: "a and b > 2".to_string()
            }
        );
        assert_eq!(
            "condition 3".parse::<DebugCommand>().unwrap(),
            DebugCommand::Condition {
                breakpoint_id: 3,
                expr: String::new()
            }
        );
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!(
            "step".parse::<DebugCommand>().unwrap_err(),
            CommandParseError::UnknownVerb("step".to_string())
        );
        assert_eq!(
            "break".parse::<DebugCommand>().unwrap_err(),
            CommandParseError::MissingArgument("break")
        );
        assert!(matches!(
            "clear ten".parse::<DebugCommand>(),
            Err(CommandParseError::InvalidNumber { verb: "clear", .. })
        ));
        assert_eq!(
            "continue now".parse::<DebugCommand>().unwrap_err(),
            CommandParseError::UnexpectedArgument("continue")
        );
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = DebugCommandRequest::new("op", "worker1", &DebugCommand::Next);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "operatorId": "op", "workerId": "worker1", "cmd": "next" })
        );
        assert_eq!(request.command().unwrap(), DebugCommand::Next);
    }
}
