//! Errors raised while declaring, parsing and running a command tree

use std::fmt;

use thiserror::Error;

/// Programmer errors in how a command tree was declared or used.
///
/// These are never caught by [`Command::main`](crate::Command::main); they surface as
/// the `Err` of `main` and end the process through the host's default error handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Duplicate option name {0}")]
    DuplicateOption(String),
    #[error("Context of command `{0}` accessed before parse has been called")]
    ContextNotBuilt(String),
    #[error("No subcommand at path `{0}`")]
    UnknownCommand(String),
}

/// User input that does not fit the declared options and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    pub message: String,
    /// Parameter the message is about, e.g. `--count` or `NAME`
    pub param_hint: Option<String>,
    /// Subcommand names leading from the invoked root to the command that raised the error.
    /// `None` until the parser attributes the error to a command.
    pub command: Option<Vec<String>>,
}

impl UsageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        UsageError {
            message: message.into(),
            param_hint: None,
            command: None,
        }
    }

    #[must_use]
    pub fn with_param_hint(mut self, hint: impl Into<String>) -> Self {
        self.param_hint = Some(hint.into());
        self
    }

    /// Attribute the error to the command at `route`, unless it already names one.
    #[must_use]
    pub fn attributed_to(mut self, route: &[String]) -> Self {
        if self.command.is_none() {
            self.command = Some(route.to_vec());
        }
        self
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param_hint {
            Some(hint) => write!(f, "Invalid value for \"{hint}\": {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for UsageError {}

/// Failure signals classified by [`Command::main`](crate::Command::main).
///
/// Everything except [`CliError::Config`] is a control-flow outcome that `main` turns
/// into one printed message and an exit status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Print the help of the command at this subcommand route, exit 0
    #[error("help requested")]
    PrintHelp { command: Vec<String> },
    /// Print the message verbatim, exit 0
    #[error("{0}")]
    PrintMessage(String),
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// Any other failure with a human readable message, exit 1
    #[error("{0}")]
    Tool(String),
    #[error("Aborted!")]
    Abort,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CliError {
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(UsageError::new(message))
    }

    #[must_use]
    pub fn bad_parameter(hint: impl Into<String>, message: impl Into<String>) -> Self {
        CliError::Usage(UsageError::new(message).with_param_hint(hint))
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        CliError::PrintMessage(message.into())
    }

    #[must_use]
    pub fn tool(message: impl Into<String>) -> Self {
        CliError::Tool(message.into())
    }

    /// Attribute an unattributed usage error to the command at `route`.
    #[must_use]
    pub(crate) fn attributed_to(self, route: &[String]) -> Self {
        match self {
            CliError::Usage(e) => CliError::Usage(e.attributed_to(route)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_display_with_hint() {
        let err = UsageError::new("not a number").with_param_hint("--count");
        assert_eq!(err.to_string(), "Invalid value for \"--count\": not a number");
    }

    #[test]
    fn test_attribution_keeps_first_route() {
        let route = vec!["child".to_string()];
        let err = CliError::usage("bad").attributed_to(&route);
        let err = err.attributed_to(&[]);
        match err {
            CliError::Usage(e) => assert_eq!(e.command, Some(route)),
            other => panic!("Expected Usage, got: {other:?}"),
        }
    }

    #[test]
    fn test_abort_message() {
        assert_eq!(CliError::Abort.to_string(), "Aborted!");
    }
}
