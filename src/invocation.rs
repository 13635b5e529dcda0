//! Parsed values handed to a command's body

use std::collections::HashMap;

use crate::context::Context;
use crate::error::{CliError, UsageError};

/// Values collected for one command during a parse, keyed by option key or argument name
#[derive(Debug, Default, Clone)]
pub(crate) struct ParsedValues {
    pub(crate) options: HashMap<String, Vec<String>>,
    pub(crate) flags: HashMap<String, usize>,
    pub(crate) arguments: HashMap<String, Vec<String>>,
}

/// What a command's body sees when it runs.
///
/// Options are looked up by their key: the longest name without leading dashes, so
/// `-n/--dry-run` is `"dry-run"`. Arguments are looked up by their declared name.
#[derive(Debug)]
pub struct Invocation<'a> {
    context: &'a Context,
    route: &'a [String],
    values: &'a ParsedValues,
    subcommand: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        context: &'a Context,
        route: &'a [String],
        values: &'a ParsedValues,
        subcommand: Option<&'a str>,
    ) -> Self {
        Invocation {
            context,
            route,
            values,
            subcommand,
        }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Subcommand names leading from the invoked root to this command
    #[must_use]
    pub fn route(&self) -> &[String] {
        self.route
    }

    /// Name of the subcommand that runs after this command, if one was given
    #[must_use]
    pub fn subcommand(&self) -> Option<&str> {
        self.subcommand
    }

    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.count(key) > 0
    }

    /// How many times a flag was given
    #[must_use]
    pub fn count(&self, key: &str) -> usize {
        self.values.flags.get(key).copied().unwrap_or(0)
    }

    /// Last value given for an option
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values(key).last().map(String::as_str)
    }

    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.values
            .options
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments(name).first().map(String::as_str)
    }

    #[must_use]
    pub fn arguments(&self, name: &str) -> &[String] {
        self.values
            .arguments
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// A usage error attributed to this command
    #[must_use]
    pub fn usage_error(&self, message: impl Into<String>) -> CliError {
        CliError::Usage(UsageError::new(message).attributed_to(self.route))
    }

    /// Signal that the help of this command should be printed
    #[must_use]
    pub fn help_requested(&self) -> CliError {
        CliError::PrintHelp {
            command: self.route.to_vec(),
        }
    }
}
