use std::collections::BTreeSet;

use crate::help::ParameterHelp;

/// What an option does when it is matched on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    /// Takes no value; each occurrence bumps a counter
    Flag,
    /// Takes exactly one value per occurrence
    Value,
    /// Stops parsing and prints the help of the command
    Help,
}

/// A named option, e.g. `-v/--verbose` or `--output FILE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOption {
    names: BTreeSet<String>,
    kind: OptionKind,
    help: String,
    metavar: Option<String>,
    required: bool,
    default: Option<String>,
    envvar: Option<String>,
}

impl CliOption {
    fn with_kind<I, S>(names: I, kind: OptionKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CliOption {
            names: names.into_iter().map(Into::into).collect(),
            kind,
            help: String::new(),
            metavar: None,
            required: false,
            default: None,
            envvar: None,
        }
    }

    /// Option that takes no value
    pub fn flag<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(names, OptionKind::Flag)
    }

    /// Option that takes a value
    pub fn value<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(names, OptionKind::Value)
    }

    /// The option injected for the help names of a command's context
    pub fn help_option<I, S>(names: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(names, OptionKind::Help).help(message)
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    #[must_use]
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Read the value from this environment variable when absent from the command line
    #[must_use]
    pub fn envvar(mut self, name: impl Into<String>) -> Self {
        self.envvar = Some(name.into());
        self
    }

    #[must_use]
    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    #[must_use]
    pub fn kind(&self) -> &OptionKind {
        &self.kind
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn get_default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    #[must_use]
    pub fn explicit_envvar(&self) -> Option<&str> {
        self.envvar.as_deref()
    }

    #[must_use]
    pub fn takes_value(&self) -> bool {
        self.kind == OptionKind::Value
    }

    /// Longest name without its leading dashes; values are stored under this key.
    #[must_use]
    pub fn key(&self) -> String {
        self.longest_name().trim_start_matches('-').to_string()
    }

    /// Longest name as declared, used when reporting errors about this option
    #[must_use]
    pub fn longest_name(&self) -> &str {
        self.names
            .iter()
            .max_by_key(|name| name.len())
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn parameter_help(&self) -> ParameterHelp {
        let metavar = match self.kind {
            OptionKind::Value => Some(self.metavar.clone().unwrap_or_else(|| "TEXT".to_string())),
            OptionKind::Flag | OptionKind::Help => None,
        };
        ParameterHelp::Option {
            names: self.names.iter().cloned().collect(),
            metavar,
            help: self.help.clone(),
        }
    }
}
