//! Per-command runtime configuration
//!
//! A [`Context`] is built for every command of a tree right before parsing. Unset fields
//! are inherited from the parent command's context; the root falls back to the defaults of
//! [`ContextBuilder`]. A command customizes its own context with
//! [`Command::configure_context`](crate::Command::configure_context).

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::commands::Command;
use crate::help::{HelpFormatter, PlainHelpFormatter};

pub const DEFAULT_HELP_MESSAGE: &str = "Show this message and exit";

/// Looks up an environment variable by name
pub type EnvReader = Arc<dyn Fn(&str) -> Option<String>>;

/// Mutable view of a context's settings, handed to customization closures.
///
/// A fresh builder starts from the parent context's values, or from the global defaults
/// for a root command.
#[derive(Clone)]
pub struct ContextBuilder {
    /// Names that trigger the synthesized help option; empty disables it
    pub help_option_names: BTreeSet<String>,
    pub help_option_message: String,
    pub help_formatter: Arc<dyn HelpFormatter>,
    /// Whether options may follow positional arguments
    pub allow_interspersed_args: bool,
    pub env_reader: EnvReader,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        ContextBuilder {
            help_option_names: ["-h", "--help"].into_iter().map(String::from).collect(),
            help_option_message: DEFAULT_HELP_MESSAGE.to_string(),
            help_formatter: Arc::new(PlainHelpFormatter::new()),
            allow_interspersed_args: true,
            env_reader: Arc::new(|name: &str| std::env::var(name).ok()),
        }
    }
}

impl ContextBuilder {
    fn inherit(parent: Option<&Context>) -> Self {
        match parent {
            Some(parent) => ContextBuilder {
                help_option_names: parent.help_option_names.clone(),
                help_option_message: parent.help_option_message.clone(),
                help_formatter: Arc::clone(&parent.help_formatter),
                allow_interspersed_args: parent.allow_interspersed_args,
                env_reader: Arc::clone(&parent.env_reader),
            },
            None => ContextBuilder::default(),
        }
    }

    /// Replace the help option names
    pub fn help_names<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.help_option_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Read environment variables through `reader` instead of the process environment
    pub fn read_env_with<F>(&mut self, reader: F) -> &mut Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.env_reader = Arc::new(reader);
        self
    }
}

/// Resolved configuration of one command for one parse.
#[derive(Clone)]
pub struct Context {
    command_path: Vec<String>,
    auto_envvar_prefix: Option<String>,
    help_option_names: BTreeSet<String>,
    help_option_message: String,
    help_formatter: Arc<dyn HelpFormatter>,
    allow_interspersed_args: bool,
    env_reader: EnvReader,
}

impl Context {
    /// Build the context of `command`, inheriting from `parent` and then applying `configure`.
    pub fn build(
        command: &Command,
        parent: Option<&Context>,
        configure: &dyn Fn(&mut ContextBuilder),
    ) -> Context {
        let mut builder = ContextBuilder::inherit(parent);
        configure(&mut builder);

        let mut command_path = parent.map(|p| p.command_path.clone()).unwrap_or_default();
        command_path.push(command.name().to_string());
        debug!(
            "Built context for `{}` (help names: {:?})",
            command_path.join(" "),
            builder.help_option_names
        );

        Context {
            command_path,
            auto_envvar_prefix: command.envvar_prefix().map(str::to_string),
            help_option_names: builder.help_option_names,
            help_option_message: builder.help_option_message,
            help_formatter: builder.help_formatter,
            allow_interspersed_args: builder.allow_interspersed_args,
            env_reader: builder.env_reader,
        }
    }

    /// Names of this command and all its ancestors, root first
    #[must_use]
    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    /// The command path joined with spaces, as shown in usage lines
    #[must_use]
    pub fn program_name(&self) -> String {
        self.command_path.join(" ")
    }

    #[must_use]
    pub fn auto_envvar_prefix(&self) -> Option<&str> {
        self.auto_envvar_prefix.as_deref()
    }

    #[must_use]
    pub fn help_option_names(&self) -> &BTreeSet<String> {
        &self.help_option_names
    }

    #[must_use]
    pub fn help_option_message(&self) -> &str {
        &self.help_option_message
    }

    #[must_use]
    pub fn help_formatter(&self) -> &dyn HelpFormatter {
        self.help_formatter.as_ref()
    }

    #[must_use]
    pub fn allow_interspersed_args(&self) -> bool {
        self.allow_interspersed_args
    }

    #[must_use]
    pub fn read_env(&self, name: &str) -> Option<String> {
        (self.env_reader)(name)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("command_path", &self.command_path)
            .field("auto_envvar_prefix", &self.auto_envvar_prefix)
            .field("help_option_names", &self.help_option_names)
            .field("help_option_message", &self.help_option_message)
            .field("allow_interspersed_args", &self.allow_interspersed_args)
            .finish_non_exhaustive()
    }
}
