use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use log::debug;

use crate::commands::inherit::inherit_envvar_prefix;
use crate::context::{Context, ContextBuilder};
use crate::error::{CliError, ConfigError};
use crate::help::ParameterHelp;
use crate::invocation::Invocation;
use crate::parameters::{Argument, CliOption};

/// Body of a command, run once its options and arguments are parsed
pub type Action = Box<dyn FnMut(&Invocation<'_>) -> Result<(), CliError>>;

/// Deferred customization of a command's context
pub type ContextConfig = Box<dyn Fn(&mut ContextBuilder)>;

/// A node of the command tree: its parameters, its subcommands and its body.
pub struct Command {
    name: String,
    help: String,
    epilog: String,
    invoke_without_subcommand: bool,
    auto_envvar_prefix: Option<String>,
    pub(crate) options: Vec<CliOption>,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) subcommands: Vec<Command>,
    aliases: HashMap<String, Vec<String>>,
    pub(crate) context_config: ContextConfig,
    pub(crate) action: Action,
    pub(crate) context: Option<Context>,
}

/// File stem of the running program, lowercased
fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_stem)
        .map_or_else(|| "command".to_string(), |stem| stem.to_string_lossy().to_lowercase())
}

impl Default for Command {
    /// A command named after the running program
    fn default() -> Self {
        Command::new(program_name())
    }
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            help: String::new(),
            epilog: String::new(),
            invoke_without_subcommand: false,
            auto_envvar_prefix: None,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
            aliases: HashMap::new(),
            context_config: Box::new(|_| {}),
            action: Box::new(|_| Ok(())),
            context: None,
        }
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    #[must_use]
    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = epilog.into();
        self
    }

    /// Run this command's body even when it has subcommands and none was given
    #[must_use]
    pub fn invoke_without_subcommand(mut self, invoke: bool) -> Self {
        self.invoke_without_subcommand = invoke;
        self
    }

    /// Set the environment variable prefix explicitly; inheritance never overrides it.
    #[must_use]
    pub fn auto_envvar_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auto_envvar_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: FnMut(&Invocation<'_>) -> Result<(), CliError> + 'static,
    {
        self.action = Box::new(action);
        self
    }

    /// Builder form of [`Command::register_option`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateOption` if one of the option's names is already taken.
    pub fn option(mut self, option: CliOption) -> Result<Self, ConfigError> {
        self.register_option(option)?;
        Ok(self)
    }

    #[must_use]
    pub fn argument(mut self, argument: Argument) -> Self {
        self.register_argument(argument);
        self
    }

    /// Let `name` stand for `tokens` when it appears where a subcommand name is expected.
    #[must_use]
    pub fn alias<I, S>(mut self, name: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(name.into(), tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Attach `commands` as children, in order.
    ///
    /// Every child without an environment variable prefix derives one from this command's
    /// prefix and its own name.
    #[must_use]
    pub fn subcommands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        for mut command in commands {
            if command.auto_envvar_prefix.is_none() {
                let prefix =
                    inherit_envvar_prefix(self.auto_envvar_prefix.as_deref(), &command.name);
                debug!("Subcommand `{}` inherits envvar prefix {prefix}", command.name);
                command.auto_envvar_prefix = Some(prefix);
            }
            self.subcommands.push(command);
        }
        self
    }

    /// Customize the context built for this command on every parse
    #[must_use]
    pub fn configure_context<F>(mut self, configure: F) -> Self
    where
        F: Fn(&mut ContextBuilder) + 'static,
    {
        self.context_config = Box::new(configure);
        self
    }

    /// Add an option after checking that none of its names is registered yet.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateOption` naming the first colliding name.
    pub fn register_option(&mut self, option: CliOption) -> Result<(), ConfigError> {
        let registered = self.registered_option_names();
        if let Some(name) = option.names().iter().find(|name| registered.contains(*name)) {
            return Err(ConfigError::DuplicateOption(name.clone()));
        }
        self.options.push(option);
        Ok(())
    }

    pub fn register_argument(&mut self, argument: Argument) {
        self.arguments.push(argument);
    }

    /// Names of every option registered on this command
    #[must_use]
    pub fn registered_option_names(&self) -> BTreeSet<String> {
        self.options
            .iter()
            .flat_map(|option| option.names().iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn help_text(&self) -> &str {
        &self.help
    }

    #[must_use]
    pub fn epilog_text(&self) -> &str {
        &self.epilog
    }

    #[must_use]
    pub fn invokes_without_subcommand(&self) -> bool {
        self.invoke_without_subcommand
    }

    #[must_use]
    pub fn envvar_prefix(&self) -> Option<&str> {
        self.auto_envvar_prefix.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &[CliOption] {
        &self.options
    }

    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    #[must_use]
    pub fn children(&self) -> &[Command] {
        &self.subcommands
    }

    #[must_use]
    pub fn aliases(&self) -> &HashMap<String, Vec<String>> {
        &self.aliases
    }

    /// The context of the current parse.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ContextNotBuilt` before the first parse or help request.
    pub fn context(&self) -> Result<&Context, ConfigError> {
        self.context
            .as_ref()
            .ok_or_else(|| ConfigError::ContextNotBuilt(self.name.clone()))
    }

    /// First sentence of the help text, shown next to the name in a parent's help
    #[must_use]
    pub fn short_help(&self) -> &str {
        self.help
            .split(['.', '\n'])
            .next()
            .unwrap_or_default()
            .trim()
    }

    pub(crate) fn all_help_params(&self) -> Vec<ParameterHelp> {
        self.options
            .iter()
            .map(CliOption::parameter_help)
            .chain(self.arguments.iter().map(Argument::parameter_help))
            .chain(self.subcommands.iter().map(|command| ParameterHelp::Subcommand {
                name: command.name.clone(),
                help: command.short_help().to_string(),
            }))
            .collect()
    }

    #[must_use]
    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|command| command.name == name)
    }

    pub(crate) fn subcommand_index(&self, name: &str) -> Option<usize> {
        self.subcommands.iter().position(|command| command.name == name)
    }

    /// The descendant reached by following subcommand names in `route`; empty is `self`.
    #[must_use]
    pub fn descendant(&self, route: &[String]) -> Option<&Command> {
        route
            .iter()
            .try_fold(self, |command, name| command.subcommand(name))
    }

    pub(crate) fn descendant_mut(&mut self, route: &[String]) -> Option<&mut Command> {
        let mut command = self;
        for name in route {
            let index = command.subcommand_index(name)?;
            command = &mut command.subcommands[index];
        }
        Some(command)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("auto_envvar_prefix", &self.auto_envvar_prefix)
            .field("options", &self.options)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
