use std::collections::BTreeSet;
use std::io::Write;

use log::debug;

use crate::commands::Command;
use crate::context::Context;
use crate::error::{CliError, ConfigError, UsageError};
use crate::parameters::CliOption;
use crate::parser;

/// How a call to [`Command::execute`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The command bodies ran without raising a signal
    Completed,
    /// A signal was handled; the process should exit with this status
    Exit(i32),
}

impl Command {
    /// Build the context of this command and, recursively, of all its subcommands.
    ///
    /// Help option names of the new context that no registered option already uses are
    /// covered by one synthesized help option.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateOption` if the synthesized help option collides.
    pub fn build_context(&mut self, parent: Option<&Context>) -> Result<(), ConfigError> {
        let context = Context::build(self, parent, &*self.context_config);
        let help_names = context.help_option_names().clone();
        let help_message = context.help_option_message().to_string();
        self.context = Some(context);

        if !help_names.is_empty() {
            let registered = self.registered_option_names();
            let missing: BTreeSet<String> = help_names.difference(&registered).cloned().collect();
            if !missing.is_empty() {
                debug!("Adding help option {missing:?} to `{}`", self.name());
                self.register_option(CliOption::help_option(missing, help_message))?;
            }
        }

        let context = self.context.as_ref();
        for child in &mut self.subcommands {
            child.build_context(context)?;
        }
        Ok(())
    }

    /// The usage line of this command, building its context first if needed.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the context cannot be built.
    pub fn formatted_usage(&mut self) -> Result<String, ConfigError> {
        if self.context.is_none() {
            self.build_context(None)?;
        }
        let context = self.context()?;
        Ok(context
            .help_formatter()
            .format_usage(&self.all_help_params(), &context.program_name()))
    }

    /// The full help page of this command, building its context first if needed.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the context cannot be built.
    pub fn formatted_help(&mut self) -> Result<String, ConfigError> {
        if self.context.is_none() {
            self.build_context(None)?;
        }
        let context = self.context()?;
        Ok(context.help_formatter().format_help(
            self.help_text(),
            self.epilog_text(),
            &self.all_help_params(),
            &context.program_name(),
        ))
    }

    /// Build a fresh context tree, then parse `argv` and run the selected commands.
    ///
    /// `parent` roots the context tree under an existing context, e.g. when this command is
    /// driven by another tool.
    ///
    /// # Errors
    ///
    /// Returns the failure signal raised while parsing or running a command body.
    pub fn parse<I, S>(&mut self, argv: I, parent: Option<&Context>) -> Result<(), CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        self.build_context(parent)?;
        parser::parse(self, &argv)
    }

    /// Parse and run, turning failure signals into one message on `out` and an exit status.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned unchanged; they are never turned into output.
    pub fn execute<I, S, W>(&mut self, argv: I, out: &mut W) -> Result<Outcome, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        W: Write,
    {
        let (message, status) = match self.parse(argv, None) {
            Ok(()) => return Ok(Outcome::Completed),
            Err(CliError::PrintHelp { command }) => (self.help_for(&command)?, 0),
            Err(CliError::PrintMessage(message)) => (message, 0),
            Err(CliError::Usage(error)) => (self.usage_message(&error)?, 1),
            Err(CliError::Tool(message)) => (message, 1),
            Err(CliError::Abort) => ("Aborted!".to_string(), 1),
            Err(CliError::Config(error)) => return Err(error),
        };
        debug!("Exiting with status {status}");
        if let Err(e) = writeln!(out, "{message}").and_then(|()| out.flush()) {
            debug!("Failed to write signal output: {e}");
        }
        Ok(Outcome::Exit(status))
    }

    /// Entry point for a binary: parse `argv` (without the program name) and run.
    ///
    /// Help, messages, usage errors, tool errors and aborts are printed to stdout and end
    /// the process with their exit status. Returns normally once the command bodies ran.
    ///
    /// # Errors
    ///
    /// Configuration errors propagate to the caller untouched.
    pub fn main<I, S>(&mut self, argv: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.execute(argv, &mut std::io::stdout())? {
            Outcome::Completed => Ok(()),
            Outcome::Exit(status) => std::process::exit(status),
        }
    }

    fn help_for(&mut self, route: &[String]) -> Result<String, ConfigError> {
        self.descendant_mut(route)
            .ok_or_else(|| ConfigError::UnknownCommand(route.join(" ")))?
            .formatted_help()
    }

    fn usage_message(&mut self, error: &UsageError) -> Result<String, ConfigError> {
        let route = error.command.as_deref().unwrap_or_default();
        let usage = self
            .descendant_mut(route)
            .ok_or_else(|| ConfigError::UnknownCommand(route.join(" ")))?
            .formatted_usage()?;
        Ok(format!("{usage}\n\nError: {error}"))
    }
}
