//! Help metadata and the formatter that renders it
//!
//! A command assembles one [`ParameterHelp`] per option, argument and subcommand and hands
//! the list to the [`HelpFormatter`] of its context. The formatter owns all layout decisions.

use std::fmt::Write;

use anstyle::{Reset, Style};

use crate::theme;

/// Help metadata for a single entry of a command's help page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterHelp {
    Option {
        names: Vec<String>,
        metavar: Option<String>,
        help: String,
    },
    Argument {
        name: String,
        help: String,
        required: bool,
        repeatable: bool,
    },
    Subcommand {
        name: String,
        help: String,
    },
}

/// Renders usage lines and full help pages from parameter metadata.
pub trait HelpFormatter {
    fn format_usage(&self, parameters: &[ParameterHelp], program_name: &str) -> String;

    fn format_help(
        &self,
        help: &str,
        epilog: &str,
        parameters: &[ParameterHelp],
        program_name: &str,
    ) -> String;
}

/// Default formatter: a usage line followed by aligned two-column sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHelpFormatter {
    styled: bool,
}

impl PlainHelpFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter that emits ANSI styles for headings and names
    #[must_use]
    pub fn styled() -> Self {
        PlainHelpFormatter { styled: true }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.styled {
            format!("{style}{text}{Reset}")
        } else {
            text.to_string()
        }
    }

    fn render_section(&self, out: &mut String, title: &str, rows: &[(String, String)]) {
        if rows.is_empty() {
            return;
        }
        let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
        out.push_str("\n\n");
        out.push_str(&self.paint(theme::HEADING, title));
        for (left, right) in rows {
            let name = self.paint(theme::LITERAL, left);
            if right.is_empty() {
                let _ = write!(out, "\n  {name}");
            } else {
                let pad = " ".repeat(width - left.len());
                let _ = write!(out, "\n  {name}{pad}  {right}");
            }
        }
    }
}

fn option_label(names: &[String], metavar: Option<&String>) -> String {
    let mut sorted: Vec<&String> = names.iter().collect();
    sorted.sort_by_key(|name| (name.starts_with("--"), name.len(), *name));
    let mut label = sorted
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if let Some(metavar) = metavar {
        label.push(' ');
        label.push_str(metavar);
    }
    label
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("  {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl HelpFormatter for PlainHelpFormatter {
    fn format_usage(&self, parameters: &[ParameterHelp], program_name: &str) -> String {
        let mut parts = vec![program_name.to_string()];
        if parameters
            .iter()
            .any(|p| matches!(p, ParameterHelp::Option { .. }))
        {
            parts.push("[OPTIONS]".to_string());
        }
        for parameter in parameters {
            if let ParameterHelp::Argument {
                name,
                required,
                repeatable,
                ..
            } = parameter
            {
                let mut metavar = name.to_uppercase();
                if *repeatable {
                    metavar.push_str("...");
                }
                if !required {
                    metavar = format!("[{metavar}]");
                }
                parts.push(metavar);
            }
        }
        if parameters
            .iter()
            .any(|p| matches!(p, ParameterHelp::Subcommand { .. }))
        {
            parts.push("COMMAND [ARGS]...".to_string());
        }
        format!("{} {}", self.paint(theme::HEADING, "Usage:"), parts.join(" "))
    }

    fn format_help(
        &self,
        help: &str,
        epilog: &str,
        parameters: &[ParameterHelp],
        program_name: &str,
    ) -> String {
        let mut arguments = Vec::new();
        let mut options = Vec::new();
        let mut commands = Vec::new();
        for parameter in parameters {
            match parameter {
                ParameterHelp::Option {
                    names,
                    metavar,
                    help,
                } => options.push((option_label(names, metavar.as_ref()), help.clone())),
                ParameterHelp::Argument { name, help, .. } if !help.is_empty() => {
                    arguments.push((name.to_uppercase(), help.clone()));
                }
                ParameterHelp::Argument { .. } => {}
                ParameterHelp::Subcommand { name, help } => {
                    commands.push((name.clone(), help.clone()));
                }
            }
        }

        let mut out = self.format_usage(parameters, program_name);
        let help = help.trim();
        if !help.is_empty() {
            out.push_str("\n\n");
            out.push_str(&indent(help));
        }
        self.render_section(&mut out, "Arguments:", &arguments);
        self.render_section(&mut out, "Options:", &options);
        self.render_section(&mut out, "Commands:", &commands);
        let epilog = epilog.trim();
        if !epilog.is_empty() {
            out.push_str("\n\n");
            out.push_str(epilog);
        }
        out
    }
}
