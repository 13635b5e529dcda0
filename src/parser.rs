//! Token parser: matches argv against a command's options and arguments
//!
//! Supported syntax: `--name value`, `--name=value`, `-x value`, `-xvalue`, clustered short
//! flags (`-abc`) and `--` to end option parsing. When a command has subcommands, its own
//! non-variadic arguments are bound first; the next positional token names the subcommand
//! and the remaining tokens belong to that subcommand. Variadic arguments of such a command
//! never receive values. The command's own body runs before the subcommand is parsed.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::commands::Command;
use crate::commands::inherit::auto_envvar;
use crate::context::Context;
use crate::error::{CliError, ConfigError, UsageError};
use crate::invocation::{Invocation, ParsedValues};
use crate::parameters::{Argument, CliOption, OptionKind};

/// Parse `argv` against `command`, run its body and descend into the chosen subcommand.
///
/// The context tree of `command` must already be built.
///
/// # Errors
///
/// Returns the failure signal raised by parsing or by a command body. Signals that name a
/// command carry its route of subcommand names relative to `command`.
pub fn parse(command: &mut Command, argv: &[String]) -> Result<(), CliError> {
    let mut route = Vec::new();
    parse_command(command, argv, &mut route)
}

struct Scan {
    values: ParsedValues,
    positionals: Vec<String>,
    subcommand: Option<(String, Vec<String>)>,
}

fn usage(route: &[String], message: String) -> CliError {
    CliError::Usage(UsageError::new(message).attributed_to(route))
}

fn parse_command(
    command: &mut Command,
    argv: &[String],
    route: &mut Vec<String>,
) -> Result<(), CliError> {
    trace!("Parsing {argv:?} for `{}`", command.name());

    let (values, chosen) = {
        let context = command.context()?;
        let mut scan = scan(command, context, argv, route)?;
        let positionals = std::mem::take(&mut scan.positionals);
        bind_arguments(&command.arguments, positionals, &mut scan.values, route)?;
        resolve_missing(&command.options, context, &mut scan.values, route)?;
        let chosen = scan
            .subcommand
            .map(|(name, rest)| resolve_subcommand(command, name, rest, route))
            .transpose()?;
        (scan.values, chosen)
    };

    if chosen.is_none() && !command.subcommands.is_empty() && !command.invokes_without_subcommand()
    {
        debug!("No subcommand given to `{}`, printing help", command.name());
        return Err(CliError::PrintHelp {
            command: route.clone(),
        });
    }

    let subcommand_name = chosen
        .as_ref()
        .map(|(index, _)| command.subcommands[*index].name().to_string());
    {
        let route: &[String] = route;
        let context = command
            .context
            .as_ref()
            .ok_or_else(|| ConfigError::ContextNotBuilt(command.name().to_string()))?;
        let invocation = Invocation::new(context, route, &values, subcommand_name.as_deref());
        (command.action)(&invocation).map_err(|e| e.attributed_to(route))?;
    }

    if let Some((index, rest)) = chosen {
        let child = &mut command.subcommands[index];
        route.push(child.name().to_string());
        debug!("Dispatching to subcommand `{}`", route.join(" "));
        parse_command(child, &rest, route)?;
    }
    Ok(())
}

fn find_option<'a>(command: &'a Command, name: &str) -> Option<&'a CliOption> {
    command
        .options
        .iter()
        .find(|option| option.names().contains(name))
}

fn scan(
    command: &Command,
    context: &Context,
    argv: &[String],
    route: &[String],
) -> Result<Scan, CliError> {
    let mut values = ParsedValues::default();
    let mut positionals = Vec::new();
    let mut options_ended = false;
    let mut index = 0;
    // Positionals a group binds itself before the next one names its subcommand
    let own_slots = command
        .arguments
        .iter()
        .filter(|argument| !argument.is_variadic())
        .count();

    while index < argv.len() {
        let token = &argv[index];
        index += 1;

        if options_ended || token == "-" || !token.starts_with('-') {
            if !command.subcommands.is_empty() && positionals.len() >= own_slots {
                return Ok(Scan {
                    values,
                    positionals,
                    subcommand: Some((token.clone(), argv[index..].to_vec())),
                });
            }
            positionals.push(token.clone());
            if !context.allow_interspersed_args() {
                options_ended = true;
            }
            continue;
        }

        if token == "--" {
            options_ended = true;
            continue;
        }

        if token.starts_with("--") {
            let (name, attached) = match token.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (token.as_str(), None),
            };
            let option = find_option(command, name)
                .ok_or_else(|| usage(route, format!("no such option: {name}")))?;
            index = apply_option(option, name, attached, argv, index, &mut values, route)?;
            continue;
        }

        if let Some(option) = find_option(command, token) {
            index = apply_option(option, token, None, argv, index, &mut values, route)?;
            continue;
        }

        let cluster = &token[1..];
        for (offset, c) in cluster.char_indices() {
            let name = format!("-{c}");
            let option = find_option(command, &name)
                .ok_or_else(|| usage(route, format!("no such option: {name}")))?;
            if option.takes_value() {
                let rest = &cluster[offset + c.len_utf8()..];
                let attached = (!rest.is_empty()).then(|| rest.to_string());
                index = apply_option(option, &name, attached, argv, index, &mut values, route)?;
                break;
            }
            apply_option(option, &name, None, argv, index, &mut values, route)?;
        }
    }

    Ok(Scan {
        values,
        positionals,
        subcommand: None,
    })
}

/// Record one occurrence of `option`; returns the index of the next unread token.
fn apply_option(
    option: &CliOption,
    name: &str,
    attached: Option<String>,
    argv: &[String],
    index: usize,
    values: &mut ParsedValues,
    route: &[String],
) -> Result<usize, CliError> {
    match option.kind() {
        OptionKind::Help => Err(CliError::PrintHelp {
            command: route.to_vec(),
        }),
        OptionKind::Flag => {
            if attached.is_some() {
                return Err(usage(route, format!("option {name} does not take a value")));
            }
            *values.flags.entry(option.key()).or_default() += 1;
            Ok(index)
        }
        OptionKind::Value => {
            let (value, next) = match attached {
                Some(value) => (value, index),
                None => match argv.get(index) {
                    Some(value) => (value.clone(), index + 1),
                    None => return Err(usage(route, format!("option {name} requires a value"))),
                },
            };
            values.options.entry(option.key()).or_default().push(value);
            Ok(next)
        }
    }
}

fn bind_arguments(
    arguments: &[Argument],
    positionals: Vec<String>,
    values: &mut ParsedValues,
    route: &[String],
) -> Result<(), CliError> {
    let mut remaining: VecDeque<String> = positionals.into();
    for (i, argument) in arguments.iter().enumerate() {
        let taken: Vec<String> = if argument.is_variadic() {
            let reserved = arguments[i + 1..]
                .iter()
                .filter(|later| later.is_required())
                .count();
            let count = remaining.len().saturating_sub(reserved);
            remaining.drain(..count).collect()
        } else {
            remaining.pop_front().into_iter().collect()
        };
        if taken.is_empty() && argument.is_required() {
            return Err(usage(
                route,
                format!("Missing argument \"{}\"", argument.metavar()),
            ));
        }
        values.arguments.insert(argument.name().to_string(), taken);
    }

    if !remaining.is_empty() {
        let extra: Vec<String> = remaining.into_iter().collect();
        let noun = if extra.len() == 1 { "argument" } else { "arguments" };
        return Err(usage(
            route,
            format!("Got unexpected extra {noun} ({})", extra.join(" ")),
        ));
    }
    Ok(())
}

/// First environment variable that is set for `option`, with its value
fn envvar_value(option: &CliOption, context: &Context) -> Option<(String, String)> {
    let explicit = option.explicit_envvar().map(str::to_string);
    let automatic = context
        .auto_envvar_prefix()
        .map(|prefix| auto_envvar(prefix, &option.key()));
    explicit
        .into_iter()
        .chain(automatic)
        .find_map(|name| context.read_env(&name).map(|value| (name, value)))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "" | "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Fill options absent from the command line from the environment or their defaults.
fn resolve_missing(
    options: &[CliOption],
    context: &Context,
    values: &mut ParsedValues,
    route: &[String],
) -> Result<(), CliError> {
    for option in options {
        let key = option.key();
        match option.kind() {
            OptionKind::Help => {}
            OptionKind::Flag => {
                if values.flags.contains_key(&key) {
                    continue;
                }
                if let Some((envvar, raw)) = envvar_value(option, context) {
                    let enabled = parse_bool(&raw).ok_or_else(|| {
                        CliError::Usage(
                            UsageError::new(format!("{raw} is not a valid boolean"))
                                .with_param_hint(envvar)
                                .attributed_to(route),
                        )
                    })?;
                    if enabled {
                        values.flags.insert(key, 1);
                    }
                }
            }
            OptionKind::Value => {
                if values.options.contains_key(&key) {
                    continue;
                }
                let value = envvar_value(option, context)
                    .map(|(_, value)| value)
                    .or_else(|| option.get_default().map(str::to_string));
                match value {
                    Some(value) => {
                        values.options.insert(key, vec![value]);
                    }
                    None if option.is_required() => {
                        return Err(usage(
                            route,
                            format!("Missing option \"{}\"", option.longest_name()),
                        ));
                    }
                    None => {}
                }
            }
        }
    }
    Ok(())
}

fn resolve_subcommand(
    command: &Command,
    name: String,
    rest: Vec<String>,
    route: &[String],
) -> Result<(usize, Vec<String>), CliError> {
    let (name, rest) = match command.aliases().get(&name) {
        Some(tokens) if !tokens.is_empty() => {
            debug!("Expanding alias `{name}` to {tokens:?}");
            let mut expanded = tokens.clone();
            let target = expanded.remove(0);
            expanded.extend(rest);
            (target, expanded)
        }
        _ => (name, rest),
    };
    let index = command
        .subcommand_index(&name)
        .ok_or_else(|| usage(route, format!("no such command: {name}")))?;
    Ok((index, rest))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    fn parse_root(command: &mut Command, tokens: &[&str]) -> Result<(), CliError> {
        command.build_context(None)?;
        parse(command, &args(tokens))
    }

    type Seen = Rc<RefCell<Vec<String>>>;

    fn recorder(
        seen: &Seen,
        render: fn(&Invocation<'_>) -> String,
    ) -> impl FnMut(&Invocation<'_>) -> Result<(), CliError> + 'static {
        let seen = Rc::clone(seen);
        move |inv| {
            seen.borrow_mut().push(render(inv));
            Ok(())
        }
    }

    #[test]
    fn test_long_and_short_values() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("tool")
            .option(CliOption::value(["-o", "--output"]))
            .and_then(|c| c.option(CliOption::value(["--name"])))
            .and_then(|c| c.option(CliOption::value(["-n"])))
            .unwrap()
            .action(recorder(&seen, |inv| {
                format!(
                    "{:?} {:?} {:?}",
                    inv.value("output"),
                    inv.value("name"),
                    inv.values("n")
                )
            }));
        parse_root(&mut command, &["-o", "a", "--name=b", "-nc", "-n", "d"]).unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            [r#"Some("a") Some("b") ["c", "d"]"#]
        );
    }

    #[test]
    fn test_clustered_flags_are_counted() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("tool")
            .option(CliOption::flag(["-v"]))
            .and_then(|c| c.option(CliOption::flag(["-q"])))
            .unwrap()
            .action(recorder(&seen, |inv| format!("{} {}", inv.count("v"), inv.flag("q"))));
        parse_root(&mut command, &["-vqv"]).unwrap();
        assert_eq!(seen.borrow().as_slice(), ["2 true"]);
    }

    #[test]
    fn test_unknown_option() {
        let mut command = Command::new("tool");
        let err = parse_root(&mut command, &["--bogus"]).unwrap_err();
        match err {
            CliError::Usage(e) => {
                assert_eq!(e.message, "no such option: --bogus");
                assert_eq!(e.command, Some(vec![]));
            }
            other => panic!("Expected Usage, got: {other:?}"),
        }
    }

    #[test]
    fn test_help_option_wins_over_missing_argument() {
        let mut command = Command::new("tool").argument(Argument::new("file"));
        let err = parse_root(&mut command, &["--help"]).unwrap_err();
        assert_eq!(err, CliError::PrintHelp { command: vec![] });
    }

    #[test]
    fn test_missing_value() {
        let mut command = Command::new("tool")
            .option(CliOption::value(["--out"]))
            .unwrap();
        let err = parse_root(&mut command, &["--out"]).unwrap_err();
        assert_eq!(err, usage(&[], "option --out requires a value".to_string()));
    }

    #[test]
    fn test_flag_rejects_attached_value() {
        let mut command = Command::new("tool")
            .option(CliOption::flag(["--force"]))
            .unwrap();
        let err = parse_root(&mut command, &["--force=yes"]).unwrap_err();
        assert_eq!(err, usage(&[], "option --force does not take a value".to_string()));
    }

    #[test]
    fn test_arguments_bind_around_variadic() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("cp")
            .argument(Argument::new("src").variadic())
            .argument(Argument::new("dst"))
            .action(recorder(&seen, |inv| {
                format!("{:?} {:?}", inv.arguments("src"), inv.argument("dst"))
            }));
        parse_root(&mut command, &["a", "b", "c"]).unwrap();
        assert_eq!(seen.borrow().as_slice(), [r#"["a", "b"] Some("c")"#]);
    }

    #[test]
    fn test_missing_and_extra_arguments() {
        let mut command = Command::new("tool").argument(Argument::new("name"));
        let err = parse_root(&mut command, &[]).unwrap_err();
        assert_eq!(err, usage(&[], "Missing argument \"NAME\"".to_string()));

        let err = parse_root(&mut command, &["a", "b", "c"]).unwrap_err();
        assert_eq!(err, usage(&[], "Got unexpected extra arguments (b c)".to_string()));
    }

    #[test]
    fn test_double_dash_ends_options() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("tool")
            .argument(Argument::new("rest").variadic().optional())
            .action(recorder(&seen, |inv| format!("{:?}", inv.arguments("rest"))));
        parse_root(&mut command, &["--", "--not-an-option", "-x"]).unwrap();
        assert_eq!(seen.borrow().as_slice(), [r#"["--not-an-option", "-x"]"#]);
    }

    #[test]
    fn test_interspersed_args_disabled() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("tool")
            .option(CliOption::flag(["-v"]))
            .unwrap()
            .argument(Argument::new("rest").variadic())
            .configure_context(|b| b.allow_interspersed_args = false)
            .action(recorder(&seen, |inv| {
                format!("{} {:?}", inv.flag("v"), inv.arguments("rest"))
            }));
        parse_root(&mut command, &["cmd", "-v"]).unwrap();
        assert_eq!(seen.borrow().as_slice(), [r#"false ["cmd", "-v"]"#]);
    }

    #[test]
    fn test_values_from_env_and_default() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("tool")
            .auto_envvar_prefix("TOOL")
            .option(CliOption::value(["--level"]))
            .and_then(|c| c.option(CliOption::value(["--token"]).envvar("SECRET_TOKEN")))
            .and_then(|c| c.option(CliOption::value(["--mode"]).default_value("fast")))
            .and_then(|c| c.option(CliOption::flag(["--dry-run"])))
            .unwrap()
            .configure_context(|b| {
                b.read_env_with(|name| match name {
                    "TOOL_LEVEL" => Some("3".to_string()),
                    "SECRET_TOKEN" => Some("s3cr3t".to_string()),
                    "TOOL_DRY_RUN" => Some("yes".to_string()),
                    _ => None,
                });
            })
            .action(recorder(&seen, |inv| {
                format!(
                    "{:?} {:?} {:?} {}",
                    inv.value("level"),
                    inv.value("token"),
                    inv.value("mode"),
                    inv.flag("dry-run")
                )
            }));
        parse_root(&mut command, &["--level", "1"]).unwrap();
        parse_root(&mut command, &[]).unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            [
                r#"Some("1") Some("s3cr3t") Some("fast") true"#,
                r#"Some("3") Some("s3cr3t") Some("fast") true"#,
            ]
        );
    }

    #[test]
    fn test_invalid_boolean_in_env() {
        let mut command = Command::new("tool")
            .option(CliOption::flag(["--force"]).envvar("FORCE"))
            .unwrap()
            .configure_context(|b| {
                b.read_env_with(|_| Some("maybe".to_string()));
            });
        let err = parse_root(&mut command, &[]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for \"FORCE\": maybe is not a valid boolean");
    }

    #[test]
    fn test_required_option() {
        let mut command = Command::new("tool")
            .option(CliOption::value(["-u", "--user"]).required())
            .unwrap()
            .configure_context(|b| {
                b.read_env_with(|_| None);
            });
        let err = parse_root(&mut command, &[]).unwrap_err();
        assert_eq!(err, usage(&[], "Missing option \"--user\"".to_string()));
    }

    #[test]
    fn test_parent_runs_before_child() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("git")
            .option(CliOption::flag(["--bare"]))
            .unwrap()
            .action(recorder(&seen, |inv| {
                format!("git {} -> {:?}", inv.flag("bare"), inv.subcommand())
            }))
            .subcommands([Command::new("commit")
                .option(CliOption::value(["-m"]))
                .unwrap()
                .action(recorder(&seen, |inv| {
                    format!("commit {:?} {:?}", inv.value("m"), inv.route())
                }))]);
        parse_root(&mut command, &["--bare", "commit", "-m", "msg"]).unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            [
                r#"git true -> Some("commit")"#,
                r#"commit Some("msg") ["commit"]"#,
            ]
        );
    }

    #[test]
    fn test_group_binds_own_arguments_before_subcommand() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("deploy")
            .argument(Argument::new("target"))
            .action(recorder(&seen, |inv| {
                format!("{:?} -> {:?}", inv.argument("target"), inv.subcommand())
            }))
            .subcommands([Command::new("run")
                .argument(Argument::new("step").optional())
                .action(recorder(&seen, |inv| format!("run {:?}", inv.argument("step"))))]);
        parse_root(&mut command, &["prod", "run", "migrate"]).unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            [r#"Some("prod") -> Some("run")"#, r#"run Some("migrate")"#]
        );

        let err = parse_root(&mut command, &["run"]).unwrap_err();
        assert_eq!(err, CliError::PrintHelp { command: vec![] });

        let err = parse_root(&mut command, &["prod", "ship"]).unwrap_err();
        assert_eq!(err, usage(&[], "no such command: ship".to_string()));
    }

    #[test]
    fn test_missing_subcommand_prints_help() {
        let mut command = Command::new("git").subcommands([Command::new("commit")]);
        let err = parse_root(&mut command, &[]).unwrap_err();
        assert_eq!(err, CliError::PrintHelp { command: vec![] });
    }

    #[test]
    fn test_invoke_without_subcommand() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("git")
            .invoke_without_subcommand(true)
            .action(recorder(&seen, |inv| format!("{:?}", inv.subcommand())))
            .subcommands([Command::new("commit")]);
        parse_root(&mut command, &[]).unwrap();
        assert_eq!(seen.borrow().as_slice(), ["None"]);
    }

    #[test]
    fn test_unknown_subcommand() {
        let mut command = Command::new("git").subcommands([Command::new("commit")]);
        let err = parse_root(&mut command, &["push"]).unwrap_err();
        assert_eq!(err, usage(&[], "no such command: push".to_string()));
    }

    #[test]
    fn test_alias_expands_to_subcommand_tokens() {
        let seen: Seen = Rc::default();
        let mut command = Command::new("git")
            .alias("ci", ["commit", "--amend"])
            .subcommands([Command::new("commit")
                .option(CliOption::flag(["--amend"]))
                .unwrap()
                .action(recorder(&seen, |inv| format!("amend={}", inv.flag("amend"))))]);
        parse_root(&mut command, &["ci"]).unwrap();
        assert_eq!(seen.borrow().as_slice(), ["amend=true"]);
    }

    #[test]
    fn test_child_errors_carry_child_route() {
        let mut command = Command::new("git").subcommands([Command::new("remote")
            .subcommands([Command::new("add").argument(Argument::new("url"))])]);
        let err = parse_root(&mut command, &["remote", "add"]).unwrap_err();
        match err {
            CliError::Usage(e) => assert_eq!(
                e.command,
                Some(vec!["remote".to_string(), "add".to_string()])
            ),
            other => panic!("Expected Usage, got: {other:?}"),
        }

        let err = parse_root(&mut command, &["remote", "-h"]).unwrap_err();
        assert_eq!(
            err,
            CliError::PrintHelp {
                command: vec!["remote".to_string()]
            }
        );
    }

    #[test]
    fn test_body_usage_error_is_attributed() {
        let mut command = Command::new("tool")
            .subcommands([Command::new("run").action(|_| Err(CliError::usage("bad input")))]);
        let err = parse_root(&mut command, &["run"]).unwrap_err();
        match err {
            CliError::Usage(e) => assert_eq!(e.command, Some(vec!["run".to_string()])),
            other => panic!("Expected Usage, got: {other:?}"),
        }
    }
}
