use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use log::{debug, info};

use cmdtree::{Argument, CliError, CliOption, Command, ConfigError, Invocation, PlainHelpFormatter};

fn notes_file(inv: &Invocation<'_>) -> PathBuf {
    PathBuf::from(inv.value("dir").unwrap_or(".")).join("notes.txt")
}

fn add(inv: &Invocation<'_>) -> Result<(), CliError> {
    let words = inv.arguments("text");
    let tags = inv.values("tag");
    let mut line = words.join(" ");
    if line.trim().is_empty() {
        return Err(inv.usage_error("note text is empty"));
    }
    for tag in tags {
        line.push_str(&format!(" #{tag}"));
    }

    let path = notes_file(inv);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| CliError::tool(format!("Unable to open {}: {e}", path.display())))?;
    writeln!(file, "{line}")
        .map_err(|e| CliError::tool(format!("Unable to write {}: {e}", path.display())))?;
    info!("Appended note to {}", path.display());
    Ok(())
}

fn list(inv: &Invocation<'_>) -> Result<(), CliError> {
    let path = notes_file(inv);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(CliError::tool(format!("Unable to read {}: {e}", path.display()))),
    };
    let filter = inv.value("tag").map(|tag| format!("#{tag}"));
    for (number, line) in content.lines().enumerate() {
        if filter.as_ref().is_none_or(|tag| line.contains(tag.as_str())) {
            println!("{:>4}  {line}", number + 1);
        }
    }
    Ok(())
}

fn clear(inv: &Invocation<'_>) -> Result<(), CliError> {
    if !inv.flag("yes") {
        return Err(CliError::Abort);
    }
    let path = notes_file(inv);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CliError::tool(format!("Unable to remove {}: {e}", path.display()))),
    }
}

fn build() -> Result<Command, ConfigError> {
    let add_command = Command::new("add")
        .help("Append a note. Tags are written as #tag after the text.")
        .option(CliOption::value(["-t", "--tag"]).metavar("TAG").help("Tag the note (repeatable)"))?
        .option(CliOption::value(["--dir"]).metavar("DIR").help("Notes directory"))?
        .argument(Argument::new("text").variadic().help("Words of the note"))
        .action(add);

    let list_command = Command::new("list")
        .help("Print notes with their numbers.")
        .option(CliOption::value(["-t", "--tag"]).metavar("TAG").help("Only notes with this tag"))?
        .option(CliOption::value(["--dir"]).metavar("DIR").help("Notes directory"))?
        .action(list);

    let clear_command = Command::new("clear")
        .help("Delete every note.")
        .option(CliOption::flag(["-y", "--yes"]).help("Do not abort"))?
        .option(CliOption::value(["--dir"]).metavar("DIR").help("Notes directory"))?
        .action(clear);

    let root = Command::new("notes")
        .help(
            "A tiny note keeper.\n\n\
             Every subcommand reads NOTES_<COMMAND>_DIR when --dir is not given.",
        )
        .epilog("Set RUST_LOG=debug to trace parsing.")
        .auto_envvar_prefix("NOTES")
        .option(CliOption::flag(["--version"]).help("Show the version and exit"))?
        .alias("ls", ["list"])
        .configure_context(|b| b.help_formatter = std::sync::Arc::new(PlainHelpFormatter::styled()))
        .action(|inv| {
            if inv.flag("version") {
                return Err(CliError::message(format!("notes {}", env!("CARGO_PKG_VERSION"))));
            }
            match inv.subcommand() {
                Some(name) => {
                    debug!("Running subcommand {name}");
                    Ok(())
                }
                None => Err(inv.help_requested()),
            }
        })
        .invoke_without_subcommand(true)
        .subcommands([add_command, list_command, clear_command]);
    Ok(root)
}

fn main() -> ExitCode {
    if let Err(e) = cmdtree::logger::init(None) {
        eprintln!("Error: {e}");
    }
    let result = build().and_then(|mut notes| notes.main(std::env::args().skip(1)));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
