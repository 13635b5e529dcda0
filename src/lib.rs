//! Declarative command trees for command-line programs
//!
//! Declare a [`Command`] with its options, arguments and subcommands, then hand it the
//! process arguments. Every parse builds a fresh [`Context`] per command from the root down,
//! injects a help option where the context asks for one, matches argv, runs the bodies of
//! the selected commands and maps the outcome to a printed message and an exit status.
//!
//! ```no_run
//! use cmdtree::{Argument, CliOption, Command};
//!
//! fn main() -> Result<(), cmdtree::ConfigError> {
//!     let mut tool = Command::new("greet")
//!         .help("Say hello.")
//!         .option(CliOption::flag(["-l", "--loud"]).help("Shout"))?
//!         .argument(Argument::new("name"))
//!         .action(|inv| {
//!             let name = inv.argument("name").unwrap_or("world");
//!             if inv.flag("loud") {
//!                 println!("HELLO {}!", name.to_uppercase());
//!             } else {
//!                 println!("Hello {name}");
//!             }
//!             Ok(())
//!         });
//!     tool.main(std::env::args().skip(1))
//! }
//! ```

pub mod commands;
pub mod context;
pub mod error;
pub mod help;
pub mod invocation;
pub mod logger;
pub mod parameters;
pub mod parser;
pub mod theme;

pub use commands::inherit::normalize_envvar;
pub use commands::{Command, Outcome};
pub use context::{Context, ContextBuilder};
pub use error::{CliError, ConfigError, UsageError};
pub use help::{HelpFormatter, ParameterHelp, PlainHelpFormatter};
pub use invocation::Invocation;
pub use parameters::{Argument, CliOption, OptionKind};
