//! Options and positional arguments a command can declare
//!
//! The command tree only relies on an option's names and on the help metadata of both;
//! value handling lives in the parser.

pub mod argument;
pub mod option;

pub use argument::Argument;
pub use option::{CliOption, OptionKind};
