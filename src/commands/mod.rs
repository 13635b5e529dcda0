//! The command tree and its execution pipeline
//!
//! A [`Command`] owns its options, arguments and subcommands. Attaching subcommands passes
//! the environment variable prefix down the tree; parsing builds a fresh context for every
//! node from the root down before any token is read.

pub mod command;
pub mod inherit;
pub mod pipeline;

pub use command::{Action, Command, ContextConfig};
pub use pipeline::Outcome;
