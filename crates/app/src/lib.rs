//! BookVerse storefront client - command-line front end
//!
//! Parses the command line, wires the client from configuration and prints
//! results as text or JSON.

pub mod cli;
pub mod output;

pub use cli::{Cli, Command};
pub use output::OutputFormat;
