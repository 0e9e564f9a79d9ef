//! Shared pieces of the lnstacks command-line front end.

pub mod args;
pub mod commands;
pub mod processing;

pub use args::Cli;
pub use commands::cmd_convert;
