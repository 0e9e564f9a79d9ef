//! Command implementations for the lnstacks CLI.

mod convert;

pub use convert::cmd_convert;
