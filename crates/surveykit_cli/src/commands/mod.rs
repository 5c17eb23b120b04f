//! Subcommand implementations.

pub(crate) mod reformat;
pub(crate) mod verify;
