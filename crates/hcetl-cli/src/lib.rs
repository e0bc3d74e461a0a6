//! Library side of the `hcetl` binary: configuration, logging, and commands.

pub mod commands;
pub mod config;
pub mod logging;
