//! CLI command handlers
//!
//! Each submodule handles one subcommand and exposes a `handle` function.

pub mod config;
pub mod helpers;
pub mod highlight;
pub mod render;
pub mod run;
pub mod watch;
