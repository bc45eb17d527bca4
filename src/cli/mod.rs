//! Command-line surface over the services

pub mod args;
pub mod commands;
pub mod render;

pub use args::{AdminCommands, Cli, Commands};
pub use commands::{AppContext, run};
