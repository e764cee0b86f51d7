mod args;
mod commands;
mod handlers;

pub use args::{Cli, Commands, LogLevel};
pub use commands::{init_logging, run};
