// src/commands/mod.rs
pub mod cd;
pub mod clear_cmd;
pub mod ls;
pub mod mkdir;
pub mod mkfile;
pub mod print;
pub mod registry;
pub mod rm;
pub mod show_cmd;
pub mod types;
pub mod whoami_cmd;

pub use registry::CommandRegistry;
pub use types::{Command, CommandContext, CommandError, CommandResult};
