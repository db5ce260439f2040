pub mod command;
pub mod executor;
pub mod process;

pub use command::{build_command, build_command_with, build_command_with_output};
pub use executor::CommandExecutor;
