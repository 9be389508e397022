//! A parsed, fully resolved command.

use std::path::PathBuf;

use crate::system::CommandInfo;

/// A shell command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exits the shell with a return code.
    Exit(i32),

    /// Echos back user input.
    Echo(Vec<String>),

    /// Displays the type of command.
    Type { name: String, resolved: CommandInfo },

    /// Prints the working directory, as captured when the command was parsed.
    Pwd(PathBuf),

    /// Changes the working directory to a given path.
    Cd(PathBuf),

    /// Runs an executable. `args[0]` is the name as typed.
    External { path: PathBuf, args: Vec<String> },
}
