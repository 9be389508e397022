//! Contains all code dealing with system access.

use std::env::{split_paths, var_os};
use std::ffi::OsString;
use std::fs::{metadata, read_dir};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::{debug, trace};

/// A command implemented by the shell itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltIn {
    Cd,
    Echo,
    Exit,
    Pwd,
    Type,
}

impl BuiltIn {
    /// Every builtin, in the order completion offers them.
    pub const ALL: [BuiltIn; 5] = [
        BuiltIn::Cd,
        BuiltIn::Echo,
        BuiltIn::Exit,
        BuiltIn::Pwd,
        BuiltIn::Type,
    ];

    /// Looks up a builtin by name.
    pub fn from_name(name: &str) -> Option<BuiltIn> {
        BuiltIn::ALL.into_iter().find(|built_in| built_in.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::Cd => "cd",
            BuiltIn::Echo => "echo",
            BuiltIn::Exit => "exit",
            BuiltIn::Pwd => "pwd",
            BuiltIn::Type => "type",
        }
    }
}

/// What a command name resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandInfo {
    BuiltIn(BuiltIn),

    /// An executable file found on the search path.
    External(PathBuf),

    Unresolved,
}

/// Resolves command names against the builtins and the search path.
///
/// Nothing is cached: the search path and the file system are consulted
/// again on every lookup, since either may change between lines.
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    /// A fixed search path. When unset, `PATH` is read on every lookup.
    search_path: Option<OsString>,
}

impl Resolver {
    /// Creates a resolver that follows the `PATH` environment variable.
    pub fn from_env() -> Resolver {
        Resolver::default()
    }

    /// Creates a resolver with a fixed, colon separated search path.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Resolver {
        Resolver {
            search_path: Some(search_path.into()),
        }
    }

    /// Gets the directories of the search path, in lookup order.
    pub fn paths(&self) -> Vec<PathBuf> {
        match self.search_path.clone().or_else(|| var_os("PATH")) {
            Some(path) => split_paths(&path).collect(),
            None => {
                debug!("no PATH environment variable found");
                Vec::new()
            }
        }
    }

    /// Resolves a command name. Builtins always win over executables.
    pub fn resolve(&self, name: &str) -> CommandInfo {
        if let Some(built_in) = BuiltIn::from_name(name) {
            return CommandInfo::BuiltIn(built_in);
        }

        let found = if name.contains('/') {
            Some(PathBuf::from(name)).filter(|path| is_executable_file(path))
        } else if name.is_empty() {
            None
        } else {
            search_for_executable_file(&self.paths(), name)
        };

        match found {
            Some(path) => {
                debug!("resolved {name} to {}", path.display());
                CommandInfo::External(path)
            }
            None => CommandInfo::Unresolved,
        }
    }

    /// Gets the names of every executable on the search path.
    pub fn executable_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for path in self.paths() {
            let read_dir_iter = match read_dir(&path) {
                Ok(read_dir_iter) => read_dir_iter,
                Err(e) => {
                    trace!("error reading dir {}: {}", path.display(), e);
                    continue;
                }
            };
            for dir_entry in read_dir_iter.flatten() {
                if !is_executable_file(&dir_entry.path()) {
                    continue;
                }
                if let Some(name) = dir_entry.file_name().to_str() {
                    names.push(name.to_owned());
                }
            }
        }
        names
    }
}

/// Searches for an executable file in a collection of paths. The first
/// match wins.
pub fn search_for_executable_file(paths: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    paths
        .iter()
        .map(|path| path.join(file_name))
        .find(|candidate| is_executable_file(candidate))
}

/// Determines if a path is a regular file with any execute bit set.
fn is_executable_file(path: &Path) -> bool {
    match metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(e) => {
            trace!("skipping {}: {}", path.display(), e);
            false
        }
    }
}

/// Changes the current directory.
pub fn change_directory(path: &Path) -> std::io::Result<()> {
    std::env::set_current_dir(path)
}
