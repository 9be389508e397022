//! Carries out parsed commands.

use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{self, Stdio};

use log::debug;
use thiserror::Error;

use crate::ast::Command;
use crate::redirect::Environment;
use crate::system::{change_directory, CommandInfo};

/// A failure while running a command. These are reported on the command's
/// stderr and do not stop the shell.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cd: {0}: No such file or directory")]
    Cd(String),

    #[error("{name}: {source}")]
    Spawn { name: String, source: io::Error },

    #[error("{name}: {source}")]
    Wait { name: String, source: io::Error },

    /// Writing to one of the command's own streams failed.
    #[error(transparent)]
    Output(#[from] io::Error),
}

/// Executes a command against its environment. Only failures to write to
/// the environment itself are returned.
pub fn execute(command: Command, env: &mut Environment) -> io::Result<()> {
    match run(command, env) {
        Ok(()) => {}
        Err(ExecError::Output(e)) => return Err(e),
        Err(e) => writeln!(env.stderr, "{e}")?,
    }
    env.flush()
}

fn run(command: Command, env: &mut Environment) -> Result<(), ExecError> {
    match command {
        Command::Exit(code) => {
            env.flush()?;
            debug!("exiting with {code}");
            process::exit(code)
        }
        Command::Echo(words) => writeln!(env.stdout, "{}", words.join(" "))?,
        Command::Pwd(path) => writeln!(env.stdout, "{}", path.display())?,
        Command::Cd(path) => cd(&path)?,
        Command::Type { name, resolved } => match resolved {
            CommandInfo::BuiltIn(_) => writeln!(env.stdout, "{name} is a shell builtin")?,
            CommandInfo::External(path) => writeln!(env.stdout, "{name} is {}", path.display())?,
            CommandInfo::Unresolved => writeln!(env.stdout, "{name}: not found")?,
        },
        Command::External { path, args } => external(path, args, env)?,
    }
    Ok(())
}

/// Changes the working directory, leaving it untouched on failure.
fn cd(path: &Path) -> Result<(), ExecError> {
    change_directory(path).map_err(|e| {
        debug!("cd to {} failed: {e}", path.display());
        ExecError::Cd(path.display().to_string())
    })
}

/// Runs an external command and waits for it to exit.
fn external(path: PathBuf, args: Vec<String>, env: &mut Environment) -> Result<(), ExecError> {
    let name = match args.first() {
        Some(arg0) => arg0.clone(),
        None => path.display().to_string(),
    };

    // Anything already written must land before the child's output.
    env.flush()?;

    let mut command = process::Command::new(&path);
    command
        .arg0(&name)
        .args(args.iter().skip(1))
        .stdin(Stdio::inherit())
        .stdout(env.stdout.stdio()?)
        .stderr(env.stderr.stdio()?);

    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        name: name.clone(),
        source,
    })?;
    debug!("spawned {} as pid {}", path.display(), child.id());

    let status = if env.stdout.is_captured() || env.stderr.is_captured() {
        let output = child.wait_with_output().map_err(|source| ExecError::Wait {
            name: name.clone(),
            source,
        })?;
        env.stdout.write_all(&output.stdout)?;
        env.stderr.write_all(&output.stderr)?;
        output.status
    } else {
        child.wait().map_err(|source| ExecError::Wait {
            name: name.clone(),
            source,
        })?
    };

    debug!("{name} exited with {status}");
    Ok(())
}
