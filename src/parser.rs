//! A command parser.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ast::Command;
use crate::system::{BuiltIn, CommandInfo, Resolver};

/// An error found while turning words into a command.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("exit: invalid code")]
    InvalidExitCode,

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("pwd: {0}")]
    CurrentDir(#[source] io::Error),
}

/// Parses the words left after redirection into a command. Returns `None`
/// when there are no words.
pub fn parse(resolver: &Resolver, words: Vec<String>) -> Result<Option<Command>, ParseError> {
    let mut words = words.into_iter();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<String> = words.collect();

    let command = match resolver.resolve(&name) {
        CommandInfo::BuiltIn(BuiltIn::Cd) => cd(args)?,
        CommandInfo::BuiltIn(BuiltIn::Echo) => Command::Echo(args),
        CommandInfo::BuiltIn(BuiltIn::Exit) => exit(args)?,
        CommandInfo::BuiltIn(BuiltIn::Pwd) => pwd()?,
        CommandInfo::BuiltIn(BuiltIn::Type) => type_builtin(resolver, args)?,
        CommandInfo::External(path) => {
            let mut argv = Vec::with_capacity(args.len() + 1);
            argv.push(name);
            argv.extend(args);
            Command::External { path, args: argv }
        }
        CommandInfo::Unresolved => return Err(ParseError::CommandNotFound(name)),
    };

    Ok(Some(command))
}

/// Parses a cd command.
fn cd(args: Vec<String>) -> Result<Command, ParseError> {
    let path = exactly_one(args, "cd <path>")?;
    let path = expand_home(path, std::env::var_os("HOME"))?;
    Ok(Command::Cd(path))
}

/// Parses an exit command.
fn exit(args: Vec<String>) -> Result<Command, ParseError> {
    let code = exactly_one(args, "exit <code>")?;
    let code = code.parse().map_err(|_| ParseError::InvalidExitCode)?;
    Ok(Command::Exit(code))
}

/// Parses a pwd command. Arguments are ignored.
fn pwd() -> Result<Command, ParseError> {
    let path = std::env::current_dir().map_err(ParseError::CurrentDir)?;
    Ok(Command::Pwd(path))
}

/// Parses the `type` builtin.
fn type_builtin(resolver: &Resolver, args: Vec<String>) -> Result<Command, ParseError> {
    let name = exactly_one(args, "type <command>")?;
    let resolved = resolver.resolve(&name);
    Ok(Command::Type { name, resolved })
}

/// Takes the only argument of a builtin.
fn exactly_one(args: Vec<String>, usage: &'static str) -> Result<String, ParseError> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(arg), None) => Ok(arg),
        _ => Err(ParseError::Usage(usage)),
    }
}

/// Replaces a lone `~` with the home directory.
fn expand_home(path: String, home: Option<OsString>) -> Result<PathBuf, ParseError> {
    if path != "~" {
        return Ok(PathBuf::from(path));
    }
    home.map(PathBuf::from).ok_or(ParseError::HomeNotSet)
}
