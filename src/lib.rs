//! The command interpretation core of a small interactive shell.
//!
//! A line flows through [`scanner`] into tokens, through [`redirect`] into
//! an [`Environment`] and plain words, through [`parser`] into a
//! [`Command`], and finally into [`executor`].

pub mod ast;
pub mod config;
pub mod editing;
pub mod error;
pub mod executor;
pub mod parser;
pub mod redirect;
pub mod scanner;
pub mod shell;
pub mod system;

pub use ast::Command;
pub use error::ShellError;
pub use redirect::Environment;
pub use shell::Shell;
pub use system::Resolver;
