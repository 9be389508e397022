//! Errors that abort the evaluation of a line.

use std::io;

use thiserror::Error;

use crate::redirect::RedirectError;
use crate::scanner::LexError;

/// An error returned to the read-eval loop.
///
/// Resolution, parse and execution errors are not in here: they are written
/// to the stderr of the line they belong to, which may be redirected.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Redirect(#[from] RedirectError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
