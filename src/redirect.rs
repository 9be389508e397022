//! Output redirection and the environment a command writes to.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::process::Stdio;
use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::scanner::{Token, TokenTag};

/// Mode used for files created by a redirection.
const CREATE_MODE: u32 = 0o644;

/// An in-memory output buffer shared with the caller.
pub type SharedBuffer = Rc<RefCell<Vec<u8>>>;

/// An error found while applying redirections.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("syntax error: missing redirection target")]
    MissingTarget,

    #[error("redirecting fd {0} not supported")]
    UnsupportedFd(String),

    #[error("{path}: {source}")]
    Open { path: String, source: io::Error },
}

/// Where a command's output stream goes.
#[derive(Debug)]
pub enum Sink {
    /// The shell's own standard output.
    Stdout,

    /// The shell's own standard error.
    Stderr,

    /// A file opened by a redirection.
    File(File),

    /// A buffer held in memory.
    Buffer(SharedBuffer),
}

impl Sink {
    /// Creates a buffer sink and returns it with a handle to its contents.
    pub fn buffer() -> (Sink, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Sink::Buffer(Rc::clone(&buffer)), buffer)
    }

    /// Returns the stdio a child process should write this stream to.
    /// Buffer sinks are fed through a pipe which the caller has to drain.
    pub fn stdio(&self) -> io::Result<Stdio> {
        let stdio = match self {
            Sink::Stdout | Sink::Stderr => Stdio::inherit(),
            Sink::File(file) => Stdio::from(file.try_clone()?),
            Sink::Buffer(_) => Stdio::piped(),
        };
        Ok(stdio)
    }

    /// Determines if a child's output for this sink has to be captured.
    pub fn is_captured(&self) -> bool {
        matches!(self, Sink::Buffer(_))
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout => io::stdout().write(buf),
            Sink::Stderr => io::stderr().write(buf),
            Sink::File(file) => file.write(buf),
            Sink::Buffer(buffer) => {
                buffer.borrow_mut().extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::File(file) => file.flush(),
            Sink::Buffer(_) => Ok(()),
        }
    }
}

/// The output streams of a single command invocation.
///
/// Files opened by redirection are closed when the environment is dropped.
#[derive(Debug)]
pub struct Environment {
    pub stdout: Sink,
    pub stderr: Sink,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            stdout: Sink::Stdout,
            stderr: Sink::Stderr,
        }
    }
}

impl Environment {
    /// Creates an environment writing to memory, returning handles to the
    /// stdout and stderr buffers.
    pub fn buffered() -> (Environment, SharedBuffer, SharedBuffer) {
        let (stdout, out) = Sink::buffer();
        let (stderr, err) = Sink::buffer();
        (Environment { stdout, stderr }, out, err)
    }

    /// Returns the sink for a file descriptor which may be redirected.
    fn sink_mut(&mut self, fd: u32) -> Result<&mut Sink, RedirectError> {
        match fd {
            1 => Ok(&mut self.stdout),
            2 => Ok(&mut self.stderr),
            fd => Err(RedirectError::UnsupportedFd(fd.to_string())),
        }
    }

    /// Flushes both streams.
    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()?;
        self.stderr.flush()
    }
}

/// Applies every redirection in `tokens` to `env`, returning the remaining
/// words in their original order.
pub fn apply_redirects(
    env: &mut Environment,
    tokens: Vec<Token>,
) -> Result<Vec<String>, RedirectError> {
    let mut words = Vec::new();
    let mut source_fd = 1;
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match token.tag {
            TokenTag::IoNumber => {
                source_fd = token
                    .lexeme
                    .parse()
                    .map_err(|_| RedirectError::UnsupportedFd(token.lexeme))?;
            }

            TokenTag::RedirectOut | TokenTag::RedirectAppend => {
                let target = match tokens.next() {
                    Some(Token {
                        tag: TokenTag::Word,
                        lexeme,
                    }) => lexeme,
                    _ => return Err(RedirectError::MissingTarget),
                };
                let is_append = token.tag == TokenTag::RedirectAppend;

                let sink = env.sink_mut(source_fd)?;
                *sink = Sink::File(open_target(&target, is_append)?);
                debug!("redirected fd {source_fd} to {target} (append: {is_append})");

                source_fd = 1;
            }

            TokenTag::Word => words.push(token.lexeme),
        }
    }

    Ok(words)
}

/// Opens a redirection target for writing.
fn open_target(path: &str, is_append: bool) -> Result<File, RedirectError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).mode(CREATE_MODE);
    if is_append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    options.open(path).map_err(|source| RedirectError::Open {
        path: path.to_owned(),
        source,
    })
}
