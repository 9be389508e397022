//! Evaluation of a single command line.

use std::io::Write;

use log::debug;

use crate::error::ShellError;
use crate::executor::execute;
use crate::parser::parse;
use crate::redirect::{apply_redirects, Environment};
use crate::scanner::tokenize;
use crate::system::Resolver;

/// Turns lines into commands and runs them.
#[derive(Clone, Debug, Default)]
pub struct Shell {
    resolver: Resolver,
}

impl Shell {
    pub fn new(resolver: Resolver) -> Shell {
        Shell { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Evaluates a line against the shell's own stdout and stderr.
    pub fn eval(&self, line: &str) -> Result<(), ShellError> {
        self.eval_in(line, Environment::default())
    }

    /// Evaluates a line against a given environment.
    ///
    /// Lex and redirection errors are returned before anything runs. Any
    /// later error is written to the environment's stderr. Files opened by
    /// redirection are closed when this returns.
    pub fn eval_in(&self, line: &str, mut env: Environment) -> Result<(), ShellError> {
        let tokens = tokenize(line)?;
        let words = apply_redirects(&mut env, tokens)?;
        debug!("words {words:?}");

        match parse(&self.resolver, words) {
            Ok(Some(command)) => {
                debug!("command {command:?}");
                execute(command, &mut env)?;
            }
            Ok(None) => {}
            Err(e) => {
                writeln!(env.stderr, "{e}")?;
                env.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn eval(line: &str) -> (String, String) {
        let shell = Shell::new(Resolver::with_search_path("/bin:/usr/bin"));
        let (env, out, err) = Environment::buffered();
        shell.eval_in(line, env).unwrap();
        let out = String::from_utf8(out.take()).unwrap();
        let err = String::from_utf8(err.take()).unwrap();
        (out, err)
    }

    #[test]
    fn echo_collapses_whitespace() {
        assert_eq!(eval("echo hello   world").0, "hello world\n");
    }

    #[test]
    fn echo_keeps_quoted_whitespace() {
        assert_eq!(eval(r#"echo 'a  b' "c d""#).0, "a  b c d\n");
    }

    #[test]
    fn type_builtin() {
        assert_eq!(eval("type cd").0, "cd is a shell builtin\n");
        assert_eq!(eval("type type").0, "type is a shell builtin\n");
    }

    #[test]
    fn type_unknown() {
        assert_eq!(eval("type nosuchcmd").0, "nosuchcmd: not found\n");
    }

    #[test]
    fn unknown_command_goes_to_stderr() {
        let (out, err) = eval("nosuchcmd");
        assert_eq!(out, "");
        assert_eq!(err, "nosuchcmd: command not found\n");
    }

    #[test]
    fn usage_goes_to_stderr() {
        let (_, err) = eval("exit");
        assert_eq!(err, "usage: exit <code>\n");
    }

    #[test]
    fn blank_line_does_nothing() {
        assert_eq!(eval("   "), (String::new(), String::new()));
    }

    #[test]
    fn external_command_runs() {
        assert_eq!(eval("sh -c 'echo from child'").0, "from child\n");
    }

    #[test]
    fn echo_redirected_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let (out, err) = eval(&format!("echo hi > {}", path.display()));
        assert_eq!((out, err), (String::new(), String::new()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi\n");
    }

    #[test]
    fn parse_errors_follow_stderr_redirection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("err.log");
        let (_, err) = eval(&format!("nosuchcmd 2> {}", path.display()));
        assert_eq!(err, "");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "nosuchcmd: command not found\n"
        );
    }

    #[test]
    fn child_stderr_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("err.log");
        let line = format!("sh -c 'echo oops >&2' 2>> {}", path.display());
        eval(&line);
        eval(&line);
        assert_eq!(fs::read_to_string(&path).unwrap(), "oops\noops\n");
    }

    #[test]
    fn lex_errors_are_returned() {
        let shell = Shell::new(Resolver::with_search_path(""));
        let (env, out, _) = Environment::buffered();
        let err = shell.eval_in("echo 'open", env).unwrap_err();
        assert!(matches!(err, ShellError::Lex(_)));
        assert!(out.borrow().is_empty());
    }

    #[test]
    fn redirect_errors_stop_the_line() {
        let shell = Shell::new(Resolver::with_search_path(""));
        let (env, out, _) = Environment::buffered();
        let err = shell.eval_in("echo hi 3> /dev/null", env).unwrap_err();
        assert_eq!(err.to_string(), "redirecting fd 3 not supported");
        assert!(out.borrow().is_empty());
    }
}
