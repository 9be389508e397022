use std::io;

use anyhow::Context;
use clap::Parser;
use log::{debug, warn, LevelFilter};
use rustyline::error::ReadlineError;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use myshell::config::Config;
use myshell::editing::{create_editor, ShellEditor};
use myshell::{Resolver, Shell};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(config.log_level)?;

    let shell = Shell::new(Resolver::from_env());
    match &config.command {
        Some(line) => {
            eval(&shell, line);
            Ok(())
        }
        None => repl(&shell, &config),
    }
}

/// Sends log records to stderr, unless logging is turned off.
fn init_logging(level: LevelFilter) -> anyhow::Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to initialise logging")
}

/// Read, eval, print loop. Returns at end of input.
fn repl(shell: &Shell, config: &Config) -> anyhow::Result<()> {
    let mut editor = create_editor(shell.resolver().clone())?;
    load_history(&mut editor, config);

    loop {
        match editor.readline(&config.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = editor.add_history_entry(line.as_str()) {
                        warn!("failed to add history entry: {e}");
                    }
                }
                eval(shell, &line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            // The offending line has been consumed; carry on with the next.
            Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                eprintln!("{e}");
            }
            Err(e) => return Err(e).context("failed to read line"),
        }
    }

    if let Some(path) = &config.history {
        editor
            .save_history(path)
            .with_context(|| format!("failed to save history to {}", path.display()))?;
    }
    Ok(())
}

/// Evaluates a line, printing any error. Errors never end the shell.
fn eval(shell: &Shell, line: &str) {
    if let Err(e) = shell.eval(line) {
        eprintln!("{e}");
    }
}

fn load_history(editor: &mut ShellEditor, config: &Config) {
    let Some(path) = &config.history else {
        return;
    };
    if let Err(e) = editor.load_history(path) {
        debug!("no history loaded from {}: {e}", path.display());
    }
}
