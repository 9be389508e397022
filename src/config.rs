//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// A small interactive command shell.
#[derive(Debug, Parser)]
#[command(name = "myshell", version, about, long_about = None)]
pub struct Config {
    /// Evaluate the given line and exit
    #[arg(short = 'c', value_name = "LINE")]
    pub command: Option<String>,

    /// Prompt shown before each line
    #[arg(long, env = "MYSHELL_PROMPT", default_value = "$ ")]
    pub prompt: String,

    /// Log level written to stderr (off, error, warn, info, debug, trace)
    #[arg(long, env = "MYSHELL_LOG", default_value = "off")]
    pub log_level: LevelFilter,

    /// File to load history from at start and save it to at exit
    #[arg(long, env = "MYSHELL_HISTORY", value_name = "FILE")]
    pub history: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Config::command().debug_assert();
    }

    #[test]
    fn single_line_mode() {
        let config = Config::try_parse_from(["myshell", "-c", "echo hi"]).unwrap();
        assert_eq!(config.command.as_deref(), Some("echo hi"));
    }

    #[test]
    fn log_level_parses() {
        let config = Config::try_parse_from(["myshell", "--log-level", "debug"]).unwrap();
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn bad_log_level_is_rejected() {
        assert!(Config::try_parse_from(["myshell", "--log-level", "loud"]).is_err());
    }
}
