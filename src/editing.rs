//! Module used to handle rustyline library.

use std::collections::BTreeSet;

use rustyline::completion::Candidate;
use rustyline::history::FileHistory;
use rustyline::{
    Completer, CompletionType, Config, Context, Editor, Helper, Highlighter, Hinter, Validator,
};
use trie_rs::{Trie, TrieBuilder};

use crate::system::{BuiltIn, Resolver};

pub type ShellEditor = Editor<ShellHelper, FileHistory>;

/// Creates a line editor that completes command names.
pub fn create_editor(resolver: Resolver) -> anyhow::Result<ShellEditor> {
    let completer = ShellCompleter::new(resolver);
    let helper = ShellHelper::new(completer);
    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut editor = Editor::with_config(config)?;
    editor.set_helper(Some(helper));
    Ok(editor)
}

#[derive(Helper, Completer, Hinter, Highlighter, Validator)]
pub struct ShellHelper {
    #[rustyline(Completer)]
    completer: ShellCompleter,
}

impl ShellHelper {
    fn new(completer: ShellCompleter) -> Self {
        Self { completer }
    }
}

/// Completes the first word of a line with builtin and `PATH` command names.
pub struct ShellCompleter {
    resolver: Resolver,
}

impl ShellCompleter {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Builds a trie of every command name. Rebuilt per request because the
    /// search path is never cached.
    fn command_trie(&self) -> Trie<u8> {
        let built_ins = BuiltIn::ALL.map(|built_in| built_in.name().to_owned());
        let names: BTreeSet<String> = self
            .resolver
            .executable_names()
            .into_iter()
            .chain(built_ins)
            .collect();

        let mut trie_builder = TrieBuilder::new();
        for name in names {
            trie_builder.push(name);
        }
        trie_builder.build()
    }

    /// Returns candidates for the text before the cursor.
    pub fn completions(&self, line: &str) -> Vec<ShellCompletionCandidate> {
        // Only the command name is completed.
        if line.is_empty() || line.contains(char::is_whitespace) {
            return Vec::new();
        }

        self.command_trie()
            .postfix_search(line)
            .map(|completion: String| ShellCompletionCandidate::new(line, completion))
            .collect()
    }
}

impl rustyline::completion::Completer for ShellCompleter {
    type Candidate = ShellCompletionCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<ShellCompletionCandidate>)> {
        let completions = match line.get(..pos) {
            Some(prefix) => self.completions(prefix),
            None => Vec::new(),
        };
        Ok((pos, completions))
    }
}

#[derive(Debug)]
pub struct ShellCompletionCandidate {
    display: String,
    replacement: String,
}

impl ShellCompletionCandidate {
    fn new(line: &str, completion: String) -> Self {
        let mut display = String::new();
        display.push_str(line);
        display.push_str(&completion);

        let mut replacement = completion;
        replacement.push(' ');

        Self {
            display,
            replacement,
        }
    }
}

impl Candidate for ShellCompletionCandidate {
    fn display(&self) -> &str {
        &self.display
    }

    fn replacement(&self) -> &str {
        &self.replacement
    }
}
