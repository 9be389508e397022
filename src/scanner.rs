//! Scanner for the command line.

use std::str::Chars;

use log::trace;
use thiserror::Error;

/// A token type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenTag {
    /// A word with its quotes and escapes removed.
    Word,

    /// A digit string naming the file descriptor of the redirection that
    /// immediately follows it.
    IoNumber,

    /// The `>` operator.
    RedirectOut,

    /// The `>>` operator.
    RedirectAppend,
}

/// A token in a command text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Tags what kind of token this is.
    pub tag: TokenTag,

    /// The token's text.
    pub lexeme: String,
}

impl Token {
    pub fn new(tag: TokenTag, lexeme: impl Into<String>) -> Token {
        Token {
            tag,
            lexeme: lexeme.into(),
        }
    }
}

/// An error found while scanning a command text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("syntax error: unterminated {0}")]
    UnterminatedQuote(char),
}

/// Possible states of the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Outside of any quotes.
    Normal,

    /// Right after a backslash outside of quotes.
    Escaped,

    /// Inside single quoted text.
    InSingleQuote,

    /// Inside double quoted text.
    InDoubleQuote,
}

/// Text accumulated but not yet emitted as a token.
enum Pending {
    Empty,

    /// A word, and whether any part of it came from quotes or escapes.
    Word { text: String, literal: bool },

    /// A single `>` which may still become `>>`.
    Redirect,
}

/// Converts a command's text into a sequence of tokens.
pub struct Scanner<'a> {
    /// An iterator over the command text.
    chars: Chars<'a>,

    state: State,

    pending: Pending,

    /// Tokens emitted so far.
    tokens: Vec<Token>,
}

/// Scans a whole command text into tokens.
pub fn tokenize(command_text: &str) -> Result<Vec<Token>, LexError> {
    Scanner::new(command_text).scan()
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for a given command text.
    pub fn new(command_text: &'a str) -> Scanner<'a> {
        Scanner {
            chars: command_text.chars(),
            state: State::Normal,
            pending: Pending::Empty,
            tokens: Vec::new(),
        }
    }

    /// Runs the scanner to the end of the command text.
    pub fn scan(mut self) -> Result<Vec<Token>, LexError> {
        use State::*;

        while let Some(c) = self.chars.next() {
            self.state = match (self.state, c) {
                (Normal, c) => self.normal(c),

                (Escaped, c) => {
                    self.push(c, true);
                    Normal
                }

                (InSingleQuote, '\'') | (InDoubleQuote, '"') => Normal,

                (quoted, c) => {
                    self.push(c, true);
                    quoted
                }
            };
        }

        match self.state {
            InSingleQuote => Err(LexError::UnterminatedQuote('\'')),
            InDoubleQuote => Err(LexError::UnterminatedQuote('"')),
            // A trailing backslash has nothing to escape and is dropped.
            Normal | Escaped => {
                self.flush(false);
                Ok(self.tokens)
            }
        }
    }

    /// Handles a character outside of quotes and returns the next state.
    fn normal(&mut self, c: char) -> State {
        match c {
            '\\' => State::Escaped,
            '\'' => {
                self.begin_word();
                State::InSingleQuote
            }
            '"' => {
                self.begin_word();
                State::InDoubleQuote
            }
            '>' => {
                if let Pending::Redirect = self.pending {
                    self.pending = Pending::Empty;
                    self.emit(Token::new(TokenTag::RedirectAppend, ">>"));
                } else {
                    self.flush(true);
                    self.pending = Pending::Redirect;
                }
                State::Normal
            }
            c if c.is_whitespace() => {
                self.flush(false);
                State::Normal
            }
            c => {
                self.push(c, false);
                State::Normal
            }
        }
    }

    /// Starts a word if none is pending, so that empty quotes still produce
    /// a word.
    fn begin_word(&mut self) {
        match &mut self.pending {
            Pending::Word { literal, .. } => *literal = true,
            Pending::Empty | Pending::Redirect => {
                self.flush(false);
                self.pending = Pending::Word {
                    text: String::new(),
                    literal: true,
                };
            }
        }
    }

    /// Appends a character to the pending word.
    fn push(&mut self, c: char, is_literal: bool) {
        match &mut self.pending {
            Pending::Word { text, literal } => {
                text.push(c);
                *literal |= is_literal;
            }
            Pending::Empty | Pending::Redirect => {
                self.flush(false);
                self.pending = Pending::Word {
                    text: String::from(c),
                    literal: is_literal,
                };
            }
        }
    }

    /// Emits whatever is pending. `before_redirect` is set when the pending
    /// text is terminated by a `>`.
    fn flush(&mut self, before_redirect: bool) {
        let token = match std::mem::replace(&mut self.pending, Pending::Empty) {
            Pending::Empty => return,
            Pending::Redirect => Token::new(TokenTag::RedirectOut, ">"),
            Pending::Word { text, literal } => {
                let tag = if before_redirect && !literal && is_digits(&text) {
                    TokenTag::IoNumber
                } else {
                    TokenTag::Word
                };
                Token::new(tag, text)
            }
        };
        self.emit(token);
    }

    fn emit(&mut self, token: Token) {
        trace!("token {:?} {:?}", token.tag, token.lexeme);
        self.tokens.push(token);
    }
}

/// Determines if the given text is a non-empty run of decimal digits.
fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(lexeme: &str) -> Token {
        Token::new(TokenTag::Word, lexeme)
    }

    fn io_number(lexeme: &str) -> Token {
        Token::new(TokenTag::IoNumber, lexeme)
    }

    fn out() -> Token {
        Token::new(TokenTag::RedirectOut, ">")
    }

    fn append() -> Token {
        Token::new(TokenTag::RedirectAppend, ">>")
    }

    #[test]
    fn splits_on_whitespace() {
        let tokens = tokenize("echo hello   world").unwrap();
        assert_eq!(tokens, vec![word("echo"), word("hello"), word("world")]);
    }

    #[test]
    fn empty_line_has_no_tokens() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize(" \t ").unwrap().is_empty());
    }

    #[test]
    fn quotes_preserve_whitespace() {
        let tokens = tokenize(r#"echo 'a  b' "c d""#).unwrap();
        assert_eq!(tokens, vec![word("echo"), word("a  b"), word("c d")]);
    }

    #[test]
    fn quoted_text_is_copied_verbatim() {
        let tokens = tokenize(r#"'a\nb' "c\""#).unwrap();
        assert_eq!(tokens, vec![word(r"a\nb"), word(r"c\")]);
    }

    #[test]
    fn single_quotes_inside_double_quotes() {
        let tokens = tokenize(r#""it's" 'say "hi"'"#).unwrap();
        assert_eq!(tokens, vec![word("it's"), word(r#"say "hi""#)]);
    }

    #[test]
    fn adjacent_pieces_join_into_one_word() {
        let tokens = tokenize(r#"a'b c'"d"e"#).unwrap();
        assert_eq!(tokens, vec![word("ab cde")]);
    }

    #[test]
    fn empty_quotes_make_an_empty_word() {
        let tokens = tokenize("echo '' \"\"").unwrap();
        assert_eq!(tokens, vec![word("echo"), word(""), word("")]);
    }

    #[test]
    fn backslash_escapes_next_character() {
        let tokens = tokenize(r"echo a\ \ b \' \\").unwrap();
        assert_eq!(tokens, vec![word("echo"), word("a  b"), word("'"), word(r"\")]);
    }

    #[test]
    fn escaped_redirect_is_a_word() {
        let tokens = tokenize(r"echo \> x").unwrap();
        assert_eq!(tokens, vec![word("echo"), word(">"), word("x")]);
    }

    #[test]
    fn trailing_backslash_is_dropped() {
        let tokens = tokenize(r"echo a\").unwrap();
        assert_eq!(tokens, vec![word("echo"), word("a")]);
    }

    #[test]
    fn redirect_operators() {
        let tokens = tokenize("ls > out >> log").unwrap();
        assert_eq!(
            tokens,
            vec![word("ls"), out(), word("out"), append(), word("log")]
        );
    }

    #[test]
    fn redirect_needs_no_surrounding_space() {
        let tokens = tokenize("echo hi>out>>log").unwrap();
        assert_eq!(
            tokens,
            vec![word("echo"), word("hi"), out(), word("out"), append(), word("log")]
        );
    }

    #[test]
    fn three_redirect_characters() {
        let tokens = tokenize(">>>").unwrap();
        assert_eq!(tokens, vec![append(), out()]);
    }

    #[test]
    fn digits_before_redirect_are_io_numbers() {
        let tokens = tokenize("cat x 2> err 1>>out").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("cat"),
                word("x"),
                io_number("2"),
                out(),
                word("err"),
                io_number("1"),
                append(),
                word("out"),
            ]
        );
    }

    #[test]
    fn digits_before_whitespace_stay_words() {
        let tokens = tokenize("echo 2 > err").unwrap();
        assert_eq!(tokens, vec![word("echo"), word("2"), out(), word("err")]);
    }

    #[test]
    fn quoted_digits_stay_words() {
        let tokens = tokenize("echo '2'> err").unwrap();
        assert_eq!(tokens, vec![word("echo"), word("2"), out(), word("err")]);
    }

    #[test]
    fn mixed_digits_stay_words() {
        let tokens = tokenize("echo a2> err").unwrap();
        assert_eq!(tokens, vec![word("echo"), word("a2"), out(), word("err")]);
    }

    #[test]
    fn unterminated_single_quote() {
        assert_eq!(
            tokenize("echo 'foo"),
            Err(LexError::UnterminatedQuote('\''))
        );
    }

    #[test]
    fn unterminated_double_quote() {
        let err = tokenize("echo \"foo").unwrap_err();
        assert_eq!(err, LexError::UnterminatedQuote('"'));
        assert_eq!(err.to_string(), "syntax error: unterminated \"");
    }
}
