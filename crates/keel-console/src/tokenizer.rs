//! Lexical tokenizer: handles single quotes, double quotes, and backslash
//! escapes (including `\xNN` byte escapes).
//!
//! The scan is a single pass over the characters of the line. Token content
//! is buffered as bytes so that hex escapes land in the token exactly; a
//! token becomes a `String` only when it is emitted.

use crate::actor::{Addr, Mailbox};
use crate::executor::ExecutorMsg;
use crate::input::{TokenizedInput, UserInput};
use crate::output::InvalidInput;
use crate::resolver::ResolverMsg;

/// What went wrong while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("missing terminating quote")]
    MissingQuote,
    #[error("escape sequence not complete")]
    IncompleteEscape,
    #[error("illegal escape sequence: \\{0}")]
    IllegalEscape(char),
    #[error("invalid hex digit: {0}")]
    InvalidHexDigit(char),
}

/// A lexical error and the character offset it was detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {offset}")]
pub struct TokenizeError {
    pub kind: LexError,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Normal,
    /// Inside a quoted run opened by the given quote character.
    Quoted(char),
    /// After a backslash. `quote` is the state to return to.
    Escape { quote: Option<char> },
    /// After `\x`, collecting two hex digits.
    Hex { quote: Option<char>, high: Option<u8> },
}

fn resume(quote: Option<char>) -> State {
    quote.map_or(State::Normal, State::Quoted)
}

#[derive(Default)]
struct Scanner {
    tokens: Vec<String>,
    current: Vec<u8>,
}

impl Scanner {
    fn push_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.current
            .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    }

    fn push_byte(&mut self, byte: u8) {
        self.current.push(byte);
    }

    /// Emit the pending token if there is one.
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.emit();
        }
    }

    /// Emit the pending token, even if empty (closing quote).
    fn emit(&mut self) {
        let bytes = std::mem::take(&mut self.current);
        let token = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        self.tokens.push(token);
    }
}

/// Split a line into tokens.
///
/// Outside quotes whitespace separates tokens. A quoted run always produces
/// a token, even an empty one. A backslash may escape either quote
/// character, a backslash, whitespace, or introduce a `\xNN` byte.
pub fn tokenize(text: &str) -> Result<Vec<String>, TokenizeError> {
    let mut scanner = Scanner::default();
    let mut state = State::Normal;

    for (offset, ch) in text.chars().enumerate() {
        state = match state {
            State::Normal => match ch {
                '\'' | '"' => {
                    scanner.flush();
                    State::Quoted(ch)
                },
                '\\' => State::Escape { quote: None },
                c if c.is_whitespace() => {
                    scanner.flush();
                    State::Normal
                },
                c => {
                    scanner.push_char(c);
                    State::Normal
                },
            },
            State::Quoted(quote) => match ch {
                c if c == quote => {
                    scanner.emit();
                    State::Normal
                },
                '\\' => State::Escape { quote: Some(quote) },
                c => {
                    scanner.push_char(c);
                    State::Quoted(quote)
                },
            },
            State::Escape { quote } => match ch {
                '\'' | '"' | '\\' => {
                    scanner.push_char(ch);
                    resume(quote)
                },
                c if c.is_whitespace() => {
                    scanner.push_char(c);
                    resume(quote)
                },
                'x' => State::Hex { quote, high: None },
                c => {
                    return Err(TokenizeError {
                        kind: LexError::IllegalEscape(c),
                        offset,
                    });
                },
            },
            State::Hex { quote, high } => {
                let digit = ch.to_digit(16).ok_or(TokenizeError {
                    kind: LexError::InvalidHexDigit(ch),
                    offset,
                })? as u8;
                match high {
                    None => State::Hex {
                        quote,
                        high: Some(digit),
                    },
                    Some(high) => {
                        scanner.push_byte((high << 4) | digit);
                        resume(quote)
                    },
                }
            },
        };
    }

    let end = text.chars().count();
    match state {
        State::Normal => {
            scanner.flush();
            Ok(scanner.tokens)
        },
        State::Quoted(_) => Err(TokenizeError {
            kind: LexError::MissingQuote,
            offset: end,
        }),
        State::Escape { .. } | State::Hex { .. } => Err(TokenizeError {
            kind: LexError::IncompleteEscape,
            offset: end,
        }),
    }
}

/// Tokenizer stage: tokenizes each filtered line and hands it to the
/// resolver. Lexical errors go to the executor as [`InvalidInput`].
pub async fn run_tokenizer(
    mut mailbox: Mailbox<UserInput>,
    resolver: Addr<ResolverMsg>,
    executor: Addr<ExecutorMsg>,
) {
    while let Some(input) = mailbox.recv().await {
        match tokenize(input.text()) {
            Ok(tokens) => {
                log::debug!("tokenized {:?} into {} token(s)", input.text(), tokens.len());
                resolver.tell(TokenizedInput::new(input, tokens));
            },
            Err(e) => {
                log::debug!("lexical error in {:?}: {e}", input.text());
                executor.tell(InvalidInput::lexical(input, e));
            },
        }
    }
    log::debug!("tokenizer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        tokenize(text).unwrap()
    }

    #[test]
    fn tokenize_simple() {
        assert_eq!(toks("cluster list"), vec!["cluster", "list"]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(toks("").is_empty());
        assert!(toks("   \t ").is_empty());
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(toks("  a \t  b  "), vec!["a", "b"]);
    }

    #[test]
    fn double_quoted_string() {
        assert_eq!(
            toks(r#"input "quoted string""#),
            vec!["input", "quoted string"]
        );
    }

    #[test]
    fn single_quoted_string() {
        assert_eq!(toks("input 'a  b'"), vec!["input", "a  b"]);
    }

    #[test]
    fn empty_quotes_produce_empty_token() {
        assert_eq!(toks("input ''"), vec!["input", ""]);
        assert_eq!(toks(r#"input """#), vec!["input", ""]);
    }

    #[test]
    fn other_quote_is_literal_inside_quotes() {
        assert_eq!(toks(r#"'say "hi"'"#), vec![r#"say "hi""#]);
        assert_eq!(toks(r#""it's""#), vec!["it's"]);
    }

    #[test]
    fn quote_flushes_pending_token() {
        assert_eq!(toks("ab'cd'ef"), vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn escaped_quote() {
        assert_eq!(toks(r#"input \""#), vec!["input", "\""]);
        assert_eq!(toks(r#""a\"b""#), vec!["a\"b"]);
    }

    #[test]
    fn escaped_backslash_and_space() {
        assert_eq!(toks(r"a\\b"), vec![r"a\b"]);
        assert_eq!(toks(r"hello\ world"), vec!["hello world"]);
    }

    #[test]
    fn hex_escape() {
        assert_eq!(toks(r"input \x25"), vec!["input", "%"]);
        assert_eq!(toks(r"'\x41\x62'"), vec!["Ab"]);
    }

    #[test]
    fn hex_escape_builds_multibyte_char() {
        assert_eq!(toks(r"caf\xc3\xa9"), vec!["café"]);
    }

    #[test]
    fn hex_escape_uppercase_digits() {
        assert_eq!(toks(r"\x4A"), vec!["J"]);
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(toks("grüße 'welt'"), vec!["grüße", "welt"]);
    }

    #[test]
    fn unterminated_quote_reports_input_length() {
        let text = r#"input "unterminated"#;
        let err = tokenize(text).unwrap_err();
        assert_eq!(err.kind, LexError::MissingQuote);
        assert_eq!(err.offset, text.len());
        assert_eq!(err.kind.to_string(), "missing terminating quote");
    }

    #[test]
    fn illegal_escape() {
        let err = tokenize(r"input \-").unwrap_err();
        assert_eq!(err.kind, LexError::IllegalEscape('-'));
        assert_eq!(err.offset, 7);
    }

    #[test]
    fn invalid_hex_digit() {
        let err = tokenize(r"a\x4g").unwrap_err();
        assert_eq!(err.kind, LexError::InvalidHexDigit('g'));
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn dangling_backslash_is_incomplete() {
        let err = tokenize("abc\\").unwrap_err();
        assert_eq!(err.kind, LexError::IncompleteEscape);
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn truncated_hex_is_incomplete() {
        let err = tokenize(r"\x4").unwrap_err();
        assert_eq!(err.kind, LexError::IncompleteEscape);
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let err = tokenize("é \\q").unwrap_err();
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn error_display_includes_offset() {
        let err = tokenize("'x").unwrap_err();
        assert_eq!(err.to_string(), "missing terminating quote at offset 2");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn plain_tokens_round_trip(words in proptest::collection::vec("[a-zA-Z0-9_./:=,-]{1,12}", 0..8)) {
                let line = words.join(" ");
                prop_assert_eq!(tokenize(&line).unwrap(), words);
            }

            #[test]
            fn single_quoting_preserves_content(content in "[a-z \"]{0,20}") {
                let line = format!("'{content}'");
                prop_assert_eq!(tokenize(&line).unwrap(), vec![content]);
            }

            #[test]
            fn tokens_never_contain_unescaped_separators(line in "[a-z ]{0,40}") {
                for token in tokenize(&line).unwrap() {
                    prop_assert!(!token.contains(' '));
                    prop_assert!(!token.is_empty());
                }
            }
        }
    }
}
