//! Operator input as it moves through the pipeline.

use std::fmt;

/// One trimmed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserInput {
    text: String,
}

impl UserInput {
    pub fn new(line: &str) -> Self {
        Self {
            text: line.trim().to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Lines starting with `#` are comments.
    pub fn is_comment(&self) -> bool {
        self.text.starts_with('#')
    }
}

impl fmt::Display for UserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A line together with the tokens the tokenizer produced for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenizedInput {
    input: UserInput,
    tokens: Vec<String>,
}

impl TokenizedInput {
    pub fn new(input: UserInput, tokens: Vec<String>) -> Self {
        Self { input, tokens }
    }

    pub fn input(&self) -> &UserInput {
        &self.input
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_trimmed() {
        let input = UserInput::new("  cluster list \t\n");
        assert_eq!(input.text(), "cluster list");
        assert_eq!(input.to_string(), "cluster list");
    }

    #[test]
    fn blank_line_is_empty() {
        assert!(UserInput::new("   ").is_empty());
        assert!(!UserInput::new("help").is_empty());
    }

    #[test]
    fn comment_detection_after_trim() {
        assert!(UserInput::new("  # note").is_comment());
        assert!(!UserInput::new("help # not a comment").is_comment());
    }

    #[test]
    fn tokenized_equality_covers_tokens() {
        let a = TokenizedInput::new(UserInput::new("a b"), vec!["a".into(), "b".into()]);
        let b = TokenizedInput::new(UserInput::new("a b"), vec!["a b".into()]);
        assert_ne!(a, b);
        assert!(a < b);
    }
}
