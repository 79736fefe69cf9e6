//! Hierarchical command paths (`cluster list`, `database`, ...).

use std::fmt;
use std::str::FromStr;

/// Reasons a path cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("command path is empty")]
    Empty,
    #[error("command path segment {0} is empty")]
    EmptySegment(usize),
}

/// A non-empty, ordered sequence of path segments.
///
/// Ordering is lexicographic over segments; a path sorts before any longer
/// path that starts with all of its segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandPath {
    segments: Vec<String>,
}

impl CommandPath {
    pub fn new<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(index) = segments.iter().position(String::is_empty) {
            return Err(PathError::EmptySegment(index));
        }
        Ok(Self { segments })
    }

    /// Leading tokens up to (not including) the first one that starts with
    /// `-`, which marks the start of the options.
    pub fn from_tokens(tokens: &[String]) -> Result<Self, PathError> {
        Self::new(tokens.iter().take_while(|t| !t.starts_with('-')).cloned())
    }

    /// Whitespace-separated words of `text`, with the same option cut-off
    /// as [`from_tokens`](Self::from_tokens).
    pub fn parse(text: &str) -> Result<Self, PathError> {
        Self::new(text.split_whitespace().take_while(|t| !t.starts_with('-')))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `query` selects this path.
    ///
    /// `query` may not be longer than `self`, and each of its segments must
    /// be a prefix of the corresponding segment here. `cluster li` selects
    /// `cluster list`; `cluster list` does not select `cluster`.
    pub fn is_prefix(&self, query: &CommandPath) -> bool {
        query.segments.len() <= self.segments.len()
            && query
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(q, s)| s.starts_with(q.as_str()))
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(" "))
    }
}

impl FromStr for CommandPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> CommandPath {
        text.parse().unwrap()
    }

    #[test]
    fn empty_path_rejected() {
        assert_eq!(CommandPath::new(Vec::<String>::new()), Err(PathError::Empty));
        assert_eq!(CommandPath::parse("   "), Err(PathError::Empty));
    }

    #[test]
    fn empty_segment_rejected() {
        assert_eq!(
            CommandPath::new(["a", ""]),
            Err(PathError::EmptySegment(1))
        );
    }

    #[test]
    fn parse_stops_at_first_option() {
        let p = path("database -t company list");
        assert_eq!(p.segments(), ["database"]);
        assert_eq!(CommandPath::parse("-t company"), Err(PathError::Empty));
    }

    #[test]
    fn from_tokens_stops_at_first_option() {
        let tokens: Vec<String> = ["cluster", "list", "--verbose", "extra"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let p = CommandPath::from_tokens(&tokens).unwrap();
        assert_eq!(p.segments(), ["cluster", "list"]);
        assert_eq!(p.len(), 2);
        assert!(!p.is_empty());
    }

    #[test]
    fn from_tokens_keeps_quoted_spaces() {
        let tokens = vec!["with space".to_string()];
        assert_eq!(CommandPath::from_tokens(&tokens).unwrap().len(), 1);
    }

    #[test]
    fn prefix_is_asymmetric() {
        let full = path("one two three");
        let partial = path("one tw");
        assert!(full.is_prefix(&partial));
        assert!(!partial.is_prefix(&full));
    }

    #[test]
    fn prefix_accepts_abbreviated_segments() {
        assert!(path("cluster list").is_prefix(&path("cluster li")));
        assert!(path("cluster list").is_prefix(&path("c")));
        assert!(path("cluster list").is_prefix(&path("cluster list")));
    }

    #[test]
    fn prefix_rejects_longer_or_mismatched_query() {
        assert!(!path("help").is_prefix(&path("help input")));
        assert!(!path("cluster list").is_prefix(&path("cluster lx")));
        assert!(!path("cluster list").is_prefix(&path("list")));
    }

    #[test]
    fn ordering_shorter_first() {
        let ab = path("a b");
        let abc = path("a b c");
        let bc = path("b c");
        assert!(ab < abc);
        assert!(abc < bc);
        assert!(ab < bc);
    }

    #[test]
    fn display_joins_segments() {
        assert_eq!(path("cluster   list").to_string(), "cluster list");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn path_selects_itself(words in proptest::collection::vec("[a-z]{1,8}", 1..5)) {
                let p = CommandPath::new(words).unwrap();
                prop_assert!(p.is_prefix(&p));
            }

            #[test]
            fn truncated_segments_still_select(words in proptest::collection::vec("[a-z]{2,8}", 1..5)) {
                let full = CommandPath::new(words.clone()).unwrap();
                let short = CommandPath::new(words.iter().map(|w| w[..1].to_string())).unwrap();
                prop_assert!(full.is_prefix(&short));
            }
        }
    }
}
