//! Source code representation.

use crate::Specification;
use std::borrow::Cow;

/// Represents source code after the specification's case rules have been applied.
#[derive(Debug, Clone)]
pub struct Source<'a> {
    content: Cow<'a, str>,
}

impl<'a> Source<'a> {
    /// Create a new `Source` from `content`.
    /// The whole text, string literals included, is upper-cased if the specification enforces
    /// upper-case code.
    pub fn new(content: &'a str, spec: &Specification) -> Self {
        let content = if spec.enforce_uppercase_code {
            Cow::Owned(content.to_uppercase())
        } else {
            Cow::Borrowed(content)
        };
        Self { content }
    }

    /// Normalized source code.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Iterates over the lines of the source along with their 1-based line numbers.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.content
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
    }
}
