use crate::error::LdarError;
use regex::Regex;
use regex::RegexBuilder;
use std::ops::Range;

/// Case-insensitive literal matcher for a search query.
#[derive(Clone, Debug)]
pub struct Matcher {
    /// `None` for the empty query
    regex: Option<Regex>,
}

impl Matcher {
    /// Builds a matcher for `query` taken literally; regex metacharacters are escaped.
    pub fn new(query: &str) -> Result<Self, LdarError> {
        if query.is_empty() {
            return Ok(Matcher { regex: None });
        }
        let regex = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()?;
        Ok(Matcher { regex: Some(regex) })
    }

    /// True for the empty query, which matches every row and highlights nothing.
    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|regex| regex.is_match(text))
    }

    /// Byte ranges of the leftmost non-overlapping occurrences in `text`.
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        match &self.regex {
            Some(regex) => regex.find_iter(text).map(|found| found.range()).collect(),
            None => Vec::new(),
        }
    }
}
